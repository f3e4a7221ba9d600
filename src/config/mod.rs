pub mod model;
pub mod nickname;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub use model::{AppConfig, LoggingConfig};

/// Overrides the config file location, mostly for pointing a second
/// client instance at another server.
const CONFIG_ENV: &str = "CHIRP_CONFIG";

fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chirp")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

/// Load the client config at `path`. A missing file is replaced by the
/// defaults, written back so the generated `justinfan` nickname stays the
/// same between launches.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let config = AppConfig::default();
        save_config_to(&config, path)?;
        return Ok(config);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read chat client config {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Invalid chat client config in {}", path.display()))?;
    validate(&config).with_context(|| format!("Unusable settings in {}", path.display()))?;
    Ok(config)
}

fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create config directory {}", parent.display()))?;
    }
    let contents =
        toml::to_string_pretty(config).context("Cannot serialize default chat client config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Cannot write default config to {}", path.display()))?;
    Ok(())
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.server.host.trim().is_empty() {
        bail!("server.host is empty");
    }
    if config.server.port == 0 {
        bail!("server.port must be between 1 and 65535");
    }
    if config.account.nickname.trim().is_empty() {
        bail!("account.nickname is empty");
    }
    if let Some(channel) = config.channels.iter().find(|c| !c.starts_with('#')) {
        bail!("channel {:?} must start with '#'", channel);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chirp-config-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = scratch("first-run");
        let path = dir.join("chirp").join("config.toml");

        let first = load_config_from(&path).unwrap();
        assert!(path.exists());
        let second = load_config_from(&path).unwrap();
        assert_eq!(first.account.nickname, second.account.nickname);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_channel_is_rejected() {
        let dir = scratch("bad-channel");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "channels = [\"rust\"]\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("channel \"rust\" must start with '#'"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = scratch("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[server\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("Invalid chat client config in"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        assert!(validate(&config).is_ok());
        config.server.port = 0;
        assert!(validate(&config).is_err());
    }
}
