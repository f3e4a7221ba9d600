//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the client can connect anonymously
//! out of the box.

use serde::{Deserialize, Serialize};

use super::nickname::generate_nickname;
use crate::irc::session::Credentials;
use crate::irc::transport::Endpoint;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub account: AccountConfig,
    /// Channels joined once the handshake completes.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            account: AccountConfig::default(),
            channels: Vec::new(),
            log_level: default_log_level(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Remote chat server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

/// Identity presented during registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default = "default_nickname")]
    pub nickname: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
    /// OAuth token without the `oauth:` prefix. Any value works for
    /// anonymous `justinfan` logins.
    #[serde(default = "default_auth_token")]
    pub auth_token: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            nickname: default_nickname(),
            user: None,
            real_name: None,
            auth_token: default_auth_token(),
        }
    }
}

impl AccountConfig {
    /// Build session credentials, falling back to the nickname for the
    /// user and real name.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            nickname: self.nickname.clone(),
            user: self.user.clone().unwrap_or_else(|| self.nickname.clone()),
            real_name: self
                .real_name
                .clone()
                .unwrap_or_else(|| self.nickname.clone()),
            auth_token: self.auth_token.clone(),
        }
    }
}

/// Chat transcript logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

fn default_port() -> u16 {
    6667
}

fn default_nickname() -> String {
    generate_nickname()
}

fn default_auth_token() -> String {
    "anonymous".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "~/.local/share/chirp/logs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "irc.chat.twitch.tv");
        assert_eq!(config.server.port, 6667);
        assert!(config.account.nickname.starts_with("justinfan"));
        assert!(config.channels.is_empty());
        assert_eq!(config.log_level, "info");
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_partial_file() {
        let config: AppConfig = toml::from_str(
            r##"
            channels = ["#rust"]

            [server]
            host = "127.0.0.1"

            [account]
            nickname = "ferris"
            auth_token = "abc123"
            "##,
        )
        .unwrap();
        assert_eq!(config.server.endpoint(), Endpoint::new("127.0.0.1", 6667));
        assert_eq!(config.channels, vec!["#rust"]);

        let creds = config.account.credentials();
        assert_eq!(creds.nickname, "ferris");
        assert_eq!(creds.user, "ferris");
        assert_eq!(creds.real_name, "ferris");
        assert_eq!(creds.auth_token, "abc123");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.account.nickname, config.account.nickname);
        assert_eq!(parsed.server.host, config.server.host);
    }
}
