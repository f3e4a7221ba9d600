//! Diagnostics setup and chat transcript logging.
//!
//! Diagnostics go through `tracing` to stderr. When enabled, received channel
//! messages are also appended to daily transcript files named
//! `<channel>_<date>.log` in the configured log directory (default:
//! `~/.local/share/chirp/logs/`).

use crate::config::LoggingConfig;
use crate::irc::message::IrcMessage;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{warn, Level};

/// Install the stderr subscriber. Unknown level names fall back to `info`.
pub fn init_diagnostics(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Writes received `PRIVMSG`s to per-channel daily log files.
///
/// File handles are cached for the lifetime of the logger to avoid repeated
/// opens. A file that cannot be created is reported once and skipped.
pub struct ChatLogger {
    enabled: bool,
    log_dir: PathBuf,
    file_handles: HashMap<String, Option<fs::File>>,
}

impl ChatLogger {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            log_dir: expand_home(&config.log_dir),
            file_handles: HashMap::new(),
        }
    }

    /// Append a message to its channel's log. No-op if logging is disabled
    /// or the message is not a channel `PRIVMSG`.
    pub fn log_message(&mut self, msg: &IrcMessage) {
        if !self.enabled || msg.command != "PRIVMSG" {
            return;
        }
        let Some(channel) = msg.target().filter(|t| t.starts_with('#')) else {
            return;
        };

        let now = chrono::Local::now();
        let line = format!(
            "[{}] <{}> {}",
            now.format("%H:%M:%S"),
            msg.nick().unwrap_or("*"),
            msg.trailing().unwrap_or_default()
        );

        // Sanitize channel for filename
        let safe_channel: String = channel
            .trim_start_matches('#')
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let filename = format!("{}_{}.log", safe_channel, now.format("%Y-%m-%d"));

        let log_dir = &self.log_dir;
        let handle = self.file_handles.entry(filename.clone()).or_insert_with(|| {
            let path = log_dir.join(&filename);
            let opened = fs::create_dir_all(log_dir)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            match opened {
                Ok(file) => Some(file),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cannot open transcript");
                    None
                }
            }
        });

        if let Some(file) = handle {
            let _ = writeln!(file, "{}", line);
        }
    }
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(dir)),
        None => PathBuf::from(dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chirp-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_writes_channel_messages() {
        let dir = temp_log_dir("transcript");
        let mut logger = ChatLogger::new(&LoggingConfig {
            enabled: true,
            log_dir: dir.to_string_lossy().into_owned(),
        });

        logger.log_message(&IrcMessage::parse(":alice!alice@host PRIVMSG #rust :hello world"));
        logger.log_message(&IrcMessage::parse(":tmi.twitch.tv 353 me = #rust :alice"));
        logger.log_message(&IrcMessage::parse(":alice!alice@host PRIVMSG #rust :second"));

        let date = chrono::Local::now().format("%Y-%m-%d");
        let contents = fs::read_to_string(dir.join(format!("rust_{}.log", date))).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("<alice> hello world"));
        assert!(lines[1].ends_with("<alice> second"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = temp_log_dir("disabled");
        let mut logger = ChatLogger::new(&LoggingConfig {
            enabled: false,
            log_dir: dir.to_string_lossy().into_owned(),
        });
        logger.log_message(&IrcMessage::parse(":a!a@a PRIVMSG #rust :hi"));
        assert!(!dir.exists());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/log/chirp"), PathBuf::from("/var/log/chirp"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/logs"), home.join("logs"));
        }
    }
}
