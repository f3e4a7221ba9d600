//! User slash-command parser.
//!
//! Parses `/command arg1 arg2 ...` input lines into typed [`ParsedCommand`]
//! values that the input handler turns into session actions.

/// A parsed user command. Each variant corresponds to a `/command`.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedCommand {
    Join { channel: String },
    Msg { target: String, text: String },
    Raw { command: String },
    Quit,
    Help,
}

/// Parse a slash-command string into a [`ParsedCommand`].
///
/// Returns `None` if the input does not start with `/` or is not a recognized
/// command. Commands are case-insensitive.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    let body = input.strip_prefix('/')?;

    let parts: Vec<&str> = body.splitn(3, ' ').collect();
    let cmd = parts.first()?.to_lowercase();

    match cmd.as_str() {
        "join" | "j" => {
            let channel = parts.get(1)?.to_string();
            let channel = if channel.starts_with('#') {
                channel
            } else {
                format!("#{}", channel)
            };
            Some(ParsedCommand::Join { channel })
        }
        "msg" | "query" => {
            let target = parts.get(1)?.to_string();
            let text = parts.get(2).unwrap_or(&"").to_string();
            Some(ParsedCommand::Msg { target, text })
        }
        "raw" | "quote" => {
            let command = body.split_once(' ')?.1.trim();
            if command.is_empty() {
                return None;
            }
            Some(ParsedCommand::Raw {
                command: command.to_string(),
            })
        }
        "quit" | "exit" => Some(ParsedCommand::Quit),
        "help" | "h" => Some(ParsedCommand::Help),
        _ => None,
    }
}

pub const HELP_TEXT: &[&str] = &[
    "/join <#channel>       join a channel and make it current",
    "/msg <#channel> <text> send a message to a channel",
    "/raw <line>            send a raw protocol line",
    "/quit                  close the session and exit",
    "anything else is sent to the current channel",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_adds_missing_hash() {
        assert_eq!(
            parse_command("/join rust"),
            Some(ParsedCommand::Join { channel: "#rust".into() })
        );
        assert_eq!(
            parse_command("/J #rust"),
            Some(ParsedCommand::Join { channel: "#rust".into() })
        );
        assert_eq!(parse_command("/join"), None);
    }

    #[test]
    fn test_msg_keeps_text_verbatim() {
        assert_eq!(
            parse_command("/msg #rust hello  there :)"),
            Some(ParsedCommand::Msg {
                target: "#rust".into(),
                text: "hello  there :)".into()
            })
        );
    }

    #[test]
    fn test_raw() {
        assert_eq!(
            parse_command("/raw CAP REQ :twitch.tv/tags"),
            Some(ParsedCommand::Raw {
                command: "CAP REQ :twitch.tv/tags".into()
            })
        );
        assert_eq!(parse_command("/raw"), None);
        assert_eq!(parse_command("/raw   "), None);
    }

    #[test]
    fn test_plain_text_and_unknown() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/frobnicate"), None);
        assert_eq!(parse_command("/QUIT"), Some(ParsedCommand::Quit));
        assert_eq!(parse_command("/help"), Some(ParsedCommand::Help));
    }
}
