//! Inbound IRC line parser.
//!
//! Splits one protocol line into its optional tag payload, optional prefix,
//! command, and the verbatim parameter string. Nothing is validated: a line
//! that doesn't fit the grammar still produces a message, just with empty
//! fields.

use std::fmt;

/// One parsed protocol line. Fields are stored exactly as received,
/// including the leading `@` of the tags and the leading `:` of the prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrcMessage {
    pub tags: Option<String>,
    pub prefix: Option<String>,
    pub command: String,
    pub parameters: String,
}

impl IrcMessage {
    /// Parse a single line (without its terminator).
    ///
    /// Each step consumes up to the next single space: tags if the line
    /// starts with `@`, then the prefix if it starts with `:`, then the
    /// command. Whatever is left is the parameter string. A line with no
    /// space left at the command step yields an empty command and empty
    /// parameters.
    pub fn parse(line: &str) -> Self {
        let mut rest = line;

        let tags = take_marked_token(&mut rest, '@');
        let prefix = take_marked_token(&mut rest, ':');

        let (command, parameters) = match rest.split_once(' ') {
            Some((command, parameters)) => (command.to_string(), parameters.to_string()),
            None => (String::new(), String::new()),
        };

        Self {
            tags,
            prefix,
            command,
            parameters,
        }
    }

    /// Nickname part of the prefix (`:nick!user@host` -> `nick`).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?.strip_prefix(':')?;
        let nick = prefix.split(['!', '@']).next().unwrap_or(prefix);
        if nick.is_empty() {
            None
        } else {
            Some(nick)
        }
    }

    /// First parameter, e.g. the channel of a `PRIVMSG`.
    pub fn target(&self) -> Option<&str> {
        if self.parameters.starts_with(':') {
            return None;
        }
        self.parameters.split(' ').next().filter(|t| !t.is_empty())
    }

    /// Trailing parameter: everything after the first ` :`.
    pub fn trailing(&self) -> Option<&str> {
        if let Some(text) = self.parameters.strip_prefix(':') {
            return Some(text);
        }
        self.parameters.split_once(" :").map(|(_, text)| text)
    }

    /// True for three-digit reply codes such as `001`.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for IrcMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref tags) = self.tags {
            write!(f, "{} ", tags)?;
        }
        if let Some(ref prefix) = self.prefix {
            write!(f, "{} ", prefix)?;
        }
        f.write_str(&self.command)?;
        if !self.parameters.is_empty() {
            write!(f, " {}", self.parameters)?;
        }
        Ok(())
    }
}

/// Remove and return the leading token if it starts with `marker` and is
/// followed by a space. Otherwise `rest` is left untouched.
fn take_marked_token(rest: &mut &str, marker: char) -> Option<String> {
    if !rest.starts_with(marker) {
        return None;
    }
    let (token, remainder) = rest.split_once(' ')?;
    *rest = remainder;
    Some(token.to_string())
}
