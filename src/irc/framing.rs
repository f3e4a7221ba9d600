//! Line framing for the IRC byte stream.
//!
//! Outbound commands are terminated with CRLF. Inbound chunks arrive with
//! arbitrary boundaries, so [`LineBuffer`] holds on to a trailing fragment
//! until the rest of the line shows up.

pub const LINE_ENDING: &str = "\r\n";

/// Append the protocol line terminator to a command.
pub fn frame(command: &str) -> String {
    let mut line = String::with_capacity(command.len() + LINE_ENDING.len());
    line.push_str(command);
    line.push_str(LINE_ENDING);
    line
}

/// Accumulates decoded chunks and yields complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and collect every line it completes.
    ///
    /// Lines are split on `\n` with a single trailing `\r` removed, so bare
    /// LF terminators are tolerated. Empty lines are dropped.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);

        let Some(last_newline) = self.pending.rfind('\n') else {
            return Vec::new();
        };

        let remainder = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, remainder);

        complete
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Bytes of an unterminated line waiting for the next chunk.
    #[cfg(test)]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_appends_crlf() {
        assert_eq!(frame("NICK justinfan1"), "NICK justinfan1\r\n");
    }

    #[test]
    fn test_single_line() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push("PING :tmi.twitch.tv\r\n"), vec!["PING :tmi.twitch.tv"]);
        assert_eq!(buf.pending(), "");
    }

    #[test]
    fn test_several_lines_in_one_chunk() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(":a 001 me :Welcome\r\n:a 002 me :Host\r\n:a 003 me :Created\r\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], ":a 003 me :Created");
    }

    #[test]
    fn test_fragment_carried_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(":nick!n@n PRIVMSG #chan :hel").is_empty());
        assert_eq!(buf.pending(), ":nick!n@n PRIVMSG #chan :hel");

        let lines = buf.push("lo\r\nPING :tmi");
        assert_eq!(lines, vec![":nick!n@n PRIVMSG #chan :hello"]);
        assert_eq!(buf.pending(), "PING :tmi");

        assert_eq!(buf.push(".twitch.tv\r\n"), vec!["PING :tmi.twitch.tv"]);
    }

    #[test]
    fn test_terminator_split_between_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push("PING :x\r").is_empty());
        assert_eq!(buf.push("\n"), vec!["PING :x"]);
    }

    #[test]
    fn test_bare_lf_and_blank_lines() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push("one\n\r\n\ntwo\r\n"), vec!["one", "two"]);
    }

    #[test]
    fn test_clear_drops_fragment() {
        let mut buf = LineBuffer::new();
        buf.push("partial");
        buf.clear();
        assert_eq!(buf.push("next\r\n"), vec!["next"]);
    }
}
