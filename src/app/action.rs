use crate::irc::message::IrcMessage;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Join { channel: String },
    SendMessage { target: String, text: String },
    SendRaw { command: String },
    Print { line: String },
    Transcribe { message: IrcMessage },
    Quit,
}
