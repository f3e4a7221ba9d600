/// What the shell remembers between events.
#[derive(Debug)]
pub struct AppState {
    pub nickname: String,
    /// Joined automatically after the handshake completes.
    pub autojoin: Vec<String>,
    /// Where plain input lines are sent.
    pub current_channel: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(nickname: String, autojoin: Vec<String>) -> Self {
        Self {
            nickname,
            autojoin,
            current_channel: None,
            should_quit: false,
        }
    }
}
