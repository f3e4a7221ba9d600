//! IRC session: registration handshake, keep-alives, and inbound dispatch.
//!
//! A [`Session`] owns one [`Transport`] and is driven entirely by
//! [`Session::dispatch`]. What the owner needs to know comes back as
//! [`SessionEvent`]s on the channel given at construction.
//!
//! ```text
//! Unopened ──register──> Opening ──writable──> AwaitingRegistration
//!                           │                      │          │
//!                           │                    PING        001
//!                           │                      v          │
//!                           │          KeepaliveAcknowledged  │
//!                           │                      │ 001      │
//!                           └──────001─────────────┴──> Ready <┘
//!
//! any open state ──closed / close()──> Closed ──register──> Opening
//! ```

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::framing::{self, LineBuffer};
use super::message::IrcMessage;
use super::transport::{ConnectionId, Transport, TransportEvent};

/// Numeric reply sent once the server has accepted our identity.
pub const RPL_WELCOME: &str = "001";

/// Identity used for the handshake. Replaced wholesale on every `register`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub nickname: String,
    pub user: String,
    pub real_name: String,
    pub auth_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    Opening,
    /// `PASS`/`NICK` sent, waiting for the server.
    AwaitingRegistration,
    /// The server has pinged us and we answered. Connection is alive but
    /// the identity has not been confirmed with `001` yet.
    KeepaliveAcknowledged,
    Ready,
    Closed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Unopened | Closed, Opening)
                | (Opening, AwaitingRegistration)
                | (AwaitingRegistration, KeepaliveAcknowledged)
                | (Opening | AwaitingRegistration | KeepaliveAcknowledged, Ready)
                | (Opening | AwaitingRegistration | KeepaliveAcknowledged | Ready, Closed)
        )
    }

    pub fn is_connected(self) -> bool {
        !matches!(self, SessionState::Unopened | SessionState::Closed)
    }
}

/// Notifications for the owner of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    HandshakeCompleted,
    MessageReceived(IrcMessage),
    SessionClosed,
    TransportError(String),
}

pub struct Session<T: Transport> {
    transport: T,
    events: mpsc::UnboundedSender<SessionEvent>,
    credentials: Credentials,
    state: SessionState,
    inbound: LineBuffer,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            transport,
            events,
            credentials: Credentials::default(),
            state: SessionState::Unopened,
            inbound: LineBuffer::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn host(&self) -> &str {
        &self.transport.endpoint().host
    }

    pub fn port(&self) -> u16 {
        self.transport.endpoint().port
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Store credentials and start connecting. The handshake itself goes out
    /// on the first `Writable` notification.
    ///
    /// On a session that is already connected only the credentials change.
    pub fn register(&mut self, credentials: Credentials) {
        self.credentials = credentials;

        if self.state.is_connected() {
            debug!(state = ?self.state, "already connected, credentials updated");
            return;
        }
        if self.transition(SessionState::Opening) {
            self.transport.open();
        }
    }

    /// Join a channel. Names without a leading `#` are ignored.
    pub fn join(&mut self, channel: &str) {
        if channel.starts_with('#') {
            self.send_command(&format!("JOIN {}", channel));
        } else {
            debug!(channel, "not a channel name, skipping JOIN");
        }
    }

    pub fn send_to_channel(&mut self, text: &str, channel: &str) {
        if channel.starts_with('#') {
            self.send_privmsg(channel, text);
        } else {
            debug!(channel, "not a channel name, dropping message");
        }
    }

    /// Send a message addressed to a nickname.
    ///
    /// Only targets starting with `#` are sent, same gate as
    /// [`Session::send_to_channel`]. Nicknames are dropped with a warning.
    pub fn send_to_nickname(&mut self, text: &str, nickname: &str) {
        if nickname.starts_with('#') {
            self.send_privmsg(nickname, text);
        } else {
            warn!(nickname, "direct messages to nicknames are not sent");
        }
    }

    /// Frame and write one raw command line.
    pub fn send_command(&mut self, command: &str) {
        debug!(command = redact(command), "sending");
        self.transport.send(&framing::frame(command));
    }

    /// Close the connection. The session is `Closed` when this returns, so
    /// `register` can reconnect straight away; the transport's own `Closed`
    /// notification for this connection is ignored.
    pub fn close(&mut self) {
        self.transport.close();
        if self.state.is_connected() {
            self.enter_closed();
        } else {
            debug!(state = ?self.state, "session is not connected");
        }
    }

    /// Dispatch one notification from the transport. Notifications from a
    /// connection that has been closed or replaced are dropped.
    pub fn dispatch(&mut self, connection: ConnectionId, event: TransportEvent) {
        if self.transport.accept(connection, &event) {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => debug!("socket opened"),
            TransportEvent::Writable => self.on_writable(),
            TransportEvent::Data(chunk) => self.on_data(&chunk),
            TransportEvent::Closed => self.on_closed(),
            TransportEvent::Error(err) => {
                warn!(error = %err, "transport error");
                self.emit(SessionEvent::TransportError(err.to_string()));
            }
        }
    }

    fn on_writable(&mut self) {
        if self.state != SessionState::Opening {
            return;
        }
        if self.transition(SessionState::AwaitingRegistration) {
            let pass = format!("PASS oauth:{}", self.credentials.auth_token);
            let nick = format!("NICK {}", self.credentials.nickname);
            self.send_command(&pass);
            self.send_command(&nick);
        }
    }

    fn on_data(&mut self, chunk: &str) {
        if !self.state.is_connected() {
            debug!(state = ?self.state, "ignoring data on a closed session");
            return;
        }
        debug!(chunk, "socket received");

        for line in self.inbound.push(chunk) {
            if line.starts_with("PING") {
                self.pong(&line);
            } else {
                self.handle_line(&line);
            }
        }
    }

    fn on_closed(&mut self) {
        if self.state == SessionState::Closed {
            debug!("session already closed");
            return;
        }
        self.enter_closed();
    }

    fn enter_closed(&mut self) {
        if !self.transition(SessionState::Closed) {
            return;
        }
        self.inbound.clear();
        self.emit(SessionEvent::SessionClosed);
    }

    fn pong(&mut self, ping: &str) {
        let echo = ping.replace("PING :", "");
        self.send_command(&format!("PONG :{}", echo));

        if self.state == SessionState::AwaitingRegistration {
            self.transition(SessionState::KeepaliveAcknowledged);
        }
    }

    fn handle_line(&mut self, line: &str) {
        let message = IrcMessage::parse(line);

        if message.command == RPL_WELCOME {
            if self.transition(SessionState::Ready) {
                self.emit(SessionEvent::HandshakeCompleted);
            }
            return;
        }
        self.emit(SessionEvent::MessageReceived(message));
    }

    fn transition(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(from = ?self.state, to = ?next, "rejected session transition");
            return false;
        }
        debug!(from = ?self.state, to = ?next, "session transition");
        self.state = next;
        true
    }

    fn send_privmsg(&mut self, target: &str, text: &str) {
        self.send_command(&format!("PRIVMSG {} :{}", target, text));
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("session event receiver dropped");
        }
    }
}

/// Hide the token of a `PASS` line before it reaches the logs.
fn redact(command: &str) -> &str {
    if command.starts_with("PASS ") {
        "PASS <redacted>"
    } else {
        command
    }
}
