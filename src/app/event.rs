use crate::irc::session::SessionEvent;
use crate::irc::transport::{ConnectionId, TransportEvent};

#[derive(Debug)]
pub enum AppEvent {
    /// Socket notification stamped with its connection, routed straight
    /// to the session
    Transport(ConnectionId, TransportEvent),

    /// Something the session wants the user to know about
    Session(SessionEvent),

    /// One line typed on stdin
    Input(String),

    /// stdin reached end of file
    InputClosed,
}
