//! IRC protocol layer: transport, line framing, message parsing, and the
//! registration session.

pub mod commands;
pub mod framing;
pub mod message;
pub mod session;
pub mod transport;
