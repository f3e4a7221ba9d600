//! TCP transport for a single IRC connection.
//!
//! The transport never blocks its caller. [`TcpTransport::open`] spawns a
//! connection task and returns; everything that happens on the socket is
//! reported back as a [`TransportEvent`] on the channel supplied at
//! construction, stamped with the [`ConnectionId`] of the connection that
//! produced it. The owner feeds those events to the session one at a time,
//! and events from a connection that has since been closed are dropped.

use std::fmt;
use std::io;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Size of a single socket read. Each read is forwarded as one chunk.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Remote host and port, fixed for the lifetime of a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    #[error("socket read failed: {0}")]
    Read(#[source] io::Error),
    #[error("socket write failed: {0}")]
    Write(#[source] io::Error),
}

/// Identifies one `open()` of a transport. Every reopen gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionId(pub u64);

/// What a transport puts on its event channel.
pub type StampedEvent = (ConnectionId, TransportEvent);

/// Notifications produced by a transport, in the order they can occur.
#[derive(Debug)]
pub enum TransportEvent {
    /// Connection established.
    Opened,
    /// One decoded read. Chunk boundaries do not follow line boundaries.
    Data(String),
    /// The socket can take more output.
    Writable,
    /// Remote end closed, local close, or the connection failed.
    Closed,
    Error(TransportError),
}

/// The operations a session needs from its byte channel.
pub trait Transport {
    fn endpoint(&self) -> &Endpoint;

    /// Start connecting. No-op if already opening or open.
    fn open(&mut self);

    /// Tear down the connection. Emits `Closed` once; later calls do nothing.
    fn close(&mut self);

    /// Write raw text. Dropped without error if the transport is closed.
    fn send(&mut self, data: &str);

    /// Decide whether an event from `connection` still applies, updating
    /// the transport's own bookkeeping when it does. Events from a closed
    /// or replaced connection return `false`.
    fn accept(&mut self, connection: ConnectionId, event: &TransportEvent) -> bool;
}

enum Link {
    Closed,
    Active {
        outbound: mpsc::UnboundedSender<String>,
        task: JoinHandle<()>,
    },
}

/// Tokio-backed [`Transport`] over a plain TCP stream.
///
/// Writes go through a queue drained by the connection task, so commands
/// issued while the connection is still being established are sent once it
/// is up, and concurrent writes never interleave.
pub struct TcpTransport {
    endpoint: Endpoint,
    events: mpsc::UnboundedSender<StampedEvent>,
    connection: ConnectionId,
    link: Link,
}

impl TcpTransport {
    pub fn new(endpoint: Endpoint, events: mpsc::UnboundedSender<StampedEvent>) -> Self {
        Self {
            endpoint,
            events,
            connection: ConnectionId(0),
            link: Link::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.link, Link::Active { .. })
    }
}

impl Transport for TcpTransport {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn open(&mut self) {
        if self.is_open() {
            debug!(endpoint = %self.endpoint, "socket is already open");
            return;
        }

        self.connection = ConnectionId(self.connection.0 + 1);
        let notifier = Notifier {
            connection: self.connection,
            events: self.events.clone(),
        };
        let (outbound, queue) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(self.endpoint.clone(), queue, notifier));
        self.link = Link::Active { outbound, task };
    }

    fn close(&mut self) {
        if let Link::Active { task, .. } = std::mem::replace(&mut self.link, Link::Closed) {
            task.abort();
            debug!(endpoint = %self.endpoint, connection = self.connection.0, "socket closed");
            let _ = self.events.send((self.connection, TransportEvent::Closed));
        }
    }

    fn send(&mut self, data: &str) {
        match &self.link {
            Link::Active { outbound, .. } => {
                if outbound.send(data.to_string()).is_err() {
                    debug!("connection task has ended, dropping write");
                }
            }
            Link::Closed => debug!("socket is not open, dropping write"),
        }
    }

    fn accept(&mut self, connection: ConnectionId, event: &TransportEvent) -> bool {
        if !self.is_open() || connection != self.connection {
            debug!(connection = connection.0, "dropping event from a stale connection");
            return false;
        }
        // The connection task has already finished when it reports Closed.
        if matches!(event, TransportEvent::Closed) {
            self.link = Link::Closed;
        }
        true
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if let Link::Active { task, .. } = &self.link {
            task.abort();
        }
    }
}

/// Event sender owned by one connection task.
struct Notifier {
    connection: ConnectionId,
    events: mpsc::UnboundedSender<StampedEvent>,
}

impl Notifier {
    /// Returns `false` once the receiving side is gone.
    fn send(&self, event: TransportEvent) -> bool {
        self.events.send((self.connection, event)).is_ok()
    }
}

async fn run_connection(
    endpoint: Endpoint,
    mut queue: mpsc::UnboundedReceiver<String>,
    events: Notifier,
) {
    let stream = match TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await {
        Ok(stream) => stream,
        Err(source) => {
            warn!(%endpoint, error = %source, "connect failed");
            events.send(TransportEvent::Error(TransportError::Connect {
                endpoint,
                source,
            }));
            events.send(TransportEvent::Closed);
            return;
        }
    };

    debug!(%endpoint, "socket opened");
    events.send(TransportEvent::Opened);
    events.send(TransportEvent::Writable);

    let (reader, writer) = stream.into_split();
    let outcome = tokio::select! {
        result = read_loop(reader, &events) => result,
        result = write_loop(writer, &mut queue, &events) => result,
    };

    if let Err(err) = outcome {
        warn!(%endpoint, error = %err, "socket error");
        events.send(TransportEvent::Error(err));
    }
    events.send(TransportEvent::Closed);
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    events: &Notifier,
) -> Result<(), TransportError> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut carry = Vec::new();

    loop {
        let len = reader.read(&mut buffer).await.map_err(TransportError::Read)?;
        if len == 0 {
            debug!("end of stream");
            return Ok(());
        }

        let chunk = decode_chunk(&mut carry, &buffer[..len]);
        if chunk.is_empty() {
            continue;
        }
        if !events.send(TransportEvent::Data(chunk)) {
            return Ok(());
        }
    }
}

async fn write_loop(
    mut writer: OwnedWriteHalf,
    queue: &mut mpsc::UnboundedReceiver<String>,
    events: &Notifier,
) -> Result<(), TransportError> {
    while let Some(data) = queue.recv().await {
        writer
            .write_all(data.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        writer.flush().await.map_err(TransportError::Write)?;
        events.send(TransportEvent::Writable);
    }
    Ok(())
}

/// Decode one read as UTF-8. An incomplete code point at the end is kept in
/// `carry` for the next read; invalid bytes become U+FFFD.
fn decode_chunk(carry: &mut Vec<u8>, bytes: &[u8]) -> String {
    carry.extend_from_slice(bytes);

    let valid_up_to = match std::str::from_utf8(carry) {
        Ok(text) => text.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        Err(_) => carry.len(),
    };

    let tail = carry.split_off(valid_up_to);
    let head = std::mem::replace(carry, tail);
    String::from_utf8_lossy(&head).into_owned()
}
