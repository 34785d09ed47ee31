//! Line-oriented channels to an engine running outside the caller's thread.

use std::fmt;
use std::sync::Arc;

mod memory;
mod process;

pub use memory::{MemoryTransport, Responder};
pub use process::ProcessTransport;

/// Something the transport delivers to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One line of engine output, without the trailing newline
    Line(String),
    /// The engine side went away
    Closed { reason: String },
}

/// Callback the transport invokes for every inbound event, in arrival order.
pub type LineHandler = Arc<dyn Fn(TransportEvent) + Send + Sync>;

/// Error type for transport failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// `post_line` before `open` or after `close`
    NotOpen,
    /// The engine could not be started
    Spawn { program: String, reason: String },
    /// Writing to the engine failed
    Io { reason: String },
    /// The engine side closed the channel
    Disconnected { reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotOpen => write!(f, "transport is not open"),
            TransportError::Spawn { program, reason } => {
                write!(f, "failed to start engine '{program}': {reason}")
            }
            TransportError::Io { reason } => write!(f, "engine I/O failed: {reason}"),
            TransportError::Disconnected { reason } => {
                write!(f, "engine disconnected: {reason}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io {
            reason: e.to_string(),
        }
    }
}

/// Bidirectional line channel to an engine.
///
/// Lines are FIFO per direction. Implementations deliver inbound events by
/// calling the handler given to `open`, from whatever thread they read on.
pub trait EngineTransport: Send + Sync {
    /// Start the engine side and begin delivering events to `handler`.
    ///
    /// Opening an already open transport restarts it.
    fn open(&self, handler: LineHandler) -> Result<(), TransportError>;

    /// Write one line (no trailing newline) to the engine.
    fn post_line(&self, line: &str) -> Result<(), TransportError>;

    /// Tear the engine side down. Idempotent.
    fn close(&self);
}

impl<T: EngineTransport + ?Sized> EngineTransport for Arc<T> {
    fn open(&self, handler: LineHandler) -> Result<(), TransportError> {
        (**self).open(handler)
    }

    fn post_line(&self, line: &str) -> Result<(), TransportError> {
        (**self).post_line(line)
    }

    fn close(&self) {
        (**self).close();
    }
}
