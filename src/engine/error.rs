//! Error types for the engine client.

use std::fmt;
use std::time::Duration;

use super::state::EngineState;
use crate::transport::TransportError;
use crate::uci::ReplyError;

/// Which suspended operation ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    Handshake,
    Search,
    Stop,
}

impl fmt::Display for WaitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitKind::Handshake => write!(f, "handshake"),
            WaitKind::Search => write!(f, "search"),
            WaitKind::Stop => write!(f, "stop"),
        }
    }
}

/// Error type for engine client operations
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Operation needs a completed handshake
    NotInitialised,
    /// Operation not allowed in the current session state
    NotReady { state: EngineState },
    /// The transport failed or went away
    Transport(TransportError),
    /// The engine sent a line that claims to be a reply but cannot be read
    Protocol(ReplyError),
    /// No reply within the configured deadline
    Timeout { waiting_for: WaitKind, after: Duration },
    /// The request was superseded by `cancel_search` or `shutdown`
    Cancelled,
    /// The engine reported `bestmove (none)`
    NoMove,
    /// The FEN cannot be sent on one `position` line
    InvalidPosition { fen: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotInitialised => write!(f, "Engine not initialised"),
            EngineError::NotReady { state } => write!(f, "Engine not ready (state: {state})"),
            EngineError::Transport(e) => write!(f, "Engine transport error: {e}"),
            EngineError::Protocol(e) => write!(f, "Engine protocol error: {e}"),
            EngineError::Timeout { waiting_for, after } => {
                write!(f, "Engine {waiting_for} timed out after {} ms", after.as_millis())
            }
            EngineError::Cancelled => write!(f, "Engine request cancelled"),
            EngineError::NoMove => write!(f, "Engine has no move in this position"),
            EngineError::InvalidPosition { fen } => {
                write!(f, "Position cannot be sent to the engine: {fen:?}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Transport(e) => Some(e),
            EngineError::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for EngineError {
    fn from(e: TransportError) -> Self {
        EngineError::Transport(e)
    }
}

impl From<ReplyError> for EngineError {
    fn from(e: ReplyError) -> Self {
        EngineError::Protocol(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_names_state() {
        let err = EngineError::NotReady {
            state: EngineState::Searching,
        };
        assert!(err.to_string().contains("searching"));
    }

    #[test]
    fn test_timeout_message() {
        let err = EngineError::Timeout {
            waiting_for: WaitKind::Handshake,
            after: Duration::from_millis(250),
        };
        let msg = err.to_string();
        assert!(msg.contains("handshake"));
        assert!(msg.contains("250"));
    }

    #[test]
    fn test_invalid_position_shows_escaped_fen() {
        let err = EngineError::InvalidPosition {
            fen: "8/8 w\ngo".to_string(),
        };
        assert!(err.to_string().contains("\\n"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;

        let err = EngineError::from(TransportError::NotOpen);
        assert!(err.source().is_some());
        assert!(EngineError::Cancelled.source().is_none());
    }
}
