//! Session states and the single pending-request slot.

use std::fmt;

use tokio::sync::oneshot;

use super::error::EngineError;
use crate::uci::BestMove;

/// Engine session state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EngineState {
    Uninitialised,
    Initialising,
    Ready,
    Searching,
    /// A reply never came or could not be read; `initialise` again to recover
    Faulted,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialised => "uninitialised",
            EngineState::Initialising => "initialising",
            EngineState::Ready => "ready",
            EngineState::Searching => "searching",
            EngineState::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Why a `bestmove` line is awaited.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum SearchPurpose {
    /// A `request_move` caller wants the move
    Play,
    /// `cancel_search` only wants the search to end
    Stop,
}

pub(crate) type HandshakeReply = oneshot::Sender<Result<(), EngineError>>;
pub(crate) type SearchReply = oneshot::Sender<Result<BestMove, EngineError>>;

/// The one request that may be outstanding at a time.
///
/// `ticket` identifies the waiter so a timed-out caller only clears its own slot.
#[derive(Debug, Default)]
pub(crate) enum Pending {
    #[default]
    Idle,
    Handshake {
        ticket: u64,
        reply: HandshakeReply,
    },
    BestMove {
        ticket: u64,
        purpose: SearchPurpose,
        reply: SearchReply,
    },
}

impl Pending {
    pub(crate) fn ticket(&self) -> Option<u64> {
        match self {
            Pending::Idle => None,
            Pending::Handshake { ticket, .. } | Pending::BestMove { ticket, .. } => Some(*ticket),
        }
    }

    /// Fail whatever is waiting with `error`, leaving the slot idle.
    pub(crate) fn fail(&mut self, error: EngineError) {
        match std::mem::take(self) {
            Pending::Idle => {}
            Pending::Handshake { reply, .. } => {
                let _ = reply.send(Err(error));
            }
            Pending::BestMove { reply, .. } => {
                let _ = reply.send(Err(error));
            }
        }
    }
}
