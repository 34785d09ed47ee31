//! Engine client: drives a UCI engine over a transport.
//!
//! The client runs the handshake, issues searches, supports cooperative
//! cancellation and degrades the engine's answers according to the current
//! blunder probability.

pub mod blunder;
mod client;
mod error;
mod state;

pub use blunder::{blunder_candidates, choose_move};
pub use client::{EngineClient, UciObserver};
pub use error::{EngineError, WaitKind};
pub use state::EngineState;
