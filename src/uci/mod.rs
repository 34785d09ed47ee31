//! Universal Chess Interface (UCI) wire model, client side.
//!
//! Builds the lines the client writes to an engine and classifies the lines
//! the engine writes back.

pub mod command;
pub mod options;
pub mod reply;

pub use command::EngineCommand;
pub use options::{clamp_probability, EngineOptions};
pub use reply::{BestMove, EngineReply, ReplyError};
