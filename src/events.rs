//! Game events and the bus that carries them between the game and the core.

use std::fmt;

use crate::store::{Listeners, Subscription};

/// Something that happened in the game outside the chess core.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameEvent {
    /// The player picked a difficulty from the menu
    DifficultySelected(String),
    /// A new game starts from the initial position
    ResetBoard,
    /// The player got hit; one of their pieces leaves the board
    RemovePiece,
    /// The player performed an en-passant capture
    EnPassant,
    /// The game ended. `result` is 1, 0.5 or 0 from the player's side.
    GameOver { reason: String, result: f64 },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::DifficultySelected(label) => write!(f, "select-difficulty {label}"),
            GameEvent::ResetBoard => write!(f, "reset-board"),
            GameEvent::RemovePiece => write!(f, "remove-piece"),
            GameEvent::EnPassant => write!(f, "en-passant"),
            GameEvent::GameOver { reason, result } => write!(f, "game-over {reason} ({result})"),
        }
    }
}

/// Publish/subscribe channel for [`GameEvent`]s.
///
/// Delivery is synchronous, in subscription order. A listener must not
/// publish on the bus that is notifying it.
#[derive(Default)]
pub struct EventBus {
    listeners: Listeners<GameEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn publish(&self, event: GameEvent) {
        log::debug!("event: {event}");
        self.listeners.notify(&event);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
