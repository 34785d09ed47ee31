//! Difficulty levels and their blunder probabilities.

use std::fmt;
use std::sync::Arc;

use crate::engine::EngineClient;
use crate::events::{EventBus, GameEvent};
use crate::store::Subscription;

/// Blunder probability for a label that names no known level.
pub const UNKNOWN_LABEL_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    Novice,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Novice,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ];

    /// Parse a menu label. Labels match exactly.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Difficulty> {
        match label {
            "Novice" => Some(Difficulty::Novice),
            "Intermediate" => Some(Difficulty::Intermediate),
            "Expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Novice => "Novice",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
        }
    }

    /// Chance that the engine's move is swapped for a random legal one.
    #[must_use]
    pub fn blunder_probability(self) -> f64 {
        match self {
            Difficulty::Novice => 0.8,
            Difficulty::Intermediate => 0.5,
            Difficulty::Expert => 0.1,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Probability for any label, falling back to [`UNKNOWN_LABEL_PROBABILITY`].
#[must_use]
pub fn probability_for_label(label: &str) -> f64 {
    Difficulty::from_label(label).map_or(UNKNOWN_LABEL_PROBABILITY, Difficulty::blunder_probability)
}

/// Keep `engine`'s blunder probability in step with difficulty selections on `bus`.
pub fn bind_difficulty(bus: &EventBus, engine: Arc<EngineClient>) -> Subscription {
    bus.subscribe(move |event| {
        if let GameEvent::DifficultySelected(label) = event {
            let p = probability_for_label(label);
            if Difficulty::from_label(label).is_none() {
                log::warn!("unknown difficulty '{label}', using {p}");
            } else {
                log::info!("difficulty {label} selected");
            }
            engine.set_difficulty_probability(p);
        }
    })
}
