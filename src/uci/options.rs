use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::command::EngineCommand;
use crate::types::Color;

pub const DEFAULT_MOVE_TIME_MS: u64 = 2000;
pub const DEFAULT_DEPTH: u32 = 40;
pub const DEFAULT_BLUNDER_PROBABILITY: f64 = 0.1;

/// Client-side engine configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineOptions {
    /// `movetime` sent with every `go`
    pub move_time_ms: u64,
    /// `depth` sent with every `go`
    pub depth: u32,
    /// Side the engine plays
    pub color: Color,
    pub skill_level: u32,
    pub limit_strength: bool,
    pub elo: u32,
    /// Initial blunder probability, in [0, 1]
    pub blunder_probability: f64,
    pub handshake_timeout: Duration,
    pub move_timeout: Duration,
    pub stop_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            move_time_ms: DEFAULT_MOVE_TIME_MS,
            depth: DEFAULT_DEPTH,
            color: Color::Black,
            skill_level: 1,
            limit_strength: true,
            elo: 400,
            blunder_probability: DEFAULT_BLUNDER_PROBABILITY,
            handshake_timeout: Duration::from_secs(10),
            move_timeout: Duration::from_millis(DEFAULT_MOVE_TIME_MS + 8000),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_move_time(mut self, move_time_ms: u64, depth: u32) -> Self {
        self.move_time_ms = move_time_ms;
        self.depth = depth;
        self
    }

    #[must_use]
    pub fn with_blunder_probability(mut self, p: f64) -> Self {
        self.blunder_probability = clamp_probability(p);
        self
    }

    #[must_use]
    pub fn with_strength(mut self, skill_level: u32, limit_strength: bool, elo: u32) -> Self {
        self.skill_level = skill_level;
        self.limit_strength = limit_strength;
        self.elo = elo;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, handshake: Duration, search: Duration, stop: Duration) -> Self {
        self.handshake_timeout = handshake;
        self.move_timeout = search;
        self.stop_timeout = stop;
        self
    }

    /// Lines written during the handshake, in order.
    #[must_use]
    pub fn handshake_commands(&self) -> Vec<EngineCommand> {
        vec![
            EngineCommand::Uci,
            EngineCommand::SetOption {
                name: "Skill Level".to_string(),
                value: self.skill_level.to_string(),
            },
            EngineCommand::SetOption {
                name: "UCI_LimitStrength".to_string(),
                value: self.limit_strength.to_string(),
            },
            EngineCommand::SetOption {
                name: "UCI_Elo".to_string(),
                value: self.elo.to_string(),
            },
        ]
    }

    #[must_use]
    pub fn go_command(&self) -> EngineCommand {
        EngineCommand::Go {
            depth: self.depth,
            movetime_ms: self.move_time_ms,
        }
    }
}

/// Clamp to [0, 1]; NaN counts as 0.
#[must_use]
pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// Property: clamped probabilities always land in [0, 1]
        #[test]
        fn prop_clamp_in_unit_interval(p in any::<f64>()) {
            let c = clamp_probability(p);
            prop_assert!((0.0..=1.0).contains(&c));
            if (0.0..=1.0).contains(&p) {
                prop_assert_eq!(c, p);
            }
        }
    }
}
