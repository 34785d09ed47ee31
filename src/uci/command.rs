//! Commands sent from the client to the engine.

use std::fmt;

/// A line the client writes to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    UciNewGame,
    SetOption { name: String, value: String },
    Position { fen: String },
    Go { depth: u32, movetime_ms: u64 },
    Stop,
    Quit,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => write!(f, "uci"),
            EngineCommand::UciNewGame => write!(f, "ucinewgame"),
            EngineCommand::SetOption { name, value } => {
                write!(f, "setoption name {name} value {value}")
            }
            EngineCommand::Position { fen } => write!(f, "position fen {fen}"),
            EngineCommand::Go { depth, movetime_ms } => {
                write!(f, "go depth {depth} movetime {movetime_ms}")
            }
            EngineCommand::Stop => write!(f, "stop"),
            EngineCommand::Quit => write!(f, "quit"),
        }
    }
}

impl EngineCommand {
    /// Parse a command line as an engine would read it.
    ///
    /// Only the forms this client emits are recognised; anything else yields `None`.
    #[must_use]
    pub fn parse(line: &str) -> Option<EngineCommand> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let first = *parts.first()?;

        let cmd = match first {
            "uci" => EngineCommand::Uci,
            "ucinewgame" => EngineCommand::UciNewGame,
            "setoption" => {
                if parts.get(1) != Some(&"name") {
                    return None;
                }
                // Option names may contain spaces; everything up to `value` is the name.
                let rest = &parts[2..];
                let at = rest.iter().position(|p| *p == "value").unwrap_or(rest.len());
                let (name, value) = rest.split_at(at);
                if name.is_empty() {
                    return None;
                }
                EngineCommand::SetOption {
                    name: name.join(" "),
                    value: value.get(1..).unwrap_or_default().join(" "),
                }
            }
            "position" => {
                if parts.get(1) != Some(&"fen") || parts.len() < 3 {
                    return None;
                }
                EngineCommand::Position {
                    fen: parts[2..].join(" "),
                }
            }
            "go" => {
                let mut depth = None;
                let mut movetime_ms = None;
                let mut i = 1;
                while i + 1 < parts.len() {
                    match parts[i] {
                        "depth" => depth = parts[i + 1].parse::<u32>().ok(),
                        "movetime" => movetime_ms = parts[i + 1].parse::<u64>().ok(),
                        _ => {}
                    }
                    i += 2;
                }
                EngineCommand::Go {
                    depth: depth?,
                    movetime_ms: movetime_ms?,
                }
            }
            "stop" => EngineCommand::Stop,
            "quit" => EngineCommand::Quit,
            _ => return None,
        };

        Some(cmd)
    }
}
