//! Lines received from the engine.

use std::fmt;

/// Error for an engine line that claims a known reply but cannot be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// `bestmove` without a move token
    MissingBestMove { line: String },
    /// Move token is not in `<from><to>[promotion]` form
    MalformedMove { token: String },
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyError::MissingBestMove { line } => {
                write!(f, "bestmove line without a move: '{line}'")
            }
            ReplyError::MalformedMove { token } => {
                write!(f, "malformed move token '{token}'")
            }
        }
    }
}

impl std::error::Error for ReplyError {}

/// The result of a finished search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    /// Move in long algebraic form, or `None` for `bestmove (none)`.
    pub mv: Option<String>,
    pub ponder: Option<String>,
}

/// Classified engine output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineReply {
    UciOk,
    BestMove(BestMove),
    Id(String),
    Option(String),
    Info(String),
    Other(String),
}

impl EngineReply {
    /// Classify one line of engine output.
    ///
    /// Unknown lines are never an error; only a `bestmove` line that cannot be
    /// read is.
    pub fn parse(line: &str) -> Result<EngineReply, ReplyError> {
        let trimmed = line.trim();
        if trimmed == "uciok" {
            return Ok(EngineReply::UciOk);
        }

        let mut parts = trimmed.split_whitespace();
        let reply = match parts.next() {
            Some("bestmove") => {
                let token = parts.next().ok_or_else(|| ReplyError::MissingBestMove {
                    line: trimmed.to_string(),
                })?;
                let mv = if token == "(none)" || token == "0000" {
                    None
                } else {
                    Some(validate_move_token(token)?)
                };
                let ponder = match (parts.next(), parts.next()) {
                    (Some("ponder"), Some(p)) => Some(p.to_string()),
                    _ => None,
                };
                EngineReply::BestMove(BestMove { mv, ponder })
            }
            Some("id") => EngineReply::Id(trimmed.to_string()),
            Some("option") => EngineReply::Option(trimmed.to_string()),
            Some("info") => EngineReply::Info(trimmed.to_string()),
            _ => EngineReply::Other(trimmed.to_string()),
        };
        Ok(reply)
    }
}

fn is_square(file: u8, rank: u8) -> bool {
    (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank)
}

fn validate_move_token(token: &str) -> Result<String, ReplyError> {
    let bytes = token.as_bytes();
    let well_formed = matches!(bytes.len(), 4 | 5)
        && is_square(bytes[0], bytes[1])
        && is_square(bytes[2], bytes[3])
        && (bytes.len() == 4 || matches!(bytes[4], b'q' | b'r' | b'b' | b'n'));
    if well_formed {
        Ok(token.to_string())
    } else {
        Err(ReplyError::MalformedMove {
            token: token.to_string(),
        })
    }
}
