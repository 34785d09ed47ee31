//! Chess rules, delegated.
//!
//! The core never generates moves itself. Everything that needs the rules of
//! chess asks a [`MoveOracle`].

use std::fmt;

use crate::types::{Color, LegalMove, Move, Piece, Position};

mod shakmaty_oracle;

pub use shakmaty_oracle::ShakmatyOracle;

/// Error type for oracle queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Position string could not be read
    InvalidPosition { fen: String, reason: String },
    /// Square is not in algebraic notation
    InvalidSquare { notation: String },
    /// Move text is not in long algebraic form
    InvalidMove { notation: String },
    /// Move is not legal in the position
    IllegalMove { notation: String },
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::InvalidPosition { fen, reason } => {
                write!(f, "Invalid position '{fen}': {reason}")
            }
            OracleError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation '{notation}'")
            }
            OracleError::InvalidMove { notation } => {
                write!(f, "Invalid move notation '{notation}'")
            }
            OracleError::IllegalMove { notation } => write!(f, "Illegal move '{notation}'"),
        }
    }
}

impl std::error::Error for OracleError {}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The given side delivered mate
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
}

impl Outcome {
    /// Score for `side`: 1 for a win, 0.5 for a draw, 0 for a loss.
    #[must_use]
    pub fn score_for(self, side: Color) -> f64 {
        match self {
            Outcome::Checkmate { winner } if winner == side => 1.0,
            Outcome::Checkmate { .. } => 0.0,
            Outcome::Stalemate | Outcome::InsufficientMaterial => 0.5,
        }
    }

    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Outcome::Checkmate { .. } => "Checkmate",
            Outcome::Stalemate => "Stalemate",
            Outcome::InsufficientMaterial => "Insufficient material",
        }
    }
}

/// Legal-move oracle: move generation, piece queries and board mutation.
pub trait MoveOracle: Send + Sync {
    /// All legal moves of the side to move.
    fn legal_moves(&self, position: &Position) -> Result<Vec<LegalMove>, OracleError>;

    /// Piece on `square`, if any.
    fn piece_at(&self, position: &Position, square: &str) -> Result<Option<Piece>, OracleError>;

    /// Position with the piece on `square` taken off the board.
    fn remove(&self, position: &Position, square: &str) -> Result<Position, OracleError>;

    /// Canonical FEN of `position`.
    fn fen(&self, position: &Position) -> Result<String, OracleError>;

    /// Play a long-algebraic move and describe it.
    fn play(&self, position: &Position, uci: &str) -> Result<Move, OracleError>;

    /// Outcome if the game is over in `position`.
    fn outcome(&self, position: &Position) -> Result<Option<Outcome>, OracleError>;
}

impl<T: MoveOracle + ?Sized> MoveOracle for std::sync::Arc<T> {
    fn legal_moves(&self, position: &Position) -> Result<Vec<LegalMove>, OracleError> {
        (**self).legal_moves(position)
    }

    fn piece_at(&self, position: &Position, square: &str) -> Result<Option<Piece>, OracleError> {
        (**self).piece_at(position, square)
    }

    fn remove(&self, position: &Position, square: &str) -> Result<Position, OracleError> {
        (**self).remove(position, square)
    }

    fn fen(&self, position: &Position) -> Result<String, OracleError> {
        (**self).fen(position)
    }

    fn play(&self, position: &Position, uci: &str) -> Result<Move, OracleError> {
        (**self).play(position, uci)
    }

    fn outcome(&self, position: &Position) -> Result<Option<Outcome>, OracleError> {
        (**self).outcome(position)
    }
}

/// Every square, a1..h8.
pub fn all_squares() -> impl Iterator<Item = String> {
    (b'1'..=b'8').flat_map(|rank| {
        (b'a'..=b'h').map(move |file| format!("{}{}", file as char, rank as char))
    })
}

/// Squares holding a piece of `color` other than the king.
pub fn non_king_squares(
    oracle: &dyn MoveOracle,
    position: &Position,
    color: Color,
) -> Result<Vec<String>, OracleError> {
    let mut squares = Vec::new();
    for square in all_squares() {
        if let Some(piece) = oracle.piece_at(position, &square)? {
            if piece.color == color && piece.kind != crate::types::PieceKind::King {
                squares.push(square);
            }
        }
    }
    Ok(squares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_squares() {
        let squares: Vec<String> = all_squares().collect();
        assert_eq!(squares.len(), 64);
        assert_eq!(squares[0], "a1");
        assert_eq!(squares[63], "h8");
    }

    #[test]
    fn test_outcome_scores() {
        let mate = Outcome::Checkmate {
            winner: Color::White,
        };
        assert_eq!(mate.score_for(Color::White), 1.0);
        assert_eq!(mate.score_for(Color::Black), 0.0);
        assert_eq!(Outcome::Stalemate.score_for(Color::Black), 0.5);
    }
}
