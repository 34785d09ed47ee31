//! Value types shared by the engine client and the board store.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Side to move / piece colour.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// FEN letter for this side (`w` or `b`).
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Piece kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

/// A coloured piece standing on a square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

/// Serialized board state (FEN). Never mutated in place; every change yields a new value.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position(String);

impl Position {
    #[must_use]
    pub fn new(fen: impl Into<String>) -> Self {
        Position(fen.into())
    }

    /// The standard initial position.
    #[must_use]
    pub fn start() -> Self {
        Position(START_FEN.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Side to move, read from the second FEN field.
    #[must_use]
    pub fn side_to_move(&self) -> Option<Color> {
        self.0
            .split_whitespace()
            .nth(1)
            .and_then(|field| field.chars().next())
            .and_then(Color::from_char)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Position {
    fn from(fen: &str) -> Self {
        Position(fen.to_string())
    }
}

impl From<String> for Position {
    fn from(fen: String) -> Self {
        Position(fen)
    }
}

/// A move that has been applied to a position.
///
/// Squares are in algebraic notation (`e2`). `after` is the position the move produced.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    pub piece: PieceKind,
    pub color: Color,
    pub from: String,
    pub to: String,
    pub promotion: Option<PieceKind>,
    pub after: Position,
}

impl Move {
    /// Long algebraic (UCI) text of the move, e.g. `e7e8q`.
    #[must_use]
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.to_char()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uci())
    }
}

/// A legal move as reported by the oracle, before it is played.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LegalMove {
    pub from: String,
    pub to: String,
    pub piece: PieceKind,
    pub promotion: Option<PieceKind>,
}

impl LegalMove {
    /// The `from+to` square pair, the form engine answers are compared in.
    #[must_use]
    pub fn square_pair(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    #[must_use]
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.to_char()),
            None => self.square_pair(),
        }
    }
}
