//! [`MoveOracle`] backed by the `shakmaty` rules crate.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position as _, PositionError, Role, Setup, Square};

use super::{MoveOracle, OracleError, Outcome};
use crate::types::{Color, LegalMove, Move, Piece, PieceKind, Position};

/// Standard chess rules via `shakmaty`.
///
/// Positions are parsed leniently: castling rights or en passant squares that
/// no longer match the board (as happens after a piece is removed) are
/// dropped instead of rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShakmatyOracle;

impl ShakmatyOracle {
    #[must_use]
    pub fn new() -> Self {
        ShakmatyOracle
    }

    fn parse_fen(position: &Position) -> Result<Fen, OracleError> {
        position
            .as_str()
            .parse::<Fen>()
            .map_err(|e| OracleError::InvalidPosition {
                fen: position.to_string(),
                reason: e.to_string(),
            })
    }

    fn parse_position(position: &Position) -> Result<Chess, OracleError> {
        Self::parse_fen(position)?
            .into_position::<Chess>(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
            .or_else(PositionError::ignore_impossible_check)
            .map_err(|e| OracleError::InvalidPosition {
                fen: position.to_string(),
                reason: e.to_string(),
            })
    }

    fn parse_square(notation: &str) -> Result<Square, OracleError> {
        notation
            .parse::<Square>()
            .map_err(|_| OracleError::InvalidSquare {
                notation: notation.to_string(),
            })
    }

    fn to_fen(pos: Chess) -> Position {
        Position::new(Fen::from_position(pos, EnPassantMode::Legal).to_string())
    }
}

fn kind_of(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

fn color_of(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

impl MoveOracle for ShakmatyOracle {
    fn legal_moves(&self, position: &Position) -> Result<Vec<LegalMove>, OracleError> {
        let pos = Self::parse_position(position)?;
        let moves = pos
            .legal_moves()
            .iter()
            .filter_map(|m| match UciMove::from_move(m, CastlingMode::Standard) {
                UciMove::Normal {
                    from,
                    to,
                    promotion,
                } => Some(LegalMove {
                    from: from.to_string(),
                    to: to.to_string(),
                    piece: kind_of(m.role()),
                    promotion: promotion.map(kind_of),
                }),
                _ => None,
            })
            .collect();
        Ok(moves)
    }

    fn piece_at(&self, position: &Position, square: &str) -> Result<Option<Piece>, OracleError> {
        let square = Self::parse_square(square)?;
        let setup = Self::parse_fen(position)?.into_setup();
        Ok(setup.board.piece_at(square).map(|p| Piece {
            kind: kind_of(p.role),
            color: color_of(p.color),
        }))
    }

    fn remove(&self, position: &Position, square: &str) -> Result<Position, OracleError> {
        let square = Self::parse_square(square)?;
        let mut setup: Setup = Self::parse_fen(position)?.into_setup();
        if let Some(removed) = setup.board.remove_piece_at(square) {
            // Rights tied to a vanished rook, or an en passant pawn, go with it.
            setup.castling_rights &= setup.board.rooks();
            if removed.role == Role::Pawn {
                setup.ep_square = None;
            }
        }
        Ok(Position::new(Fen::from_setup(setup).to_string()))
    }

    fn fen(&self, position: &Position) -> Result<String, OracleError> {
        Ok(Self::to_fen(Self::parse_position(position)?).to_string())
    }

    fn play(&self, position: &Position, uci: &str) -> Result<Move, OracleError> {
        let pos = Self::parse_position(position)?;
        let parsed = uci.parse::<UciMove>().map_err(|_| OracleError::InvalidMove {
            notation: uci.to_string(),
        })?;
        // A bare from+to pawn move onto the last rank promotes to a queen.
        let m = parsed
            .to_move(&pos)
            .or_else(|e| match &parsed {
                UciMove::Normal {
                    from,
                    to,
                    promotion: None,
                } => UciMove::Normal {
                    from: *from,
                    to: *to,
                    promotion: Some(Role::Queen),
                }
                .to_move(&pos),
                _ => Err(e),
            })
            .map_err(|_| OracleError::IllegalMove {
                notation: uci.to_string(),
            })?;

        let color = color_of(pos.turn());
        let piece = kind_of(m.role());
        let (from, to, promotion) = match UciMove::from_move(&m, CastlingMode::Standard) {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => (from.to_string(), to.to_string(), promotion.map(kind_of)),
            _ => {
                return Err(OracleError::IllegalMove {
                    notation: uci.to_string(),
                })
            }
        };

        let after = pos.play(&m).map_err(|_| OracleError::IllegalMove {
            notation: uci.to_string(),
        })?;

        Ok(Move {
            piece,
            color,
            from,
            to,
            promotion,
            after: Self::to_fen(after),
        })
    }

    fn outcome(&self, position: &Position) -> Result<Option<Outcome>, OracleError> {
        let pos = Self::parse_position(position)?;
        let outcome = if pos.is_checkmate() {
            Some(Outcome::Checkmate {
                winner: color_of(pos.turn()).opponent(),
            })
        } else if pos.is_stalemate() {
            Some(Outcome::Stalemate)
        } else if pos.is_insufficient_material() {
            Some(Outcome::InsufficientMaterial)
        } else {
            None
        };
        Ok(outcome)
    }
}
