//! One game between the player and the engine.
//!
//! [`GameSession`] ties the engine client, the board store and the oracle
//! together: player moves are checked and applied through the oracle, the
//! engine's reply is requested and applied the same way, and a finished game
//! is announced on the event bus.

use std::fmt;
use std::sync::Arc;

use crate::engine::{EngineClient, EngineError};
use crate::events::{EventBus, GameEvent};
use crate::oracle::{MoveOracle, OracleError, Outcome};
use crate::store::{BoardStore, Subscription};
use crate::types::{Color, Move};

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    Engine(EngineError),
    Oracle(OracleError),
    /// It is the other side's turn
    WrongTurn { to_move: Option<Color> },
    /// The game has already ended
    Finished(Outcome),
    /// The board changed while the engine was thinking
    PositionChanged,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Engine(e) => write!(f, "Engine error: {e}"),
            GameError::Oracle(e) => write!(f, "Rules error: {e}"),
            GameError::WrongTurn { to_move: Some(c) } => write!(f, "Not your turn, {c} to move"),
            GameError::WrongTurn { to_move: None } => write!(f, "Side to move is unknown"),
            GameError::Finished(outcome) => write!(f, "Game is over: {}", outcome.reason()),
            GameError::PositionChanged => write!(f, "Board changed during the engine search"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Engine(e) => Some(e),
            GameError::Oracle(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for GameError {
    fn from(e: EngineError) -> Self {
        GameError::Engine(e)
    }
}

impl From<OracleError> for GameError {
    fn from(e: OracleError) -> Self {
        GameError::Oracle(e)
    }
}

/// Apply board events from `bus` to `store`: `ResetBoard` starts over,
/// `RemovePiece` takes one of `player`'s pieces off the board.
pub fn bind_board(bus: &EventBus, store: Arc<BoardStore>, player: Color) -> Subscription {
    bus.subscribe(move |event| match event {
        GameEvent::ResetBoard => store.reset(None),
        GameEvent::RemovePiece => {
            if let Err(e) = store.remove_random_piece(player) {
                log::warn!("could not remove a {player} piece: {e}");
            }
        }
        _ => {}
    })
}

pub struct GameSession {
    engine: Arc<EngineClient>,
    store: Arc<BoardStore>,
    oracle: Arc<dyn MoveOracle>,
    bus: Arc<EventBus>,
    player: Color,
}

impl GameSession {
    /// The player gets the colour the engine does not play.
    pub fn new(
        engine: Arc<EngineClient>,
        store: Arc<BoardStore>,
        oracle: Arc<dyn MoveOracle>,
        bus: Arc<EventBus>,
    ) -> Self {
        let player = engine.color().opponent();
        GameSession {
            engine,
            store,
            oracle,
            bus,
            player,
        }
    }

    #[must_use]
    pub fn player_color(&self) -> Color {
        self.player
    }

    #[must_use]
    pub fn store(&self) -> &Arc<BoardStore> {
        &self.store
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<EngineClient> {
        &self.engine
    }

    /// Start over from the initial position and tell the engine.
    pub fn start_new_game(&self) -> Result<(), GameError> {
        self.store.reset(None);
        self.engine.new_game()?;
        Ok(())
    }

    /// True when the side to move is the engine's.
    #[must_use]
    pub fn is_engine_turn(&self) -> bool {
        self.store.position().side_to_move() == Some(self.engine.color())
    }

    #[must_use]
    pub fn is_player_turn(&self) -> bool {
        self.store.position().side_to_move() == Some(self.player)
    }

    pub fn outcome(&self) -> Result<Option<Outcome>, GameError> {
        Ok(self.oracle.outcome(&self.store.position())?)
    }

    /// Play the player's move given in long algebraic notation.
    pub fn player_move(&self, uci: &str) -> Result<Move, GameError> {
        self.apply(self.player, uci)
    }

    /// Ask the engine for its move and play it.
    pub async fn engine_turn(&self) -> Result<Move, GameError> {
        let position = self.store.position();
        self.ensure_playable(self.engine.color())?;
        let uci = self.engine.request_move(position.as_str()).await?;
        if self.store.position() != position {
            return Err(GameError::PositionChanged);
        }
        self.apply(self.engine.color(), &uci)
    }

    fn ensure_playable(&self, side: Color) -> Result<(), GameError> {
        let position = self.store.position();
        if let Some(outcome) = self.oracle.outcome(&position)? {
            return Err(GameError::Finished(outcome));
        }
        let to_move = position.side_to_move();
        if to_move != Some(side) {
            return Err(GameError::WrongTurn { to_move });
        }
        Ok(())
    }

    fn apply(&self, side: Color, uci: &str) -> Result<Move, GameError> {
        self.ensure_playable(side)?;
        let mv = self.oracle.play(&self.store.position(), uci)?;
        log::info!("{side} plays {}", mv.uci());
        self.store.add_move(mv.clone());
        self.announce_outcome()?;
        Ok(mv)
    }

    fn announce_outcome(&self) -> Result<(), GameError> {
        if let Some(outcome) = self.outcome()? {
            let result = outcome.score_for(self.player);
            log::info!("game over: {} ({result})", outcome.reason());
            self.bus.publish(GameEvent::GameOver {
                reason: outcome.reason().to_string(),
                result,
            });
        }
        Ok(())
    }
}
