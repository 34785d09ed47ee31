use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::observable::{Listeners, Subscription};
use crate::oracle::{non_king_squares, MoveOracle, OracleError};
use crate::types::{Color, Move, Position};

struct BoardState {
    position: Position,
    history: Vec<Move>,
}

/// Current position and move history of one game.
///
/// Single writer. Each successful mutation updates both values first and then
/// notifies history listeners, then position listeners, exactly once each for
/// what changed. A mutation that changes nothing notifies nobody. Listeners
/// may read the store but must not mutate it.
pub struct BoardStore {
    state: Mutex<BoardState>,
    position_listeners: Listeners<Position>,
    history_listeners: Listeners<Vec<Move>>,
    oracle: Arc<dyn MoveOracle>,
    rng: Mutex<StdRng>,
}

impl BoardStore {
    pub fn new<O: MoveOracle + 'static>(oracle: O) -> Self {
        Self::with_rng(oracle, StdRng::from_entropy())
    }

    pub fn with_rng<O: MoveOracle + 'static>(oracle: O, rng: StdRng) -> Self {
        BoardStore {
            state: Mutex::new(BoardState {
                position: Position::start(),
                history: Vec::new(),
            }),
            position_listeners: Listeners::new(),
            history_listeners: Listeners::new(),
            oracle: Arc::new(oracle),
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.state.lock().position.clone()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Move> {
        self.state.lock().history.clone()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    #[must_use]
    pub fn last_move(&self) -> Option<Move> {
        self.state.lock().history.last().cloned()
    }

    /// Observe the current position.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&Position) + Send + 'static,
    {
        self.position_listeners.subscribe(listener)
    }

    /// Observe the move history.
    pub fn subscribe_history<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&Vec<Move>) + Send + 'static,
    {
        self.history_listeners.subscribe(listener)
    }

    /// Append `mv` and make `mv.after` the current position.
    ///
    /// The move is trusted; it is not checked against the previous position.
    pub fn add_move(&self, mv: Move) {
        let (history, position) = {
            let mut state = self.state.lock();
            state.position = mv.after.clone();
            state.history.push(mv);
            (state.history.clone(), state.position.clone())
        };
        log::debug!("move {} recorded, {} in history", history.len(), position);
        self.history_listeners.notify(&history);
        self.position_listeners.notify(&position);
    }

    /// Take a random non-king piece of `color` off the board.
    ///
    /// Only squares whose removal leaves a playable position are eligible; a
    /// piece shielding its king from a check the side to move could not have
    /// given stays put. Returns the new position, or `None` when nothing is
    /// eligible (the store is then left untouched). History is not extended.
    pub fn remove_random_piece(&self, color: Color) -> Result<Option<Position>, OracleError> {
        let current = self.position();
        let mut squares = non_king_squares(self.oracle.as_ref(), &current, color)?;
        squares.shuffle(&mut *self.rng.lock());

        for square in squares {
            let next = self.oracle.remove(&current, &square)?;
            if let Err(e) = self.oracle.legal_moves(&next) {
                log::debug!("keeping {color} piece on {square}: {e}");
                continue;
            }
            self.state.lock().position = next.clone();
            log::info!("removed {color} piece on {square}");
            self.position_listeners.notify(&next);
            return Ok(Some(next));
        }

        log::debug!("no {color} piece to remove");
        Ok(None)
    }

    /// Clear history and set the position to `position`, or the standard start.
    pub fn reset(&self, position: Option<Position>) {
        let position = position.unwrap_or_default();
        {
            let mut state = self.state.lock();
            state.history.clear();
            state.position = position.clone();
        }
        log::debug!("board reset to {position}");
        self.history_listeners.notify(&Vec::new());
        self.position_listeners.notify(&position);
    }
}
