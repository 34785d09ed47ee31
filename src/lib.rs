pub mod difficulty;
pub mod engine;
pub mod events;
pub mod game;
pub mod leaderboard;
pub mod oracle;
pub mod store;
pub mod transport;
pub mod types;
pub mod uci;

pub use difficulty::{bind_difficulty, Difficulty};
pub use engine::{EngineClient, EngineError, EngineState};
pub use events::{EventBus, GameEvent};
pub use game::{bind_board, GameError, GameSession};
pub use leaderboard::{KeyValueStore, Leaderboard, LeaderboardEntry};
pub use oracle::{MoveOracle, OracleError, Outcome, ShakmatyOracle};
pub use store::{BoardStore, Subscription};
pub use transport::{EngineTransport, MemoryTransport, ProcessTransport};
pub use types::{Color, LegalMove, Move, Position, START_FEN};
pub use uci::EngineOptions;
