use std::env;
use std::process;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::seq::SliceRandom;

use chess_platformer::difficulty::{bind_difficulty, Difficulty};
use chess_platformer::events::{EventBus, GameEvent};
use chess_platformer::game::{bind_board, GameError, GameSession};
use chess_platformer::leaderboard::{Leaderboard, LeaderboardEntry};
use chess_platformer::oracle::{MoveOracle, ShakmatyOracle};
use chess_platformer::store::BoardStore;
use chess_platformer::transport::ProcessTransport;
use chess_platformer::uci::EngineOptions;
use chess_platformer::EngineClient;

const MAX_PLIES: usize = 300;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: chess_platformer <engine-path> [Novice|Intermediate|Expert]");
        process::exit(2);
    }
    let engine_path = &args[1];
    let label = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| Difficulty::Intermediate.label().to_string());

    if let Err(e) = run(engine_path, &label).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(engine_path: &str, label: &str) -> Result<(), GameError> {
    let oracle: Arc<dyn MoveOracle> = Arc::new(ShakmatyOracle);
    let engine = Arc::new(EngineClient::new(
        ProcessTransport::new(engine_path),
        Arc::clone(&oracle),
        EngineOptions::default(),
    ));
    engine.set_uci_observer(|line| log::trace!("uci: {line}"));

    let bus = Arc::new(EventBus::new());
    let store = Arc::new(BoardStore::new(Arc::clone(&oracle)));
    let session = GameSession::new(
        Arc::clone(&engine),
        Arc::clone(&store),
        Arc::clone(&oracle),
        Arc::clone(&bus),
    );

    let _difficulty = bind_difficulty(&bus, Arc::clone(&engine));
    let _board = bind_board(&bus, Arc::clone(&store), session.player_color());

    let result = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&result);
    let _game_over = bus.subscribe(move |event| {
        if let GameEvent::GameOver { reason, result } = event {
            *sink.lock() = Some((reason.clone(), *result));
        }
    });

    bus.publish(GameEvent::DifficultySelected(label.to_string()));
    engine.initialise().await?;
    bus.publish(GameEvent::ResetBoard);
    engine.new_game()?;

    println!("you play {}, engine at {label}", session.player_color());
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_PLIES {
        if session.outcome()?.is_some() {
            break;
        }
        let mv = if session.is_engine_turn() {
            session.engine_turn().await?
        } else {
            let legal = oracle.legal_moves(&store.position())?;
            let Some(choice) = legal.choose(&mut rng) else {
                break;
            };
            session.player_move(&choice.uci())?
        };
        println!("{:>3}. {} {}", store.history_len(), mv.color, mv);
    }

    let finished = result.lock().take();
    match finished {
        Some((reason, score)) => {
            println!("game over: {reason}, score {score}");
            let board = Leaderboard::new();
            if let Err(e) = board.record(LeaderboardEntry::new("random mover", score, label)) {
                log::warn!("score not recorded: {e}");
            }
            for entry in board.ranked() {
                println!("{}  {}  {}", entry.name, entry.score, entry.difficulty);
            }
        }
        None => println!("no result after {} plies: {}", store.history_len(), store.position()),
    }

    engine.shutdown();
    Ok(())
}
