//! Whole games through the session glue: player, engine, store and bus.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chess_platformer::difficulty::{bind_difficulty, Difficulty, UNKNOWN_LABEL_PROBABILITY};
use chess_platformer::engine::EngineClient;
use chess_platformer::events::{EventBus, GameEvent};
use chess_platformer::game::{GameError, GameSession};
use chess_platformer::oracle::{MoveOracle, Outcome, ShakmatyOracle};
use chess_platformer::store::BoardStore;
use chess_platformer::transport::MemoryTransport;
use chess_platformer::types::{Color, START_FEN};
use chess_platformer::uci::{EngineCommand, EngineOptions};

/// Fake engine playing `moves` in order, one per `go`.
fn scripted_engine(moves: &[&str]) -> Arc<MemoryTransport> {
    let mut script: VecDeque<String> = moves.iter().map(|m| format!("bestmove {m}")).collect();
    Arc::new(MemoryTransport::with_responder(move |line| {
        match EngineCommand::parse(line) {
            Some(EngineCommand::Uci) => vec!["uciok".into()],
            Some(EngineCommand::Go { .. }) => script.pop_front().into_iter().collect(),
            _ => Vec::new(),
        }
    }))
}

struct Table {
    session: GameSession,
    bus: Arc<EventBus>,
    results: Arc<Mutex<Vec<(String, f64)>>>,
}

async fn table(transport: &Arc<MemoryTransport>) -> Table {
    let oracle: Arc<dyn MoveOracle> = Arc::new(ShakmatyOracle);
    let engine = Arc::new(EngineClient::with_rng(
        Arc::clone(transport),
        Arc::clone(&oracle),
        EngineOptions::default().with_blunder_probability(0.0),
        StdRng::seed_from_u64(8),
    ));
    engine.initialise().await.unwrap();

    let bus = Arc::new(EventBus::new());
    let store = Arc::new(BoardStore::new(Arc::clone(&oracle)));
    let session = GameSession::new(engine, store, oracle, Arc::clone(&bus));

    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    let _sub = bus.subscribe(move |event| {
        if let GameEvent::GameOver { reason, result } = event {
            sink.lock().push((reason.clone(), *result));
        }
    });

    Table {
        session,
        bus,
        results,
    }
}

#[tokio::test]
async fn engine_mates_player_and_game_over_is_published() {
    let transport = scripted_engine(&["e7e5", "d8h4"]);
    let table = table(&transport).await;
    let session = &table.session;
    assert_eq!(session.player_color(), Color::White);
    session.start_new_game().unwrap();

    session.player_move("f2f3").unwrap();
    assert!(session.is_engine_turn());
    assert_eq!(session.engine_turn().await.unwrap().uci(), "e7e5");
    session.player_move("g2g4").unwrap();
    let mate = session.engine_turn().await.unwrap();
    assert_eq!(mate.uci(), "d8h4");

    assert_eq!(
        session.outcome().unwrap(),
        Some(Outcome::Checkmate {
            winner: Color::Black
        })
    );
    assert_eq!(
        *table.results.lock(),
        vec![("Checkmate".to_string(), 0.0)]
    );
    assert_eq!(session.store().history_len(), 4);
    assert!(matches!(
        session.player_move("a2a3"),
        Err(GameError::Finished(_))
    ));

    let sent = transport.sent_lines();
    assert!(sent.contains(&"ucinewgame".to_string()));
    let searched = format!("position fen {}", session.store().history()[2].after);
    assert!(sent.contains(&searched));
}

#[tokio::test]
async fn moves_out_of_turn_are_rejected() {
    let transport = scripted_engine(&[]);
    let table = table(&transport).await;
    let session = &table.session;

    assert!(matches!(
        session.engine_turn().await,
        Err(GameError::WrongTurn {
            to_move: Some(Color::White)
        })
    ));
    session.player_move("e2e4").unwrap();
    assert!(matches!(
        session.player_move("d2d4"),
        Err(GameError::WrongTurn {
            to_move: Some(Color::Black)
        })
    ));
    assert!(matches!(
        session.player_move("e7e4"),
        Err(GameError::WrongTurn { .. })
    ));
}

#[tokio::test]
async fn illegal_player_move_leaves_board_alone() {
    let transport = scripted_engine(&[]);
    let table = table(&transport).await;
    let session = &table.session;

    assert!(matches!(
        session.player_move("e2e5"),
        Err(GameError::Oracle(_))
    ));
    assert_eq!(session.store().position().as_str(), START_FEN);
    assert_eq!(session.store().history_len(), 0);
}

#[tokio::test]
async fn engine_without_move_reports_no_move() {
    let transport = scripted_engine(&["(none)"]);
    let table = table(&transport).await;
    let session = &table.session;

    session.player_move("e2e4").unwrap();
    assert!(matches!(
        session.engine_turn().await,
        Err(GameError::Engine(chess_platformer::EngineError::NoMove))
    ));
    assert_eq!(session.store().history_len(), 1);
}

#[tokio::test]
async fn difficulty_selection_reaches_the_engine() {
    let transport = scripted_engine(&[]);
    let table = table(&transport).await;
    let engine = Arc::clone(table.session.engine());
    let _sub = bind_difficulty(&table.bus, Arc::clone(&engine));

    for level in Difficulty::ALL {
        table
            .bus
            .publish(GameEvent::DifficultySelected(level.label().to_string()));
        assert_eq!(engine.difficulty_probability(), level.blunder_probability());
    }
    table
        .bus
        .publish(GameEvent::DifficultySelected("Grandmaster".to_string()));
    assert_eq!(engine.difficulty_probability(), UNKNOWN_LABEL_PROBABILITY);

    // Other events do not touch the probability.
    table.bus.publish(GameEvent::ResetBoard);
    assert_eq!(engine.difficulty_probability(), UNKNOWN_LABEL_PROBABILITY);
}
