//! Board store notifications and the board event binding.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chess_platformer::events::{EventBus, GameEvent};
use chess_platformer::game::bind_board;
use chess_platformer::oracle::{MoveOracle, ShakmatyOracle};
use chess_platformer::store::BoardStore;
use chess_platformer::types::{Color, PieceKind, Position, START_FEN};

struct Counts {
    positions: Arc<Mutex<Vec<Position>>>,
    histories: Arc<Mutex<Vec<usize>>>,
}

fn store_with_counts() -> (Arc<BoardStore>, Counts) {
    let store = Arc::new(BoardStore::with_rng(ShakmatyOracle, StdRng::seed_from_u64(3)));
    let positions = Arc::new(Mutex::new(Vec::new()));
    let histories = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&positions);
    let _p = store.subscribe(move |p| sink.lock().push(p.clone()));
    let sink = Arc::clone(&histories);
    let _h = store.subscribe_history(move |h| sink.lock().push(h.len()));

    (
        store,
        Counts {
            positions,
            histories,
        },
    )
}

#[test]
fn add_move_notifies_each_observer_once() {
    let (store, counts) = store_with_counts();
    let mv = ShakmatyOracle.play(&store.position(), "e2e4").unwrap();
    store.add_move(mv.clone());

    assert_eq!(*counts.positions.lock(), vec![mv.after.clone()]);
    assert_eq!(*counts.histories.lock(), vec![1]);
    assert_eq!(store.history(), vec![mv]);
}

#[test]
fn observer_sees_consistent_store() {
    let store = Arc::new(BoardStore::new(ShakmatyOracle));
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let reader = Arc::clone(&store);
    let _sub = store.subscribe(move |p| {
        *sink.lock() = Some((p.clone(), reader.position(), reader.history_len()));
    });

    let mv = ShakmatyOracle.play(&store.position(), "g1f3").unwrap();
    store.add_move(mv.clone());

    let (notified, read, len) = seen.lock().clone().unwrap();
    assert_eq!(notified, mv.after);
    assert_eq!(read, mv.after);
    assert_eq!(len, 1);
}

#[test]
fn removal_notifies_position_only() {
    let (store, counts) = store_with_counts();
    let before = store.position();
    let after = store.remove_random_piece(Color::White).unwrap().unwrap();

    assert_ne!(after, before);
    assert_eq!(*counts.positions.lock(), vec![after.clone()]);
    assert!(counts.histories.lock().is_empty());

    // Exactly one white non-king piece is gone.
    let count = |p: &Position| {
        chess_platformer::oracle::non_king_squares(&ShakmatyOracle, p, Color::White)
            .unwrap()
            .len()
    };
    assert_eq!(count(&before), 15);
    assert_eq!(count(&after), 14);
}

#[test]
fn removal_without_candidates_is_silent_noop() {
    let (store, counts) = store_with_counts();
    let bare = Position::new("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
    store.reset(Some(bare.clone()));
    counts.positions.lock().clear();
    counts.histories.lock().clear();

    assert_eq!(store.remove_random_piece(Color::Black).unwrap(), None);
    assert_eq!(store.position().as_str(), bare.as_str());
    assert!(counts.positions.lock().is_empty());
    assert!(counts.histories.lock().is_empty());
}

#[test]
fn removing_last_rook_keeps_king() {
    let store = BoardStore::with_rng(ShakmatyOracle, StdRng::seed_from_u64(9));
    store.reset(Some(Position::new("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1")));
    let after = store.remove_random_piece(Color::White).unwrap().unwrap();

    assert_eq!(after.as_str(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    let king = ShakmatyOracle.piece_at(&after, "e1").unwrap().unwrap();
    assert_eq!(king.kind, PieceKind::King);
}

#[test]
fn reset_restores_start_and_clears_history() {
    let (store, counts) = store_with_counts();
    let mv = ShakmatyOracle.play(&store.position(), "e2e4").unwrap();
    store.add_move(mv);
    store.reset(None);

    assert_eq!(store.position().as_str(), START_FEN);
    assert!(store.history().is_empty());
    assert_eq!(counts.positions.lock().len(), 2);
    assert_eq!(*counts.histories.lock(), vec![1, 0]);
}

#[test]
fn unsubscribed_observer_is_not_called() {
    let store = BoardStore::new(ShakmatyOracle);
    let calls = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&calls);
    let sub = store.subscribe(move |_| *sink.lock() += 1);

    store.reset(None);
    sub.unsubscribe();
    store.reset(None);
    assert_eq!(*calls.lock(), 1);
}

#[test]
fn board_events_drive_the_store() {
    let bus = EventBus::new();
    let store = Arc::new(BoardStore::with_rng(ShakmatyOracle, StdRng::seed_from_u64(1)));
    let sub = bind_board(&bus, Arc::clone(&store), Color::White);

    bus.publish(GameEvent::RemovePiece);
    assert_ne!(store.position().as_str(), START_FEN);

    bus.publish(GameEvent::ResetBoard);
    assert_eq!(store.position().as_str(), START_FEN);

    // Unrelated events leave the board alone.
    bus.publish(GameEvent::EnPassant);
    assert_eq!(store.position().as_str(), START_FEN);

    sub.unsubscribe();
    bus.publish(GameEvent::RemovePiece);
    assert_eq!(store.position().as_str(), START_FEN);
}

#[test]
fn remove_event_never_exposes_the_player_king() {
    let bus = EventBus::new();
    let store = Arc::new(BoardStore::with_rng(ShakmatyOracle, StdRng::seed_from_u64(2)));
    let _sub = bind_board(&bus, Arc::clone(&store), Color::White);
    let shielded = Position::new("4r1k1/8/8/8/8/8/4B3/4K3 b - - 0 1");
    store.reset(Some(shielded.clone()));

    bus.publish(GameEvent::RemovePiece);

    assert_eq!(store.position(), shielded);
    assert!(ShakmatyOracle.outcome(&store.position()).is_ok());
}
