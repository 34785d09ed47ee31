//! End to end through a real child process speaking UCI.
#![cfg(unix)]

use std::time::Duration;

use chess_platformer::engine::{EngineClient, EngineError, EngineState};
use chess_platformer::oracle::ShakmatyOracle;
use chess_platformer::transport::{ProcessTransport, TransportError};
use chess_platformer::types::START_FEN;
use chess_platformer::uci::EngineOptions;

const SHELL_ENGINE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "id name shell"; echo "uciok" ;;
    go*) echo "info depth 1"; echo "bestmove e2e4 ponder e7e5" ;;
    quit) exit 0 ;;
  esac
done
"#;

fn options() -> EngineOptions {
    EngineOptions::default()
        .with_blunder_probability(0.0)
        .with_timeouts(
            Duration::from_secs(5),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
}

#[tokio::test]
async fn shell_engine_plays_e4() {
    let transport = ProcessTransport::new("sh").with_args(["-c", SHELL_ENGINE]);
    let client = EngineClient::new(transport, ShakmatyOracle, options());

    client.initialise().await.unwrap();
    assert_eq!(client.request_move(START_FEN).await.unwrap(), "e2e4");

    client.shutdown();
    assert_eq!(client.state(), EngineState::Uninitialised);
}

#[tokio::test]
async fn engine_exit_is_reported_as_disconnect() {
    let transport = ProcessTransport::new("sh").with_args(["-c", "exit 0"]);
    let client = EngineClient::new(transport, ShakmatyOracle, options());

    match client.initialise().await {
        Err(EngineError::Transport(TransportError::Disconnected { .. }))
        | Err(EngineError::Transport(TransportError::Io { .. })) => {}
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(client.state(), EngineState::Faulted);
}

#[tokio::test]
async fn missing_engine_fails_to_start() {
    let transport = ProcessTransport::new("/nonexistent/engine");
    let client = EngineClient::new(transport, ShakmatyOracle, options());

    assert!(matches!(
        client.initialise().await,
        Err(EngineError::Transport(TransportError::Spawn { .. }))
    ));
    assert_eq!(client.state(), EngineState::Faulted);
}
