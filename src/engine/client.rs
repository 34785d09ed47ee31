//! Engine client implementation.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::oneshot;

use super::blunder;
use super::error::{EngineError, WaitKind};
use super::state::{EngineState, Pending, SearchPurpose};
use crate::oracle::MoveOracle;
use crate::transport::{EngineTransport, LineHandler, TransportError, TransportEvent};
use crate::types::{Color, Position};
use crate::uci::{clamp_probability, BestMove, EngineCommand, EngineOptions, EngineReply};

/// Callback receiving every line the engine prints.
pub type UciObserver = Arc<dyn Fn(&str) + Send + Sync>;

/// Mutable session data, guarded by one lock.
struct Session {
    state: EngineState,
    pending: Pending,
    blunder_probability: f64,
    observer: Option<UciObserver>,
    next_ticket: u64,
    /// Bumped on every (re)initialise and shutdown; events from an older
    /// transport run carry a stale generation and are dropped.
    generation: u64,
}

impl Session {
    fn take_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn dispatch(&mut self, line: &str) {
        let reply = EngineReply::parse(line);
        match (reply, std::mem::take(&mut self.pending)) {
            (Ok(EngineReply::UciOk), Pending::Handshake { reply, .. }) => {
                self.state = EngineState::Ready;
                log::info!("engine handshake complete");
                let _ = reply.send(Ok(()));
            }
            (Ok(EngineReply::BestMove(best)), Pending::BestMove { reply, .. }) => {
                self.state = EngineState::Ready;
                let _ = reply.send(Ok(best));
            }
            (Err(_), Pending::BestMove { purpose: SearchPurpose::Stop, reply, .. }) => {
                // A stopped search's move is discarded, readable or not.
                self.state = EngineState::Ready;
                let _ = reply.send(Ok(BestMove {
                    mv: None,
                    ponder: None,
                }));
            }
            (Err(e), Pending::BestMove { reply, .. }) => {
                log::warn!("unreadable engine reply, session faulted: {e}");
                self.state = EngineState::Faulted;
                let _ = reply.send(Err(e.into()));
            }
            (_, pending) => self.pending = pending,
        }
    }

    /// Fault the session unless another request owns the slot by now.
    fn fault(&mut self, ticket: u64) {
        match self.pending.ticket() {
            Some(t) if t != ticket => {}
            _ => {
                self.pending = Pending::Idle;
                self.state = EngineState::Faulted;
            }
        }
    }
}

struct Shared {
    session: Mutex<Session>,
}

impl Shared {
    fn handle_event(&self, generation: u64, event: TransportEvent) {
        match event {
            TransportEvent::Line(line) => self.handle_line(generation, &line),
            TransportEvent::Closed { reason } => self.handle_closed(generation, reason),
        }
    }

    fn handle_line(&self, generation: u64, line: &str) {
        let observer = {
            let mut session = self.session.lock();
            if session.generation != generation {
                return;
            }
            log::trace!("engine -> {line}");
            session.dispatch(line);
            session.observer.clone()
        };
        // Outside the lock so the observer may query the client.
        if let Some(observer) = observer {
            observer(line);
        }
    }

    fn handle_closed(&self, generation: u64, reason: String) {
        let mut session = self.session.lock();
        if session.generation != generation || session.state == EngineState::Uninitialised {
            return;
        }
        log::warn!("engine transport closed: {reason}");
        session.state = EngineState::Faulted;
        session
            .pending
            .fail(EngineError::Transport(TransportError::Disconnected { reason }));
    }
}

/// Client for a UCI engine behind an [`EngineTransport`].
///
/// One request may be outstanding at a time; a second concurrent call fails
/// immediately with [`EngineError::NotReady`]. Every wait is bounded by the
/// timeouts in [`EngineOptions`]; on expiry the session is `Faulted` and must
/// be initialised again.
///
/// `cancel_search` supersedes an in-flight `request_move`: the waiting
/// future resolves with [`EngineError::Cancelled`] and the move of the stopped
/// search is discarded.
pub struct EngineClient {
    shared: Arc<Shared>,
    transport: Arc<dyn EngineTransport>,
    oracle: Arc<dyn MoveOracle>,
    options: EngineOptions,
    rng: Mutex<StdRng>,
}

impl EngineClient {
    /// Create a client. Nothing is started until [`initialise`](Self::initialise).
    pub fn new<T, O>(transport: T, oracle: O, options: EngineOptions) -> Self
    where
        T: EngineTransport + 'static,
        O: MoveOracle + 'static,
    {
        Self::with_rng(transport, oracle, options, StdRng::from_entropy())
    }

    /// Create a client with a fixed random source for blunder selection.
    pub fn with_rng<T, O>(transport: T, oracle: O, options: EngineOptions, rng: StdRng) -> Self
    where
        T: EngineTransport + 'static,
        O: MoveOracle + 'static,
    {
        let session = Session {
            state: EngineState::Uninitialised,
            pending: Pending::Idle,
            blunder_probability: clamp_probability(options.blunder_probability),
            observer: None,
            next_ticket: 0,
            generation: 0,
        };
        EngineClient {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
            }),
            transport: Arc::new(transport),
            oracle: Arc::new(oracle),
            options,
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Open the transport and run the handshake.
    ///
    /// Allowed from `Uninitialised` and, to recover, from `Faulted`.
    pub async fn initialise(&self) -> Result<(), EngineError> {
        let (ticket, generation, rx) = {
            let mut session = self.shared.session.lock();
            match session.state {
                EngineState::Uninitialised | EngineState::Faulted => {}
                state => return Err(EngineError::NotReady { state }),
            }
            session.generation += 1;
            let ticket = session.take_ticket();
            let (tx, rx) = oneshot::channel();
            session.pending = Pending::Handshake { ticket, reply: tx };
            session.state = EngineState::Initialising;
            (ticket, session.generation, rx)
        };
        log::debug!("initialising engine session {generation}");

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let handler: LineHandler = Arc::new(move |event| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_event(generation, event);
            }
        });
        if let Err(e) = self.transport.open(handler) {
            self.shared.session.lock().fault(ticket);
            return Err(e.into());
        }

        for command in self.options.handshake_commands() {
            self.post(ticket, &command)?;
        }

        self.await_reply(ticket, rx, WaitKind::Handshake, self.options.handshake_timeout)
            .await
    }

    /// Ask the engine for a move in `fen`.
    ///
    /// The engine's answer passes through blunder injection with the
    /// probability current when the request was made. A `fen` containing a
    /// line break or other control character is rejected before anything is
    /// written.
    pub async fn request_move(&self, fen: &str) -> Result<String, EngineError> {
        let (ticket, probability, rx) = {
            let mut session = self.shared.session.lock();
            match session.state {
                EngineState::Ready => {}
                EngineState::Uninitialised => return Err(EngineError::NotInitialised),
                state => return Err(EngineError::NotReady { state }),
            }
            if fen.chars().any(char::is_control) {
                log::warn!("refusing to send position {fen:?}");
                return Err(EngineError::InvalidPosition {
                    fen: fen.to_string(),
                });
            }
            let ticket = session.take_ticket();
            let (tx, rx) = oneshot::channel();
            session.pending = Pending::BestMove {
                ticket,
                purpose: SearchPurpose::Play,
                reply: tx,
            };
            session.state = EngineState::Searching;
            (ticket, session.blunder_probability, rx)
        };

        self.post(
            ticket,
            &EngineCommand::Position {
                fen: fen.to_string(),
            },
        )?;
        self.post(ticket, &self.options.go_command())?;

        let best = self
            .await_reply(ticket, rx, WaitKind::Search, self.options.move_timeout)
            .await?;
        let engine_move = best.mv.ok_or(EngineError::NoMove)?;

        let mut rng = self.rng.lock();
        Ok(blunder::choose_move(
            self.oracle.as_ref(),
            &Position::new(fen),
            &engine_move,
            probability,
            &mut *rng,
        ))
    }

    /// Stop the running search, if any, and wait until the engine confirms.
    pub async fn cancel_search(&self) -> Result<(), EngineError> {
        let (ticket, rx) = {
            let mut session = self.shared.session.lock();
            if session.state != EngineState::Searching {
                return Ok(());
            }
            match std::mem::take(&mut session.pending) {
                Pending::BestMove {
                    purpose: SearchPurpose::Play,
                    reply,
                    ..
                } => {
                    let _ = reply.send(Err(EngineError::Cancelled));
                }
                other => {
                    // A stop is already on its way.
                    session.pending = other;
                    return Err(EngineError::NotReady {
                        state: session.state,
                    });
                }
            }
            let ticket = session.take_ticket();
            let (tx, rx) = oneshot::channel();
            session.pending = Pending::BestMove {
                ticket,
                purpose: SearchPurpose::Stop,
                reply: tx,
            };
            (ticket, rx)
        };

        self.post(ticket, &EngineCommand::Stop)?;
        self.await_reply(ticket, rx, WaitKind::Stop, self.options.stop_timeout)
            .await
            .map(|_| ())
    }

    /// Tell the engine a new game starts. Only valid while `Ready`.
    pub fn new_game(&self) -> Result<(), EngineError> {
        let ticket = {
            let session = self.shared.session.lock();
            match session.state {
                EngineState::Ready => session.next_ticket,
                EngineState::Uninitialised => return Err(EngineError::NotInitialised),
                state => return Err(EngineError::NotReady { state }),
            }
        };
        self.post(ticket, &EngineCommand::UciNewGame)
    }

    /// Tear the session down: fail any waiter with `Cancelled`, send `quit`
    /// and close the transport. The client can be initialised again afterwards.
    pub fn shutdown(&self) {
        let previous = {
            let mut session = self.shared.session.lock();
            let previous = session.state;
            session.generation += 1;
            session.pending.fail(EngineError::Cancelled);
            session.state = EngineState::Uninitialised;
            previous
        };
        if previous != EngineState::Uninitialised {
            let _ = self.transport.post_line(&EngineCommand::Quit.to_string());
            self.transport.close();
            log::info!("engine session shut down from {previous}");
        }
    }

    /// Deliver one engine line by hand, as if it came from the transport.
    pub fn on_engine_line(&self, line: &str) {
        let generation = self.shared.session.lock().generation;
        self.shared.handle_line(generation, line);
    }

    /// Register the diagnostics observer, replacing any previous one.
    pub fn set_uci_observer<F>(&self, observer: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.shared.session.lock().observer = Some(Arc::new(observer));
    }

    pub fn clear_uci_observer(&self) {
        self.shared.session.lock().observer = None;
    }

    /// Side the engine plays.
    #[must_use]
    pub fn color(&self) -> Color {
        self.options.color
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.session.lock().state
    }

    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.state() == EngineState::Searching
    }

    /// Set the blunder probability, clamped to [0, 1].
    ///
    /// Takes effect from the next `request_move`; a running search keeps the
    /// value it started with.
    pub fn set_difficulty_probability(&self, p: f64) {
        let p = clamp_probability(p);
        self.shared.session.lock().blunder_probability = p;
        log::debug!("blunder probability set to {p}");
    }

    #[must_use]
    pub fn difficulty_probability(&self) -> f64 {
        self.shared.session.lock().blunder_probability
    }

    fn post(&self, ticket: u64, command: &EngineCommand) -> Result<(), EngineError> {
        let line = command.to_string();
        log::debug!("engine <- {line}");
        self.transport.post_line(&line).map_err(|e| {
            log::warn!("engine write failed, session faulted: {e}");
            self.shared.session.lock().fault(ticket);
            EngineError::from(e)
        })
    }

    async fn await_reply<T>(
        &self,
        ticket: u64,
        rx: oneshot::Receiver<Result<T, EngineError>>,
        waiting_for: WaitKind,
        after: Duration,
    ) -> Result<T, EngineError> {
        match tokio::time::timeout(after, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(EngineError::Cancelled),
            Err(_) => {
                let timed_out = {
                    let mut session = self.shared.session.lock();
                    let ours = session.pending.ticket() == Some(ticket);
                    if ours {
                        session.fault(ticket);
                    }
                    ours
                };
                if timed_out {
                    log::warn!("engine {waiting_for} timed out after {after:?}, session faulted");
                    if waiting_for == WaitKind::Search {
                        let _ = self.transport.post_line(&EngineCommand::Stop.to_string());
                    }
                }
                Err(EngineError::Timeout { waiting_for, after })
            }
        }
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}
