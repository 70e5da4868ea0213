use crate::timer::PeriodicTask;
use deckdraw_core::{
    Deck, DeckService, DrawnCard, SessionConfig, SessionError, SessionEvent, SessionObserver,
    SessionSnapshot, SessionState, StopReason,
};
use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Client-side controller for one remote deck.
///
/// Owns the local [`SessionState`] and the auto-draw timer. Every mutation is
/// reported to the observer. Dropping the session aborts a running timer.
pub struct DeckSession {
    shared: Arc<Shared>,
    auto_draw: Mutex<Option<AutoDrawRun>>,
    runtime: Handle,
}

/// Timer for one auto-draw run. Lock order is `auto_draw` before `state`.
struct AutoDrawRun {
    run: u64,
    task: PeriodicTask,
}

struct Shared {
    service: Arc<dyn DeckService>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        let snapshot = self.state.lock().snapshot();
        self.observer.on_event(&event, &snapshot);
    }

    async fn draw_one(&self) -> Result<DrawnCard, SessionError> {
        let deck_id = self.state.lock().begin_draw()?;
        let response = match self.service.draw(&deck_id).await {
            Ok(response) => response,
            Err(err) => {
                warn!(deck_id = %deck_id, error = %err, "draw request failed");
                let err = SessionError::from(err);
                self.emit(SessionEvent::DrawFailed {
                    reason: err.alert_text(),
                });
                return Err(err);
            }
        };
        let applied = self.state.lock().apply_draw(&response);
        match &applied {
            Ok(card) => {
                debug!(deck_id = %deck_id, card = %card.id, remaining = response.remaining, "card drawn");
                self.emit(SessionEvent::CardDrawn {
                    card: card.clone(),
                    remaining: response.remaining,
                });
            }
            Err(SessionError::Exhausted) => {
                info!(deck_id = %deck_id, "deck exhausted");
                self.emit(SessionEvent::Exhausted);
            }
            Err(err) => {
                warn!(deck_id = %deck_id, error = %err, "draw response rejected");
                self.emit(SessionEvent::DrawFailed {
                    reason: err.alert_text(),
                });
            }
        }
        applied
    }

    async fn auto_draw_tick(&self, run: u64) -> ControlFlow<()> {
        if !self.state.lock().is_current_run(run) {
            debug!(run, "auto draw run retired");
            return ControlFlow::Break(());
        }
        match self.draw_one().await {
            Ok(_) => ControlFlow::Continue(()),
            Err(err) => {
                let reason = match err {
                    SessionError::Exhausted => StopReason::Exhausted,
                    _ => StopReason::Failed,
                };
                let ended = self.state.lock().end_run(run);
                if ended {
                    self.emit(SessionEvent::AutoDrawStopped { reason });
                }
                ControlFlow::Break(())
            }
        }
    }
}

/// Releases the busy flag however the shuffle future ends.
struct ShuffleGuard<'a> {
    shared: &'a Shared,
    settled: bool,
}

impl ShuffleGuard<'_> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for ShuffleGuard<'_> {
    fn drop(&mut self) {
        self.shared.state.lock().release_shuffle();
        if !self.settled {
            warn!("shuffle abandoned before the service answered");
        }
    }
}

impl DeckSession {
    /// Build an unloaded session. Timers are spawned on `runtime`.
    pub fn new(
        service: Arc<dyn DeckService>,
        observer: Arc<dyn SessionObserver>,
        config: SessionConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                service,
                observer,
                config,
                state: Mutex::new(SessionState::new()),
            }),
            auto_draw: Mutex::new(None),
            runtime,
        }
    }

    /// Build a session on the current runtime and load its deck. A failed
    /// load is logged and leaves the session unloaded.
    pub async fn start(
        service: Arc<dyn DeckService>,
        observer: Arc<dyn SessionObserver>,
        config: SessionConfig,
    ) -> Self {
        let session = Self::new(service, observer, config, Handle::current());
        let _ = session.load().await;
        session
    }

    /// Fetch a fresh shuffled deck. There is no retry on failure.
    pub async fn load(&self) -> Result<(), SessionError> {
        let response = match self.shared.service.new_shuffled_deck().await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "failed to load deck");
                self.shared.emit(SessionEvent::LoadFailed {
                    reason: err.to_string(),
                });
                return Err(SessionError::Load(err));
            }
        };
        let deck = Deck::from_response(&response);
        info!(deck_id = %deck.id, remaining = deck.remaining, "deck loaded");
        self.shared.state.lock().load(deck.clone());
        self.shared.emit(SessionEvent::DeckLoaded {
            deck_id: deck.id,
            remaining: deck.remaining,
        });
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.lock().snapshot()
    }

    pub fn is_ready(&self) -> bool {
        self.shared.state.lock().is_ready()
    }

    /// Draw one card and append it to the drawn list.
    pub async fn draw_one(&self) -> Result<DrawnCard, SessionError> {
        self.shared.draw_one().await
    }

    /// Reshuffle the deck in place and clear the drawn list.
    ///
    /// Holds the busy flag for the duration and stops auto-draw first. Both
    /// activity flags are cleared on every exit path.
    pub async fn shuffle(&self) -> Result<(), SessionError> {
        let (deck_id, was_drawing) = {
            let mut state = self.shared.state.lock();
            let was_drawing = state.drawing;
            (state.begin_shuffle()?, was_drawing)
        };
        let guard = ShuffleGuard {
            shared: &self.shared,
            settled: false,
        };
        self.abort_timer();
        if was_drawing {
            self.shared.emit(SessionEvent::AutoDrawStopped {
                reason: StopReason::Shuffle,
            });
        }
        self.shared.emit(SessionEvent::ShuffleStarted);

        match self.shared.service.reshuffle(&deck_id).await {
            Ok(response) => {
                self.shared.state.lock().complete_shuffle(&response);
                guard.settle();
                info!(deck_id = %deck_id, remaining = response.remaining, "deck reshuffled");
                self.shared.emit(SessionEvent::Shuffled {
                    remaining: response.remaining,
                });
                Ok(())
            }
            Err(err) => {
                guard.settle();
                warn!(deck_id = %deck_id, error = %err, "shuffle request failed");
                self.shared.emit(SessionEvent::ShuffleFailed {
                    reason: err.to_string(),
                });
                Err(SessionError::Shuffle(err))
            }
        }
    }

    pub fn is_auto_drawing(&self) -> bool {
        self.shared.state.lock().drawing
    }

    /// Start or stop the repeating draw. Starting tears down any previous
    /// timer first; asking for the current state is a no-op.
    pub fn set_auto_draw(&self, active: bool) -> Result<(), SessionError> {
        if !active {
            self.stop_auto_draw(StopReason::Requested);
            return Ok(());
        }
        let run = {
            let mut auto_draw = self.auto_draw.lock();
            let run = {
                let mut state = self.shared.state.lock();
                if state.drawing {
                    return Ok(());
                }
                state.start_drawing()?
            };
            if let Some(previous) = auto_draw.take() {
                previous.task.cancel();
            }
            *auto_draw = Some(AutoDrawRun {
                run,
                task: self.spawn_timer(run),
            });
            run
        };
        info!(
            run,
            period_ms = self.shared.config.draw_interval.as_millis() as u64,
            "auto draw started"
        );
        self.shared.emit(SessionEvent::AutoDrawStarted);
        Ok(())
    }

    /// Flip auto-draw and return the new setting.
    pub fn toggle_auto_draw(&self) -> Result<bool, SessionError> {
        let next = !self.is_auto_drawing();
        self.set_auto_draw(next)?;
        Ok(next)
    }

    /// Abort the timer unconditionally. Call when the UI goes away.
    pub fn shutdown(&self) {
        self.stop_auto_draw(StopReason::Shutdown);
    }

    fn stop_auto_draw(&self, reason: StopReason) {
        let stopped = {
            let mut auto_draw = self.auto_draw.lock();
            if let Some(previous) = auto_draw.take() {
                previous.task.cancel();
            }
            self.shared.state.lock().stop_drawing()
        };
        if stopped {
            info!(?reason, "auto draw stopped");
            self.shared.emit(SessionEvent::AutoDrawStopped { reason });
        }
    }

    fn abort_timer(&self) {
        if let Some(previous) = self.auto_draw.lock().take() {
            debug!(run = previous.run, "auto draw timer aborted");
            previous.task.cancel();
        }
    }

    fn spawn_timer(&self, run: u64) -> PeriodicTask {
        let shared = Arc::clone(&self.shared);
        PeriodicTask::spawn(&self.runtime, self.shared.config.draw_interval, move || {
            let shared = Arc::clone(&shared);
            async move { shared.auto_draw_tick(run).await }
        })
    }
}

impl std::fmt::Debug for DeckSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckSession")
            .field("state", &*self.shared.state.lock())
            .field("config", &self.shared.config)
            .finish()
    }
}
