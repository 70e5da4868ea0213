use deckdraw_core::{
    DrawMode, SessionEvent, SessionObserver, SessionPhase, SessionSnapshot,
};
use deckdraw_session::DeckSession;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

const MAX_EVENT_LOG: usize = 200;

/// Forwards session notifications into the UI loop.
pub struct ChannelObserver {
    tx: UnboundedSender<SessionEvent>,
}

impl SessionObserver for ChannelObserver {
    fn on_event(&self, event: &SessionEvent, _snapshot: &SessionSnapshot) {
        let _ = self.tx.send(event.clone());
    }
}

pub fn channel_observer() -> (Arc<ChannelObserver>, UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = unbounded_channel();
    (Arc::new(ChannelObserver { tx }), rx)
}

pub struct App {
    pub mode: DrawMode,
    pub session: Arc<DeckSession>,
    runtime: Handle,
    events: UnboundedReceiver<SessionEvent>,
    pub(crate) in_flight: Vec<JoinHandle<()>>,
    alerts: VecDeque<String>,
    pub event_log: VecDeque<String>,
    pub card_cursor: usize,
    pub status_line: String,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        mode: DrawMode,
        session: Arc<DeckSession>,
        runtime: Handle,
        events: UnboundedReceiver<SessionEvent>,
    ) -> Self {
        Self {
            mode,
            session,
            runtime,
            events,
            in_flight: Vec::new(),
            alerts: VecDeque::new(),
            event_log: VecDeque::new(),
            card_cursor: 0,
            status_line: "loading deck".to_string(),
            show_help: false,
            should_quit: false,
        }
    }

    /// Kick off the initial deck fetch without blocking the UI.
    pub fn begin_loading(&mut self) {
        let session = Arc::clone(&self.session);
        let task = self.runtime.spawn(async move {
            let _ = session.load().await;
        });
        self.in_flight.push(task);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn on_tick(&mut self) {
        self.pump_events();
    }

    /// Fold queued session events into the log and alert queue.
    pub fn pump_events(&mut self) {
        self.in_flight.retain(|task| !task.is_finished());
        while let Ok(event) = self.events.try_recv() {
            match &event {
                SessionEvent::DeckLoaded { .. } => self.push_status("ready"),
                SessionEvent::LoadFailed { .. } => self.push_status("deck unavailable"),
                SessionEvent::CardDrawn { .. } => {
                    self.card_cursor = self.snapshot().drawn.len().saturating_sub(1);
                }
                SessionEvent::Shuffled { .. } => {
                    self.card_cursor = 0;
                    self.push_status("shuffled");
                }
                _ => {}
            }
            if let Some(text) = event.alert() {
                self.alerts.push_back(text);
            }
            self.push_event_line(event.describe());
        }
    }

    pub fn alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn is_working(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn primary_label(&self) -> &'static str {
        match self.mode {
            DrawMode::Manual => "DRAW",
            DrawMode::Auto => {
                if self.session.is_auto_drawing() {
                    "STOP DRAWING"
                } else {
                    "KEEP DRAWING"
                }
            }
        }
    }

    pub fn phase_label(&self, phase: SessionPhase) -> &'static str {
        match phase {
            SessionPhase::Unloaded => "loading",
            SessionPhase::Idle => "idle",
            SessionPhase::Drawing => "drawing",
            SessionPhase::Shuffling => "shuffling",
            SessionPhase::Exhausted => "empty",
        }
    }

    pub fn controls_enabled(&self) -> bool {
        self.snapshot().controls_enabled()
    }

    pub fn activate_primary(&mut self) {
        match self.mode {
            DrawMode::Manual => self.draw(),
            DrawMode::Auto => self.toggle_auto_draw(),
        }
    }

    pub fn draw(&mut self) {
        if !self.ensure_controls() {
            return;
        }
        let session = Arc::clone(&self.session);
        let task = self.runtime.spawn(async move {
            let _ = session.draw_one().await;
        });
        self.in_flight.push(task);
    }

    pub fn toggle_auto_draw(&mut self) {
        if !self.ensure_controls() {
            return;
        }
        match self.session.toggle_auto_draw() {
            Ok(true) => {
                let period = self.session.config().draw_interval.as_millis();
                self.push_status(format!("drawing every {period} ms"));
            }
            Ok(false) => self.push_status("stopped"),
            Err(err) => self.push_status(err.to_string()),
        }
    }

    pub fn shuffle(&mut self) {
        if !self.ensure_controls() {
            return;
        }
        self.push_status("shuffling");
        let session = Arc::clone(&self.session);
        let task = self.runtime.spawn(async move {
            let _ = session.shuffle().await;
        });
        self.in_flight.push(task);
    }

    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }

    pub fn move_cursor(&mut self, down: bool) {
        let len = self.snapshot().drawn.len();
        move_index(&mut self.card_cursor, len, down);
    }

    pub fn card_rows(&self) -> Vec<String> {
        self.snapshot()
            .drawn
            .iter()
            .enumerate()
            .map(|(idx, card)| format!("{:>2}. {} [{}]  {}", idx + 1, card.name, card.id, card.image))
            .collect()
    }

    pub fn push_status(&mut self, value: impl Into<String>) {
        self.status_line = value.into();
    }

    fn ensure_controls(&mut self) -> bool {
        let snapshot = self.snapshot();
        if !snapshot.is_ready() {
            self.push_status("deck is not loaded");
            return false;
        }
        if snapshot.shuffling {
            self.push_status("shuffle in progress");
            return false;
        }
        true
    }

    fn push_event_line(&mut self, line: String) {
        self.event_log.push_back(line);
        while self.event_log.len() > MAX_EVENT_LOG {
            self.event_log.pop_front();
        }
    }
}

fn move_index(value: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *value = 0;
        return;
    }
    if down {
        *value = (*value + 1).min(len - 1);
    } else {
        *value = value.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::dispatch;
    use crate::input::InputAction;
    use deckdraw_core::SessionConfig;
    use deckdraw_test_support::{init_logging, ScriptedDeckService};
    use std::time::Duration;
    use tokio::runtime::Runtime;

    fn harness(mode: DrawMode, service: Arc<ScriptedDeckService>, load: bool) -> (Runtime, App) {
        init_logging();
        let runtime = Runtime::new().expect("runtime");
        let (observer, events) = channel_observer();
        let config = SessionConfig {
            mode,
            draw_interval: Duration::from_secs(60),
            ..SessionConfig::default()
        };
        let session = Arc::new(DeckSession::new(
            service,
            observer,
            config,
            runtime.handle().clone(),
        ));
        let mut app = App::new(mode, session, runtime.handle().clone(), events);
        if load {
            app.begin_loading();
            settle(&runtime, &mut app);
        }
        (runtime, app)
    }

    fn settle(runtime: &Runtime, app: &mut App) {
        let pending: Vec<_> = app.in_flight.drain(..).collect();
        runtime.block_on(async {
            for task in pending {
                let _ = task.await;
            }
        });
        app.pump_events();
    }

    #[test]
    fn manual_draw_appends_and_logs() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (runtime, mut app) = harness(DrawMode::Manual, service, true);
        assert_eq!(app.status_line, "ready");
        assert_eq!(app.primary_label(), "DRAW");
        dispatch(&mut app, InputAction::Primary);
        settle(&runtime, &mut app);
        assert_eq!(app.snapshot().drawn.len(), 1);
        assert_eq!(
            app.event_log.back().map(String::as_str),
            Some("drew SPADES ACE [AS] (51 left)")
        );
        assert_eq!(app.card_rows()[0], " 1. SPADES ACE [AS]  https://deckofcardsapi.com/static/img/AS.png");
    }

    #[test]
    fn alert_blocks_input_until_dismissed() {
        let service = Arc::new(ScriptedDeckService::new("abc123").with_remaining(1));
        let (runtime, mut app) = harness(DrawMode::Manual, Arc::clone(&service), true);
        dispatch(&mut app, InputAction::Primary);
        settle(&runtime, &mut app);
        assert_eq!(app.alert(), Some("Deck empty!"));

        dispatch(&mut app, InputAction::Shuffle);
        settle(&runtime, &mut app);
        assert_eq!(service.calls().reshuffle, 0);

        dispatch(&mut app, InputAction::Dismiss);
        assert!(app.alert().is_none());
        dispatch(&mut app, InputAction::Shuffle);
        settle(&runtime, &mut app);
        assert_eq!(service.calls().reshuffle, 1);
        assert_eq!(app.status_line, "shuffled");
    }

    #[test]
    fn controls_stay_disabled_until_the_deck_loads() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (_runtime, mut app) = harness(DrawMode::Manual, Arc::clone(&service), false);
        dispatch(&mut app, InputAction::Primary);
        dispatch(&mut app, InputAction::Shuffle);
        assert_eq!(app.status_line, "deck is not loaded");
        assert!(!app.is_working());
        assert_eq!(service.calls().draw, 0);
    }

    #[test]
    fn auto_mode_toggles_and_shuffle_stops_it() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (runtime, mut app) = harness(DrawMode::Auto, service, true);
        assert_eq!(app.primary_label(), "KEEP DRAWING");
        dispatch(&mut app, InputAction::Primary);
        assert_eq!(app.primary_label(), "STOP DRAWING");
        assert_eq!(app.status_line, "drawing every 60000 ms");

        dispatch(&mut app, InputAction::Shuffle);
        settle(&runtime, &mut app);
        assert_eq!(app.primary_label(), "KEEP DRAWING");
        assert!(app.snapshot().drawn.is_empty());
        assert!(app
            .event_log
            .iter()
            .any(|line| line == "auto draw off (Shuffle)"));
    }

    #[test]
    fn shutdown_stops_auto_draw() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (runtime, mut app) = harness(DrawMode::Auto, service, true);
        dispatch(&mut app, InputAction::Primary);
        assert!(app.session.is_auto_drawing());
        app.shutdown();
        settle(&runtime, &mut app);
        assert!(!app.session.is_auto_drawing());
        assert_eq!(app.primary_label(), "KEEP DRAWING");
    }

    #[test]
    fn cursor_stays_within_the_card_list() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (runtime, mut app) = harness(DrawMode::Manual, service, true);
        for _ in 0..3 {
            dispatch(&mut app, InputAction::Primary);
            settle(&runtime, &mut app);
        }
        assert_eq!(app.card_cursor, 2);
        dispatch(&mut app, InputAction::MoveDown);
        assert_eq!(app.card_cursor, 2);
        dispatch(&mut app, InputAction::MoveUp);
        dispatch(&mut app, InputAction::MoveUp);
        dispatch(&mut app, InputAction::MoveUp);
        assert_eq!(app.card_cursor, 0);
    }
}
