use deckdraw_core::{
    DeckService, DrawMode, DrawnCard, EventBus, SessionConfig, SessionError, SessionEvent,
    SessionObserver, SessionPhase, SessionSnapshot,
};
use deckdraw_session::DeckSession;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Queues session events until the next API response drains them.
struct BusObserver {
    bus: Arc<Mutex<EventBus>>,
}

impl SessionObserver for BusObserver {
    fn on_event(&self, event: &SessionEvent, _snapshot: &SessionSnapshot) {
        self.bus.lock().push(event.clone());
    }
}

pub struct AppState {
    mode: DrawMode,
    session: Arc<DeckSession>,
    events: Arc<Mutex<EventBus>>,
    runtime: Handle,
}

impl AppState {
    /// Build the session and start loading its deck in the background.
    pub fn start(service: Arc<dyn DeckService>, config: SessionConfig, runtime: Handle) -> Self {
        let events = Arc::new(Mutex::new(EventBus::default()));
        let observer = Arc::new(BusObserver {
            bus: Arc::clone(&events),
        });
        let mode = config.mode;
        let session = Arc::new(DeckSession::new(service, observer, config, runtime.clone()));
        let loader = Arc::clone(&session);
        runtime.spawn(async move {
            let _ = loader.load().await;
        });
        Self {
            mode,
            session,
            events,
            runtime,
        }
    }

    pub fn session(&self) -> &Arc<DeckSession> {
        &self.session
    }

    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub state: UiState,
    pub events: Vec<UiEvent>,
}

#[derive(Serialize)]
pub struct UiState {
    pub ready: bool,
    pub mode: DrawMode,
    pub phase: SessionPhase,
    pub deck_id: Option<String>,
    pub remaining: Option<u32>,
    pub drawing: bool,
    pub shuffling: bool,
    pub exhausted: bool,
    pub controls_enabled: bool,
    pub primary_label: &'static str,
    pub cards: Vec<DrawnCard>,
}

#[derive(Serialize)]
pub struct UiEvent {
    #[serde(flatten)]
    pub event: SessionEvent,
    pub text: String,
    pub alert: Option<String>,
}

#[derive(Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

pub fn build_response(state: &AppState, err: Option<String>) -> ApiResponse {
    let events = state
        .events
        .lock()
        .drain()
        .map(|event| UiEvent {
            text: event.describe(),
            alert: event.alert(),
            event,
        })
        .collect();
    ApiResponse {
        ok: err.is_none(),
        error: err,
        state: snapshot_state(state.mode, &state.session.snapshot()),
        events,
    }
}

fn snapshot_state(mode: DrawMode, snapshot: &SessionSnapshot) -> UiState {
    let primary_label = match (mode, snapshot.drawing) {
        (DrawMode::Manual, _) => "DRAW",
        (DrawMode::Auto, true) => "STOP DRAWING",
        (DrawMode::Auto, false) => "KEEP DRAWING",
    };
    UiState {
        ready: snapshot.is_ready(),
        mode,
        phase: snapshot.phase,
        deck_id: snapshot.deck_id().map(str::to_string),
        remaining: snapshot.deck.as_ref().map(|deck| deck.remaining),
        drawing: snapshot.drawing,
        shuffling: snapshot.shuffling,
        exhausted: snapshot.exhausted,
        controls_enabled: snapshot.controls_enabled(),
        primary_label,
        cards: snapshot.drawn.clone(),
    }
}

/// Run one UI action. Returns the error text for a refused action.
///
/// Draws and shuffles run on the runtime so the request loop keeps serving
/// polls; their outcome arrives as events on a later response.
pub fn apply_action(state: &AppState, req: ActionRequest) -> Option<String> {
    debug!(action = %req.action, "api action");
    let session = &state.session;
    match req.action.as_str() {
        "draw" => {
            if let Some(err) = refuse_remote_action(&session.snapshot()) {
                return Some(err);
            }
            let session = Arc::clone(session);
            state.runtime.spawn(async move {
                let _ = session.draw_one().await;
            });
            None
        }
        "shuffle" => {
            if let Some(err) = refuse_remote_action(&session.snapshot()) {
                return Some(err);
            }
            let session = Arc::clone(session);
            state.runtime.spawn(async move {
                let _ = session.shuffle().await;
            });
            None
        }
        "toggle_auto" => session
            .toggle_auto_draw()
            .map(|_| ())
            .map_err(|err| err.to_string())
            .err(),
        "start_auto" => session
            .set_auto_draw(true)
            .map_err(|err| err.to_string())
            .err(),
        "stop_auto" => session
            .set_auto_draw(false)
            .map_err(|err| err.to_string())
            .err(),
        other => Some(format!("unknown action '{other}'")),
    }
}

fn refuse_remote_action(snapshot: &SessionSnapshot) -> Option<String> {
    if !snapshot.is_ready() {
        return Some(SessionError::NotReady.to_string());
    }
    if snapshot.shuffling {
        return Some(SessionError::ShuffleInProgress.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckdraw_test_support::{init_logging, ScriptedDeckService};
    use std::time::Duration;
    use tokio::runtime::Runtime;

    fn loaded(mode: DrawMode, service: Arc<ScriptedDeckService>) -> (Runtime, AppState) {
        init_logging();
        let runtime = Runtime::new().expect("runtime");
        let config = SessionConfig {
            mode,
            draw_interval: Duration::from_secs(60),
            ..SessionConfig::default()
        };
        let state = AppState::start(service, config, runtime.handle().clone());
        wait_for(&runtime, || state.session().is_ready());
        (runtime, state)
    }

    fn wait_for(runtime: &Runtime, done: impl Fn() -> bool) {
        runtime.block_on(async {
            for _ in 0..200 {
                if done() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            panic!("condition not reached");
        });
    }

    fn action(name: &str) -> ActionRequest {
        ActionRequest {
            action: name.to_string(),
        }
    }

    #[test]
    fn draw_runs_in_background_and_drains_events() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (runtime, state) = loaded(DrawMode::Manual, service);
        assert_eq!(apply_action(&state, action("draw")), None);
        wait_for(&runtime, || state.session().snapshot().drawn.len() == 1);
        let response = build_response(&state, None);
        assert!(response.ok);
        assert_eq!(response.state.cards.len(), 1);
        assert_eq!(response.state.cards[0].name, "SPADES ACE");
        assert_eq!(response.state.primary_label, "DRAW");
        let kinds: Vec<String> = response.events.iter().map(|event| event.text.clone()).collect();
        assert_eq!(
            kinds,
            ["deck abc123 loaded (52 left)", "drew SPADES ACE [AS] (51 left)"]
        );
        assert!(build_response(&state, None).events.is_empty());
    }

    #[test]
    fn exhausted_draw_reports_alert_event() {
        let service = Arc::new(ScriptedDeckService::new("abc123").with_remaining(1));
        let (runtime, state) = loaded(DrawMode::Manual, service);
        assert_eq!(apply_action(&state, action("draw")), None);
        wait_for(&runtime, || state.session().snapshot().exhausted);
        let response = build_response(&state, None);
        assert!(response.state.exhausted);
        assert!(response.state.cards.is_empty());
        let alerts: Vec<_> = response
            .events
            .iter()
            .filter_map(|event| event.alert.clone())
            .collect();
        assert_eq!(alerts, ["Deck empty!"]);
    }

    #[test]
    fn shuffle_runs_in_background_and_clears_cards() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (runtime, state) = loaded(DrawMode::Manual, Arc::clone(&service));
        apply_action(&state, action("draw"));
        wait_for(&runtime, || state.session().snapshot().drawn.len() == 1);
        assert_eq!(apply_action(&state, action("shuffle")), None);
        wait_for(&runtime, || service.calls().reshuffle == 1 && !state.session().snapshot().shuffling);
        let response = build_response(&state, None);
        assert!(response.state.cards.is_empty());
        assert!(response.state.controls_enabled);
    }

    #[test]
    fn auto_actions_flip_the_label() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (_runtime, state) = loaded(DrawMode::Auto, service);
        assert_eq!(build_response(&state, None).state.primary_label, "KEEP DRAWING");
        assert_eq!(apply_action(&state, action("toggle_auto")), None);
        let response = build_response(&state, None);
        assert_eq!(response.state.primary_label, "STOP DRAWING");
        assert_eq!(response.state.phase, SessionPhase::Drawing);
        assert_eq!(apply_action(&state, action("stop_auto")), None);
        assert!(!build_response(&state, None).state.drawing);
        state.shutdown();
    }

    #[test]
    fn draw_is_refused_while_a_shuffle_runs() {
        let service = Arc::new(
            ScriptedDeckService::new("abc123").with_latency(Duration::from_millis(200)),
        );
        let (runtime, state) = loaded(DrawMode::Manual, Arc::clone(&service));
        assert_eq!(apply_action(&state, action("shuffle")), None);
        wait_for(&runtime, || state.session().snapshot().shuffling);
        assert_eq!(
            apply_action(&state, action("draw")).as_deref(),
            Some("a shuffle is in progress")
        );
        assert_eq!(
            build_response(&state, None).state.primary_label,
            "DRAW"
        );
        wait_for(&runtime, || !state.session().snapshot().shuffling);
        assert_eq!(service.calls().draw, 0);
    }

    #[test]
    fn state_polls_are_served_while_a_draw_is_pending() {
        let service = Arc::new(
            ScriptedDeckService::new("abc123").with_latency(Duration::from_millis(300)),
        );
        let (runtime, state) = loaded(DrawMode::Manual, Arc::clone(&service));
        assert_eq!(apply_action(&state, action("draw")), None);
        let response = build_response(&state, None);
        assert!(response.state.cards.is_empty());
        assert!(response.state.controls_enabled);
        wait_for(&runtime, || state.session().snapshot().drawn.len() == 1);
    }

    #[test]
    fn unknown_action_is_an_error() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (_runtime, state) = loaded(DrawMode::Manual, service);
        assert_eq!(
            apply_action(&state, action("deal")),
            Some("unknown action 'deal'".to_string())
        );
    }

    #[test]
    fn response_serializes_flattened_events() {
        let service = Arc::new(ScriptedDeckService::new("abc123"));
        let (_runtime, state) = loaded(DrawMode::Manual, service);
        let body = serde_json::to_value(build_response(&state, None)).expect("encode");
        assert_eq!(body["state"]["deck_id"], "abc123");
        assert_eq!(body["state"]["mode"], "manual");
        assert_eq!(body["events"][0]["kind"], "DeckLoaded");
        assert_eq!(body["events"][0]["alert"], serde_json::Value::Null);
    }
}
