use deckdraw_core::{SessionEvent, SessionObserver, SessionSnapshot};
use parking_lot::Mutex;

/// Observer that keeps every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<(SessionEvent, SessionSnapshot)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.seen.lock().iter().map(|(event, _)| event.clone()).collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter_map(|(event, _)| event.alert())
            .collect()
    }

    pub fn last_snapshot(&self) -> Option<SessionSnapshot> {
        self.seen.lock().last().map(|(_, snapshot)| snapshot.clone())
    }
}

impl SessionObserver for RecordingObserver {
    fn on_event(&self, event: &SessionEvent, snapshot: &SessionSnapshot) {
        self.seen.lock().push((event.clone(), snapshot.clone()));
    }
}
