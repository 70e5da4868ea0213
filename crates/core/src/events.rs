use crate::{DrawnCard, SessionSnapshot, DECK_EMPTY_ALERT, SHUFFLE_FAILED_ALERT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    Exhausted,
    Failed,
    Shuffle,
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum SessionEvent {
    DeckLoaded { deck_id: String, remaining: u32 },
    LoadFailed { reason: String },
    CardDrawn { card: DrawnCard, remaining: u32 },
    Exhausted,
    DrawFailed { reason: String },
    ShuffleStarted,
    Shuffled { remaining: u32 },
    ShuffleFailed { reason: String },
    AutoDrawStarted,
    AutoDrawStopped { reason: StopReason },
}

impl SessionEvent {
    /// Blocking-alert text, for the events a user has to acknowledge.
    pub fn alert(&self) -> Option<String> {
        match self {
            Self::Exhausted => Some(DECK_EMPTY_ALERT.to_string()),
            Self::DrawFailed { reason } => Some(reason.clone()),
            Self::ShuffleFailed { .. } => Some(SHUFFLE_FAILED_ALERT.to_string()),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::DeckLoaded { deck_id, remaining } => {
                format!("deck {deck_id} loaded ({remaining} left)")
            }
            Self::LoadFailed { reason } => format!("deck load failed: {reason}"),
            Self::CardDrawn { card, remaining } => {
                format!("drew {} [{}] ({remaining} left)", card.name, card.id)
            }
            Self::Exhausted => "deck empty".to_string(),
            Self::DrawFailed { reason } => format!("draw failed: {reason}"),
            Self::ShuffleStarted => "shuffling".to_string(),
            Self::Shuffled { remaining } => format!("shuffled ({remaining} left)"),
            Self::ShuffleFailed { reason } => format!("shuffle failed: {reason}"),
            Self::AutoDrawStarted => "auto draw on".to_string(),
            Self::AutoDrawStopped { reason } => format!("auto draw off ({reason:?})"),
        }
    }
}

/// Redraw hook. Called after every state change, never under the state lock.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent, snapshot: &SessionSnapshot);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionEvent, &SessionSnapshot) + Send + Sync,
{
    fn on_event(&self, event: &SessionEvent, snapshot: &SessionSnapshot) {
        self(event, snapshot)
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<SessionEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: SessionEvent) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SessionEvent> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
