use thiserror::Error;

pub const DECK_EMPTY_ALERT: &str = "Deck empty!";
pub const SHUFFLE_FAILED_ALERT: &str = "Error shuffling the deck";

/// Failures talking to the remote deck service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service returned status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("service rejected request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("deck is not loaded")]
    NotReady,
    #[error("failed to load deck: {0}")]
    Load(ServiceError),
    #[error("Deck empty!")]
    Exhausted,
    #[error("{0}")]
    Request(#[from] ServiceError),
    #[error("draw response carried no card")]
    MalformedResponse,
    #[error("Error shuffling the deck")]
    Shuffle(ServiceError),
    #[error("a shuffle is in progress")]
    ShuffleInProgress,
}

impl SessionError {
    /// Text for the blocking alert a UI raises for this failure.
    pub fn alert_text(&self) -> String {
        match self {
            Self::Exhausted => DECK_EMPTY_ALERT.to_string(),
            Self::Shuffle(_) => SHUFFLE_FAILED_ALERT.to_string(),
            other => other.to_string(),
        }
    }
}
