use crate::DeckResponse;
use serde::{Deserialize, Serialize};

/// Handle on a deck owned by the remote service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub id: String,
    pub remaining: u32,
    pub shuffled: bool,
}

impl Deck {
    pub fn from_response(response: &DeckResponse) -> Self {
        Self {
            id: response.deck_id.clone(),
            remaining: response.remaining,
            shuffled: response.shuffled,
        }
    }

    /// Reshuffles keep the identifier; only the counters move.
    pub fn refresh(&mut self, response: &DeckResponse) {
        self.remaining = response.remaining;
        self.shuffled = response.shuffled;
    }

    pub fn set_remaining(&mut self, remaining: u32) {
        self.remaining = remaining;
    }
}
