use crate::CardPayload;
use serde::{Deserialize, Serialize};

/// A card pulled from the remote deck and kept for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DrawnCard {
    pub id: String,
    pub name: String,
    pub image: String,
}

impl DrawnCard {
    pub fn from_payload(card: &CardPayload) -> Self {
        Self {
            id: card.code.clone(),
            name: display_name(&card.suit, &card.value),
            image: card.image.clone(),
        }
    }
}

pub fn display_name(suit: &str, value: &str) -> String {
    format!("{suit} {value}")
}
