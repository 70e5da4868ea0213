use serde::{Deserialize, Serialize};

fn default_success() -> bool {
    true
}

/// Body returned by the new-shuffled-deck and reshuffle calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub deck_id: String,
    #[serde(default)]
    pub shuffled: bool,
    #[serde(default)]
    pub remaining: u32,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body returned by the draw call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub cards: Vec<CardPayload>,
    pub remaining: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl DrawResponse {
    pub fn first_card(&self) -> Option<&CardPayload> {
        self.cards.first()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardPayload {
    pub code: String,
    pub image: String,
    pub value: String,
    pub suit: String,
}
