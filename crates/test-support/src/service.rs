use async_trait::async_trait;
use deckdraw_core::{CardPayload, DeckResponse, DeckService, DrawResponse, ServiceError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

pub const CARD_CODES: [&str; 52] = [
    "AS", "2S", "3S", "4S", "5S", "6S", "7S", "8S", "9S", "0S", "JS", "QS", "KS", "AH", "2H",
    "3H", "4H", "5H", "6H", "7H", "8H", "9H", "0H", "JH", "QH", "KH", "AC", "2C", "3C", "4C",
    "5C", "6C", "7C", "8C", "9C", "0C", "JC", "QC", "KC", "AD", "2D", "3D", "4D", "5D", "6D",
    "7D", "8D", "9D", "0D", "JD", "QD", "KD",
];

pub fn card_payload(code: &str) -> CardPayload {
    let mut chars = code.chars();
    let value = match chars.next() {
        Some('A') => "ACE".to_string(),
        Some('K') => "KING".to_string(),
        Some('Q') => "QUEEN".to_string(),
        Some('J') => "JACK".to_string(),
        Some('0') => "10".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let suit = match chars.next() {
        Some('S') => "SPADES",
        Some('H') => "HEARTS",
        Some('C') => "CLUBS",
        Some('D') => "DIAMONDS",
        _ => "",
    };
    CardPayload {
        code: code.to_string(),
        image: format!("https://deckofcardsapi.com/static/img/{code}.png"),
        value,
        suit: suit.to_string(),
    }
}

pub fn deck_body(deck_id: &str, remaining: u32) -> DeckResponse {
    DeckResponse {
        success: true,
        deck_id: deck_id.to_string(),
        shuffled: true,
        remaining,
        error: None,
    }
}

pub fn draw_body(deck_id: &str, card: Option<CardPayload>, remaining: u32) -> DrawResponse {
    DrawResponse {
        success: card.is_some(),
        deck_id: deck_id.to_string(),
        cards: card.into_iter().collect(),
        remaining,
        error: None,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub new_deck: usize,
    pub draw: usize,
    pub reshuffle: usize,
}

#[derive(Debug)]
struct Script {
    new_deck: VecDeque<Result<DeckResponse, ServiceError>>,
    draws: VecDeque<Result<DrawResponse, ServiceError>>,
    reshuffles: VecDeque<Result<DeckResponse, ServiceError>>,
    remaining: u32,
    dealt: usize,
    calls: CallCounts,
}

/// In-memory deck service. Scripted responses are served first; once a
/// queue is empty it deals through a standard 52-card order.
#[derive(Debug)]
pub struct ScriptedDeckService {
    deck_id: String,
    latency: Duration,
    script: Mutex<Script>,
}

impl ScriptedDeckService {
    pub fn new(deck_id: &str) -> Self {
        Self {
            deck_id: deck_id.to_string(),
            latency: Duration::ZERO,
            script: Mutex::new(Script {
                new_deck: VecDeque::new(),
                draws: VecDeque::new(),
                reshuffles: VecDeque::new(),
                remaining: 52,
                dealt: 0,
                calls: CallCounts::default(),
            }),
        }
    }

    /// Every call sleeps this long on the tokio clock before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_remaining(self, remaining: u32) -> Self {
        self.script.lock().remaining = remaining;
        self
    }

    pub fn push_new_deck(&self, result: Result<DeckResponse, ServiceError>) {
        self.script.lock().new_deck.push_back(result);
    }

    pub fn push_draw(&self, result: Result<DrawResponse, ServiceError>) {
        self.script.lock().draws.push_back(result);
    }

    pub fn push_reshuffle(&self, result: Result<DeckResponse, ServiceError>) {
        self.script.lock().reshuffles.push_back(result);
    }

    pub fn calls(&self) -> CallCounts {
        self.script.lock().calls
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DeckService for ScriptedDeckService {
    async fn new_shuffled_deck(&self) -> Result<DeckResponse, ServiceError> {
        self.script.lock().calls.new_deck += 1;
        self.wait().await;
        let mut script = self.script.lock();
        match script.new_deck.pop_front() {
            Some(result) => result,
            None => Ok(deck_body(&self.deck_id, script.remaining)),
        }
    }

    async fn draw(&self, deck_id: &str) -> Result<DrawResponse, ServiceError> {
        self.script.lock().calls.draw += 1;
        self.wait().await;
        let mut script = self.script.lock();
        if let Some(result) = script.draws.pop_front() {
            return result;
        }
        if script.remaining == 0 {
            return Ok(draw_body(deck_id, None, 0));
        }
        script.remaining -= 1;
        let code = CARD_CODES[script.dealt % CARD_CODES.len()];
        script.dealt += 1;
        Ok(draw_body(deck_id, Some(card_payload(code)), script.remaining))
    }

    async fn reshuffle(&self, deck_id: &str) -> Result<DeckResponse, ServiceError> {
        self.script.lock().calls.reshuffle += 1;
        self.wait().await;
        let mut script = self.script.lock();
        if let Some(result) = script.reshuffles.pop_front() {
            return result;
        }
        script.remaining = 52;
        script.dealt = 0;
        Ok(deck_body(deck_id, 52))
    }
}
