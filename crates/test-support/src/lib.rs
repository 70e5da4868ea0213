//! Shared fakes for deckdraw tests.

mod logging;
mod observer;
mod service;

pub use logging::init_logging;
pub use observer::RecordingObserver;
pub use service::{
    card_payload, deck_body, draw_body, CallCounts, ScriptedDeckService, CARD_CODES,
};
