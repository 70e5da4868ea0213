//! Deck session controller, its auto-draw timer, and the HTTP deck client.

mod remote;
mod session;
mod timer;

pub use remote::HttpDeckService;
pub use session::DeckSession;
pub use timer::PeriodicTask;
