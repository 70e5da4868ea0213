//! Deck session types. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod deck;
pub mod error;
pub mod events;
pub mod service;
pub mod state;
pub mod wire;

pub use cards::*;
pub use config::*;
pub use deck::*;
pub use error::*;
pub use events::*;
pub use service::*;
pub use state::*;
pub use wire::*;
