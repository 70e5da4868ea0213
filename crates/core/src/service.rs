use crate::{DeckResponse, DrawResponse, ServiceError};
use async_trait::async_trait;

/// Remote deck service seam.
///
/// Shuffling and card selection live entirely on the other side of this
/// trait; implementations only move requests and decode bodies.
#[async_trait]
pub trait DeckService: Send + Sync {
    /// Request a brand new, already shuffled deck.
    async fn new_shuffled_deck(&self) -> Result<DeckResponse, ServiceError>;

    /// Draw a single card from `deck_id`.
    ///
    /// A body reporting zero remaining cards must be returned as `Ok` so the
    /// caller can tell exhaustion apart from a transport failure.
    async fn draw(&self, deck_id: &str) -> Result<DrawResponse, ServiceError>;

    /// Reshuffle `deck_id` in place. The identifier stays the same.
    async fn reshuffle(&self, deck_id: &str) -> Result<DeckResponse, ServiceError>;
}
