use crate::{Deck, DeckResponse, DrawResponse, DrawnCard, SessionError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionPhase {
    Unloaded,
    Idle,
    Drawing,
    Shuffling,
    Exhausted,
}

/// Everything a deck session knows locally.
///
/// Transitions are plain synchronous methods so the controller can apply them
/// under its lock between remote calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub deck: Option<Deck>,
    pub drawn: Vec<DrawnCard>,
    pub drawing: bool,
    pub shuffling: bool,
    #[serde(default)]
    pub exhausted: bool,
    /// Bumped whenever auto-draw starts or is forced off. A timer tick only
    /// acts while the run it was spawned for is still current.
    #[serde(default)]
    pub draw_run: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub deck: Option<Deck>,
    pub drawn: Vec<DrawnCard>,
    pub drawing: bool,
    pub shuffling: bool,
    pub exhausted: bool,
}

impl SessionSnapshot {
    pub fn is_ready(&self) -> bool {
        self.deck.is_some()
    }

    pub fn deck_id(&self) -> Option<&str> {
        self.deck.as_ref().map(|deck| deck.id.as_str())
    }

    /// Draw and shuffle controls are disabled while unloaded or shuffling.
    pub fn controls_enabled(&self) -> bool {
        self.is_ready() && !self.shuffling
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.deck.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.deck.is_none() {
            SessionPhase::Unloaded
        } else if self.shuffling {
            SessionPhase::Shuffling
        } else if self.drawing {
            SessionPhase::Drawing
        } else if self.exhausted {
            SessionPhase::Exhausted
        } else {
            SessionPhase::Idle
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            deck: self.deck.clone(),
            drawn: self.drawn.clone(),
            drawing: self.drawing,
            shuffling: self.shuffling,
            exhausted: self.exhausted,
        }
    }

    pub fn load(&mut self, deck: Deck) {
        self.deck = Some(deck);
        self.drawn.clear();
        self.stop_drawing();
        self.shuffling = false;
        self.exhausted = false;
    }

    pub fn deck_id(&self) -> Result<String, SessionError> {
        self.deck
            .as_ref()
            .map(|deck| deck.id.clone())
            .ok_or(SessionError::NotReady)
    }

    /// Deck id to draw from, refusing while a shuffle holds the busy flag.
    pub fn begin_draw(&self) -> Result<String, SessionError> {
        let id = self.deck_id()?;
        if self.shuffling {
            return Err(SessionError::ShuffleInProgress);
        }
        Ok(id)
    }

    /// Fold a draw response in. A zero remaining count means the deck is
    /// spent and nothing is appended.
    pub fn apply_draw(&mut self, response: &DrawResponse) -> Result<DrawnCard, SessionError> {
        if let Some(deck) = self.deck.as_mut() {
            deck.set_remaining(response.remaining);
        }
        if response.remaining == 0 {
            self.exhausted = true;
            return Err(SessionError::Exhausted);
        }
        let payload = response
            .first_card()
            .ok_or(SessionError::MalformedResponse)?;
        let card = DrawnCard::from_payload(payload);
        self.drawn.push(card.clone());
        Ok(card)
    }

    /// Take the busy flag. Active drawing is forced off in the same step.
    pub fn begin_shuffle(&mut self) -> Result<String, SessionError> {
        let id = self.deck_id()?;
        if self.shuffling {
            return Err(SessionError::ShuffleInProgress);
        }
        self.shuffling = true;
        self.stop_drawing();
        Ok(id)
    }

    pub fn complete_shuffle(&mut self, response: &DeckResponse) {
        self.drawn.clear();
        self.exhausted = false;
        if let Some(deck) = self.deck.as_mut() {
            deck.refresh(response);
        }
    }

    /// Release the busy flag. Runs on every shuffle exit path.
    pub fn release_shuffle(&mut self) {
        self.shuffling = false;
        self.drawing = false;
    }

    /// Turn auto-draw on and return the id of the new run.
    pub fn start_drawing(&mut self) -> Result<u64, SessionError> {
        self.deck_id()?;
        if self.shuffling {
            return Err(SessionError::ShuffleInProgress);
        }
        self.drawing = true;
        self.draw_run += 1;
        Ok(self.draw_run)
    }

    /// Force auto-draw off and retire the current run. Returns whether the
    /// flag was set.
    pub fn stop_drawing(&mut self) -> bool {
        self.draw_run += 1;
        std::mem::replace(&mut self.drawing, false)
    }

    pub fn is_current_run(&self, run: u64) -> bool {
        self.drawing && self.draw_run == run
    }

    /// Stop auto-draw from inside run `run`. A retired run leaves the flag
    /// alone.
    pub fn end_run(&mut self, run: u64) -> bool {
        if !self.is_current_run(run) {
            return false;
        }
        self.stop_drawing()
    }
}
