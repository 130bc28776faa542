use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur when interpreting a rating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating must be between 1 and 4, got {0}")]
    OutOfRange(u8),
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// Four-level self assessment given after revealing a card's answer.
///
/// Persisted and exchanged as the integers 1 (again) through 4 (easy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    /// Forgotten. Counts as a lapse.
    Again,
    /// Recalled with significant difficulty.
    Hard,
    /// Recalled correctly.
    Good,
    /// Recalled instantly.
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Converts a numeric rating (1-4) to a `Rating`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::OutOfRange` for any other value.
    pub fn from_u8(value: u8) -> Result<Self, RatingError> {
        match value {
            1 => Ok(Self::Again),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            _ => Err(RatingError::OutOfRange(value)),
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Rating::Again => 1,
            Rating::Hard => 2,
            Rating::Good => 3,
            Rating::Easy => 4,
        }
    }

    /// Good and easy count as a correct answer for scoring.
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Rating::Good | Rating::Easy)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

//
// ─── SESSION RESULT ───────────────────────────────────────────────────────────
//

/// One answered card inside the current session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub card_id: CardId,
    pub rating: Rating,
}

impl SessionResult {
    #[must_use]
    pub fn new(card_id: CardId, rating: Rating) -> Self {
        Self { card_id, rating }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
