use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CardId, DeckId};

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// Card as declared in a deck file, before structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl CardDraft {
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: None,
            question: Some(question.into()),
            answer: Some(answer.into()),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate the draft as the card at `index` of `deck_id`.
    ///
    /// A missing or blank id is replaced by [`CardId::derived`].
    ///
    /// # Errors
    ///
    /// Returns `CardError` when the question or answer is missing or blank.
    pub fn validate(self, deck_id: &DeckId, index: usize) -> Result<Flashcard, CardError> {
        let question = non_blank(self.question).ok_or(CardError::MissingQuestion { index })?;
        let answer = non_blank(self.answer).ok_or(CardError::MissingAnswer { index })?;
        let id = match non_blank(self.id) {
            Some(explicit) => CardId::new(explicit),
            None => CardId::derived(deck_id, index),
        };

        Ok(Flashcard {
            id,
            question,
            answer,
            deck_id: deck_id.clone(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Immutable flashcard owned by a deck.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Flashcard {
    pub id: CardId,
    pub question: String,
    pub answer: String,
    pub deck_id: DeckId,
}

impl Flashcard {
    #[must_use]
    pub fn new(
        id: CardId,
        question: impl Into<String>,
        answer: impl Into<String>,
        deck_id: DeckId,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            answer: answer.into(),
            deck_id,
        }
    }
}

//
// ─── CARD VALIDATION ERRORS ────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("card {index} has no question")]
    MissingQuestion { index: usize },

    #[error("card {index} has no answer")]
    MissingAnswer { index: usize },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
