use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::card::{CardDraft, CardError, Flashcard};
use crate::model::ids::{CardId, DeckId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("deck has no id and none can be derived from path {path:?}")]
    MissingId { path: String },

    #[error("deck title cannot be empty")]
    EmptyTitle,

    #[error("deck has no cards")]
    NoCards,

    #[error("card id {id} appears more than once in the deck")]
    DuplicateCardId { id: CardId },

    #[error(transparent)]
    Card(#[from] CardError),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Deck definition as handed over by a deck source.
///
/// `path` is filled in by the source (it is the location the deck was read
/// from) and doubles as the fallback for a missing id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub cards: Vec<CardDraft>,
    #[serde(default)]
    pub path: String,
}

impl DeckDraft {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            unit: None,
            cards: Vec::new(),
            path: path.into(),
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_card(mut self, card: CardDraft) -> Self {
        self.cards.push(card);
        self
    }

    /// Structurally validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first `DeckError` found: missing id, blank title, empty
    /// card list, a card without question/answer, or two cards sharing an id
    /// (explicit or derived).
    pub fn validate(self) -> Result<Deck, DeckError> {
        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => DeckId::new(id.trim()),
            None => id_from_path(&self.path).ok_or_else(|| DeckError::MissingId {
                path: self.path.clone(),
            })?,
        };

        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(DeckError::EmptyTitle)?;

        if self.cards.is_empty() {
            return Err(DeckError::NoCards);
        }

        let cards = self
            .cards
            .into_iter()
            .enumerate()
            .map(|(index, card)| card.validate(&id, index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(cards.len());
        if let Some(dup) = cards.iter().find(|card| !seen.insert(&card.id)) {
            return Err(DeckError::DuplicateCardId { id: dup.id.clone() });
        }

        Ok(Deck {
            id,
            title,
            unit: self.unit.filter(|u| !u.trim().is_empty()),
            cards,
            path: self.path,
        })
    }
}

fn id_from_path(path: &str) -> Option<DeckId> {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty())
        .map(DeckId::new)
}

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// A validated, read-only deck of flashcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    id: DeckId,
    title: String,
    unit: Option<String>,
    cards: Vec<Flashcard>,
    path: String,
}

impl Deck {
    #[must_use]
    pub fn id(&self) -> &DeckId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn into_cards(self) -> Vec<Flashcard> {
        self.cards
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
