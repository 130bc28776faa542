use std::collections::HashSet;
use std::sync::Arc;

use flash_core::model::{Deck, DeckId, Flashcard};
use storage::repository::{DeckSource, SourcedDeck};

use crate::error::DeckServiceError;

/// A deck that was dropped while loading a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDeck {
    pub path: String,
    pub reason: String,
}

/// Outcome of loading a scope: valid decks plus the ones that were dropped.
#[derive(Debug, Clone, Default)]
pub struct DeckLoadReport {
    pub decks: Vec<Deck>,
    pub rejected: Vec<RejectedDeck>,
}

impl DeckLoadReport {
    fn reject(&mut self, path: String, reason: String) {
        tracing::warn!(path = %path, reason = %reason, "dropping deck");
        self.rejected.push(RejectedDeck { path, reason });
    }
}

/// Loads and validates decks from a deck source.
#[derive(Clone)]
pub struct DeckService {
    decks: Arc<dyn DeckSource>,
}

impl DeckService {
    #[must_use]
    pub fn new(decks: Arc<dyn DeckSource>) -> Self {
        Self { decks }
    }

    /// Load every deck under `scope`.
    ///
    /// Broken decks do not fail the call: unreadable files, validation
    /// failures and duplicate deck ids end up in `rejected`.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::Storage` if the source itself is unavailable.
    pub async fn load_scope(&self, scope: &str) -> Result<DeckLoadReport, DeckServiceError> {
        let sourced = self.decks.load_decks(scope).await?;
        let mut report = DeckLoadReport::default();
        let mut seen: HashSet<DeckId> = HashSet::new();

        for entry in sourced {
            let draft = match entry {
                SourcedDeck::Parsed(draft) => draft,
                SourcedDeck::Unreadable { path, reason } => {
                    report.reject(path, reason);
                    continue;
                }
            };

            let path = draft.path.clone();
            match draft.validate() {
                Ok(deck) if !seen.insert(deck.id().clone()) => {
                    report.reject(path, format!("duplicate deck id {}", deck.id()));
                }
                Ok(deck) => report.decks.push(deck),
                Err(e) => report.reject(path, e.to_string()),
            }
        }

        tracing::debug!(
            scope,
            loaded = report.decks.len(),
            rejected = report.rejected.len(),
            "loaded deck scope"
        );
        Ok(report)
    }

    /// Find one deck by id.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::DeckNotFound` if no valid deck in `scope`
    /// has that id, or `DeckServiceError::Storage` on source failure.
    pub async fn find_deck(&self, scope: &str, deck_id: &DeckId) -> Result<Deck, DeckServiceError> {
        self.load_scope(scope)
            .await?
            .decks
            .into_iter()
            .find(|deck| deck.id() == deck_id)
            .ok_or_else(|| DeckServiceError::DeckNotFound(deck_id.clone()))
    }

    /// Every card of every valid deck in `scope`, in deck order.
    ///
    /// A card id that appears in more than one deck is kept once, from the
    /// first deck that has it, since stats are keyed by card id.
    ///
    /// # Errors
    ///
    /// Returns `DeckServiceError::NoCards` if the scope yields no cards, or
    /// `DeckServiceError::Storage` on source failure.
    pub async fn all_cards(&self, scope: &str) -> Result<Vec<Flashcard>, DeckServiceError> {
        let report = self.load_scope(scope).await?;
        let mut seen = HashSet::new();
        let mut cards = Vec::new();
        for card in report.decks.into_iter().flat_map(Deck::into_cards) {
            if seen.insert(card.id.clone()) {
                cards.push(card);
            } else {
                tracing::warn!(card_id = %card.id, deck_id = %card.deck_id, "skipping duplicate card id");
            }
        }

        if cards.is_empty() {
            return Err(DeckServiceError::NoCards {
                scope: scope.to_owned(),
            });
        }
        Ok(cards)
    }
}
