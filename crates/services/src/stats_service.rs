use std::sync::Arc;

use chrono::{DateTime, Utc};

use flash_core::Clock;
use flash_core::model::{CardStats, Deck, Flashcard, StatsMap};
use storage::blob;
use storage::repository::{StatsStore, StorageError};

use crate::error::StatsServiceError;

/// Review state of one deck at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckOverview {
    pub total: usize,
    /// Cards that were never rated.
    pub unseen: usize,
    /// Rated cards whose due time has passed.
    pub due: usize,
    /// Rated cards due later.
    pub scheduled: usize,
    /// Earliest due time among scheduled cards.
    pub next_due: Option<DateTime<Utc>>,
}

/// Count unseen, due and scheduled cards.
#[must_use]
pub fn overview_of(cards: &[Flashcard], stats: &StatsMap, now: DateTime<Utc>) -> DeckOverview {
    let mut overview = DeckOverview {
        total: cards.len(),
        unseen: 0,
        due: 0,
        scheduled: 0,
        next_due: None,
    };
    for card in cards {
        match stats.get(&card.id) {
            None => overview.unseen += 1,
            Some(s) if s.is_due(now) => overview.due += 1,
            Some(s) => {
                overview.scheduled += 1;
                overview.next_due = Some(overview.next_due.map_or(s.due, |d| d.min(s.due)));
            }
        }
    }
    overview
}

/// Reads and writes card stats for sessions.
///
/// Session-facing calls never fail: a store error is logged and the session
/// carries on with what it has in memory.
#[derive(Clone)]
pub struct StatsService {
    clock: Clock,
    stats: Arc<dyn StatsStore>,
}

impl StatsService {
    #[must_use]
    pub fn new(clock: Clock, stats: Arc<dyn StatsStore>) -> Self {
        Self { clock, stats }
    }

    /// All stored stats, or an empty map if the store cannot be read.
    pub async fn snapshot(&self) -> StatsMap {
        match self.stats.load_all().await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load card stats, starting from defaults");
                StatsMap::new()
            }
        }
    }

    /// Persist one updated record. Returns `false` if the write was lost.
    pub async fn record(&self, stats: &CardStats) -> bool {
        match self.stats.save_one(stats).await {
            Ok(()) => {
                tracing::debug!(
                    card_id = %stats.id,
                    interval = stats.interval,
                    ease = stats.ease,
                    "stored card stats"
                );
                true
            }
            Err(e) => {
                tracing::warn!(card_id = %stats.id, error = %e, "failed to store card stats");
                false
            }
        }
    }

    /// Store an externally produced id → stats map in one batch.
    ///
    /// Records are clamped back into range first. Returns the number stored.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if the batch write fails.
    pub async fn import(&self, stats: StatsMap) -> Result<usize, StatsServiceError> {
        let mut records: Vec<CardStats> = stats
            .into_iter()
            .map(|(id, record)| CardStats { id, ..record }.normalized())
            .collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));

        self.stats.save_batch(&records).await?;
        tracing::info!(count = records.len(), "imported card stats");
        Ok(records.len())
    }

    /// Parse a stats blob and import it.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::InvalidImport` if `raw` is not a valid
    /// blob, or `StatsServiceError::Storage` if the write fails.
    pub async fn import_json(&self, raw: &str) -> Result<usize, StatsServiceError> {
        let stats = blob::decode(raw).map_err(|e| match e {
            StorageError::Serialization(msg) => StatsServiceError::InvalidImport(msg),
            other => StatsServiceError::Storage(other),
        })?;
        self.import(stats).await
    }

    /// Overview of `deck` as of now.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if stats cannot be loaded.
    pub async fn deck_overview(&self, deck: &Deck) -> Result<DeckOverview, StatsServiceError> {
        let stats = self.stats.load_all().await?;
        Ok(overview_of(deck.cards(), &stats, self.clock.now()))
    }
}
