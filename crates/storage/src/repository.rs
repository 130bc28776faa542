use async_trait::async_trait;
use flash_core::model::{CardStats, DeckDraft, StatsMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::blob;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── STATS STORE ───────────────────────────────────────────────────────────────
//

/// Persistence of per-card memory stats.
///
/// Implementations keep one flat id → stats mapping with last-write-wins
/// semantics; nothing is ever deleted through this trait.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Read every stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read or decoded.
    async fn load_all(&self) -> Result<StatsMap, StorageError>;

    /// Store or replace a single record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; the record is then not stored.
    async fn save_one(&self, stats: &CardStats) -> Result<(), StorageError>;

    /// Store or replace several records in one write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; none of the records are stored.
    async fn save_batch(&self, stats: &[CardStats]) -> Result<(), StorageError>;
}

/// In-memory stats store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStatsStore {
    stats: Arc<Mutex<StatsMap>>,
}

impl InMemoryStatsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    #[must_use]
    pub fn with_stats(stats: StatsMap) -> Self {
        Self {
            stats: Arc::new(Mutex::new(stats)),
        }
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn load_all(&self) -> Result<StatsMap, StorageError> {
        let guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_one(&self, stats: &CardStats) -> Result<(), StorageError> {
        self.save_batch(std::slice::from_ref(stats)).await
    }

    async fn save_batch(&self, stats: &[CardStats]) -> Result<(), StorageError> {
        let mut guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        blob::merge(&mut guard, stats);
        Ok(())
    }
}

//
// ─── DECK SOURCE ───────────────────────────────────────────────────────────────
//

/// A deck as produced by a source: either a parsed draft awaiting
/// validation, or a location that could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcedDeck {
    Parsed(DeckDraft),
    Unreadable { path: String, reason: String },
}

/// Supplier of deck definitions for a scope (a folder-like path prefix).
#[async_trait]
pub trait DeckSource: Send + Sync {
    /// List the decks under `scope`. An empty scope means every deck.
    ///
    /// A single broken deck is reported as `SourcedDeck::Unreadable` rather
    /// than failing the whole call.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the source as a whole is unavailable.
    async fn load_decks(&self, scope: &str) -> Result<Vec<SourcedDeck>, StorageError>;
}

/// True when `path` lies at or below `scope`. Paths use `/` separators.
#[must_use]
pub fn in_scope(path: &str, scope: &str) -> bool {
    let scope = scope.trim_matches('/');
    if scope.is_empty() {
        return true;
    }
    let path = path.trim_start_matches('/');
    path == scope
        || path
            .strip_prefix(scope)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// In-memory deck source for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryDeckSource {
    decks: Arc<Mutex<Vec<SourcedDeck>>>,
}

impl InMemoryDeckSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deck draft. Fails only if the internal lock is poisoned.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` on a poisoned lock.
    pub fn add_deck(&self, deck: DeckDraft) -> Result<(), StorageError> {
        self.push(SourcedDeck::Parsed(deck))
    }

    /// Register a location that cannot be read, to exercise partial failures.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` on a poisoned lock.
    pub fn add_unreadable(
        &self,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), StorageError> {
        self.push(SourcedDeck::Unreadable {
            path: path.into(),
            reason: reason.into(),
        })
    }

    fn push(&self, deck: SourcedDeck) -> Result<(), StorageError> {
        let mut guard = self
            .decks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(deck);
        Ok(())
    }
}

#[async_trait]
impl DeckSource for InMemoryDeckSource {
    async fn load_decks(&self, scope: &str) -> Result<Vec<SourcedDeck>, StorageError> {
        let guard = self
            .decks
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|deck| match deck {
                SourcedDeck::Parsed(draft) => in_scope(&draft.path, scope),
                SourcedDeck::Unreadable { path, .. } => in_scope(path, scope),
            })
            .cloned()
            .collect())
    }
}

//
// ─── STORAGE ───────────────────────────────────────────────────────────────────
//

/// Aggregates the stats store and deck source behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn StatsStore>,
    pub decks: Arc<dyn DeckSource>,
}
