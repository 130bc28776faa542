//! Shared error types for the services crate.

use thiserror::Error;

use flash_core::model::DeckId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::sessions::GamePhase;

/// Errors emitted by the session state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GameError {
    #[error("event {event:?} is not valid in phase {phase}")]
    InvalidEvent {
        phase: GamePhase,
        event: &'static str,
    },
}

/// Errors emitted by `DeckService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeckServiceError {
    #[error("deck {0} not found in scope")]
    DeckNotFound(DeckId),
    #[error("no cards found in scope {scope:?}")]
    NoCards { scope: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error("stats import is not valid JSON: {0}")]
    InvalidImport(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
