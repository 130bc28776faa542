#![forbid(unsafe_code)]

pub mod blob;
pub mod json_decks;
pub mod repository;
pub mod sqlite;

pub use repository::{
    DeckSource, InMemoryDeckSource, InMemoryStatsStore, SourcedDeck, StatsStore, Storage,
    StorageError,
};
