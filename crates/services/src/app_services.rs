use std::path::PathBuf;
use std::sync::Arc;

use flash_core::BlindLadder;
use storage::json_decks::JsonDeckDirectory;
use storage::repository::{DeckSource, Storage};

use crate::Clock;
use crate::deck_service::DeckService;
use crate::error::AppServicesError;
use crate::sessions::GameLoopService;
use crate::stats_service::StatsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    deck_service: Arc<DeckService>,
    stats_service: Arc<StatsService>,
    game_loop: Arc<GameLoopService>,
}

impl AppServices {
    /// Build services with stats in `SQLite` and decks read from `decks_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        decks_dir: impl Into<PathBuf>,
        clock: Clock,
        ladder: BlindLadder,
    ) -> Result<Self, AppServicesError> {
        let decks: Arc<dyn DeckSource> = Arc::new(JsonDeckDirectory::new(decks_dir));
        let storage = Storage::sqlite(db_url, decks).await?;
        Ok(Self::from_storage(&storage, clock, ladder))
    }

    /// Build services over an already assembled storage.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, ladder: BlindLadder) -> Self {
        let deck_service = DeckService::new(Arc::clone(&storage.decks));
        let stats_service = StatsService::new(clock, Arc::clone(&storage.stats));
        let game_loop = GameLoopService::new(clock, deck_service.clone(), stats_service.clone())
            .with_ladder(ladder);

        Self {
            deck_service: Arc::new(deck_service),
            stats_service: Arc::new(stats_service),
            game_loop: Arc::new(game_loop),
        }
    }

    #[must_use]
    pub fn deck_service(&self) -> Arc<DeckService> {
        Arc::clone(&self.deck_service)
    }

    #[must_use]
    pub fn stats_service(&self) -> Arc<StatsService> {
        Arc::clone(&self.stats_service)
    }

    #[must_use]
    pub fn game_loop(&self) -> Arc<GameLoopService> {
        Arc::clone(&self.game_loop)
    }
}
