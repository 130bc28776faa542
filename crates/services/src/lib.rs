#![forbid(unsafe_code)]

pub mod app_services;
pub mod deck_service;
pub mod error;
pub mod sessions;
pub mod stats_service;

pub use flash_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use deck_service::{DeckLoadReport, DeckService, RejectedDeck};
pub use error::{AppServicesError, DeckServiceError, GameError, StatsServiceError};
pub use stats_service::{DeckOverview, StatsService, overview_of};

pub use sessions::{
    AnswerResult, GameEvent, GameLoopService, GameMode, GamePhase, GameSession, GameView,
    SessionProgress, TierOutcome,
};
