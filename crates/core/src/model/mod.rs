mod card;
mod deck;
mod ids;
mod review;
mod stats;
mod summary;

pub use ids::{CardId, DeckId, ParseIdError};

pub use card::{CardDraft, CardError, Flashcard};
pub use deck::{Deck, DeckDraft, DeckError};
pub use review::{Rating, RatingError, SessionResult};
pub use stats::{
    CardStats, DEFAULT_EASE, MAX_EASE, MIN_EASE, MIN_INTERVAL_DAYS, StatsMap, stats_or_unseen,
};
pub use summary::SessionSummary;
