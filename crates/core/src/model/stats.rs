use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::CardId;
use crate::model::review::Rating;

/// Lowest ease factor a card can reach.
pub const MIN_EASE: f64 = 1.3;
/// Highest ease factor a card can reach.
pub const MAX_EASE: f64 = 3.0;
/// Ease factor of a card that has never been rated.
pub const DEFAULT_EASE: f64 = 2.5;
/// Shortest interval, in whole days.
pub const MIN_INTERVAL_DAYS: u32 = 1;

/// Memory-strength record of one card, keyed by card id in the stats store.
///
/// Serialized in camelCase with `due` as epoch milliseconds so that the stats
/// blob stays a flat `{ id: record }` JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStats {
    pub id: CardId,
    pub ease: f64,
    /// Days until the next review.
    pub interval: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub due: DateTime<Utc>,
    pub reviews: u32,
    pub lapses: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rating: Option<Rating>,
}

impl CardStats {
    /// Stats of a card that has never been rated: due immediately.
    #[must_use]
    pub fn unseen(id: CardId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            ease: DEFAULT_EASE,
            interval: MIN_INTERVAL_DAYS,
            due: now,
            reviews: 0,
            lapses: 0,
            last_rating: None,
        }
    }

    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }

    /// Ease clamped into `[MIN_EASE, MAX_EASE]`; a non-finite ease reads as the default.
    #[must_use]
    pub fn effective_ease(&self) -> f64 {
        if self.ease.is_finite() {
            self.ease.clamp(MIN_EASE, MAX_EASE)
        } else {
            DEFAULT_EASE
        }
    }

    /// Clamp ease and interval back into range.
    ///
    /// Records coming from outside the scheduler (imports, hand edits) may
    /// violate the bounds.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.ease = self.effective_ease();
        self.interval = self.interval.max(MIN_INTERVAL_DAYS);
        self
    }
}

/// All known stats, as returned by a store's `load_all`.
pub type StatsMap = HashMap<CardId, CardStats>;

/// Stored stats for `id`, or the unseen defaults when the card was never rated.
#[must_use]
pub fn stats_or_unseen(stats: &StatsMap, id: &CardId, now: DateTime<Utc>) -> CardStats {
    stats
        .get(id)
        .cloned()
        .unwrap_or_else(|| CardStats::unseen(id.clone(), now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn unseen_defaults() {
        let stats = CardStats::unseen(CardId::new("c"), fixed_now());
        assert_eq!(stats.ease, DEFAULT_EASE);
        assert_eq!(stats.interval, 1);
        assert_eq!(stats.reviews, 0);
        assert_eq!(stats.lapses, 0);
        assert!(stats.is_due(fixed_now()));
    }

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let mut stats = CardStats::unseen(CardId::new("c"), fixed_now());
        stats.ease = 9.0;
        stats.interval = 0;
        let fixed = stats.normalized();
        assert_eq!(fixed.ease, MAX_EASE);
        assert_eq!(fixed.interval, 1);

        let mut nan = CardStats::unseen(CardId::new("c"), fixed_now());
        nan.ease = f64::NAN;
        assert_eq!(nan.normalized().ease, DEFAULT_EASE);
    }

    #[test]
    fn serializes_camel_case_with_millisecond_due() {
        let mut stats = CardStats::unseen(CardId::new("net-0"), fixed_now());
        stats.last_rating = Some(Rating::Good);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["id"], "net-0");
        assert_eq!(value["due"], 1_700_000_000_000_i64);
        assert_eq!(value["lastRating"], 3);

        let back: CardStats = serde_json::from_value(value).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn last_rating_is_optional_on_read() {
        let json = r#"{"id":"a","ease":2.5,"interval":1,"due":0,"reviews":0,"lapses":0}"#;
        let stats: CardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.last_rating, None);
    }

    #[test]
    fn missing_stats_fall_back_to_unseen() {
        let map = StatsMap::new();
        let stats = stats_or_unseen(&map, &CardId::new("x"), fixed_now());
        assert_eq!(stats.reviews, 0);
        assert_eq!(stats.due, fixed_now());
    }
}
