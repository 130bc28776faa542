//! Review-interval and ease update rule.
//!
//! A simplified SM-2 style heuristic: the ease factor moves by fixed steps per
//! rating and the interval grows multiplicatively on success. The functions
//! here are pure; persisting the returned record is the caller's job.

use chrono::{DateTime, Duration, Utc};

use crate::model::{CardStats, MAX_EASE, MIN_EASE, MIN_INTERVAL_DAYS, Rating};

//
// ─── CONSTANTS ─────────────────────────────────────────────────────────────────
//

const AGAIN_EASE_PENALTY: f64 = 0.20;
const HARD_EASE_PENALTY: f64 = 0.15;
const EASY_EASE_BONUS: f64 = 0.15;

const HARD_INTERVAL_FACTOR: f64 = 1.2;
const EASY_INTERVAL_BONUS: f64 = 1.3;

const GOOD_SECOND_INTERVAL: u32 = 6;
const EASY_FIRST_INTERVAL: u32 = 4;

/// Upper bound on any interval, keeps `due` representable.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Apply one rating to a card's stats as of `now`.
///
/// `reviews` is incremented first and the interval branch reads the
/// incremented count: the first exposure of a card is `reviews == 1`, the
/// second `reviews == 2`.
///
/// Never fails; the result always has `ease` in `[1.3, 3.0]` and
/// `interval >= 1`.
///
/// # Examples
///
/// ```
/// # use flash_core::model::{CardId, CardStats, Rating};
/// # use flash_core::scheduler::apply_rating;
/// let now = flash_core::time::fixed_now();
/// let fresh = CardStats::unseen(CardId::new("net-0"), now);
///
/// let first = apply_rating(&fresh, Rating::Good, now);
/// assert_eq!(first.interval, 1);
/// let second = apply_rating(&first, Rating::Good, now);
/// assert_eq!(second.interval, 6);
/// ```
#[must_use]
pub fn apply_rating(stats: &CardStats, rating: Rating, now: DateTime<Utc>) -> CardStats {
    let current = stats.clone().normalized();
    let reviews = current.reviews.saturating_add(1);
    let mut lapses = current.lapses;

    let (ease, interval) = match rating {
        Rating::Again => {
            lapses = lapses.saturating_add(1);
            (current.ease - AGAIN_EASE_PENALTY, MIN_INTERVAL_DAYS)
        }
        Rating::Hard => (
            current.ease - HARD_EASE_PENALTY,
            scale(current.interval, HARD_INTERVAL_FACTOR),
        ),
        Rating::Good => {
            let interval = match reviews {
                0 | 1 => MIN_INTERVAL_DAYS,
                2 => GOOD_SECOND_INTERVAL,
                _ => scale(current.interval, current.ease),
            };
            (current.ease, interval)
        }
        Rating::Easy => {
            let ease = (current.ease + EASY_EASE_BONUS).min(MAX_EASE);
            let interval = if reviews <= 1 {
                EASY_FIRST_INTERVAL
            } else {
                scale(current.interval, ease * EASY_INTERVAL_BONUS)
            };
            (ease, interval)
        }
    };

    let interval = interval.clamp(MIN_INTERVAL_DAYS, MAX_INTERVAL_DAYS);

    CardStats {
        id: current.id,
        ease: ease.clamp(MIN_EASE, MAX_EASE),
        interval,
        due: due_after(now, interval),
        reviews,
        lapses,
        last_rating: Some(rating),
    }
}

/// `round(interval * factor)`, saturating at the interval cap.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale(interval: u32, factor: f64) -> u32 {
    let scaled = (f64::from(interval) * factor).round();
    if scaled >= f64::from(MAX_INTERVAL_DAYS) {
        MAX_INTERVAL_DAYS
    } else {
        (scaled.max(0.0) as u32).max(MIN_INTERVAL_DAYS)
    }
}

fn due_after(now: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
