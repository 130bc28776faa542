use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use flash_core::model::{CardStats, Flashcard, StatsMap, stats_or_unseen};

/// Extra weight per recorded lapse.
pub const LAPSE_WEIGHT: f64 = 0.4;
/// Multiplier for cards whose due time has passed.
pub const OVERDUE_BOOST: f64 = 1.5;

/// Sampling weight of a card: harder, lapse-prone and overdue cards weigh more.
#[must_use]
pub fn selection_weight(stats: &CardStats, now: DateTime<Utc>) -> f64 {
    let overdue = if stats.is_due(now) { OVERDUE_BOOST } else { 1.0 };
    (1.0 / stats.effective_ease()) * (1.0 + f64::from(stats.lapses) * LAPSE_WEIGHT) * overdue
}

/// Pick `count` distinct cards from `pool`, biased by [`selection_weight`].
///
/// When the pool holds no more than `count` cards every card is returned in
/// shuffled order. Otherwise cards are drawn one at a time without
/// replacement: a uniform draw in `[0, remaining weight)` is walked against
/// the running sum of the remaining weights. Cards without stats use the
/// unseen defaults and therefore count as overdue.
pub fn weighted_select<R: Rng + ?Sized>(
    pool: &[Flashcard],
    stats: &StatsMap,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Flashcard> {
    if pool.len() <= count {
        let mut all = pool.to_vec();
        all.shuffle(rng);
        return all;
    }

    let mut remaining: Vec<(&Flashcard, f64)> = pool
        .iter()
        .map(|card| {
            let weight = selection_weight(&stats_or_unseen(stats, &card.id, now), now);
            (card, weight)
        })
        .collect();
    let mut total: f64 = remaining.iter().map(|(_, w)| w).sum();

    let mut chosen = Vec::with_capacity(count);
    while chosen.len() < count && !remaining.is_empty() {
        let index = draw_index(&remaining, total, rng);
        let (card, weight) = remaining.remove(index);
        total -= weight;
        chosen.push(card.clone());
    }
    chosen
}

fn draw_index<R: Rng + ?Sized>(remaining: &[(&Flashcard, f64)], total: f64, rng: &mut R) -> usize {
    let last = remaining.len() - 1;
    if total <= 0.0 || !total.is_finite() {
        return rng.random_range(0..remaining.len());
    }

    let mut target = rng.random_range(0.0..total);
    for (index, (_, weight)) in remaining.iter().enumerate() {
        if target < *weight {
            return index;
        }
        target -= weight;
    }
    // Float drift after many subtractions can leave the draw past the end.
    last
}

/// Order a deck for a unit playthrough.
///
/// Cards with stats come first: overdue ones (treated as due at time zero),
/// then by due time, ties broken by lower ease. Cards with no stats go last,
/// keeping their original relative order.
#[must_use]
pub fn sort_for_unit_mode(
    mut cards: Vec<Flashcard>,
    stats: &StatsMap,
    now: DateTime<Utc>,
) -> Vec<Flashcard> {
    cards.sort_by(|a, b| match (stats.get(&a.id), stats.get(&b.id)) {
        (Some(sa), Some(sb)) => effective_due(sa, now)
            .cmp(&effective_due(sb, now))
            .then_with(|| sa.ease.total_cmp(&sb.ease)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    cards
}

/// `None` (sorts first) for overdue cards, otherwise the due time.
fn effective_due(stats: &CardStats, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if stats.is_due(now) {
        None
    } else {
        Some(stats.due)
    }
}
