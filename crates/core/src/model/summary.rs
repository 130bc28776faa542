use serde::Serialize;

use crate::model::review::{Rating, SessionResult};

/// Aggregate of the ratings collected in a session or round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    again: u32,
    hard: u32,
    good: u32,
    easy: u32,
}

impl SessionSummary {
    /// Build a summary from the results recorded so far.
    #[must_use]
    pub fn from_results(results: &[SessionResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result.rating);
        }
        summary
    }

    fn record(&mut self, rating: Rating) {
        let slot = match rating {
            Rating::Again => &mut self.again,
            Rating::Hard => &mut self.hard,
            Rating::Good => &mut self.good,
            Rating::Easy => &mut self.easy,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn count(&self, rating: Rating) -> u32 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.again + self.hard + self.good + self.easy
    }

    /// Ratings of good or easy.
    #[must_use]
    pub fn correct(&self) -> u32 {
        self.good + self.easy
    }

    /// Share of correct answers as a rounded percentage; 0 for an empty session.
    #[must_use]
    pub fn pct(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let pct = (100.0 * f64::from(self.correct()) / f64::from(total)).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = pct as u32;
        pct
    }
}
