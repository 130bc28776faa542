use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LadderError {
    #[error("blind ladder must contain at least one tier")]
    Empty,

    #[error("tier {name:?} must deal at least one card")]
    NoCards { name: String },

    #[error("tier {name:?} threshold must be within [0, 1], got {threshold}")]
    InvalidThreshold { name: String, threshold: f64 },

    #[error("tier {name:?} point multiplier must be positive, got {multiplier}")]
    InvalidMultiplier { name: String, multiplier: f64 },
}

//
// ─── TIER ──────────────────────────────────────────────────────────────────────
//

/// One stage of a blind round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlindTier {
    pub name: String,
    pub label: String,
    pub card_count: usize,
    /// Minimum share of correct answers needed to pass, inclusive.
    pub threshold: f64,
    pub point_multiplier: f64,
}

impl BlindTier {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        card_count: usize,
        threshold: f64,
        point_multiplier: f64,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            card_count,
            threshold,
            point_multiplier,
        }
    }

    /// `correct / dealt >= threshold`. A tier that dealt nothing cannot pass.
    #[must_use]
    pub fn is_passed(&self, correct: usize, dealt: usize) -> bool {
        if dealt == 0 {
            return false;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = correct as f64 / dealt as f64;
        fraction >= self.threshold
    }

    /// Points for `correct` answers: `round(correct * 100 * multiplier)`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn points_for(&self, correct: usize) -> u64 {
        (correct as f64 * 100.0 * self.point_multiplier)
            .round()
            .max(0.0) as u64
    }

    fn validate(&self) -> Result<(), LadderError> {
        if self.card_count == 0 {
            return Err(LadderError::NoCards {
                name: self.name.clone(),
            });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(LadderError::InvalidThreshold {
                name: self.name.clone(),
                threshold: self.threshold,
            });
        }
        if !self.point_multiplier.is_finite() || self.point_multiplier <= 0.0 {
            return Err(LadderError::InvalidMultiplier {
                name: self.name.clone(),
                multiplier: self.point_multiplier,
            });
        }
        Ok(())
    }
}

//
// ─── LADDER ────────────────────────────────────────────────────────────────────
//

/// Ordered, non-empty list of blind tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BlindLadder {
    tiers: Vec<BlindTier>,
}

impl BlindLadder {
    /// Build a ladder from custom tiers.
    ///
    /// # Errors
    ///
    /// Returns `LadderError` if `tiers` is empty or any tier is malformed.
    pub fn new(tiers: Vec<BlindTier>) -> Result<Self, LadderError> {
        if tiers.is_empty() {
            return Err(LadderError::Empty);
        }
        for tier in &tiers {
            tier.validate()?;
        }
        Ok(Self { tiers })
    }

    /// The shipped three-tier ladder: small, big and boss blind.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                BlindTier::new("small", "Small Blind", 5, 0.6, 1.0),
                BlindTier::new("big", "Big Blind", 8, 0.7, 1.5),
                BlindTier::new("boss", "Boss Blind", 10, 0.8, 2.0),
            ],
        }
    }

    #[must_use]
    pub fn tiers(&self) -> &[BlindTier] {
        &self.tiers
    }

    #[must_use]
    pub fn tier(&self, index: usize) -> Option<&BlindTier> {
        self.tiers.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// True when the ladder has no tiers, which `new` never allows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.tiers.len()
    }
}

impl Default for BlindLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'de> Deserialize<'de> for BlindLadder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tiers = Vec::<BlindTier>::deserialize(deserializer)?;
        Self::new(tiers).map_err(serde::de::Error::custom)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_ladder_escalates() {
        let ladder = BlindLadder::standard();
        assert_eq!(ladder.len(), 3);
        for pair in ladder.tiers().windows(2) {
            assert!(pair[0].card_count < pair[1].card_count);
            assert!(pair[0].threshold < pair[1].threshold);
            assert!(pair[0].point_multiplier < pair[1].point_multiplier);
        }
        assert!(!ladder.is_last(0));
        assert!(ladder.is_last(2));
    }

    #[test]
    fn pass_rule_is_boundary_inclusive() {
        let tier = BlindTier::new("t", "T", 10, 0.70, 1.0);
        assert!(tier.is_passed(7, 10));
        assert!(!tier.is_passed(6, 10));
        assert!(tier.is_passed(10, 10));
        assert!(!tier.is_passed(0, 0));
    }

    #[test]
    fn points_are_rounded() {
        let tier = BlindTier::new("t", "T", 10, 0.70, 1.0);
        assert_eq!(tier.points_for(7), 700);
        let boss = BlindTier::new("b", "B", 10, 0.8, 1.25);
        assert_eq!(boss.points_for(3), 375);
        assert_eq!(boss.points_for(0), 0);
    }

    #[test]
    fn empty_ladder_rejected() {
        assert_eq!(BlindLadder::new(Vec::new()).unwrap_err(), LadderError::Empty);
    }

    #[test]
    fn malformed_tiers_rejected() {
        let zero = BlindTier::new("z", "Z", 0, 0.5, 1.0);
        assert!(matches!(
            BlindLadder::new(vec![zero]),
            Err(LadderError::NoCards { .. })
        ));

        let threshold = BlindTier::new("t", "T", 3, 1.5, 1.0);
        assert!(matches!(
            BlindLadder::new(vec![threshold]),
            Err(LadderError::InvalidThreshold { .. })
        ));

        let multiplier = BlindTier::new("m", "M", 3, 0.5, 0.0);
        assert!(matches!(
            BlindLadder::new(vec![multiplier]),
            Err(LadderError::InvalidMultiplier { .. })
        ));
    }

    #[test]
    fn ladder_deserializes_with_validation() {
        let json = r#"[{"name":"only","label":"Only","cardCount":4,"threshold":0.5,"pointMultiplier":3}]"#;
        let ladder: BlindLadder = serde_json::from_str(json).unwrap();
        assert_eq!(ladder.len(), 1);
        assert_eq!(ladder.tier(0).unwrap().card_count, 4);

        assert!(serde_json::from_str::<BlindLadder>("[]").is_err());
    }
}
