use flash_core::ladder::BlindTier;
use flash_core::model::{Flashcard, SessionSummary};

use super::engine::{GameMode, GamePhase, GameSession, TierOutcome};
use super::progress::SessionProgress;

/// Tier data shown on the blind intro and during play.
#[derive(Debug, Clone, PartialEq)]
pub struct TierView {
    pub index: usize,
    pub of: usize,
    pub tier: BlindTier,
}

/// Read-only snapshot of a session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct GameView {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub error: Option<String>,
    pub card: Option<Flashcard>,
    pub progress: SessionProgress,
    pub tier: Option<TierView>,
    pub score: u64,
    pub last_tier: Option<TierOutcome>,
    pub ladder_cleared: bool,
    pub blinds_reached: usize,
    pub summary: SessionSummary,
}

impl GameView {
    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        let tier = session.current_tier().map(|tier| TierView {
            index: session.tier_index(),
            of: session.ladder().len(),
            tier: tier.clone(),
        });

        Self {
            mode: session.mode().clone(),
            phase: session.phase(),
            error: session.error().map(str::to_owned),
            card: session.current_card().cloned(),
            progress: session.progress(),
            tier,
            score: session.score(),
            last_tier: session.last_tier(),
            ladder_cleared: session.ladder_cleared(),
            blinds_reached: session.blinds_reached(),
            summary: session.summary(),
        }
    }

    #[must_use]
    pub fn is_blind(&self) -> bool {
        matches!(self.mode, GameMode::Random)
    }
}

impl From<&GameSession> for GameView {
    fn from(session: &GameSession) -> Self {
        Self::from_session(session)
    }
}
