use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;

use flash_core::BlindLadder;
use flash_core::ladder::BlindTier;
use flash_core::model::{
    CardStats, DeckId, Flashcard, Rating, SessionResult, SessionSummary, StatsMap,
    stats_or_unseen,
};
use flash_core::scheduler::apply_rating;

use super::progress::SessionProgress;
use super::selector::{sort_for_unit_mode, weighted_select};
use crate::error::GameError;

//
// ─── STATES & EVENTS ───────────────────────────────────────────────────────────
//

/// Which game is being played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMode {
    /// Fixed playthrough of one deck, due cards first.
    Unit { deck_id: DeckId },
    /// Blind ladder over every card in scope.
    Random,
}

/// Phase of the session state machine.
///
/// `Results`, `RoundOver` and `Error` are terminal until the player asks for
/// another pass (`StudyAgain`, `NewRound`, `Retry`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Loading,
    Error,
    BlindIntro,
    Playing,
    Results,
    RoundOver,
}

impl GamePhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Loading => "loading",
            GamePhase::Error => "error",
            GamePhase::BlindIntro => "blind-intro",
            GamePhase::Playing => "playing",
            GamePhase::Results => "results",
            GamePhase::RoundOver => "round-over",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input dispatched into a [`GameSession`].
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// Cards and stats are available.
    Loaded { cards: Vec<Flashcard>, stats: StatsMap },
    /// Loading could not produce a card set.
    LoadFailed { message: String },
    /// Leave the blind intro and play the tier.
    Start,
    /// Rate the current card.
    Rate(Rating),
    /// Replay the unit deck after the results screen.
    StudyAgain,
    /// Start a new blind round after a round is over.
    NewRound,
    /// Go back to loading after an error.
    Retry,
}

impl GameEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Loaded { .. } => "loaded",
            GameEvent::LoadFailed { .. } => "load-failed",
            GameEvent::Start => "start",
            GameEvent::Rate(_) => "rate",
            GameEvent::StudyAgain => "study-again",
            GameEvent::NewRound => "new-round",
            GameEvent::Retry => "retry",
        }
    }
}

/// Result of a finished blind tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierOutcome {
    pub tier_index: usize,
    pub correct: usize,
    pub dealt: usize,
    pub passed: bool,
    pub earned: u64,
}

/// What a single transition did.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Phase after the transition.
    pub phase: GamePhase,
    /// New stats of the card that was just rated; the caller persists them.
    pub rated: Option<CardStats>,
    /// Set when the transition closed a blind tier.
    pub tier: Option<TierOutcome>,
}

impl Step {
    fn to(phase: GamePhase) -> Self {
        Self {
            phase,
            rated: None,
            tier: None,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory game session: queue, results and (for blind rounds) tier and score.
///
/// Driven only through [`GameSession::handle`]; it performs no I/O. Stats are
/// held as a snapshot taken at load time and updated on every rating, so later
/// tiers are selected with fresh numbers.
pub struct GameSession {
    mode: GameMode,
    scope: String,
    ladder: BlindLadder,
    phase: GamePhase,
    error: Option<String>,
    pool: Vec<Flashcard>,
    stats: StatsMap,
    queue: Vec<Flashcard>,
    current: usize,
    results: Vec<SessionResult>,
    tier_index: usize,
    tier_start: usize,
    score: u64,
    passed: bool,
    last_tier: Option<TierOutcome>,
    ladder_cleared: bool,
}

impl GameSession {
    /// A session waiting in `Loading` for its cards.
    #[must_use]
    pub fn new(mode: GameMode, scope: impl Into<String>, ladder: BlindLadder) -> Self {
        Self {
            mode,
            scope: scope.into(),
            ladder,
            phase: GamePhase::Loading,
            error: None,
            pool: Vec::new(),
            stats: StatsMap::new(),
            queue: Vec::new(),
            current: 0,
            results: Vec::new(),
            tier_index: 0,
            tier_start: 0,
            score: 0,
            passed: false,
            last_tier: None,
            ladder_cleared: false,
        }
    }

    #[must_use]
    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    #[must_use]
    pub fn ladder(&self) -> &BlindLadder {
        &self.ladder
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    #[must_use]
    pub fn queue(&self) -> &[Flashcard] {
        &self.queue
    }

    #[must_use]
    pub fn stats(&self) -> &StatsMap {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn tier_index(&self) -> usize {
        self.tier_index
    }

    #[must_use]
    pub fn current_tier(&self) -> Option<&BlindTier> {
        match self.mode {
            GameMode::Random => self.ladder.tier(self.tier_index),
            GameMode::Unit { .. } => None,
        }
    }

    /// Pass flag of the most recently finished tier.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn last_tier(&self) -> Option<TierOutcome> {
        self.last_tier
    }

    /// True once the final tier of the ladder has been passed.
    #[must_use]
    pub fn ladder_cleared(&self) -> bool {
        self.ladder_cleared
    }

    /// Number of tiers reached in the current round, counting the current one.
    #[must_use]
    pub fn blinds_reached(&self) -> usize {
        self.tier_index + 1
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        match self.phase {
            GamePhase::Playing => self.queue.get(self.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.queue.len(), self.current)
    }

    /// Rating counts over the results of the current session or round.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_results(&self.results)
    }

    /// Apply one event.
    ///
    /// `now` feeds the scheduler and selector; `rng` is only used when a new
    /// blind tier is dealt.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidEvent` when the event makes no sense in the
    /// current phase; the session is left unchanged in that case.
    pub fn handle<R: Rng + ?Sized>(
        &mut self,
        event: GameEvent,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Step, GameError> {
        match (self.phase, event) {
            (GamePhase::Loading, GameEvent::Loaded { cards, stats }) => {
                Ok(self.on_loaded(cards, stats, now, rng))
            }
            (GamePhase::Loading, GameEvent::LoadFailed { message }) => Ok(self.fail(message)),
            (GamePhase::Error, GameEvent::Retry) => {
                self.error = None;
                self.phase = GamePhase::Loading;
                Ok(Step::to(GamePhase::Loading))
            }
            (GamePhase::BlindIntro, GameEvent::Start) => {
                self.phase = GamePhase::Playing;
                Ok(Step::to(GamePhase::Playing))
            }
            (GamePhase::Playing, GameEvent::Rate(rating)) => self.on_rate(rating, now, rng),
            (GamePhase::Results, GameEvent::StudyAgain) => {
                self.deal_unit(now);
                Ok(Step::to(self.phase))
            }
            (GamePhase::RoundOver, GameEvent::NewRound) => {
                self.begin_round(now, rng);
                Ok(Step::to(self.phase))
            }
            (phase, event) => Err(GameError::InvalidEvent {
                phase,
                event: event.name(),
            }),
        }
    }

    fn on_loaded<R: Rng + ?Sized>(
        &mut self,
        cards: Vec<Flashcard>,
        stats: StatsMap,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Step {
        if cards.is_empty() {
            return self.fail("no cards available for this session".to_owned());
        }
        self.pool = cards;
        self.stats = stats;

        match self.mode {
            GameMode::Unit { .. } => self.deal_unit(now),
            GameMode::Random => self.begin_round(now, rng),
        }
        Step::to(self.phase)
    }

    fn fail(&mut self, message: String) -> Step {
        self.error = Some(message);
        self.phase = GamePhase::Error;
        Step::to(GamePhase::Error)
    }

    fn deal_unit(&mut self, now: DateTime<Utc>) {
        self.queue = sort_for_unit_mode(self.pool.clone(), &self.stats, now);
        self.current = 0;
        self.results.clear();
        self.phase = GamePhase::Playing;
    }

    fn begin_round<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) {
        self.results.clear();
        self.score = 0;
        self.tier_index = 0;
        self.passed = false;
        self.last_tier = None;
        self.ladder_cleared = false;
        self.deal_tier(now, rng);
    }

    fn deal_tier<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) {
        let count = self
            .ladder
            .tier(self.tier_index)
            .map_or(0, |tier| tier.card_count);
        self.queue = weighted_select(&self.pool, &self.stats, count, now, rng);
        self.current = 0;
        self.tier_start = self.results.len();
        self.phase = GamePhase::BlindIntro;
    }

    fn on_rate<R: Rng + ?Sized>(
        &mut self,
        rating: Rating,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Step, GameError> {
        let card_id = self
            .queue
            .get(self.current)
            .map(|card| card.id.clone())
            .ok_or(GameError::InvalidEvent {
                phase: self.phase,
                event: "rate",
            })?;

        let previous = stats_or_unseen(&self.stats, &card_id, now);
        let updated = apply_rating(&previous, rating, now);
        self.stats.insert(card_id.clone(), updated.clone());
        self.results.push(SessionResult::new(card_id, rating));
        self.current += 1;

        let mut step = Step {
            phase: GamePhase::Playing,
            rated: Some(updated),
            tier: None,
        };

        if self.current >= self.queue.len() {
            match self.mode {
                GameMode::Unit { .. } => self.phase = GamePhase::Results,
                GameMode::Random => step.tier = Some(self.finish_tier(now, rng)),
            }
            step.phase = self.phase;
        }
        Ok(step)
    }

    fn finish_tier<R: Rng + ?Sized>(&mut self, now: DateTime<Utc>, rng: &mut R) -> TierOutcome {
        let dealt = self.queue.len();
        let correct = self.results[self.tier_start..]
            .iter()
            .filter(|r| r.rating.is_correct())
            .count();

        let (passed, earned) = match self.ladder.tier(self.tier_index) {
            Some(tier) => (tier.is_passed(correct, dealt), tier.points_for(correct)),
            None => (false, 0),
        };
        self.passed = passed;
        self.score = self.score.saturating_add(earned);

        let outcome = TierOutcome {
            tier_index: self.tier_index,
            correct,
            dealt,
            passed,
            earned,
        };
        self.last_tier = Some(outcome);

        let is_last = self.ladder.is_last(self.tier_index);
        if passed && !is_last {
            self.tier_index += 1;
            self.deal_tier(now, rng);
        } else {
            self.ladder_cleared = passed && is_last;
            self.phase = GamePhase::RoundOver;
        }
        outcome
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("mode", &self.mode)
            .field("phase", &self.phase)
            .field("pool_len", &self.pool.len())
            .field("queue_len", &self.queue.len())
            .field("current", &self.current)
            .field("results_len", &self.results.len())
            .field("tier_index", &self.tier_index)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
