use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;

use flash_core::model::{CardStats, DeckId, Flashcard, Rating};
use flash_core::{BlindLadder, Clock};

use super::engine::{GameEvent, GameMode, GamePhase, GameSession, Step, TierOutcome};
use crate::deck_service::DeckService;
use crate::error::{DeckServiceError, GameError};
use crate::stats_service::StatsService;

/// Result of rating a single card.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub phase: GamePhase,
    pub rated: CardStats,
    /// False when the store rejected the write; the session still holds the update.
    pub persisted: bool,
    pub tier: Option<TierOutcome>,
}

/// Drives game sessions against the deck source and stats store.
///
/// Owns the I/O around a [`GameSession`]: loading cards and stats before
/// play, persisting every rating as it happens.
pub struct GameLoopService {
    clock: Clock,
    decks: DeckService,
    stats: StatsService,
    ladder: BlindLadder,
    rng: Mutex<StdRng>,
}

impl GameLoopService {
    #[must_use]
    pub fn new(clock: Clock, decks: DeckService, stats: StatsService) -> Self {
        Self {
            clock,
            decks,
            stats,
            ladder: BlindLadder::standard(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Use a deterministic random source, for tests and replays.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    #[must_use]
    pub fn with_ladder(mut self, ladder: BlindLadder) -> Self {
        self.ladder = ladder;
        self
    }

    #[must_use]
    pub fn ladder(&self) -> &BlindLadder {
        &self.ladder
    }

    /// Start a unit playthrough of one deck.
    ///
    /// Load failures do not error; the session comes back in the `Error` phase.
    ///
    /// # Errors
    ///
    /// Returns `GameError` only if the state machine rejects the load events.
    pub async fn start_unit(&self, scope: &str, deck_id: &DeckId) -> Result<GameSession, GameError> {
        let mode = GameMode::Unit {
            deck_id: deck_id.clone(),
        };
        self.start(mode, scope).await
    }

    /// Start a blind round over every card in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `GameError` only if the state machine rejects the load events.
    pub async fn start_random(&self, scope: &str) -> Result<GameSession, GameError> {
        self.start(GameMode::Random, scope).await
    }

    async fn start(&self, mode: GameMode, scope: &str) -> Result<GameSession, GameError> {
        let mut session = GameSession::new(mode, scope, self.ladder.clone());
        self.load(&mut session).await?;
        Ok(session)
    }

    /// Leave the error phase and load again.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidEvent` if the session is not in `Error`.
    pub async fn retry(&self, session: &mut GameSession) -> Result<GamePhase, GameError> {
        self.dispatch(session, GameEvent::Retry)?;
        self.load(session).await
    }

    async fn load(&self, session: &mut GameSession) -> Result<GamePhase, GameError> {
        let event = match self.fetch_cards(session.mode(), session.scope()).await {
            Ok(cards) => GameEvent::Loaded {
                cards,
                stats: self.stats.snapshot().await,
            },
            Err(e) => {
                tracing::warn!(scope = session.scope(), error = %e, "session load failed");
                GameEvent::LoadFailed {
                    message: e.to_string(),
                }
            }
        };
        let step = self.dispatch(session, event)?;
        tracing::info!(mode = ?session.mode(), phase = %step.phase, "session loaded");
        Ok(step.phase)
    }

    async fn fetch_cards(
        &self,
        mode: &GameMode,
        scope: &str,
    ) -> Result<Vec<Flashcard>, DeckServiceError> {
        match mode {
            GameMode::Unit { deck_id } => {
                let deck = self.decks.find_deck(scope, deck_id).await?;
                Ok(deck.into_cards())
            }
            GameMode::Random => self.decks.all_cards(scope).await,
        }
    }

    /// Leave the blind intro and start playing the tier.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidEvent` outside `BlindIntro`.
    pub fn start_tier(&self, session: &mut GameSession) -> Result<GamePhase, GameError> {
        let step = self.dispatch(session, GameEvent::Start)?;
        tracing::info!(tier = session.tier_index(), cards = session.queue().len(), "tier started");
        Ok(step.phase)
    }

    /// Rate the current card and persist its new stats.
    ///
    /// A failed write is logged and reported through `persisted`; the session
    /// continues either way.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidEvent` outside `Playing`.
    pub async fn rate(
        &self,
        session: &mut GameSession,
        rating: Rating,
    ) -> Result<AnswerResult, GameError> {
        let step = self.dispatch(session, GameEvent::Rate(rating))?;
        let Some(rated) = step.rated else {
            return Err(GameError::InvalidEvent {
                phase: step.phase,
                event: "rate",
            });
        };
        let persisted = self.stats.record(&rated).await;

        if let Some(outcome) = step.tier {
            tracing::info!(
                tier = outcome.tier_index,
                correct = outcome.correct,
                dealt = outcome.dealt,
                passed = outcome.passed,
                earned = outcome.earned,
                score = session.score(),
                "tier finished"
            );
        }
        if matches!(step.phase, GamePhase::Results | GamePhase::RoundOver) {
            let summary = session.summary();
            tracing::info!(
                correct = summary.correct(),
                total = summary.total(),
                pct = summary.pct(),
                "session finished"
            );
        }

        Ok(AnswerResult {
            phase: step.phase,
            rated,
            persisted,
            tier: step.tier,
        })
    }

    /// Replay a finished unit deck.
    ///
    /// The new order uses the stats updated during the previous pass.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidEvent` outside `Results`.
    pub fn study_again(&self, session: &mut GameSession) -> Result<GamePhase, GameError> {
        Ok(self.dispatch(session, GameEvent::StudyAgain)?.phase)
    }

    /// Start a fresh blind round from the first tier.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidEvent` outside `RoundOver`.
    pub fn new_round(&self, session: &mut GameSession) -> Result<GamePhase, GameError> {
        Ok(self.dispatch(session, GameEvent::NewRound)?.phase)
    }

    fn dispatch(&self, session: &mut GameSession, event: GameEvent) -> Result<Step, GameError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        session.handle(event, self.clock.now(), &mut *rng)
    }
}
