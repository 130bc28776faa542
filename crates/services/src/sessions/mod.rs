mod engine;
mod progress;
mod selector;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::GameError;
pub use engine::{GameEvent, GameMode, GamePhase, GameSession, Step, TierOutcome};
pub use progress::SessionProgress;
pub use selector::{LAPSE_WEIGHT, OVERDUE_BOOST, selection_weight, sort_for_unit_mode, weighted_select};
pub use view::{GameView, TierView};
pub use workflow::{AnswerResult, GameLoopService};
