#![forbid(unsafe_code)]

pub mod error;
pub mod ladder;
pub mod model;
pub mod scheduler;
pub mod time;

pub use error::Error;
pub use ladder::{BlindLadder, BlindTier, LadderError};
pub use time::Clock;
