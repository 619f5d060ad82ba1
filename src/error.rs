use thiserror::Error;

use crate::infra::Position;
use crate::sim::Outcome;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze source has no cells")]
    Empty,

    #[error("generated maze must be at least 4x4, got {width}x{height}")]
    TooSmall { width: i32, height: i32 },

    #[error("maze source has no protagonist spawn ('P')")]
    MissingProtagonistSpawn,

    #[error("maze source has a second protagonist spawn at {second:?} (first at {first:?})")]
    DuplicateProtagonistSpawn { first: Position, second: Position },

    #[error("unknown maze symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: i32, y: i32 },

    #[error("maze border is open at ({x}, {y})")]
    OpenBorder { x: i32, y: i32 },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("action index {0} is not one of the four directions")]
    InvalidIndex(usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RewardError {
    #[error("reward ordering violated: expected bump ({bump}) < 0 < collect ({collect}) < win ({win})")]
    Ordering { bump: f64, collect: f64, win: f64 },

    #[error("collision penalty {penalty} does not dominate {collectible_total} total collectible reward")]
    CollisionNotDominant { penalty: f64, collectible_total: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("episode already finished ({0:?}); reset before stepping")]
    EpisodeFinished(Outcome),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Reward(#[from] RewardError),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("learning rate must be in (0, 1], got {0}")]
    LearningRate(f64),

    #[error("discount must be in [0, 1), got {0}")]
    Discount(f64),

    #[error("invalid epsilon schedule: start {start}, min {min}, decay {decay}")]
    EpsilonSchedule { start: f64, min: f64, decay: f64 },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("value table i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("value table is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot timestamp value table snapshot: {0}")]
    Timestamp(#[from] time::error::Error),

    #[error("value table lists state {0} more than once")]
    DuplicateState(String),

    #[error("value table entry for state {0} is missing an intent")]
    MissingIntent(String),

    #[error("value table entry for state {0} holds a non-finite value")]
    NonFinite(String),
}
