mod env;
mod observation;
mod reward;

pub use env::{Outcome, Simulation, StepInfo, StepResult};
pub use observation::{
    CODE_ADVERSARY, CODE_COLLECTIBLE, CODE_OPEN, CODE_PROTAGONIST, CODE_WALL, Observation,
};
pub use reward::RewardConfig;
