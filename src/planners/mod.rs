//! Move sources for the protagonist: a uniform random baseline and the
//! value-learning agent.

pub mod random;
pub mod rl;

use crate::infra::Direction;
use crate::sim::{Simulation, StepResult};

pub use random::RandomPolicy;

/// Anything that picks the protagonist's next move.
pub trait Policy {
    /// Next move, or `None` to stop the episode early.
    fn act(&mut self, sim: &Simulation) -> Option<Direction>;

    /// Called after each turn with the simulation already advanced.
    fn feedback(&mut self, _sim: &Simulation, _result: &StepResult) {}

    /// Called once the episode is over.
    fn end_episode(&mut self) {}
}
