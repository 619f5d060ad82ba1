//! Baseline policy: a uniformly random valid move every turn

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::infra::Direction;
use crate::sim::Simulation;

use super::Policy;

pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    /// Stops the episode when the protagonist is boxed in.
    fn act(&mut self, sim: &Simulation) -> Option<Direction> {
        sim.valid_actions().choose(&mut self.rng).copied()
    }
}
