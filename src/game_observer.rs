use crate::game::EpisodeSummary;
use crate::infra::Direction;
use crate::sim::{Simulation, StepResult};

/// Trait for observing episode events during execution
pub trait EpisodeObserver {
    /// Called after the reset that opens an episode
    fn on_episode_start(&mut self, episode: usize, sim: &Simulation);

    /// Called after every turn
    fn on_step(&mut self, action: Direction, result: &StepResult);

    /// Called once the episode ends, including watchdog truncation
    fn on_episode_finished(&mut self, episode: usize, summary: &EpisodeSummary);
}
