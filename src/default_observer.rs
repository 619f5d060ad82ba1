use std::io::{self, Write};

use tracing::{debug, info};

use crate::game::EpisodeSummary;
use crate::game_observer::EpisodeObserver;
use crate::infra::Direction;
use crate::sim::{Simulation, StepResult};

/// Logs episode events. With `render` set, also draws the board after every
/// turn, for interactive play.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObserver {
    render: bool,
}

impl DefaultObserver {
    pub fn quiet() -> Self {
        Self { render: false }
    }

    pub fn rendering() -> Self {
        Self { render: true }
    }
}

impl EpisodeObserver for DefaultObserver {
    fn on_episode_start(&mut self, episode: usize, sim: &Simulation) {
        let maze = sim.maze();
        debug!(
            "Episode {} started: {}x{} maze, {} collectibles, {} adversaries",
            episode,
            maze.width,
            maze.height,
            sim.remaining_collectibles(),
            sim.adversaries().len()
        );

        if self.render {
            let _ = writeln!(io::stdout(), "{}", sim.observation());
        }
    }

    fn on_step(&mut self, action: Direction, result: &StepResult) {
        debug!(
            "tick: {}, action: {}, reward: {:.1}, remaining: {}",
            result.info.steps, action, result.reward, result.info.remaining_collectibles
        );

        if self.render {
            let _ = writeln!(io::stdout(), "{}", result.observation);
            let _ = writeln!(
                io::stdout(),
                "Reward: {:.1} | Remaining: {}",
                result.reward,
                result.info.remaining_collectibles
            );
        }
    }

    fn on_episode_finished(&mut self, episode: usize, summary: &EpisodeSummary) {
        if self.render {
            info!(
                "Episode {} finished: {:?} after {} steps, reward {:.1}",
                episode, summary.end, summary.steps, summary.reward
            );
        } else {
            debug!(
                "Episode {} finished: {:?} after {} steps, reward {:.1}",
                episode, summary.end, summary.steps, summary.reward
            );
        }
    }
}
