use crate::error::SimulationError;
use crate::game_observer::EpisodeObserver;
use crate::planners::Policy;
use crate::sim::{Outcome, Simulation};

/// Per-episode turn ceiling when none is configured.
pub const DEFAULT_MAX_STEPS: usize = 500;

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    Collided,
    Cleared,
    /// Step ceiling reached, or the policy had no move to offer
    Truncated,
}

impl From<Outcome> for EpisodeEnd {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Collided => EpisodeEnd::Collided,
            Outcome::Cleared => EpisodeEnd::Cleared,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// Sum of turn rewards
    pub reward: f64,
    pub steps: usize,
    pub end: EpisodeEnd,
}

/// Drives a simulation with a policy, one episode at a time, enforcing the
/// step ceiling.
pub struct Game {
    sim: Simulation,
    observer: Box<dyn EpisodeObserver>,
    max_steps: usize,
    episodes: usize,
}

impl Game {
    pub fn new(sim: Simulation, observer: impl EpisodeObserver + 'static, max_steps: usize) -> Self {
        Self {
            sim,
            observer: Box::new(observer),
            max_steps,
            episodes: 0,
        }
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Episodes started so far.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn run_episode<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
    ) -> Result<EpisodeSummary, SimulationError> {
        self.episodes += 1;
        self.sim.reset();
        self.observer.on_episode_start(self.episodes, &self.sim);

        let mut reward = 0.0;
        let end = loop {
            if self.sim.steps() >= self.max_steps {
                break EpisodeEnd::Truncated;
            }
            let Some(action) = policy.act(&self.sim) else {
                break EpisodeEnd::Truncated;
            };

            let result = self.sim.step(action)?;
            reward += result.reward;
            self.observer.on_step(action, &result);
            policy.feedback(&self.sim, &result);

            if let Some(outcome) = result.info.outcome {
                break outcome.into();
            }
        };
        policy.end_episode();

        let summary = EpisodeSummary {
            reward,
            steps: self.sim.steps(),
            end,
        };
        self.observer.on_episode_finished(self.episodes, &summary);
        Ok(summary)
    }

    pub fn run<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        episodes: usize,
    ) -> Result<Vec<EpisodeSummary>, SimulationError> {
        (0..episodes).map(|_| self.run_episode(policy)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::default_observer::DefaultObserver;
    use crate::infra::Direction;
    use crate::sim::RewardConfig;
    use crate::state::{BehaviorKind, Maze};

    /// Always walks in one direction.
    struct Fixed(Direction);

    impl Policy for Fixed {
        fn act(&mut self, _sim: &Simulation) -> Option<Direction> {
            Some(self.0)
        }
    }

    fn game(source: &str, max_steps: usize) -> Game {
        let maze = Maze::parse(source).unwrap();
        let sim = Simulation::new(
            maze,
            BehaviorKind::Random,
            RewardConfig::default(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        Game::new(sim, DefaultObserver::quiet(), max_steps)
    }

    #[test]
    fn test_watchdog_truncates_episode() {
        let mut game = game("#####\n#P .#\n#####", 7);
        let summary = game.run_episode(&mut Fixed(Direction::Up)).unwrap();
        assert_eq!(summary.end, EpisodeEnd::Truncated);
        assert_eq!(summary.steps, 7);
        assert!((summary.reward - -7.0).abs() < 1e-9);
    }

    #[test]
    fn test_episode_ends_on_clear_and_restarts() {
        let mut game = game("#####\n#P .#\n#####", 50);
        let summaries = game.run(&mut Fixed(Direction::Right), 2).unwrap();
        assert_eq!(game.episodes(), 2);
        for summary in summaries {
            assert_eq!(summary.end, EpisodeEnd::Cleared);
            assert_eq!(summary.steps, 2);
            assert!((summary.reward - 210.0).abs() < 1e-9);
        }
    }
}
