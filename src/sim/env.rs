//! Turn sequencer - gym-like interface over the maze, the protagonist and the
//! adversaries

use rand::rngs::StdRng;
use tracing::debug;

use crate::error::SimulationError;
use crate::infra::{Direction, Position};
use crate::state::{Adversary, Behavior, BehaviorKind, CyclicSchedule, Maze, Protagonist};

use super::observation::Observation;
use super::reward::RewardConfig;

/// Terminal state of an episode. Both are absorbing until `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An adversary shares the protagonist's cell
    Collided,
    /// No collectibles remain
    Cleared,
}

/// Step result from the simulation
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the turn
    pub observation: Observation,
    /// Net reward of the turn
    pub reward: f64,
    /// Episode reached a terminal outcome
    pub done: bool,
    /// Auxiliary details, not part of the learning signal
    pub info: StepInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Turns taken this episode, including this one
    pub steps: usize,
    /// The requested move hit a blocked cell
    pub bumped: bool,
    /// A collectible was consumed this turn
    pub collected: bool,
    /// Collectibles left after the turn
    pub remaining_collectibles: usize,
    pub outcome: Option<Outcome>,
}

pub struct Simulation {
    maze: Maze,
    protagonist: Protagonist,
    adversaries: Vec<Adversary>,
    rewards: RewardConfig,
    rng: StdRng,
    outcome: Option<Outcome>,
    steps: usize,
}

impl Simulation {
    /// Every adversary runs the same kind of behavior.
    pub fn new(
        maze: Maze,
        kind: BehaviorKind,
        rewards: RewardConfig,
        rng: StdRng,
    ) -> Result<Self, SimulationError> {
        let behavior = Behavior::from_kind(kind, CyclicSchedule::default());
        let behaviors = vec![behavior; maze.adversary_spawns().len()];
        Self::with_behaviors(maze, behaviors, rewards, rng)
    }

    /// Adversary `i` runs `behaviors[i]`; adversaries without an entry move randomly.
    pub fn with_behaviors(
        maze: Maze,
        behaviors: Vec<Behavior>,
        rewards: RewardConfig,
        rng: StdRng,
    ) -> Result<Self, SimulationError> {
        rewards.validate(maze.total_collectibles())?;

        let protagonist = Protagonist::new(maze.protagonist_spawn());
        let mut behaviors = behaviors.into_iter();
        let adversaries = maze
            .adversary_spawns()
            .iter()
            .enumerate()
            .map(|(index, spawn)| {
                let behavior = behaviors.next().unwrap_or(Behavior::Random);
                Adversary::new(*spawn, maze.scatter_target(index), behavior)
            })
            .collect();

        let mut simulation = Self {
            maze,
            protagonist,
            adversaries,
            rewards,
            rng,
            outcome: None,
            steps: 0,
        };
        simulation.reset();
        Ok(simulation)
    }

    /// Restore spawns, collectibles and adversary timers.
    pub fn reset(&mut self) -> Observation {
        self.maze.restore_collectibles();
        self.protagonist.respawn();
        for adversary in &mut self.adversaries {
            adversary.respawn();
        }
        self.outcome = None;
        self.steps = 0;

        self.observation()
    }

    /// Take a step with a primitive action index (0=up, 1=down, 2=left, 3=right).
    pub fn step_index(&mut self, action: usize) -> Result<StepResult, SimulationError> {
        let direction = Direction::try_from(action)?;
        self.step(direction)
    }

    /// Run one turn: protagonist move, pickup, adversaries, collision, clear.
    pub fn step(&mut self, direction: Direction) -> Result<StepResult, SimulationError> {
        if let Some(outcome) = self.outcome {
            return Err(SimulationError::EpisodeFinished(outcome));
        }
        self.steps += 1;

        let mut reward = 0.0;
        let mut info = StepInfo {
            steps: self.steps,
            ..StepInfo::default()
        };

        let destination = self.protagonist.position.step(direction);
        if self.maze.is_blocked(destination) {
            reward += self.rewards.wall_bump;
            info.bumped = true;
        } else {
            self.protagonist.position = destination;
            if self.maze.collect_at(destination) {
                reward += self.rewards.collect;
                info.collected = true;
            }
        }

        let target = self.protagonist.position;
        for adversary in &mut self.adversaries {
            adversary.advance(&self.maze, target, &mut self.rng);
        }

        // Collision is checked first so a simultaneous clear still counts as a loss.
        if self.adversaries.iter().any(|a| a.position == target) {
            reward += self.rewards.collision;
            self.outcome = Some(Outcome::Collided);
        } else if self.maze.remaining_collectibles() == 0 {
            reward += self.rewards.win_bonus;
            self.outcome = Some(Outcome::Cleared);
        }

        info.remaining_collectibles = self.maze.remaining_collectibles();
        info.outcome = self.outcome;

        debug!(
            "step {}: {} -> {} reward {:.1} remaining {}{}",
            self.steps,
            direction,
            target,
            reward,
            info.remaining_collectibles,
            self.outcome.map(|o| format!(" ({:?})", o)).unwrap_or_default()
        );

        Ok(StepResult {
            observation: self.observation(),
            reward,
            done: self.outcome.is_some(),
            info,
        })
    }

    /// Directions whose destination from the protagonist's cell is open.
    pub fn valid_actions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|direction| !self.maze.is_blocked(self.protagonist.position.step(*direction)))
            .collect()
    }

    pub fn observation(&self) -> Observation {
        Observation::capture(&self.maze, &self.protagonist, &self.adversaries)
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn protagonist_position(&self) -> Position {
        self.protagonist.position
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn adversary_positions(&self) -> Vec<Position> {
        self.adversaries.iter().map(|a| a.position).collect()
    }

    pub fn remaining_collectibles(&self) -> usize {
        self.maze.remaining_collectibles()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn rewards(&self) -> &RewardConfig {
        &self.rewards
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::error::ActionError;

    fn simulation(source: &str, behaviors: Vec<Behavior>) -> Simulation {
        let maze = Maze::parse(source).unwrap();
        let rng = StdRng::seed_from_u64(42);
        Simulation::with_behaviors(maze, behaviors, RewardConfig::default(), rng).unwrap()
    }

    #[test]
    fn test_bump_leaves_protagonist_in_place() {
        let mut sim = simulation("####\n#P.#\n####", vec![]);
        let result = sim.step(Direction::Up).unwrap();
        assert!((result.reward - -1.0).abs() < 1e-9);
        assert!(result.info.bumped);
        assert!(!result.done);
        assert_eq!(sim.protagonist_position(), Position::new(1, 1));
    }

    #[test]
    fn test_invalid_action_index_is_rejected() {
        let mut sim = simulation("####\n#P.#\n####", vec![]);
        assert_eq!(
            sim.step_index(9).unwrap_err(),
            SimulationError::Action(ActionError::InvalidIndex(9))
        );
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn test_collision_dominates_same_turn_collect() {
        // The adversary pursues onto the cell the protagonist just cleared.
        let mut sim = simulation("#####\n#P.G#\n#####", vec![Behavior::Pursuit]);
        let result = sim.step(Direction::Right).unwrap();
        assert!(result.info.collected);
        assert_eq!(result.info.outcome, Some(Outcome::Collided));
        assert!(result.done);
        assert!((result.reward - (10.0 - 100.0)).abs() < 1e-9);
        assert_eq!(sim.remaining_collectibles(), 0);
    }

    #[test]
    fn test_finished_episode_rejects_steps_until_reset() {
        let mut sim = simulation("####\n#P.#\n####", vec![]);
        let result = sim.step(Direction::Right).unwrap();
        assert_eq!(result.info.outcome, Some(Outcome::Cleared));
        assert_eq!(
            sim.step(Direction::Left).unwrap_err(),
            SimulationError::EpisodeFinished(Outcome::Cleared)
        );

        sim.reset();
        assert!(!sim.is_finished());
        assert_eq!(sim.remaining_collectibles(), 1);
        assert!(sim.step(Direction::Left).is_ok());
    }

    #[test]
    fn test_reset_restores_spawns_and_timers() {
        let mut sim = simulation(
            "#######\n#P...G#\n#######",
            vec![Behavior::cyclic(CyclicSchedule::default())],
        );
        let initial = sim.observation();
        sim.step(Direction::Right).unwrap();
        sim.step(Direction::Right).unwrap();
        assert_ne!(sim.observation(), initial);

        assert_eq!(sim.reset(), initial);
        assert_eq!(sim.adversaries()[0].behavior().mode(), Some(crate::state::Mode::Scatter));
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn test_observation_codes() {
        let sim = simulation("#####\n#P.G#\n#####", vec![Behavior::Random]);
        let observation = sim.observation();
        assert_eq!(observation.get(Position::new(0, 0)), Some(crate::sim::CODE_WALL));
        assert_eq!(observation.get(Position::new(1, 1)), Some(4));
        assert_eq!(observation.get(Position::new(2, 1)), Some(2));
        assert_eq!(observation.get(Position::new(3, 1)), Some(3));
        assert_eq!(observation.get(Position::new(5, 1)), None);
        assert_eq!(observation.to_string(), "#####\n#P.G#\n#####\n");
    }

    #[test]
    fn test_reward_consistency_is_enforced() {
        let maze = Maze::open_arena(10, 10).unwrap();
        let result = Simulation::new(
            maze,
            BehaviorKind::Random,
            RewardConfig::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(SimulationError::Reward(_))));
    }
}
