use std::collections::{HashMap, VecDeque};

use dotbot::default_observer::DefaultObserver;
use dotbot::error::SimulationError;
use dotbot::game::{EpisodeEnd, Game};
use dotbot::infra::{AStar, Direction, Position};
use dotbot::planners::RandomPolicy;
use dotbot::planners::rl::{
    AbstractState, AgentConfig, DecisionAgent, Intent, TrainConfig, ValueTable, train,
};
use dotbot::sim::{Outcome, RewardConfig, Simulation};
use dotbot::state::{Behavior, BehaviorKind, Maze};
use rand::SeedableRng;
use rand::rngs::StdRng;

const CORRIDOR: &str = "\
#####
#####
#P .#
#####
#####";

const BOXED_IN: &str = "\
#####
#P#.#
#####";

fn simulation(source: &str, behaviors: Vec<Behavior>) -> Simulation {
    let maze = Maze::parse(source).unwrap();
    let rewards = RewardConfig::for_collectibles(maze.total_collectibles());
    Simulation::with_behaviors(maze, behaviors, rewards, StdRng::seed_from_u64(17)).unwrap()
}

fn classic(kind: BehaviorKind, seed: u64) -> Simulation {
    let maze = Maze::classic().unwrap();
    let rewards = RewardConfig::for_collectibles(maze.total_collectibles());
    Simulation::new(maze, kind, rewards, StdRng::seed_from_u64(seed)).unwrap()
}

fn bfs_distances(maze: &Maze, start: Position) -> HashMap<Position, usize> {
    let mut distances = HashMap::from([(start, 0)]);
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        let distance = distances[&pos];
        for next in maze.open_neighbors(pos) {
            if !distances.contains_key(&next) {
                distances.insert(next, distance + 1);
                queue.push_back(next);
            }
        }
    }
    distances
}

#[test]
fn corridor_walk_collects_and_clears() {
    let mut sim = simulation(CORRIDOR, vec![]);
    let rewards = *sim.rewards();

    let first = sim.step(Direction::Right).unwrap();
    assert_eq!(first.reward, 0.0);
    assert!(!first.done);

    let last = sim.step(Direction::Right).unwrap();
    assert!((last.reward - (rewards.collect + rewards.win_bonus)).abs() < 1e-9);
    assert!(last.done);
    assert_eq!(last.info.outcome, Some(Outcome::Cleared));
    assert_eq!(sim.remaining_collectibles(), 0);
}

#[test]
fn boxed_in_protagonist_only_bumps() {
    let mut sim = simulation(BOXED_IN, vec![]);
    assert!(sim.valid_actions().is_empty());

    for direction in Direction::ALL {
        let result = sim.step(direction).unwrap();
        assert!((result.reward - sim.rewards().wall_bump).abs() < 1e-9);
        assert!(!result.done);
        assert!(result.info.bumped);
    }
    assert_eq!(sim.protagonist_position(), Position::new(1, 1));
}

#[test]
fn reset_is_idempotent_after_play() {
    let mut sim = classic(BehaviorKind::Cyclic, 3);
    let mut policy_rng = StdRng::seed_from_u64(8);
    for _ in 0..30 {
        if sim.is_finished() {
            break;
        }
        let actions = sim.valid_actions();
        let action = actions[rand::Rng::random_range(&mut policy_rng, 0..actions.len())];
        sim.step(action).unwrap();
    }

    let first = sim.reset();
    let second = sim.reset();
    assert_eq!(first, second);
    assert_eq!(sim.remaining_collectibles(), sim.maze().total_collectibles());
}

#[test]
fn collision_ends_episode_even_on_collect() {
    let mut sim = simulation("######\n#P.G.#\n######", vec![Behavior::Pursuit]);
    let rewards = *sim.rewards();

    let result = sim.step(Direction::Right).unwrap();
    assert!(result.done);
    assert_eq!(result.info.outcome, Some(Outcome::Collided));
    assert!((result.reward - (rewards.collect + rewards.collision)).abs() < 1e-9);
    assert!(matches!(
        sim.step(Direction::Left),
        Err(SimulationError::EpisodeFinished(Outcome::Collided))
    ));
}

#[test]
fn astar_matches_bfs_on_classic_maze() {
    let maze = Maze::classic().unwrap();
    let open: Vec<Position> = maze.positions().filter(|p| !maze.is_blocked(*p)).collect();

    for start in open.iter().step_by(7) {
        let distances = bfs_distances(&maze, *start);
        for goal in &open {
            let path = AStar::find_path(&maze, *start, *goal);
            match distances.get(goal) {
                Some(distance) => {
                    let path = path.unwrap();
                    assert_eq!(path.len(), distance + 1);
                    assert_eq!(path.first(), Some(start));
                    assert_eq!(path.last(), Some(goal));
                    assert!(path.windows(2).all(|w| w[0].is_adjacent(&w[1])));
                }
                None => assert!(path.is_none()),
            }
        }
    }
}

#[test]
fn value_update_converges_monotonically() {
    let mut agent = DecisionAgent::new(AgentConfig::default(), StdRng::seed_from_u64(1)).unwrap();
    let sim = classic(BehaviorKind::Random, 1);
    let state = AbstractState::observe(&sim);

    let mut previous = 0.0;
    for _ in 0..100 {
        agent.update_value(state, Intent::AvoidThreat, -50.0, state, true);
        let value = agent.table().get(&state, Intent::AvoidThreat);
        assert!(value <= previous);
        assert!(value >= -50.0);
        previous = value;
    }
    assert!((previous - -50.0).abs() < 0.01);
}

#[test]
fn trained_table_survives_save_and_load() {
    let sim = classic(BehaviorKind::Cyclic, 5);
    let mut game = Game::new(sim, DefaultObserver::quiet(), 200);
    let mut agent = DecisionAgent::new(AgentConfig::default(), StdRng::seed_from_u64(6)).unwrap();
    let config = TrainConfig {
        episodes: 5,
        log_every: 0,
        ..TrainConfig::default()
    };
    let summaries = train(&mut game, &mut agent, &config).unwrap();
    assert_eq!(summaries.len(), 5);

    let path = std::env::temp_dir().join(format!("dotbot-scenario-{}.json", std::process::id()));
    agent.table().save(&path).unwrap();
    let restored = ValueTable::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(&restored, agent.table());
    assert!(restored.len() <= AbstractState::COUNT);
}

#[test]
fn random_baseline_respects_step_ceiling() {
    let sim = classic(BehaviorKind::Mixed, 9);
    let mut game = Game::new(sim, DefaultObserver::quiet(), 40);
    let mut policy = RandomPolicy::new(StdRng::seed_from_u64(10));

    for summary in game.run(&mut policy, 5).unwrap() {
        assert!(summary.steps <= 40);
        if summary.end == EpisodeEnd::Truncated {
            assert_eq!(summary.steps, 40);
        }
    }
}
