use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};

use dotbot::config::{RunConfig, RunMode};
use dotbot::default_observer::DefaultObserver;
use dotbot::game::Game;
use dotbot::infra::Direction;
use dotbot::planners::rl::{
    DecisionAgent, EvaluationMetrics, TrainConfig, ValueTable, evaluate, train,
};
use dotbot::planners::{Policy, RandomPolicy};
use dotbot::sim::{RewardConfig, Simulation};
use dotbot::state::Maze;
use dotenv::dotenv;
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dotbot=info,warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Reads w/a/s/d lines from stdin. `q` or end of input stops the episode.
struct Keyboard;

impl Policy for Keyboard {
    fn act(&mut self, _sim: &Simulation) -> Option<Direction> {
        let stdin = io::stdin();
        loop {
            print!("move [w/a/s/d, q to quit]: ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            match line.trim() {
                "w" => return Some(Direction::Up),
                "s" => return Some(Direction::Down),
                "a" => return Some(Direction::Left),
                "d" => return Some(Direction::Right),
                "q" => return None,
                other => println!("unknown key {:?}", other),
            }
        }
    }
}

fn seeded(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_os_rng(),
    }
}

fn load_maze(config: &RunConfig) -> Result<Maze, Box<dyn Error>> {
    let maze = match &config.maze {
        Some(path) => Maze::parse(&fs::read_to_string(path)?)?,
        None => Maze::classic()?,
    };
    info!(
        "Maze {}x{}: {} collectibles, {} adversaries ({})",
        maze.width,
        maze.height,
        maze.total_collectibles(),
        maze.adversary_spawns().len(),
        config.ghost_mode
    );
    Ok(maze)
}

fn load_agent(config: &RunConfig) -> Result<DecisionAgent, Box<dyn Error>> {
    let table = match &config.value_table {
        Some(path) if path.exists() => ValueTable::load_or_empty(path),
        Some(path) => {
            info!("No value table at {}, starting empty", path.display());
            ValueTable::new()
        }
        None => ValueTable::new(),
    };
    Ok(DecisionAgent::with_table(config.agent, table, seeded(config.seed, 2))?)
}

fn save_agent(config: &RunConfig, agent: &DecisionAgent) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &config.value_table {
        agent.table().save(path)?;
    }
    if let Some(dir) = &config.save_dir {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        agent.table().save(&ValueTable::snapshot_path(dir, now)?)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    init_logging()?;

    let config = RunConfig::from_env()?;
    info!("Mode: {}", config.mode);
    if let Some(seed) = config.seed {
        info!("- seed: {}", seed);
    }

    let maze = load_maze(&config)?;
    let rewards = RewardConfig::for_collectibles(maze.total_collectibles());
    let sim = Simulation::new(maze, config.ghost_mode, rewards, seeded(config.seed, 1))?;

    match config.mode {
        RunMode::Train => {
            let mut game = Game::new(sim, DefaultObserver::quiet(), config.max_steps);
            let mut agent = load_agent(&config)?;
            let train_config = TrainConfig {
                episodes: config.episodes,
                ..TrainConfig::default()
            };
            train(&mut game, &mut agent, &train_config)?;
            save_agent(&config, &agent)?;

            let episodes = (config.episodes / 10).max(1);
            evaluate(&mut game, &mut agent, episodes)?.log_summary("Greedy Evaluation");
        }
        RunMode::Eval => {
            let mut game = Game::new(sim, DefaultObserver::quiet(), config.max_steps);
            let mut agent = load_agent(&config)?;
            if agent.table().is_empty() {
                warn!("Evaluating with an empty value table");
            }
            evaluate(&mut game, &mut agent, config.episodes)?.log_summary("Evaluation");
        }
        RunMode::Random => {
            let mut game = Game::new(sim, DefaultObserver::quiet(), config.max_steps);
            let mut policy = RandomPolicy::new(seeded(config.seed, 3));
            let mut metrics = EvaluationMetrics::new();
            for summary in game.run(&mut policy, config.episodes)? {
                metrics.record_episode(&summary);
            }
            metrics.log_summary("Random Baseline");
        }
        RunMode::Play => {
            let mut game = Game::new(sim, DefaultObserver::rendering(), config.max_steps);
            game.run_episode(&mut Keyboard)?;
        }
    }

    Ok(())
}
