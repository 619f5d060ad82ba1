//! Run configuration for the binary, read from `DOTBOT_*` environment variables

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::game::DEFAULT_MAX_STEPS;
use crate::planners::rl::AgentConfig;
use crate::state::BehaviorKind;

/// What the binary does with the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Learn a value table, then report a greedy evaluation
    #[default]
    Train,
    /// Greedy episodes with a loaded table
    Eval,
    /// Uniform random baseline
    Random,
    /// Keyboard control on stdin
    Play,
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(RunMode::Train),
            "eval" | "evaluate" => Ok(RunMode::Eval),
            "random" | "baseline" => Ok(RunMode::Random),
            "play" => Ok(RunMode::Play),
            _ => Err(invalid("DOTBOT_MODE", value)),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Train => "train",
            RunMode::Eval => "eval",
            RunMode::Random => "random",
            RunMode::Play => "play",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: RunMode,
    pub episodes: usize,
    pub max_steps: usize,
    /// Seed for every generator; drawn from entropy when unset
    pub seed: Option<u64>,
    pub ghost_mode: BehaviorKind,
    /// Maze text file; the built-in layout when unset
    pub maze: Option<PathBuf>,
    /// Value table to load before and save after a run
    pub value_table: Option<PathBuf>,
    /// Directory for timestamped value-table snapshots after training
    pub save_dir: Option<PathBuf>,
    pub agent: AgentConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            episodes: 200,
            max_steps: DEFAULT_MAX_STEPS,
            seed: None,
            ghost_mode: BehaviorKind::Cyclic,
            maze: None,
            value_table: None,
            save_dir: None,
            agent: AgentConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their defaults; set but
    /// unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let agent = AgentConfig {
            learning_rate: parse_or(&lookup, "DOTBOT_LEARNING_RATE", defaults.agent.learning_rate)?,
            discount: parse_or(&lookup, "DOTBOT_DISCOUNT", defaults.agent.discount)?,
            epsilon_decay: parse_or(&lookup, "DOTBOT_EPSILON_DECAY", defaults.agent.epsilon_decay)?,
            ..defaults.agent
        };
        agent.validate()?;

        let max_steps = parse_or(&lookup, "DOTBOT_MAX_STEPS", defaults.max_steps)?;
        if max_steps == 0 {
            return Err(invalid("DOTBOT_MAX_STEPS", "0"));
        }

        Ok(Self {
            mode: parse_or(&lookup, "DOTBOT_MODE", defaults.mode)?,
            episodes: parse_or(&lookup, "DOTBOT_EPISODES", defaults.episodes)?,
            max_steps,
            seed: parse_opt(&lookup, "DOTBOT_SEED")?,
            ghost_mode: parse_or(&lookup, "DOTBOT_GHOST_MODE", defaults.ghost_mode)?,
            maze: path(&lookup, "DOTBOT_MAZE"),
            value_table: path(&lookup, "DOTBOT_VALUE_TABLE"),
            save_dir: path(&lookup, "DOTBOT_SAVE_DIR"),
            agent,
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn lookup_set<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup_set(lookup, key)
        .map(|value| value.trim().parse::<T>().map_err(|_| invalid(key, &value)))
        .transpose()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

fn path<F>(lookup: &F, key: &str) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup_set(lookup, key).map(PathBuf::from)
}
