pub mod config;
pub mod default_observer;
pub mod error;
pub mod game;
pub mod game_observer;
pub mod infra;
pub mod planners;
pub mod sim;
pub mod state;

// Re-export commonly used types for convenience
pub use game::{EpisodeEnd, EpisodeSummary, Game};
pub use infra::{AStar, Direction, Position};
pub use sim::{Outcome, Simulation};
pub use state::Maze;
