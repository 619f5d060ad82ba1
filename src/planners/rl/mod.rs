//! Tabular value learning over two abstract intents
//!
//! The agent never picks primitive moves directly. Each turn it summarises the
//! simulation into a small discrete state, picks an intent epsilon-greedily
//! from its value table, and lets path search turn that intent into a move.
//!
//! # Architecture
//!
//! ```text
//! Simulation
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  AbstractState::observe()                                   │
//! │  - quadrant, threat flag, collectible bucket                │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DecisionAgent::choose_intent()                             │
//! │  - epsilon-greedy over SeekReward / AvoidThreat             │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DecisionAgent::intent_to_action()                          │
//! │  - goal cell by full scan, first step of the A* path        │
//! └─────────────────────────────────────────────────────────────┘
//!     │
//!     ▼
//! Simulation::step() ──► DecisionAgent::update_value()
//! ```

pub mod action_space;
pub mod agent;
pub mod config;
pub mod metrics;
pub mod state;
pub mod train;
pub mod value_table;

// Re-export commonly used types
pub use action_space::Intent;
pub use agent::{DecisionAgent, FALLBACK_ACTION};
pub use config::AgentConfig;
pub use metrics::{EvaluationMetrics, MovingAverage, TrainingMetrics};
pub use state::{AbstractState, CollectibleBucket, Quadrant};
pub use train::{AgentPolicy, TrainConfig, evaluate, train};
pub use value_table::{ValueEntry, ValueTable};
