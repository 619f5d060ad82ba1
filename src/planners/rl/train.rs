//! Training and evaluation loops for the decision agent

use tracing::info;

use crate::error::SimulationError;
use crate::game::{EpisodeSummary, Game};
use crate::infra::Direction;
use crate::planners::Policy;
use crate::sim::{Simulation, StepResult};

use super::action_space::Intent;
use super::agent::DecisionAgent;
use super::metrics::{EvaluationMetrics, TrainingMetrics};
use super::state::AbstractState;

/// Training configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainConfig {
    pub episodes: usize,
    /// Log rolling metrics every this many episodes
    pub log_every: usize,
    /// Window of the rolling metrics
    pub metrics_window: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            episodes: 200,
            log_every: 50,
            metrics_window: 100,
        }
    }
}

/// Adapts a `DecisionAgent` to the `Policy` interface. Chooses an intent each
/// turn and, when learning, updates the table from the turn's reward.
///
/// A greedy policy zeroes the agent's exploration rate and puts it back when
/// dropped.
pub struct AgentPolicy<'a> {
    agent: &'a mut DecisionAgent,
    learn: bool,
    pending: Option<(AbstractState, Intent)>,
    saved_epsilon: Option<f64>,
}

impl<'a> AgentPolicy<'a> {
    pub fn learning(agent: &'a mut DecisionAgent) -> Self {
        Self {
            agent,
            learn: true,
            pending: None,
            saved_epsilon: None,
        }
    }

    pub fn greedy(agent: &'a mut DecisionAgent) -> Self {
        let saved_epsilon = agent.set_greedy();
        Self {
            agent,
            learn: false,
            pending: None,
            saved_epsilon: Some(saved_epsilon),
        }
    }
}

impl Drop for AgentPolicy<'_> {
    fn drop(&mut self) {
        if let Some(epsilon) = self.saved_epsilon.take() {
            self.agent.restore_epsilon(epsilon);
        }
    }
}

impl Policy for AgentPolicy<'_> {
    fn act(&mut self, sim: &Simulation) -> Option<Direction> {
        let state = self.agent.observe(sim);
        let intent = self.agent.choose_intent(&state);
        self.pending = Some((state, intent));
        Some(self.agent.intent_to_action(sim, intent))
    }

    fn feedback(&mut self, sim: &Simulation, result: &StepResult) {
        let Some((state, intent)) = self.pending.take() else {
            return;
        };
        if self.learn {
            let next_state = self.agent.observe(sim);
            self.agent
                .update_value(state, intent, result.reward, next_state, result.done);
        }
    }

    fn end_episode(&mut self) {
        self.pending = None;
        if self.learn {
            self.agent.end_episode();
        }
    }
}

/// Run `config.episodes` learning episodes and return their summaries in order.
pub fn train(
    game: &mut Game,
    agent: &mut DecisionAgent,
    config: &TrainConfig,
) -> Result<Vec<EpisodeSummary>, SimulationError> {
    info!(
        "Training for {} episodes (max {} steps each)",
        config.episodes,
        game.max_steps()
    );

    let mut metrics = TrainingMetrics::new(config.metrics_window);
    let mut summaries = Vec::with_capacity(config.episodes);
    for episode in 1..=config.episodes {
        let summary = {
            let mut policy = AgentPolicy::learning(agent);
            game.run_episode(&mut policy)?
        };
        metrics.record_episode(&summary);
        summaries.push(summary);

        if config.log_every > 0 && episode % config.log_every == 0 {
            metrics.log_to_console(agent.epsilon(), agent.table().len());
        }
    }

    info!(
        "Training finished: {} states learned, epsilon {:.3}",
        agent.table().len(),
        agent.epsilon()
    );
    Ok(summaries)
}

/// Run greedy episodes without updating the table. The agent's exploration
/// rate is unchanged afterwards.
pub fn evaluate(
    game: &mut Game,
    agent: &mut DecisionAgent,
    episodes: usize,
) -> Result<EvaluationMetrics, SimulationError> {
    let mut metrics = EvaluationMetrics::new();
    let mut policy = AgentPolicy::greedy(agent);
    for _ in 0..episodes {
        metrics.record_episode(&game.run_episode(&mut policy)?);
    }
    Ok(metrics)
}
