//! Configuration for the decision agent

use crate::error::ConfigError;

/// Value-update and exploration parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    /// Step size of the value update, in (0, 1]
    pub learning_rate: f64,
    /// Weight of the next state's best value, in [0, 1)
    pub discount: f64,
    /// Exploration rate of the first episode
    pub epsilon_start: f64,
    /// Floor the exploration rate decays toward
    pub epsilon_min: f64,
    /// Multiplier applied to epsilon after each episode, in (0, 1]
    pub epsilon_decay: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_min: 0.05,
            epsilon_decay: 0.995,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::LearningRate(self.learning_rate));
        }
        if !(0.0..1.0).contains(&self.discount) {
            return Err(ConfigError::Discount(self.discount));
        }

        let in_unit = |value: f64| (0.0..=1.0).contains(&value);
        let schedule_ok = in_unit(self.epsilon_start)
            && in_unit(self.epsilon_min)
            && self.epsilon_min <= self.epsilon_start
            && self.epsilon_decay > 0.0
            && self.epsilon_decay <= 1.0;
        if !schedule_ok {
            return Err(ConfigError::EpsilonSchedule {
                start: self.epsilon_start,
                min: self.epsilon_min,
                decay: self.epsilon_decay,
            });
        }

        Ok(())
    }
}
