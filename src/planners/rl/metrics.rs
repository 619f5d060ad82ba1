//! Episode metrics for training progress and evaluation runs

use std::collections::VecDeque;
use std::time::Instant;

use crate::game::{EpisodeEnd, EpisodeSummary};

/// Moving average calculator
#[derive(Debug, Clone)]
pub struct MovingAverage {
    values: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.values.len() >= self.window_size
            && let Some(old) = self.values.pop_front()
        {
            self.sum -= old;
        }
        self.values.push_back(value);
        self.sum += value;
    }

    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rolling view of recent training episodes
#[derive(Debug)]
pub struct TrainingMetrics {
    pub episode_rewards: MovingAverage,
    pub episode_lengths: MovingAverage,
    pub clear_rate: MovingAverage,
    pub collision_rate: MovingAverage,
    /// Episodes recorded so far
    pub episodes: usize,
    /// Turns across all recorded episodes
    pub total_steps: usize,
    start_time: Instant,
}

impl TrainingMetrics {
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: MovingAverage::new(window_size),
            episode_lengths: MovingAverage::new(window_size),
            clear_rate: MovingAverage::new(window_size),
            collision_rate: MovingAverage::new(window_size),
            episodes: 0,
            total_steps: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += summary.steps;
        self.episode_rewards.push(summary.reward);
        self.episode_lengths.push(summary.steps as f64);
        self.clear_rate.push(indicator(summary.end == EpisodeEnd::Cleared));
        self.collision_rate.push(indicator(summary.end == EpisodeEnd::Collided));
    }

    pub fn steps_per_second(&self) -> f64 {
        let duration = self.start_time.elapsed().as_secs_f64();
        if duration > 0.0 {
            self.total_steps as f64 / duration
        } else {
            0.0
        }
    }

    pub fn log_to_console(&self, epsilon: f64, states: usize) {
        tracing::info!(
            "Episode {} | steps {} | SPS {:.1} | epsilon {:.3} | states {}",
            self.episodes,
            self.total_steps,
            self.steps_per_second(),
            epsilon,
            states
        );
        tracing::info!(
            "  Recent: reward={:.2}, length={:.1}, cleared={:.1}%, collided={:.1}%",
            self.episode_rewards.average(),
            self.episode_lengths.average(),
            self.clear_rate.average() * 100.0,
            self.collision_rate.average() * 100.0
        );
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Totals over a fixed batch of episodes, for comparing policies
#[derive(Debug, Clone, Default)]
pub struct EvaluationMetrics {
    pub num_episodes: usize,
    pub total_reward: f64,
    pub total_steps: usize,
    pub num_cleared: usize,
    pub num_collided: usize,
    pub num_truncated: usize,
}

impl EvaluationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_episode(&mut self, summary: &EpisodeSummary) {
        self.num_episodes += 1;
        self.total_reward += summary.reward;
        self.total_steps += summary.steps;
        match summary.end {
            EpisodeEnd::Cleared => self.num_cleared += 1,
            EpisodeEnd::Collided => self.num_collided += 1,
            EpisodeEnd::Truncated => self.num_truncated += 1,
        }
    }

    pub fn avg_reward(&self) -> f64 {
        self.per_episode(self.total_reward)
    }

    pub fn avg_steps(&self) -> f64 {
        self.per_episode(self.total_steps as f64)
    }

    pub fn clear_rate(&self) -> f64 {
        self.per_episode(self.num_cleared as f64)
    }

    pub fn collision_rate(&self) -> f64 {
        self.per_episode(self.num_collided as f64)
    }

    fn per_episode(&self, total: f64) -> f64 {
        if self.num_episodes > 0 {
            total / self.num_episodes as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self, label: &str) {
        tracing::info!("=== {} Summary ===", label);
        tracing::info!("Episodes: {}", self.num_episodes);
        tracing::info!("Avg Reward: {:.2}", self.avg_reward());
        tracing::info!("Avg Steps: {:.1}", self.avg_steps());
        tracing::info!("Clear Rate: {:.1}%", self.clear_rate() * 100.0);
        tracing::info!("Collision Rate: {:.1}%", self.collision_rate() * 100.0);
        tracing::info!("Truncated: {}", self.num_truncated);
    }
}

fn indicator(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(reward: f64, steps: usize, end: EpisodeEnd) -> EpisodeSummary {
        EpisodeSummary { reward, steps, end }
    }

    #[test]
    fn test_moving_average() {
        let mut avg = MovingAverage::new(3);
        assert!(avg.is_empty());

        avg.push(1.0);
        assert!((avg.average() - 1.0).abs() < 1e-9);

        avg.push(2.0);
        assert!((avg.average() - 1.5).abs() < 1e-9);

        avg.push(3.0);
        assert!((avg.average() - 2.0).abs() < 1e-9);

        avg.push(4.0); // Pushes out 1.0
        assert!((avg.average() - 3.0).abs() < 1e-9);
        assert_eq!(avg.len(), 3);
    }

    #[test]
    fn test_evaluation_metrics() {
        let mut metrics = EvaluationMetrics::new();

        metrics.record_episode(&summary(250.0, 50, EpisodeEnd::Cleared));
        metrics.record_episode(&summary(-80.0, 20, EpisodeEnd::Collided));
        metrics.record_episode(&summary(-5.0, 500, EpisodeEnd::Truncated));
        metrics.record_episode(&summary(15.0, 30, EpisodeEnd::Collided));

        assert_eq!(metrics.num_episodes, 4);
        assert!((metrics.avg_reward() - 45.0).abs() < 1e-9);
        assert!((metrics.avg_steps() - 150.0).abs() < 1e-9);
        assert!((metrics.clear_rate() - 0.25).abs() < 1e-9);
        assert!((metrics.collision_rate() - 0.5).abs() < 1e-9);
        assert_eq!(metrics.num_truncated, 1);
    }

    #[test]
    fn test_training_metrics_window() {
        let mut metrics = TrainingMetrics::new(2);
        metrics.record_episode(&summary(10.0, 4, EpisodeEnd::Cleared));
        metrics.record_episode(&summary(0.0, 6, EpisodeEnd::Collided));
        metrics.record_episode(&summary(20.0, 8, EpisodeEnd::Collided));

        assert_eq!(metrics.episodes, 3);
        assert_eq!(metrics.total_steps, 18);
        assert!((metrics.episode_rewards.average() - 10.0).abs() < 1e-9);
        assert!((metrics.collision_rate.average() - 1.0).abs() < 1e-9);
        assert!(metrics.clear_rate.average().abs() < 1e-9);
    }
}
