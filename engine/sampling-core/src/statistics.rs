//! Streaming reward statistics collected as an analysis observer.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use crate::observer::{AnalysisObserver, SampleEvent};
use crate::result::SamplingResult;

/// Summary statistics over raw sample rewards.
///
/// Mean and variance are accumulated with Welford's update so nothing
/// proportional to the number of samples is kept in memory.
#[derive(Debug, Default)]
pub struct SampleStatistics {
    started: Option<Instant>,
    count: u64,
    mean: f64,
    m2: f64,
    min_reward: Option<i64>,
    best_reward: Option<i64>,
    best_reward_sample: u64,
    best_reward_time: Duration,
    best_reward_ties: u64,
    previously_sampled: u64,
    total_samples: u64,
    analysis_time: Duration,
}

/// Serializable view of `SampleStatistics`.
#[derive(Debug, Clone, Serialize)]
pub struct SampleStatisticsSnapshot {
    pub total_samples: u64,
    pub min_reward: Option<i64>,
    pub best_reward: Option<i64>,
    pub best_reward_sample: u64,
    pub best_reward_secs: f64,
    pub best_reward_ties: u64,
    pub previously_sampled: u64,
    pub reward_mean: f64,
    pub reward_variance: f64,
    pub reward_stddev: f64,
    pub analysis_secs: f64,
    pub samples_per_second: f64,
}

impl SampleStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample (n - 1) variance; 0 with fewer than two samples.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn stddev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min_reward(&self) -> Option<i64> {
        self.min_reward
    }

    pub fn best_reward(&self) -> Option<i64> {
        self.best_reward
    }

    pub fn best_reward_sample(&self) -> u64 {
        self.best_reward_sample
    }

    /// Number of samples that hit the current best reward.
    pub fn best_reward_ties(&self) -> u64 {
        self.best_reward_ties
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn throughput(&self) -> f64 {
        let secs = self.analysis_time.as_secs_f64();
        if secs > 0.0 {
            self.total_samples as f64 / secs
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> SampleStatisticsSnapshot {
        SampleStatisticsSnapshot {
            total_samples: self.total_samples,
            min_reward: self.min_reward,
            best_reward: self.best_reward,
            best_reward_sample: self.best_reward_sample,
            best_reward_secs: self.best_reward_time.as_secs_f64(),
            best_reward_ties: self.best_reward_ties,
            previously_sampled: self.previously_sampled,
            reward_mean: self.mean,
            reward_variance: self.variance(),
            reward_stddev: self.stddev(),
            analysis_secs: self.analysis_time.as_secs_f64(),
            samples_per_second: self.throughput(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }
}

impl AnalysisObserver for SampleStatistics {
    fn analysis_started(&mut self) {
        self.started = Some(Instant::now());
    }

    fn sample_done(&mut self, event: &SampleEvent<'_>) {
        let reward = event.reward;

        self.count += 1;
        let delta = reward as f64 - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (reward as f64 - self.mean);

        self.min_reward = Some(self.min_reward.map_or(reward, |m| m.min(reward)));

        match self.best_reward {
            Some(best) if reward == best => self.best_reward_ties += 1,
            Some(best) if reward < best => {}
            _ => {
                self.best_reward = Some(reward);
                self.best_reward_sample = event.sample;
                self.best_reward_time = self.elapsed();
                self.best_reward_ties = 1;
            }
        }

        if event.previously_sampled {
            self.previously_sampled += 1;
        }
    }

    fn analysis_done(&mut self, result: &SamplingResult) {
        self.analysis_time = self.elapsed();
        self.total_samples = result.sample_count();

        info!(
            samples = self.total_samples,
            mean = format!("{:.3}", self.mean()),
            stddev = format!("{:.3}", self.stddev()),
            best = ?self.best_reward,
            best_sample = self.best_reward_sample,
            samples_per_sec = format!("{:.1}", self.throughput()),
            "Reward statistics"
        );
    }
}
