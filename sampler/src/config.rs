//! Configuration for the sampler binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use sampler_config::{load_config, CentralConfig, StrategyKind};
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_strategy() -> StrategyKind {
    CENTRAL_CONFIG.sampling.strategy
}

fn default_max_samples() -> u64 {
    CENTRAL_CONFIG.sampling.max_samples
}

fn default_use_prefix_cache() -> bool {
    CENTRAL_CONFIG.sampling.use_prefix_cache
}

fn default_exploration_constant() -> f64 {
    CENTRAL_CONFIG.mcts.exploration_constant
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.mcts.seed
}

fn default_capture_snapshots() -> bool {
    CENTRAL_CONFIG.mcts.capture_snapshots
}

fn default_depth() -> usize {
    CENTRAL_CONFIG.program.depth
}

fn default_branching() -> usize {
    CENTRAL_CONFIG.program.branching
}

fn default_program_seed() -> u64 {
    CENTRAL_CONFIG.program.seed
}

fn default_error_rate() -> f64 {
    CENTRAL_CONFIG.program.error_rate
}

fn default_boundary_rate() -> f64 {
    CENTRAL_CONFIG.program.boundary_rate
}

#[derive(Parser, Debug, Clone)]
#[command(name = "sampler")]
#[command(about = "Statistical path sampler guided by Monte Carlo Tree Search")]
#[command(
    long_about = "Samples paths of a synthetic branching program, steering towards
high-reward paths with MCTS (or plain Monte Carlo for comparison), and writes
run statistics and per-sample rewards to the data directory.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Data directory for statistics and reward logs
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Analysis strategy (mcts or random)
    #[arg(long, default_value_t = default_strategy())]
    pub strategy: StrategyKind,

    /// Number of paths to sample
    #[arg(long, default_value_t = default_max_samples())]
    pub max_samples: u64,

    /// Report replay hints for prefixes already executed
    #[arg(long, action = clap::ArgAction::Set, default_value_t = default_use_prefix_cache())]
    pub use_prefix_cache: bool,

    /// UCB exploration constant
    #[arg(long, default_value_t = default_exploration_constant())]
    pub exploration_constant: f64,

    /// Seed for the strategy RNGs
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Store the path condition on every tree node
    #[arg(long, action = clap::ArgAction::Set, default_value_t = default_capture_snapshots())]
    pub capture_snapshots: bool,

    /// Number of decisions on a complete path of the program
    #[arg(long, default_value_t = default_depth())]
    pub depth: usize,

    /// Choices per decision point
    #[arg(long, default_value_t = default_branching())]
    pub branching: usize,

    /// Seed of the program landscape
    #[arg(long, default_value_t = default_program_seed())]
    pub program_seed: u64,

    /// Per-decision probability of a failing path
    #[arg(long, default_value_t = default_error_rate())]
    pub error_rate: f64,

    /// Per-decision probability of hitting a resource bound
    #[arg(long, default_value_t = default_boundary_rate())]
    pub boundary_rate: f64,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.max_samples == 0 {
            return Err(anyhow!("max_samples must be greater than 0"));
        }

        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(anyhow!(
                "exploration_constant must be a non-negative number, got {}",
                self.exploration_constant
            ));
        }

        if self.depth == 0 {
            return Err(anyhow!("depth must be greater than 0"));
        }

        if self.branching == 0 {
            return Err(anyhow!("branching must be greater than 0"));
        }

        for (name, rate) in [
            ("error_rate", self.error_rate),
            ("boundary_rate", self.boundary_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(anyhow!("{} must be within [0, 1], got {}", name, rate));
            }
        }
        if self.error_rate + self.boundary_rate > 1.0 {
            return Err(anyhow!("error_rate + boundary_rate must not exceed 1"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Path of the JSON run report
    pub fn stats_path(&self) -> String {
        format!("{}/sampler_stats.json", self.data_dir)
    }

    /// Path of the per-sample reward CSV
    pub fn rewards_path(&self) -> String {
        format!("{}/rewards.csv", self.data_dir)
    }
}
