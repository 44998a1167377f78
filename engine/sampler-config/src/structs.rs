//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use std::fmt;
use std::str::FromStr;

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_exploration() -> f64 {
    defaults::exploration_constant()
}
fn d_mcts_seed() -> u64 {
    defaults::mcts_seed()
}
fn d_capture_snapshots() -> bool {
    defaults::capture_snapshots()
}
fn d_strategy() -> StrategyKind {
    defaults::strategy()
}
fn d_max_samples() -> u64 {
    defaults::max_samples()
}
fn d_use_prefix_cache() -> bool {
    defaults::use_prefix_cache()
}
fn d_depth() -> usize {
    defaults::program_depth()
}
fn d_branching() -> usize {
    defaults::program_branching()
}
fn d_program_seed() -> u64 {
    defaults::program_seed()
}
fn d_error_rate() -> f64 {
    defaults::error_rate()
}
fn d_boundary_rate() -> f64 {
    defaults::boundary_rate()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Which analysis strategy drives the choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Monte Carlo Tree Search
    Mcts,
    /// Pure Monte Carlo, no learning between samples
    Random,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcts" => Ok(StrategyKind::Mcts),
            "random" => Ok(StrategyKind::Random),
            other => Err(format!("unknown strategy '{}', expected mcts or random", other)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Mcts => write!(f, "mcts"),
            StrategyKind::Random => write!(f, "random"),
        }
    }
}

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub program: ProgramConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
        }
    }
}

/// MCTS driver settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_exploration")]
    pub exploration_constant: f64,
    #[serde(default = "d_mcts_seed")]
    pub seed: u64,
    #[serde(default = "d_capture_snapshots")]
    pub capture_snapshots: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_constant: defaults::exploration_constant(),
            seed: defaults::mcts_seed(),
            capture_snapshots: defaults::capture_snapshots(),
        }
    }
}

/// Sampling run settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplingConfig {
    #[serde(default = "d_strategy")]
    pub strategy: StrategyKind,
    #[serde(default = "d_max_samples")]
    pub max_samples: u64,
    #[serde(default = "d_use_prefix_cache")]
    pub use_prefix_cache: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            strategy: defaults::strategy(),
            max_samples: defaults::max_samples(),
            use_prefix_cache: defaults::use_prefix_cache(),
        }
    }
}

/// Synthetic program under analysis
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProgramConfig {
    #[serde(default = "d_depth")]
    pub depth: usize,
    #[serde(default = "d_branching")]
    pub branching: usize,
    #[serde(default = "d_program_seed")]
    pub seed: u64,
    #[serde(default = "d_error_rate")]
    pub error_rate: f64,
    #[serde(default = "d_boundary_rate")]
    pub boundary_rate: f64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            depth: defaults::program_depth(),
            branching: defaults::program_branching(),
            seed: defaults::program_seed(),
            error_rate: defaults::error_rate(),
            boundary_rate: defaults::boundary_rate(),
        }
    }
}
