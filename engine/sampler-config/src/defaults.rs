//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so the binary and every
//! library agree on the same defaults.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::structs::StrategyKind;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    sampling: SamplingDefaults,
    program: ProgramDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    exploration_constant: f64,
    seed: u64,
    capture_snapshots: bool,
}

#[derive(Debug, Deserialize)]
struct SamplingDefaults {
    strategy: StrategyKind,
    max_samples: u64,
    use_prefix_cache: bool,
}

#[derive(Debug, Deserialize)]
struct ProgramDefaults {
    depth: usize,
    branching: usize,
    seed: u64,
    error_rate: f64,
    boundary_rate: f64,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// MCTS
pub fn exploration_constant() -> f64 {
    DEFAULTS.mcts.exploration_constant
}
pub fn mcts_seed() -> u64 {
    DEFAULTS.mcts.seed
}
pub fn capture_snapshots() -> bool {
    DEFAULTS.mcts.capture_snapshots
}

// Sampling
pub fn strategy() -> StrategyKind {
    DEFAULTS.sampling.strategy
}
pub fn max_samples() -> u64 {
    DEFAULTS.sampling.max_samples
}
pub fn use_prefix_cache() -> bool {
    DEFAULTS.sampling.use_prefix_cache
}

// Program
pub fn program_depth() -> usize {
    DEFAULTS.program.depth
}
pub fn program_branching() -> usize {
    DEFAULTS.program.branching
}
pub fn program_seed() -> u64 {
    DEFAULTS.program.seed
}
pub fn error_rate() -> f64 {
    DEFAULTS.program.error_rate
}
pub fn boundary_rate() -> f64 {
    DEFAULTS.program.boundary_rate
}
