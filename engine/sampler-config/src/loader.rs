//! Locating and reading config.toml, then layering `SAMPLER_*` environment
//! overrides on top.

use crate::CentralConfig;
use std::path::Path;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Places tried for config.toml when SAMPLER_CONFIG is unset or missing.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml", "/app/config.toml"];

/// Find the config file to load, if any.
///
/// An existing SAMPLER_CONFIG path wins over the search paths.
pub fn locate_config() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("SAMPLER_CONFIG").map(PathBuf::from) {
        if explicit.is_file() {
            return Some(explicit);
        }
        warn!(path = %explicit.display(), "SAMPLER_CONFIG does not exist, trying search paths");
    }

    CONFIG_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

/// Load the central configuration with environment overrides applied.
pub fn load_config() -> CentralConfig {
    match locate_config() {
        Some(path) => {
            info!(path = %path.display(), "Loading sampler config");
            load_from_path(&path)
        }
        None => {
            debug!("No config.toml found, using built-in defaults");
            apply_env_overrides(CentralConfig::default())
        }
    }
}

fn parse_file(path: &Path) -> Result<CentralConfig, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("unreadable: {}", e))?;
    toml::from_str(&content).map_err(|e| format!("invalid TOML: {}", e))
}

/// Load configuration from `path`.
///
/// Unreadable or malformed files fall back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    let config = parse_file(path).unwrap_or_else(|reason| {
        warn!(path = %path.display(), %reason, "Ignoring config file");
        CentralConfig::default()
    });
    apply_env_overrides(config)
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u64, f64, bool, enums with FromStr)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparseable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: SAMPLER_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "SAMPLER_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "SAMPLER_COMMON_LOG_LEVEL");

    // MCTS
    env_override!(
        config,
        mcts.exploration_constant,
        "SAMPLER_MCTS_EXPLORATION_CONSTANT",
        parse
    );
    env_override!(config, mcts.seed, "SAMPLER_MCTS_SEED", parse);
    env_override!(
        config,
        mcts.capture_snapshots,
        "SAMPLER_MCTS_CAPTURE_SNAPSHOTS",
        parse
    );

    // Sampling
    env_override!(
        config,
        sampling.strategy,
        "SAMPLER_SAMPLING_STRATEGY",
        parse
    );
    env_override!(
        config,
        sampling.max_samples,
        "SAMPLER_SAMPLING_MAX_SAMPLES",
        parse
    );
    env_override!(
        config,
        sampling.use_prefix_cache,
        "SAMPLER_SAMPLING_USE_PREFIX_CACHE",
        parse
    );

    // Program
    env_override!(config, program.depth, "SAMPLER_PROGRAM_DEPTH", parse);
    env_override!(
        config,
        program.branching,
        "SAMPLER_PROGRAM_BRANCHING",
        parse
    );
    env_override!(config, program.seed, "SAMPLER_PROGRAM_SEED", parse);
    env_override!(
        config,
        program.error_rate,
        "SAMPLER_PROGRAM_ERROR_RATE",
        parse
    );
    env_override!(
        config,
        program.boundary_rate,
        "SAMPLER_PROGRAM_BOUNDARY_RATE",
        parse
    );

    config
}
