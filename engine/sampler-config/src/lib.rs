//! Sampler configuration.
//!
//! One `CentralConfig` is assembled from three layers, later layers winning:
//! the defaults compiled in from `config.defaults.toml`, an optional
//! `config.toml` on disk, and `SAMPLER_<SECTION>_<KEY>` environment
//! variables. The sampler binary puts its command-line flags on top.
//!
//! ```text
//! SAMPLER_MCTS_EXPLORATION_CONSTANT=2.0
//! SAMPLER_SAMPLING_STRATEGY=random
//! SAMPLER_PROGRAM_DEPTH=20
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, locate_config, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
