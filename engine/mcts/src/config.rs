//! MCTS configuration parameters.

/// Configuration for a sampling run driven by MCTS.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Exploration constant for the UCB formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    /// Rewards are not normalized, so scale this with the reward range.
    pub exploration_constant: f64,

    /// Seed for the selection and simulation RNGs.
    pub seed: u64,

    /// Store an engine snapshot on every created node.
    pub capture_snapshots: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f64::consts::SQRT_2,
            seed: 42,
            capture_snapshots: true,
        }
    }
}

impl MctsConfig {
    /// Create a fast, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            exploration_constant: 1.0,
            seed: 0,
            capture_snapshots: false,
        }
    }

    /// Builder pattern: set the UCB exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder pattern: enable or disable snapshot capture on nodes.
    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.capture_snapshots = enabled;
        self
    }
}
