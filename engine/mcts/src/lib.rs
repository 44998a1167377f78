//! Monte Carlo Tree Search (MCTS) guided sampling of program paths.
//!
//! An execution engine (symbolic or concrete) explores a branching program
//! one path at a time. This crate decides which branch to take at each
//! decision point so that, over many samples, exploration concentrates on
//! paths that score a high reward, e.g. the deepest or most expensive ones.
//!
//! # Overview
//!
//! Each sample is one engine path and goes through the four MCTS phases:
//!
//! 1. **Selection**: While inside the search tree, descend with UCB1 over
//!    volume-weighted statistics
//! 2. **Expansion**: At the first node with an unexpanded eligible choice,
//!    pick one; its node is created once the engine reaches the next
//!    decision point (or terminates)
//! 3. **Simulation**: Below the frontier, choose with a rollout policy and
//!    record playout nodes that are not part of the search tree
//! 4. **Backpropagation**: On termination, add the path volume to `visits`
//!    and the volume-amplified reward to `reward_sum` of every node from the
//!    last one up to and including the root
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{MctsConfig, MctsStrategy, SamplingAnalysis, SampleVerdict};
//! use sampling_core::{DepthReward, SampleSizeTermination, UnitVolume};
//!
//! let config = MctsConfig::default();
//! let mut analysis = SamplingAnalysis::new(
//!     MctsStrategy::from_config(&config),
//!     Box::new(DepthReward),
//!     Box::new(UnitVolume),
//!     Box::new(SampleSizeTermination::new(1000)),
//! );
//!
//! analysis.started();
//! // Engine loop: call `analysis.decision_point(..)` at every branch and
//! // `analysis.path_terminated(..)` at every path end until it says Stop.
//! analysis.finished();
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls the driver:
//!
//! - `exploration_constant`: UCB exploration constant (default: sqrt(2))
//! - `seed`: Seed for the selection and rollout RNGs (default: 42)
//! - `capture_snapshots`: Store an engine snapshot on every node (default: true)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       SamplingAnalysis                       │
//! │  best results · prefix trie · termination · observers        │
//! ├──────────────────────────────────────────────────────────────┤
//! │                  AnalysisStrategy (MCTS / random)            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────┐   │
//! │  │ DecisionTree │  │ NodeFactory  │  │ Selection /       │   │
//! │  │   (arena)    │  │              │  │ Simulation policy │   │
//! │  └──────────────┘  └──────────────┘  └───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod analysis;
pub mod config;
pub mod factory;
pub mod node;
pub mod policy;
pub mod search;
pub mod strategy;
pub mod tree;
pub mod trie;

#[cfg(test)]
mod testing;

// Re-export main types
pub use analysis::{AnalysisError, DecisionResponse, SampleVerdict, SamplingAnalysis};
pub use config::MctsConfig;
pub use factory::{DefaultNodeFactory, NodeCreationError, NodeFactory};
pub use node::{DecisionNode, NodeId};
pub use policy::{RandomSimulation, SelectionPolicy, SimulationPolicy, UcbSelection};
pub use search::{MctsObserver, MctsPhase, MctsStrategy};
pub use strategy::{AnalysisStrategy, RandomStrategy, StrategyError};
pub use tree::{DecisionTree, TreeStats};
pub use trie::{PrefixTrie, TrieError};
