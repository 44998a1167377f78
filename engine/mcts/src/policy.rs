//! Selection and simulation policies.
//!
//! Selection runs while the cursor is inside the permanent search tree and
//! balances exploration against exploitation. Simulation (rollout) runs once
//! the cursor has left the tree and does not look at tree statistics.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sampling_core::{Choice, ExecutionContext};

use crate::node::NodeId;
use crate::tree::DecisionTree;

/// Policy used inside the search tree.
pub trait SelectionPolicy {
    /// Pick the in-tree child of `node` to descend into, restricted to
    /// children whose choice is in `eligible`. Returns None if there is no
    /// such child.
    fn select_best_child(
        &mut self,
        tree: &DecisionTree,
        node: NodeId,
        eligible: &[Choice],
    ) -> Option<NodeId>;

    /// Pick which unexpanded choice of a frontier node to expand.
    /// `unexpanded` is never empty.
    fn expand_child(&mut self, tree: &DecisionTree, node: NodeId, unexpanded: &[Choice]) -> Choice;
}

/// Policy used during playout, outside the search tree.
pub trait SimulationPolicy {
    /// Pick one of `eligible` (never empty).
    fn select_choice(&mut self, ctx: &dyn ExecutionContext, eligible: &[Choice]) -> Choice;
}

/// UCB1 selection with uniformly random expansion.
///
/// Ties between equal UCB scores go to the lowest choice id so that runs are
/// reproducible under a fixed seed.
#[derive(Debug, Clone)]
pub struct UcbSelection {
    exploration: f64,
    rng: ChaCha20Rng,
}

impl UcbSelection {
    pub fn new(exploration: f64, seed: u64) -> Self {
        Self {
            exploration,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn exploration(&self) -> f64 {
        self.exploration
    }
}

impl SelectionPolicy for UcbSelection {
    fn select_best_child(
        &mut self,
        tree: &DecisionTree,
        node: NodeId,
        eligible: &[Choice],
    ) -> Option<NodeId> {
        let parent = tree.get(node);
        // Pre-compute ln once instead of per-child comparison
        let ln_parent_visits = (parent.visits as f64).ln();

        let mut best: Option<(Choice, NodeId, f64)> = None;
        for &choice in eligible {
            let Some(child_id) = parent.child(choice) else {
                continue;
            };
            let child = tree.get(child_id);
            if !child.in_tree {
                continue;
            }

            let score = child.ucb_score(ln_parent_visits, self.exploration);
            let better = match best {
                None => true,
                Some((best_choice, _, best_score)) => {
                    score > best_score || (score == best_score && choice < best_choice)
                }
            };
            if better {
                best = Some((choice, child_id, score));
            }
        }

        best.map(|(_, id, _)| id)
    }

    fn expand_child(
        &mut self,
        _tree: &DecisionTree,
        _node: NodeId,
        unexpanded: &[Choice],
    ) -> Choice {
        unexpanded[self.rng.gen_range(0..unexpanded.len())]
    }
}

/// Uniformly random rollout.
#[derive(Debug, Clone)]
pub struct RandomSimulation {
    rng: ChaCha20Rng,
}

impl RandomSimulation {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl SimulationPolicy for RandomSimulation {
    fn select_choice(&mut self, _ctx: &dyn ExecutionContext, eligible: &[Choice]) -> Choice {
        eligible[self.rng.gen_range(0..eligible.len())]
    }
}
