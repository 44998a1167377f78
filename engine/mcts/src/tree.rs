//! Decision tree with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices.
//! Parent links are plain indices, so ancestor walks are O(depth) without
//! any ownership cycle. The tree only grows during a run.

use sampling_core::{Choice, Path, StateSnapshot};

use crate::factory::NodeCreationError;
use crate::node::{DecisionNode, NodeId};

/// Decision tree with arena-based node storage.
#[derive(Debug)]
pub struct DecisionTree {
    /// Arena storing all nodes
    nodes: Vec<DecisionNode>,

    /// Root node index (NONE until the first decision point is seen)
    root: NodeId,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create an empty tree. The root is created lazily.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId::NONE,
        }
    }

    /// Get the root node ID, if the root exists.
    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root.is_some().then_some(self.root)
    }

    /// Create the root node. Returns the existing root if there already is one.
    pub fn create_root(
        &mut self,
        total_choices: usize,
        snapshot: StateSnapshot,
    ) -> Result<NodeId, NodeCreationError> {
        if let Some(root) = self.root() {
            return Ok(root);
        }
        let id = self.allocate(DecisionNode::new_root(total_choices, snapshot))?;
        self.root = id;
        Ok(id)
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &DecisionNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut DecisionNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    fn allocate(&mut self, node: DecisionNode) -> Result<NodeId, NodeCreationError> {
        let index = u32::try_from(self.nodes.len())
            .ok()
            .filter(|&i| i != NodeId::NONE.0)
            .ok_or(NodeCreationError::ArenaExhausted)?;
        self.nodes.push(node);
        Ok(NodeId(index))
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[DecisionNode] {
        &self.nodes
    }

    /// Child of `parent` reached by `choice`, if materialized.
    #[inline]
    pub fn child(&self, parent: NodeId, choice: Choice) -> Option<NodeId> {
        self.get(parent).child(choice)
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    ///
    /// Fails with `DuplicateChild` if `parent` already has a child for
    /// `choice`; the existing entry is left untouched.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        choice: Choice,
        total_choices: usize,
        snapshot: StateSnapshot,
    ) -> Result<NodeId, NodeCreationError> {
        if self.get(parent).has_child_for_choice(choice) {
            return Err(NodeCreationError::DuplicateChild {
                parent: parent.0,
                choice,
            });
        }

        let child = DecisionNode::new_child(parent, choice, total_choices, snapshot);
        let child_id = self.allocate(child)?;

        // Add to parent's children
        self.get_mut(parent).children.push((choice, child_id));

        Ok(child_id)
    }

    /// Backpropagate one sample from `leaf` up to and including the root.
    ///
    /// Every node on the way gains `path_volume` visits and
    /// `amplified_reward` reward. Visits are volume mass, not a sample count.
    ///
    /// Accumulators clamp at the integer bounds. Returns true if any of them
    /// had to be clamped.
    pub fn backpropagate(
        &mut self,
        leaf: NodeId,
        amplified_reward: i64,
        path_volume: u64,
    ) -> bool {
        let mut current = leaf;
        let mut saturated = false;

        while current.is_some() {
            let node = self.get_mut(current);
            saturated |= node.visits.checked_add(path_volume).is_none()
                || node.reward_sum.checked_add(amplified_reward).is_none();
            node.visits = node.visits.saturating_add(path_volume);
            node.reward_sum = node.reward_sum.saturating_add(amplified_reward);
            current = node.parent;
        }

        saturated
    }

    /// Choices from the root down to `node` (root's own choice excluded).
    pub fn path_to(&self, node: NodeId) -> Path {
        let mut choices = Vec::new();
        let mut current = node;
        while current.is_some() {
            let n = self.get(current);
            if n.is_root() {
                break;
            }
            choices.push(n.choice);
            current = n.parent;
        }
        choices.reverse();
        Path::from_choices(choices)
    }

    /// Depth of `node` (root = 0).
    pub fn depth(&self, node: NodeId) -> u32 {
        let mut depth = 0;
        let mut current = self.get(node).parent;
        while current.is_some() {
            depth += 1;
            current = self.get(current).parent;
        }
        depth
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let (root_visits, root_mean_reward) = match self.root() {
            Some(root) => {
                let node = self.get(root);
                (node.visits, node.mean_reward())
            }
            None => (0, 0.0),
        };

        TreeStats {
            total_nodes: self.nodes.len(),
            in_tree_nodes: self.nodes.iter().filter(|n| n.in_tree).count(),
            root_visits,
            root_mean_reward,
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        let Some(root) = self.root() else {
            return 0;
        };

        // Iterative so deep sampled paths cannot overflow the stack
        let mut max_depth = 0;
        let mut stack = vec![(root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &(_, child) in &self.get(id).children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }
}

/// Statistics about a decision tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub in_tree_nodes: usize,
    pub root_visits: u64,
    pub root_mean_reward: f64,
    pub max_depth: u32,
}
