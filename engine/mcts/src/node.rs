//! Decision tree node representation.
//!
//! Each node stands for one decision point reached by taking `choice` from
//! the parent. Nodes carry the volume-weighted statistics used by UCB
//! selection.

use sampling_core::{Choice, StateSnapshot, ROOT_CHOICE};

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the decision tree.
#[derive(Debug, Clone)]
pub struct DecisionNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Choice that led to this node from parent (ROOT_CHOICE for root)
    pub choice: Choice,

    /// Number of choices offered by the decision point at creation
    /// (0 for terminal nodes)
    pub total_choices: usize,

    /// Cumulative path volume of the samples that passed through this node.
    /// Not a sample count: each sample adds its path volume.
    pub visits: u64,

    /// Sum of amplified rewards propagated through this node.
    pub reward_sum: i64,

    /// Part of the permanent search tree, as opposed to a playout node.
    pub in_tree: bool,

    /// Engine snapshot at creation time; never interpreted here.
    pub snapshot: StateSnapshot,

    /// Children: Vec of (choice, NodeId) pairs. Choices are unique.
    pub children: Vec<(Choice, NodeId)>,
}

impl DecisionNode {
    /// Create a new root node.
    pub fn new_root(total_choices: usize, snapshot: StateSnapshot) -> Self {
        Self {
            parent: NodeId::NONE,
            choice: ROOT_CHOICE,
            total_choices,
            visits: 0,
            reward_sum: 0,
            in_tree: true,
            snapshot,
            children: Vec::new(),
        }
    }

    /// Create a new child node. Children start out as playout nodes.
    pub fn new_child(
        parent: NodeId,
        choice: Choice,
        total_choices: usize,
        snapshot: StateSnapshot,
    ) -> Self {
        Self {
            parent,
            choice,
            total_choices,
            visits: 0,
            reward_sum: 0,
            in_tree: false,
            snapshot,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn has_child_for_choice(&self, choice: Choice) -> bool {
        self.child(choice).is_some()
    }

    /// Child reached by `choice`, if it has been materialized.
    #[inline]
    pub fn child(&self, choice: Choice) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(c, _)| *c == choice)
            .map(|(_, id)| *id)
    }

    /// Mean amplified reward per unit of visited volume.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.reward_sum as f64 / self.visits as f64
        }
    }

    /// UCB1 score used when the parent selects among its children:
    /// mean + c * sqrt(ln(N_parent) / N).
    ///
    /// Unvisited children score +inf so they are always tried first.
    /// Takes pre-computed ln(parent_visits) to avoid redundant ln calls when
    /// comparing multiple children.
    #[inline]
    pub fn ucb_score(&self, ln_parent_visits: f64, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.mean_reward() + exploration * (ln_parent_visits.max(0.0) / visits).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(!NodeId(0).is_none());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_root() {
        let node = DecisionNode::new_root(2, StateSnapshot::from("true"));

        assert!(node.is_root());
        assert_eq!(node.choice, ROOT_CHOICE);
        assert_eq!(node.total_choices, 2);
        assert_eq!(node.visits, 0);
        assert!(node.in_tree);
        assert!(node.children.is_empty());
        assert_eq!(node.snapshot.as_bytes(), b"true");
    }

    #[test]
    fn test_new_child_is_playout() {
        let node = DecisionNode::new_child(NodeId(0), 1, 3, StateSnapshot::empty());
        assert!(!node.is_root());
        assert!(!node.in_tree);
        assert_eq!(node.choice, 1);
    }

    #[test]
    fn test_child_lookup() {
        let mut node = DecisionNode::new_root(2, StateSnapshot::empty());
        node.children.push((1, NodeId(4)));

        assert!(node.has_child_for_choice(1));
        assert!(!node.has_child_for_choice(0));
        assert_eq!(node.child(1), Some(NodeId(4)));
        assert_eq!(node.child(0), None);
    }

    #[test]
    fn test_mean_reward() {
        let mut node = DecisionNode::new_root(2, StateSnapshot::empty());
        assert!(node.mean_reward().abs() < 1e-9);

        node.visits = 4;
        node.reward_sum = 10;
        assert!((node.mean_reward() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_ucb_score() {
        let mut node = DecisionNode::new_child(NodeId(0), 0, 2, StateSnapshot::empty());
        assert!(node.ucb_score(1.0, 1.0).is_infinite());

        node.visits = 4;
        node.reward_sum = 8;
        let ln_parent = (16.0f64).ln();

        // UCB = 2 + 1.5 * sqrt(ln(16) / 4)
        let expected = 2.0 + 1.5 * (ln_parent / 4.0).sqrt();
        assert!((node.ucb_score(ln_parent, 1.5) - expected).abs() < 1e-9);

        // No exploration: pure exploitation
        assert!((node.ucb_score(ln_parent, 0.0) - 2.0).abs() < 1e-9);
    }
}
