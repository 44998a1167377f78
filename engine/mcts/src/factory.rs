//! Node construction.
//!
//! The factory decides which decision-point kinds the tree tracks and builds
//! nodes for them. Decision points it does not support are left entirely to
//! the engine.

use sampling_core::{Choice, DecisionKind, DecisionPoint, StateSnapshot};
use thiserror::Error;

use crate::node::NodeId;
use crate::tree::DecisionTree;

/// Errors that can occur while materializing a node.
#[derive(Debug, Error)]
pub enum NodeCreationError {
    #[error("Unsupported decision point kind: {0}")]
    UnsupportedDecision(DecisionKind),

    #[error("Node {parent} already has a child for choice {choice}")]
    DuplicateChild { parent: u32, choice: Choice },

    #[error("Node arena exhausted")]
    ArenaExhausted,
}

/// Strategy for turning decision points into tree nodes.
pub trait NodeFactory {
    /// Whether decision points of this kind are tracked by the tree.
    fn is_supported(&self, kind: &DecisionKind) -> bool;

    /// Create the node for `decision`, reached from `parent` via `choice`.
    ///
    /// `parent == None` creates the root. `decision == None` creates a
    /// terminal node (the path ended right after `choice`); terminal nodes
    /// are always supported.
    fn create(
        &self,
        tree: &mut DecisionTree,
        parent: Option<NodeId>,
        decision: Option<&dyn DecisionPoint>,
        choice: Choice,
    ) -> Result<NodeId, NodeCreationError>;
}

/// Tracks path-condition and nondeterministic decision points.
#[derive(Debug, Clone)]
pub struct DefaultNodeFactory {
    capture_snapshots: bool,
}

impl Default for DefaultNodeFactory {
    fn default() -> Self {
        Self {
            capture_snapshots: true,
        }
    }
}

impl DefaultNodeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip snapshot capture on node creation. Capturing a path condition
    /// can be expensive on deep paths.
    pub fn without_snapshots() -> Self {
        Self {
            capture_snapshots: false,
        }
    }
}

impl NodeFactory for DefaultNodeFactory {
    fn is_supported(&self, kind: &DecisionKind) -> bool {
        matches!(
            kind,
            DecisionKind::PathCondition | DecisionKind::Nondeterministic
        )
    }

    fn create(
        &self,
        tree: &mut DecisionTree,
        parent: Option<NodeId>,
        decision: Option<&dyn DecisionPoint>,
        choice: Choice,
    ) -> Result<NodeId, NodeCreationError> {
        let (total_choices, snapshot) = match decision {
            Some(d) => {
                let kind = d.kind();
                if !self.is_supported(&kind) {
                    return Err(NodeCreationError::UnsupportedDecision(kind));
                }
                let snapshot = if self.capture_snapshots {
                    d.snapshot()
                } else {
                    StateSnapshot::empty()
                };
                (d.total_choices(), snapshot)
            }
            None => (0, StateSnapshot::empty()),
        };

        match parent {
            Some(parent) => tree.add_child(parent, choice, total_choices, snapshot),
            None => tree.create_root(total_choices, snapshot),
        }
    }
}
