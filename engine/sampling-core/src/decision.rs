//! Decision points offered by the execution engine.

use std::fmt;

use crate::path::Choice;
use crate::snapshot::StateSnapshot;

/// What kind of branching a decision point represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DecisionKind {
    /// Branch on a symbolic path condition.
    PathCondition,
    /// Explicit nondeterministic choice in the program.
    Nondeterministic,
    /// Thread scheduling choice.
    Scheduling,
    /// Any other engine-specific kind.
    Other(String),
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionKind::PathCondition => write!(f, "path-condition"),
            DecisionKind::Nondeterministic => write!(f, "nondeterministic"),
            DecisionKind::Scheduling => write!(f, "scheduling"),
            DecisionKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Live handle to the decision point the engine is currently stopped at.
pub trait DecisionPoint {
    fn kind(&self) -> DecisionKind;

    /// Total number of choices at this point, eligible or not.
    fn total_choices(&self) -> usize;

    /// Capture an owned copy of the state leading to this decision.
    fn snapshot(&self) -> StateSnapshot;

    /// Commit `choice` as the branch the engine takes next.
    fn select(&mut self, choice: Choice);
}
