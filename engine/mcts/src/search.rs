//! MCTS sampling driver.
//!
//! Unlike a game search that simulates internally, the engine owns the
//! execution here and calls back into the driver at every decision point.
//! One sample is one engine path, and each sample runs the four MCTS steps
//! spread across those callbacks:
//! 1. Selection: descend the search tree with UCB while the cursor is in it
//! 2. Expansion: at the first frontier node pick one unexpanded choice; its
//!    node is created lazily at the next decision point (or at termination)
//! 3. Simulation: below the frontier, pick with the rollout policy and record
//!    playout nodes that stay outside the search tree
//! 4. Backpropagation: on termination add the path volume and the
//!    volume-amplified reward from the last node up to and including the root

use std::fmt;

use sampling_core::{Choice, DecisionPoint, ExecutionContext, OutcomeClass};
use tracing::{debug, trace, warn};

use crate::config::MctsConfig;
use crate::factory::{DefaultNodeFactory, NodeFactory};
use crate::node::NodeId;
use crate::policy::{RandomSimulation, SelectionPolicy, SimulationPolicy, UcbSelection};
use crate::strategy::{AnalysisStrategy, StrategyError};
use crate::tree::DecisionTree;

/// Which half of a sample the driver is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MctsPhase {
    /// Cursor is inside the search tree.
    Selection,
    /// Cursor has left the search tree; choices come from the rollout policy.
    Simulation,
}

impl fmt::Display for MctsPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MctsPhase::Selection => write!(f, "selection"),
            MctsPhase::Simulation => write!(f, "simulation"),
        }
    }
}

/// Notified after each sample has been propagated into the tree.
pub trait MctsObserver {
    fn sample_done(&mut self, tree: &DecisionTree, last_node: NodeId);
}

/// MCTS driver state.
pub struct MctsStrategy {
    tree: DecisionTree,
    phase: MctsPhase,

    /// Node of the most recent decision made in this sample (NONE before the
    /// root exists)
    cursor: NodeId,

    /// Choice picked for expansion under `cursor`, waiting for its node.
    /// Only ever set while in the simulation phase.
    pending_expansion: Option<Choice>,

    factory: Box<dyn NodeFactory>,
    selection: Box<dyn SelectionPolicy>,
    simulation: Box<dyn SimulationPolicy>,
    observers: Vec<Box<dyn MctsObserver>>,
}

impl MctsStrategy {
    pub fn new(
        factory: Box<dyn NodeFactory>,
        selection: Box<dyn SelectionPolicy>,
        simulation: Box<dyn SimulationPolicy>,
    ) -> Self {
        Self {
            tree: DecisionTree::new(),
            phase: MctsPhase::Selection,
            cursor: NodeId::NONE,
            pending_expansion: None,
            factory,
            selection,
            simulation,
            observers: Vec::new(),
        }
    }

    /// UCB1 selection, uniform rollout and the default node factory, all
    /// seeded from `config`.
    pub fn from_config(config: &MctsConfig) -> Self {
        let factory: Box<dyn NodeFactory> = if config.capture_snapshots {
            Box::new(DefaultNodeFactory::new())
        } else {
            Box::new(DefaultNodeFactory::without_snapshots())
        };

        Self::new(
            factory,
            Box::new(UcbSelection::new(config.exploration_constant, config.seed)),
            // Separate stream so expansion and rollout draws don't interleave
            Box::new(RandomSimulation::new(config.seed.wrapping_add(1))),
        )
    }

    pub fn add_observer(&mut self, observer: Box<dyn MctsObserver>) {
        self.observers.push(observer);
    }

    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    pub fn phase(&self) -> MctsPhase {
        self.phase
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn pending_expansion(&self) -> Option<Choice> {
        self.pending_expansion
    }

    /// Get the child of the cursor for `choice`, creating it if needed.
    fn materialize(
        &mut self,
        decision: Option<&dyn DecisionPoint>,
        choice: Choice,
    ) -> Result<NodeId, StrategyError> {
        let parent = self.cursor;
        if let Some(existing) = self.tree.child(parent, choice) {
            return Ok(existing);
        }

        self.factory
            .create(&mut self.tree, Some(parent), decision, choice)
            .map_err(|source| StrategyError::NodeCreation {
                phase: self.phase,
                parent: Some(parent.0),
                choice,
                source,
            })
    }

    /// Create the node for the pending expansion and make it part of the
    /// search tree. A playout node left there by an earlier sample is reused
    /// and promoted.
    fn complete_expansion(
        &mut self,
        decision: Option<&dyn DecisionPoint>,
    ) -> Result<(), StrategyError> {
        if let Some(choice) = self.pending_expansion.take() {
            let child = self.materialize(decision, choice)?;
            self.tree.get_mut(child).in_tree = true;
            self.cursor = child;
            trace!(node = child.0, choice, "Expanded node into search tree");
        }
        Ok(())
    }

    /// A node is on the frontier if some eligible choice has no in-tree child.
    fn unexpanded_choices(&self, node: NodeId, eligible: &[Choice]) -> Vec<Choice> {
        let node = self.tree.get(node);
        eligible
            .iter()
            .copied()
            .filter(|&choice| match node.child(choice) {
                Some(child) => !self.tree.get(child).in_tree,
                None => true,
            })
            .collect()
    }

    fn select(&mut self, eligible: &[Choice]) -> Result<Choice, StrategyError> {
        let cursor = self.cursor;
        let unexpanded = self.unexpanded_choices(cursor, eligible);

        if !unexpanded.is_empty() {
            let choice = self.selection.expand_child(&self.tree, cursor, &unexpanded);
            if !unexpanded.contains(&choice) {
                return Err(StrategyError::InvalidPolicyChoice { choice });
            }

            trace!(node = cursor.0, choice, "Frontier reached, expansion deferred");
            self.pending_expansion = Some(choice);
            self.phase = MctsPhase::Simulation;
            return Ok(choice);
        }

        let child = self
            .selection
            .select_best_child(&self.tree, cursor, eligible)
            .ok_or(StrategyError::NoEligibleChild { node: cursor.0 })?;

        let node = self.tree.get(child);
        if node.parent != cursor || !node.in_tree || !eligible.contains(&node.choice) {
            return Err(StrategyError::InvalidPolicyChoice {
                choice: node.choice,
            });
        }

        let choice = node.choice;
        self.cursor = child;
        Ok(choice)
    }

    fn simulate(
        &mut self,
        ctx: &dyn ExecutionContext,
        decision: &dyn DecisionPoint,
        eligible: &[Choice],
    ) -> Result<Choice, StrategyError> {
        let choice = self.simulation.select_choice(ctx, eligible);
        if !eligible.contains(&choice) {
            return Err(StrategyError::InvalidPolicyChoice { choice });
        }

        // Playout node: recorded for the backpropagation path, not in tree
        self.cursor = self.materialize(Some(decision), choice)?;
        Ok(choice)
    }

    fn reset(&mut self) {
        self.phase = MctsPhase::Selection;
        self.pending_expansion = None;
        self.cursor = self.tree.root().unwrap_or(NodeId::NONE);
    }
}

impl AnalysisStrategy for MctsStrategy {
    fn make_choice(
        &mut self,
        ctx: &dyn ExecutionContext,
        decision: &mut dyn DecisionPoint,
        eligible: &[Choice],
    ) -> Result<Option<Choice>, StrategyError> {
        if eligible.is_empty() {
            return Err(StrategyError::EmptyEligibleChoices);
        }

        let kind = decision.kind();
        if !self.factory.is_supported(&kind) {
            trace!(%kind, "Decision point not tracked, leaving choice to engine");
            return Ok(None);
        }

        self.complete_expansion(Some(&*decision))?;

        if self.tree.root().is_none() {
            let root = self
                .factory
                .create(&mut self.tree, None, Some(&*decision), sampling_core::ROOT_CHOICE)
                .map_err(|source| StrategyError::NodeCreation {
                    phase: self.phase,
                    parent: None,
                    choice: sampling_core::ROOT_CHOICE,
                    source,
                })?;
            debug!(total_choices = decision.total_choices(), "Created search tree root");
            self.cursor = root;
        }

        let choice = match self.phase {
            MctsPhase::Selection => self.select(eligible)?,
            MctsPhase::Simulation => self.simulate(ctx, &*decision, eligible)?,
        };

        decision.select(choice);
        Ok(Some(choice))
    }

    fn path_terminated(
        &mut self,
        outcome: OutcomeClass,
        reward: i64,
        path_volume: i64,
        previously_sampled: bool,
    ) -> Result<(), StrategyError> {
        let volume = u64::try_from(path_volume)
            .ok()
            .filter(|&v| v > 0)
            .ok_or(StrategyError::InvalidPathVolume(path_volume))?;

        // Path ended right after the expansion choice: terminal node
        self.complete_expansion(None)?;

        if self.cursor.is_none() {
            debug!(%outcome, "Sample hit no tracked decision point, nothing to propagate");
            self.reset();
            return Ok(());
        }

        if previously_sampled {
            warn!(
                %outcome,
                node = self.cursor.0,
                "Path has already been sampled, propagating anyway"
            );
        }

        let amplified = reward.checked_mul(path_volume).unwrap_or_else(|| {
            warn!(reward, path_volume, "Amplified reward overflows i64, clamping");
            reward.saturating_mul(path_volume)
        });
        if self.tree.backpropagate(self.cursor, amplified, volume) {
            warn!(
                node = self.cursor.0,
                amplified,
                "Node statistics saturated during backpropagation"
            );
        }

        trace!(
            %outcome,
            reward,
            path_volume,
            depth = self.tree.depth(self.cursor),
            tree_size = self.tree.len(),
            "Sample propagated"
        );

        for observer in &mut self.observers {
            observer.sample_done(&self.tree, self.cursor);
        }

        self.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{walk, ScriptedDecision, TraceContext};
    use sampling_core::DecisionKind;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn strategy(seed: u64) -> MctsStrategy {
        MctsStrategy::from_config(&MctsConfig::for_testing().with_seed(seed))
    }

    fn assert_tree_invariants(tree: &DecisionTree) {
        for (i, node) in tree.arena().iter().enumerate() {
            let choices: HashSet<Choice> = node.children.iter().map(|(c, _)| *c).collect();
            assert_eq!(choices.len(), node.children.len(), "duplicate child at {}", i);

            if !node.in_tree {
                for (_, child) in &node.children {
                    assert!(!tree.get(*child).in_tree, "in-tree child under playout node");
                }
            }
            for (choice, child) in &node.children {
                assert_eq!(tree.get(*child).choice, *choice);
                assert_eq!(tree.get(*child).parent, NodeId(i as u32));
            }
        }
    }

    #[test]
    fn test_first_sample_expands_root_only() {
        let mut mcts = strategy(0);
        walk(&mut mcts, &[2, 2, 2]);
        assert_eq!(mcts.phase(), MctsPhase::Simulation);
        assert!(mcts.pending_expansion().is_none());

        mcts.path_terminated(OutcomeClass::Success, 7, 1, false)
            .unwrap();

        let tree = mcts.tree();
        // root + expanded child + two playout nodes
        assert_eq!(tree.len(), 4);
        let stats = tree.stats();
        assert_eq!(stats.in_tree_nodes, 2);
        assert_eq!(stats.root_visits, 1);
        assert_eq!(mcts.phase(), MctsPhase::Selection);
        assert_eq!(mcts.cursor(), tree.root().unwrap());
        assert_tree_invariants(tree);
    }

    #[test]
    fn test_two_samples_of_constant_reward() {
        let mut mcts = strategy(1);

        for _ in 0..2 {
            walk(&mut mcts, &[2, 2, 2]);
            mcts.path_terminated(OutcomeClass::Success, 7, 1, false)
                .unwrap();
        }

        let tree = mcts.tree();
        let root = tree.get(tree.root().unwrap());
        assert_eq!(root.visits, 2);
        assert_eq!(root.reward_sum, 14);

        // Both root choices expanded, one per sample
        assert_eq!(root.children.len(), 2);
        for (_, child) in &root.children {
            assert!(tree.get(*child).in_tree);
            assert_eq!(tree.get(*child).visits, 1);
        }
        assert_tree_invariants(tree);
    }

    #[test]
    fn test_repeated_sampling_never_duplicates_nodes() {
        let mut mcts = strategy(2);

        for i in 0..40 {
            walk(&mut mcts, &[2, 2, 2]);
            mcts.path_terminated(OutcomeClass::Success, i % 5, 1, false)
                .unwrap();
        }

        let tree = mcts.tree();
        // Complete binary tree of depth 3 has 15 nodes
        assert!(tree.len() <= 15);
        assert_tree_invariants(tree);

        let root = tree.get(tree.root().unwrap());
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(|(_, c)| tree.get(*c).in_tree));
    }

    #[test]
    fn test_selection_descends_once_root_is_expanded() {
        let mut mcts = strategy(3);
        for _ in 0..2 {
            walk(&mut mcts, &[2, 2, 2]);
            mcts.path_terminated(OutcomeClass::Success, 1, 1, false)
                .unwrap();
        }

        // Third sample: root is no longer a frontier node
        let ctx = TraceContext::default();
        let mut decision = ScriptedDecision::new(DecisionKind::PathCondition, 2);
        mcts.make_choice(&ctx, &mut decision, &[0, 1]).unwrap();

        assert_eq!(mcts.phase(), MctsPhase::Selection);
        assert!(mcts.pending_expansion().is_none());
        assert_ne!(mcts.cursor(), mcts.tree().root().unwrap());
    }

    #[test]
    fn test_root_visits_sum_path_volumes() {
        let mut mcts = strategy(4);
        let volumes = [3, 1, 4, 1, 5, 9, 2, 6];

        for &volume in &volumes {
            walk(&mut mcts, &[3, 2]);
            mcts.path_terminated(OutcomeClass::Error, 2, volume, false)
                .unwrap();
        }

        let tree = mcts.tree();
        let root = tree.get(tree.root().unwrap());
        let total: i64 = volumes.iter().sum();
        assert_eq!(root.visits, total as u64);
        assert_eq!(root.reward_sum, 2 * total);
    }

    #[test]
    fn test_empty_eligible_is_fatal_and_leaves_state_untouched() {
        let mut mcts = strategy(5);
        let ctx = TraceContext::default();
        let mut decision = ScriptedDecision::new(DecisionKind::PathCondition, 2);

        let err = mcts.make_choice(&ctx, &mut decision, &[]).unwrap_err();

        assert!(matches!(err, StrategyError::EmptyEligibleChoices));
        assert!(mcts.tree().is_empty());
        assert_eq!(decision.selected, None);
    }

    #[test]
    fn test_empty_eligible_keeps_pending_expansion() {
        let mut mcts = strategy(5);
        let mut ctx = TraceContext::default();
        let mut decision = ScriptedDecision::new(DecisionKind::PathCondition, 2);
        let choice = mcts.make_choice(&ctx, &mut decision, &[0, 1]).unwrap().unwrap();
        ctx.trace.record(choice, 2);
        let len = mcts.tree().len();

        let mut next = ScriptedDecision::new(DecisionKind::PathCondition, 2);
        assert!(mcts.make_choice(&ctx, &mut next, &[]).is_err());

        assert_eq!(mcts.pending_expansion(), Some(choice));
        assert_eq!(mcts.tree().len(), len);
    }

    #[test]
    fn test_unsupported_decision_is_left_to_engine() {
        let mut mcts = strategy(6);
        let ctx = TraceContext::default();
        let mut decision = ScriptedDecision::new(DecisionKind::Scheduling, 3);

        let choice = mcts.make_choice(&ctx, &mut decision, &[0, 1, 2]).unwrap();

        assert_eq!(choice, None);
        assert_eq!(decision.selected, None);
        assert!(mcts.tree().is_empty());
        assert_eq!(mcts.phase(), MctsPhase::Selection);
    }

    #[test]
    fn test_expansion_materializes_at_next_tracked_decision() {
        let mut mcts = strategy(7);
        let mut ctx = TraceContext::default();

        let mut first = ScriptedDecision::new(DecisionKind::PathCondition, 2);
        let choice = mcts.make_choice(&ctx, &mut first, &[0, 1]).unwrap().unwrap();
        ctx.trace.record(choice, 2);
        assert_eq!(mcts.pending_expansion(), Some(choice));
        assert_eq!(mcts.tree().len(), 1);

        // Untracked decision in between does not consume the expansion
        let mut sched = ScriptedDecision::new(DecisionKind::Scheduling, 2);
        assert_eq!(mcts.make_choice(&ctx, &mut sched, &[0, 1]).unwrap(), None);
        assert_eq!(mcts.pending_expansion(), Some(choice));

        let mut second = ScriptedDecision::new(DecisionKind::Nondeterministic, 5);
        mcts.make_choice(&ctx, &mut second, &[0, 1, 2, 3, 4]).unwrap();

        let tree = mcts.tree();
        let root = tree.root().unwrap();
        let expanded = tree.child(root, choice).unwrap();
        assert!(tree.get(expanded).in_tree);
        // Expanded node was built from the decision point it stands for
        assert_eq!(tree.get(expanded).total_choices, 5);
        assert!(mcts.pending_expansion().is_none());
        // Playout node below it stays outside the search tree
        let playout = mcts.cursor();
        assert_eq!(tree.get(playout).parent, expanded);
        assert!(!tree.get(playout).in_tree);
    }

    #[test]
    fn test_expansion_materializes_at_termination() {
        let mut mcts = strategy(8);
        walk(&mut mcts, &[4]);
        assert!(mcts.pending_expansion().is_some());

        mcts.path_terminated(OutcomeClass::ConstraintBoundary, 3, 2, false)
            .unwrap();

        let tree = mcts.tree();
        assert_eq!(tree.len(), 2);
        let terminal = tree.get(NodeId(1));
        assert!(terminal.in_tree);
        assert_eq!(terminal.total_choices, 0);
        assert_eq!(terminal.visits, 2);
        assert_eq!(terminal.reward_sum, 6);
    }

    #[test]
    fn test_sample_without_tracked_decisions() {
        let mut mcts = strategy(9);
        mcts.path_terminated(OutcomeClass::Success, 5, 1, false)
            .unwrap();
        assert!(mcts.tree().is_empty());
    }

    #[test]
    fn test_invalid_volume_rejected() {
        let mut mcts = strategy(10);
        walk(&mut mcts, &[2]);
        let err = mcts
            .path_terminated(OutcomeClass::Success, 1, 0, false)
            .unwrap_err();
        assert!(matches!(err, StrategyError::InvalidPathVolume(0)));
    }

    #[test]
    fn test_overflowing_reward_is_clamped() {
        let mut mcts = strategy(14);
        walk(&mut mcts, &[2]);
        mcts.path_terminated(OutcomeClass::Success, i64::MAX / 2, 4, false)
            .unwrap();

        let tree = mcts.tree();
        let root = tree.get(tree.root().unwrap());
        assert_eq!(root.reward_sum, i64::MAX);
        assert_eq!(root.visits, 4);

        walk(&mut mcts, &[2]);
        mcts.path_terminated(OutcomeClass::Error, i64::MIN / 2, 4, false)
            .unwrap();
        let root = mcts.tree().get(mcts.tree().root().unwrap());
        // MAX + MIN, no further clamping on the way down
        assert_eq!(root.reward_sum, -1);
    }

    #[test]
    fn test_previously_sampled_path_still_propagates() {
        let mut mcts = strategy(11);
        walk(&mut mcts, &[1]);
        mcts.path_terminated(OutcomeClass::Success, 1, 1, false)
            .unwrap();
        walk(&mut mcts, &[1]);
        mcts.path_terminated(OutcomeClass::Success, 1, 1, true)
            .unwrap();

        let tree = mcts.tree();
        assert_eq!(tree.get(tree.root().unwrap()).visits, 2);
    }

    #[test]
    fn test_eligibility_restricts_expansion() {
        let mut mcts = strategy(12);
        for _ in 0..10 {
            let mut ctx = TraceContext::default();
            let mut decision = ScriptedDecision::new(DecisionKind::PathCondition, 3);
            let choice = mcts.make_choice(&ctx, &mut decision, &[2]).unwrap().unwrap();
            assert_eq!(choice, 2);
            ctx.trace.record(choice, 3);
            mcts.path_terminated(OutcomeClass::Success, 1, 1, false)
                .unwrap();
        }

        let tree = mcts.tree();
        let root = tree.get(tree.root().unwrap());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].0, 2);
    }

    #[test]
    fn test_observers_see_propagated_tree() {
        struct Recorder(Rc<RefCell<Vec<u64>>>);
        impl MctsObserver for Recorder {
            fn sample_done(&mut self, tree: &DecisionTree, _last_node: NodeId) {
                let root = tree.root().unwrap();
                self.0.borrow_mut().push(tree.get(root).visits);
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut mcts = strategy(13);
        mcts.add_observer(Box::new(Recorder(Rc::clone(&seen))));

        for _ in 0..3 {
            walk(&mut mcts, &[2, 2]);
            mcts.path_terminated(OutcomeClass::Success, 1, 1, false)
                .unwrap();
        }

        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let run = |seed| {
            let mut mcts = strategy(seed);
            let mut paths = Vec::new();
            for i in 0..20 {
                let ctx = walk(&mut mcts, &[2, 3, 2]);
                paths.push(ctx.trace.path());
                mcts.path_terminated(OutcomeClass::Success, i % 3, 1, false)
                    .unwrap();
            }
            paths
        };

        assert_eq!(run(21), run(21));
    }
}
