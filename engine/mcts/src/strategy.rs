//! Analysis strategies: the component that picks a choice at every decision
//! point the engine stops at, and learns from each terminated path.

use sampling_core::{Choice, DecisionPoint, ExecutionContext, OutcomeClass};
use thiserror::Error;
use tracing::trace;

use crate::factory::NodeCreationError;
use crate::policy::{RandomSimulation, SimulationPolicy};
use crate::search::MctsPhase;

/// Errors raised by a strategy. All of them are fatal for the run.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Decision point offered no eligible choices")]
    EmptyEligibleChoices,

    #[error("Node {node} has no in-tree child among the eligible choices")]
    NoEligibleChild { node: u32 },

    #[error("Policy picked choice {choice}, which is not allowed here")]
    InvalidPolicyChoice { choice: Choice },

    #[error("Path volume must be positive, got {0}")]
    InvalidPathVolume(i64),

    #[error("Failed to create node for choice {choice} under {parent:?} during {phase}")]
    NodeCreation {
        phase: MctsPhase,
        parent: Option<u32>,
        choice: Choice,
        #[source]
        source: NodeCreationError,
    },
}

/// Drives the choices of one sampling run.
pub trait AnalysisStrategy {
    /// Choose among `eligible` at `decision` and commit it with
    /// `DecisionPoint::select`.
    ///
    /// Returns `Ok(None)` when the strategy does not track this kind of
    /// decision point; the engine then picks on its own.
    fn make_choice(
        &mut self,
        ctx: &dyn ExecutionContext,
        decision: &mut dyn DecisionPoint,
        eligible: &[Choice],
    ) -> Result<Option<Choice>, StrategyError>;

    /// The current path ended. `reward` is the raw reward; amplification by
    /// `path_volume` is up to the strategy.
    fn path_terminated(
        &mut self,
        outcome: OutcomeClass,
        reward: i64,
        path_volume: i64,
        previously_sampled: bool,
    ) -> Result<(), StrategyError>;
}

impl<T: AnalysisStrategy + ?Sized> AnalysisStrategy for Box<T> {
    fn make_choice(
        &mut self,
        ctx: &dyn ExecutionContext,
        decision: &mut dyn DecisionPoint,
        eligible: &[Choice],
    ) -> Result<Option<Choice>, StrategyError> {
        (**self).make_choice(ctx, decision, eligible)
    }

    fn path_terminated(
        &mut self,
        outcome: OutcomeClass,
        reward: i64,
        path_volume: i64,
        previously_sampled: bool,
    ) -> Result<(), StrategyError> {
        (**self).path_terminated(outcome, reward, path_volume, previously_sampled)
    }
}

/// Pure Monte Carlo sampling: every choice is a fresh rollout, nothing is
/// learned between samples. Baseline for comparing MCTS against.
pub struct RandomStrategy {
    simulation: Box<dyn SimulationPolicy>,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self::with_policy(Box::new(RandomSimulation::new(seed)))
    }

    pub fn with_policy(simulation: Box<dyn SimulationPolicy>) -> Self {
        Self { simulation }
    }
}

impl AnalysisStrategy for RandomStrategy {
    fn make_choice(
        &mut self,
        ctx: &dyn ExecutionContext,
        decision: &mut dyn DecisionPoint,
        eligible: &[Choice],
    ) -> Result<Option<Choice>, StrategyError> {
        if eligible.is_empty() {
            return Err(StrategyError::EmptyEligibleChoices);
        }

        let choice = self.simulation.select_choice(ctx, eligible);
        if !eligible.contains(&choice) {
            return Err(StrategyError::InvalidPolicyChoice { choice });
        }

        trace!(choice, depth = ctx.depth(), "Random choice");
        decision.select(choice);
        Ok(Some(choice))
    }

    fn path_terminated(
        &mut self,
        _outcome: OutcomeClass,
        _reward: i64,
        path_volume: i64,
        _previously_sampled: bool,
    ) -> Result<(), StrategyError> {
        if path_volume <= 0 {
            return Err(StrategyError::InvalidPathVolume(path_volume));
        }
        Ok(())
    }
}
