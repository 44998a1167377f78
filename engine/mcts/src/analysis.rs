//! Sampling analysis: the glue between the execution engine, the strategy
//! and everything that watches a run.
//!
//! The engine calls `decision_point` whenever it stops at a branch and
//! `path_terminated` whenever a path ends. The analysis keeps the best result
//! per outcome class, the prefix cache of completed paths and the termination
//! check, and fans out lifecycle events to observers.

use sampling_core::{
    AnalysisObserver, Choice, CoreError, DecisionKind, DecisionPoint, ExecutionContext,
    OutcomeClass, PathQuantifier, RewardFunction, SampleEvent, SamplingResult,
    TerminationStrategy,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::strategy::{AnalysisStrategy, StrategyError};
use crate::trie::{PrefixTrie, TrieError};

/// Errors that abort a sampling run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Prefix cache rejected path: {0}")]
    Cache(#[from] TrieError),
}

/// Whether the engine should go on sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleVerdict {
    Continue,
    Stop,
}

/// Answer to the engine at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionResponse {
    /// Choice committed by the strategy, or None if the engine decides.
    pub choice: Option<Choice>,
    /// The prefix ending in `choice` has been executed before, so the engine
    /// may replay it instead of re-solving its path condition.
    pub replay: bool,
}

/// One sampling run.
pub struct SamplingAnalysis<'a, S: AnalysisStrategy> {
    strategy: S,
    reward: Box<dyn RewardFunction + 'a>,
    quantifier: Box<dyn PathQuantifier + 'a>,
    termination: Box<dyn TerminationStrategy + 'a>,
    observers: Vec<Box<dyn AnalysisObserver + 'a>>,
    cache: PrefixTrie,
    use_prefix_cache: bool,
    result: SamplingResult,
}

impl<'a, S: AnalysisStrategy> SamplingAnalysis<'a, S> {
    pub fn new(
        strategy: S,
        reward: Box<dyn RewardFunction + 'a>,
        quantifier: Box<dyn PathQuantifier + 'a>,
        termination: Box<dyn TerminationStrategy + 'a>,
    ) -> Self {
        Self {
            strategy,
            reward,
            quantifier,
            termination,
            observers: Vec::new(),
            cache: PrefixTrie::new(),
            use_prefix_cache: true,
            result: SamplingResult::new(),
        }
    }

    /// Builder pattern: enable or disable replay hints from the prefix cache.
    pub fn with_prefix_cache(mut self, enabled: bool) -> Self {
        self.use_prefix_cache = enabled;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn AnalysisObserver + 'a>) {
        self.observers.push(observer);
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn result(&self) -> &SamplingResult {
        &self.result
    }

    pub fn cache(&self) -> &PrefixTrie {
        &self.cache
    }

    pub fn started(&mut self) {
        info!(use_prefix_cache = self.use_prefix_cache, "Sampling analysis started");
        for observer in &mut self.observers {
            observer.analysis_started();
        }
    }

    /// Let the strategy choose at `decision`.
    pub fn decision_point(
        &mut self,
        ctx: &dyn ExecutionContext,
        decision: &mut dyn DecisionPoint,
        eligible: &[Choice],
    ) -> Result<DecisionResponse, AnalysisError> {
        let choice = self.strategy.make_choice(ctx, decision, eligible)?;

        let replay = match choice {
            Some(choice)
                if self.use_prefix_cache && decision.kind() == DecisionKind::PathCondition =>
            {
                let mut prefix = ctx.path();
                prefix.push(choice);
                self.cache.contains_prefix(&prefix)
            }
            _ => false,
        };

        Ok(DecisionResponse { choice, replay })
    }

    /// Account for a finished path and decide whether to keep sampling.
    pub fn path_terminated(
        &mut self,
        ctx: &dyn ExecutionContext,
        outcome: OutcomeClass,
    ) -> Result<SampleVerdict, AnalysisError> {
        let path = ctx.path();
        let previously_sampled = self.cache.is_cached(&path);

        let path_volume = self.quantifier.quantify_path(ctx);
        if path_volume <= 0 {
            return Err(CoreError::InvalidPathVolume(path_volume).into());
        }

        let sample = self.result.next_sample();
        let reward = self.reward.compute_reward(ctx);

        debug!(
            sample,
            %outcome,
            reward,
            path_volume,
            depth = path.len(),
            previously_sampled,
            "Path terminated"
        );

        // Observers see the best result as it was before this sample
        {
            let event = SampleEvent {
                sample,
                outcome,
                reward,
                path_volume,
                best: self.result.best(outcome),
                previously_sampled,
            };
            for observer in &mut self.observers {
                observer.sample_done(&event);
            }
        }

        let snapshot = ctx.snapshot();
        if self
            .result
            .best_mut(outcome)
            .offer(reward, sample, &path, &snapshot)
        {
            info!(sample, %outcome, reward, %path, "New best reward");
        }

        self.strategy
            .path_terminated(outcome, reward, path_volume, previously_sampled)?;

        let stop = self.termination.should_terminate(ctx, &self.result);

        self.cache.add_path(ctx.trace().steps())?;

        Ok(if stop {
            SampleVerdict::Stop
        } else {
            SampleVerdict::Continue
        })
    }

    pub fn finished(&mut self) {
        match self.result.overall_best() {
            Some((outcome, best)) => info!(
                samples = self.result.sample_count(),
                %outcome,
                reward = best.reward,
                sample = best.sample_number,
                "Sampling analysis finished"
            ),
            None => info!(
                samples = self.result.sample_count(),
                "Sampling analysis finished without samples"
            ),
        }

        for observer in &mut self.observers {
            observer.analysis_done(&self.result);
        }
    }

    /// Consume the analysis, returning the strategy and the run's result.
    pub fn into_parts(self) -> (S, SamplingResult) {
        (self.strategy, self.result)
    }
}
