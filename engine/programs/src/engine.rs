//! Minimal execution engine that walks a `SyntheticProgram` one sampled
//! path at a time, asking the sampling analysis at every decision point.

use mcts::{AnalysisError, AnalysisStrategy, SampleVerdict, SamplingAnalysis};
use sampling_core::{
    Choice, DecisionKind, DecisionPoint, DecisionTrace, ExecutionContext, OutcomeClass,
    StateSnapshot,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::SyntheticProgram;

/// State of the path currently being executed.
pub struct ProgramContext<'p> {
    program: &'p SyntheticProgram,
    trace: DecisionTrace,
}

impl<'p> ProgramContext<'p> {
    pub fn new(program: &'p SyntheticProgram) -> Self {
        Self {
            program,
            trace: DecisionTrace::new(),
        }
    }

    pub fn record(&mut self, choice: Choice, width: usize) {
        self.trace.record(choice, width);
    }
}

impl ExecutionContext for ProgramContext<'_> {
    fn trace(&self) -> &DecisionTrace {
        &self.trace
    }

    fn snapshot(&self) -> StateSnapshot {
        self.program.path_condition(self.trace.path().as_slice())
    }
}

/// Decision point of a synthetic program.
pub struct ProgramDecision {
    kind: DecisionKind,
    width: usize,
    condition: StateSnapshot,
    selected: Option<Choice>,
}

impl ProgramDecision {
    pub fn new(kind: DecisionKind, width: usize, condition: StateSnapshot) -> Self {
        Self {
            kind,
            width,
            condition,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<Choice> {
        self.selected
    }
}

impl DecisionPoint for ProgramDecision {
    fn kind(&self) -> DecisionKind {
        self.kind.clone()
    }

    fn total_choices(&self) -> usize {
        self.width
    }

    fn snapshot(&self) -> StateSnapshot {
        self.condition.clone()
    }

    fn select(&mut self, choice: Choice) {
        self.selected = Some(choice);
    }
}

/// Engine-side counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub samples: u64,
    pub decisions: u64,
    /// Decisions the strategy left to the engine
    pub engine_decisions: u64,
    /// Decisions whose prefix was answered from the prefix cache
    pub replayed_decisions: u64,
    pub success: u64,
    pub error: u64,
    pub constraint_boundary: u64,
}

impl RunSummary {
    fn count(&mut self, outcome: OutcomeClass) {
        match outcome {
            OutcomeClass::Success => self.success += 1,
            OutcomeClass::Error => self.error += 1,
            OutcomeClass::ConstraintBoundary => self.constraint_boundary += 1,
        }
    }
}

/// Sample paths of `program` until the analysis asks to stop.
///
/// Calls `started` before the first sample and `finished` after the last.
pub fn run_sampling<S: AnalysisStrategy>(
    program: &SyntheticProgram,
    analysis: &mut SamplingAnalysis<'_, S>,
) -> Result<RunSummary, AnalysisError> {
    info!(
        depth = program.depth(),
        branching = program.branching(),
        seed = program.seed(),
        "Sampling synthetic program"
    );

    let mut summary = RunSummary::default();
    analysis.started();

    loop {
        let mut ctx = ProgramContext::new(program);

        let (outcome, verdict) = loop {
            let prefix = ctx.trace.path();
            if let Some(outcome) = program.outcome(prefix.as_slice()) {
                let verdict = analysis.path_terminated(&ctx, outcome)?;
                break (outcome, verdict);
            }

            let eligible = program.eligible_choices(prefix.as_slice());
            let mut decision = ProgramDecision::new(
                program.decision_kind(prefix.as_slice()),
                program.branching(),
                program.path_condition(prefix.as_slice()),
            );

            let response = analysis.decision_point(&ctx, &mut decision, &eligible)?;
            summary.decisions += 1;
            if response.replay {
                summary.replayed_decisions += 1;
            }

            let choice = match decision.selected() {
                Some(choice) => choice,
                None => {
                    summary.engine_decisions += 1;
                    program.default_choice(prefix.as_slice(), &eligible)
                }
            };
            ctx.record(choice, program.branching());
        };

        summary.samples += 1;
        summary.count(outcome);
        debug!(sample = summary.samples, %outcome, depth = ctx.depth(), "Sample finished");

        if verdict == SampleVerdict::Stop {
            break;
        }
    }

    analysis.finished();
    info!(
        samples = summary.samples,
        success = summary.success,
        error = summary.error,
        constraint_boundary = summary.constraint_boundary,
        "Sampling run complete"
    );
    Ok(summary)
}
