//! Test doubles for the engine side of the sampling contracts.

use sampling_core::{
    Choice, DecisionKind, DecisionPoint, DecisionTrace, ExecutionContext, StateSnapshot,
};

use crate::strategy::AnalysisStrategy;

pub struct ScriptedDecision {
    pub kind: DecisionKind,
    pub width: usize,
    pub selected: Option<Choice>,
}

impl ScriptedDecision {
    pub fn new(kind: DecisionKind, width: usize) -> Self {
        Self {
            kind,
            width,
            selected: None,
        }
    }
}

impl DecisionPoint for ScriptedDecision {
    fn kind(&self) -> DecisionKind {
        self.kind.clone()
    }

    fn total_choices(&self) -> usize {
        self.width
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from(format!("width={}", self.width).as_str())
    }

    fn select(&mut self, choice: Choice) {
        self.selected = Some(choice);
    }
}

#[derive(Default)]
pub struct TraceContext {
    pub trace: DecisionTrace,
}

impl ExecutionContext for TraceContext {
    fn trace(&self) -> &DecisionTrace {
        &self.trace
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from(self.trace.path().to_string().as_str())
    }
}

/// Walk one path through a complete tree with the given per-depth widths,
/// every choice eligible. Returns the trace of the sampled path.
pub fn walk<S: AnalysisStrategy + ?Sized>(strategy: &mut S, widths: &[usize]) -> TraceContext {
    let mut ctx = TraceContext::default();
    for &width in widths {
        let eligible: Vec<Choice> = (0..width as Choice).collect();
        let mut decision = ScriptedDecision::new(DecisionKind::PathCondition, width);
        let choice = strategy
            .make_choice(&ctx, &mut decision, &eligible)
            .expect("make_choice")
            .expect("supported decision");
        assert_eq!(decision.selected, Some(choice));
        ctx.trace.record(choice, width);
    }
    ctx
}
