//! Read-only view of the running execution, plus the injected reward and
//! path-volume functions that are computed from it.

use crate::path::{DecisionTrace, Path};
use crate::snapshot::StateSnapshot;

/// What the engine exposes about the path currently being sampled.
pub trait ExecutionContext {
    /// Decisions taken so far in this sample, root first.
    fn trace(&self) -> &DecisionTrace;

    /// Owned copy of the current engine state (e.g. the path condition).
    fn snapshot(&self) -> StateSnapshot;

    /// Choice ids taken so far.
    fn path(&self) -> Path {
        self.trace().path()
    }

    fn depth(&self) -> usize {
        self.trace().len()
    }
}

/// Computes the raw reward of a terminated path.
pub trait RewardFunction {
    fn compute_reward(&self, ctx: &dyn ExecutionContext) -> i64;
}

impl<F> RewardFunction for F
where
    F: Fn(&dyn ExecutionContext) -> i64,
{
    fn compute_reward(&self, ctx: &dyn ExecutionContext) -> i64 {
        self(ctx)
    }
}

/// Computes the volume of a terminated path: roughly how many concrete
/// executions it stands for. Must be strictly positive.
pub trait PathQuantifier {
    fn quantify_path(&self, ctx: &dyn ExecutionContext) -> i64;
}

impl<F> PathQuantifier for F
where
    F: Fn(&dyn ExecutionContext) -> i64,
{
    fn quantify_path(&self, ctx: &dyn ExecutionContext) -> i64 {
        self(ctx)
    }
}

/// Reward equal to the number of decisions on the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthReward;

impl RewardFunction for DepthReward {
    fn compute_reward(&self, ctx: &dyn ExecutionContext) -> i64 {
        ctx.depth() as i64
    }
}

/// Every path counts once.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitVolume;

impl PathQuantifier for UnitVolume {
    fn quantify_path(&self, _ctx: &dyn ExecutionContext) -> i64 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedContext {
        trace: DecisionTrace,
    }

    impl ExecutionContext for FixedContext {
        fn trace(&self) -> &DecisionTrace {
            &self.trace
        }

        fn snapshot(&self) -> StateSnapshot {
            StateSnapshot::from("pc")
        }
    }

    fn context(choices: &[i32]) -> FixedContext {
        let mut trace = DecisionTrace::new();
        for &c in choices {
            trace.record(c, 2);
        }
        FixedContext { trace }
    }

    #[test]
    fn test_depth_reward() {
        assert_eq!(DepthReward.compute_reward(&context(&[0, 1, 1])), 3);
        assert_eq!(DepthReward.compute_reward(&context(&[])), 0);
    }

    #[test]
    fn test_unit_volume() {
        assert_eq!(UnitVolume.quantify_path(&context(&[1])), 1);
    }

    #[test]
    fn test_closures_as_functions() {
        let ones = |ctx: &dyn ExecutionContext| ctx.path().iter().filter(|&c| c == 1).count() as i64;
        let volume = |ctx: &dyn ExecutionContext| 1i64 << ctx.depth();

        let ctx = context(&[1, 0, 1]);
        assert_eq!(ones.compute_reward(&ctx), 2);
        assert_eq!(volume.quantify_path(&ctx), 8);
    }
}
