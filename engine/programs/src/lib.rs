//! Synthetic branching programs for the path sampler.
//!
//! A `SyntheticProgram` stands in for a program under symbolic execution.
//! Its shape is a pure function of a seed: every path prefix hashes to the
//! branches that are feasible from it, whether the path ends there (and how),
//! and the cost of taking each branch. That makes the whole landscape
//! reproducible, cheap to evaluate and small enough to enumerate in tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{MctsConfig, MctsStrategy, SamplingAnalysis};
//! use programs::{run_sampling, PathCost, SyntheticProgram};
//! use sampling_core::{SampleSizeTermination, UnitVolume};
//!
//! let program = SyntheticProgram::new(12, 2, 7);
//! let mut analysis = SamplingAnalysis::new(
//!     MctsStrategy::from_config(&MctsConfig::default()),
//!     Box::new(PathCost::new(program.clone())),
//!     Box::new(UnitVolume),
//!     Box::new(SampleSizeTermination::new(1000)),
//! );
//! let summary = run_sampling(&program, &mut analysis).unwrap();
//! ```

mod engine;

pub use engine::{run_sampling, ProgramContext, ProgramDecision, RunSummary};

use sampling_core::{
    Choice, DecisionKind, ExecutionContext, OutcomeClass, Path, PathQuantifier, RewardFunction,
    StateSnapshot,
};

/// Branches whose hash hits this modulus are infeasible.
const INFEASIBLE_MODULUS: u64 = 5;

/// Upper bound (exclusive) on the cost of a single branch.
const MAX_BRANCH_COST: u64 = 10;

/// Deterministic program landscape.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticProgram {
    depth: usize,
    branching: usize,
    seed: u64,
    error_rate: f64,
    boundary_rate: f64,
}

impl SyntheticProgram {
    /// Program with no early terminations.
    pub fn new(depth: usize, branching: usize, seed: u64) -> Self {
        Self {
            depth,
            branching: branching.max(1),
            seed,
            error_rate: 0.0,
            boundary_rate: 0.0,
        }
    }

    /// Per-decision probability that the path fails right there.
    pub fn with_error_rate(mut self, rate: f64) -> Self {
        self.error_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Per-decision probability that the path runs into a resource bound.
    pub fn with_boundary_rate(mut self, rate: f64) -> Self {
        self.boundary_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn branching(&self) -> usize {
        self.branching
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn hash(&self, prefix: &[Choice], salt: u64) -> u64 {
        let mut h = splitmix64(self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        for &choice in prefix {
            h = splitmix64(h ^ (choice as u64).wrapping_add(0x632B_E59B_D9B4_E019));
        }
        h
    }

    fn unit(&self, prefix: &[Choice], salt: u64) -> f64 {
        // 53 high bits give an exact f64 in [0, 1)
        (self.hash(prefix, salt) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Kind of the decision point reached after `prefix`.
    pub fn decision_kind(&self, prefix: &[Choice]) -> DecisionKind {
        let depth = prefix.len();
        if depth % 7 == 6 {
            DecisionKind::Scheduling
        } else if depth % 3 == 2 {
            DecisionKind::Nondeterministic
        } else {
            DecisionKind::PathCondition
        }
    }

    /// Feasible branches after `prefix`. Never empty.
    pub fn eligible_choices(&self, prefix: &[Choice]) -> Vec<Choice> {
        let mut eligible: Vec<Choice> = (0..self.branching as Choice)
            .filter(|&c| {
                let mut branch = prefix.to_vec();
                branch.push(c);
                self.hash(&branch, 1) % INFEASIBLE_MODULUS != 0
            })
            .collect();

        if eligible.is_empty() {
            eligible.push(0);
        }
        eligible
    }

    /// Outcome if the program terminates right after `prefix`.
    pub fn outcome(&self, prefix: &[Choice]) -> Option<OutcomeClass> {
        if prefix.len() >= self.depth {
            return Some(OutcomeClass::Success);
        }
        if prefix.is_empty() {
            return None;
        }

        let u = self.unit(prefix, 2);
        if u < self.error_rate {
            Some(OutcomeClass::Error)
        } else if u < self.error_rate + self.boundary_rate {
            Some(OutcomeClass::ConstraintBoundary)
        } else {
            None
        }
    }

    /// Choice the engine makes on its own at decisions the strategy leaves
    /// alone.
    pub fn default_choice(&self, prefix: &[Choice], eligible: &[Choice]) -> Choice {
        eligible[(self.hash(prefix, 3) % eligible.len() as u64) as usize]
    }

    /// Cost of taking `choice` after `prefix`, in 1..=MAX_BRANCH_COST.
    pub fn branch_cost(&self, prefix: &[Choice], choice: Choice) -> i64 {
        let mut branch = prefix.to_vec();
        branch.push(choice);
        (self.hash(&branch, 4) % MAX_BRANCH_COST) as i64 + 1
    }

    /// Total cost of a path.
    pub fn path_cost(&self, path: &Path) -> i64 {
        let choices = path.as_slice();
        (0..choices.len())
            .map(|i| self.branch_cost(&choices[..i], choices[i]))
            .sum()
    }

    /// Number of concrete inputs a path stands for, in 1..=4.
    pub fn model_count(&self, path: &Path) -> i64 {
        (self.hash(path.as_slice(), 5) % 4) as i64 + 1
    }

    /// Path condition accumulated along `prefix`, e.g. `b0==1 && b1==0`.
    pub fn path_condition(&self, prefix: &[Choice]) -> StateSnapshot {
        let condition = prefix
            .iter()
            .enumerate()
            .map(|(depth, choice)| format!("b{}=={}", depth, choice))
            .collect::<Vec<_>>()
            .join(" && ");
        StateSnapshot::from(condition.as_str())
    }

    /// Every complete path of the program with its outcome, in DFS order.
    /// Exponential in depth; only meant for small programs.
    pub fn enumerate_paths(&self) -> Vec<(Path, OutcomeClass)> {
        let mut out = Vec::new();
        let mut stack = vec![Vec::<Choice>::new()];
        while let Some(prefix) = stack.pop() {
            if let Some(outcome) = self.outcome(&prefix) {
                out.push((Path::from_choices(prefix), outcome));
                continue;
            }
            for choice in self.eligible_choices(&prefix).into_iter().rev() {
                let mut next = prefix.clone();
                next.push(choice);
                stack.push(next);
            }
        }
        out
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Reward equal to the summed branch costs of the sampled path.
#[derive(Debug, Clone)]
pub struct PathCost {
    program: SyntheticProgram,
}

impl PathCost {
    pub fn new(program: SyntheticProgram) -> Self {
        Self { program }
    }
}

impl RewardFunction for PathCost {
    fn compute_reward(&self, ctx: &dyn ExecutionContext) -> i64 {
        self.program.path_cost(&ctx.path())
    }
}

/// Path volume from the program's model count.
#[derive(Debug, Clone)]
pub struct ModelCount {
    program: SyntheticProgram,
}

impl ModelCount {
    pub fn new(program: SyntheticProgram) -> Self {
        Self { program }
    }
}

impl PathQuantifier for ModelCount {
    fn quantify_path(&self, ctx: &dyn ExecutionContext) -> i64 {
        self.program.model_count(&ctx.path())
    }
}
