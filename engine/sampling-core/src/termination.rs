//! Stop conditions for a sampling run.

use crate::context::ExecutionContext;
use crate::result::SamplingResult;

/// Decides after each completed sample whether the run should stop.
pub trait TerminationStrategy {
    fn should_terminate(&mut self, ctx: &dyn ExecutionContext, result: &SamplingResult) -> bool;
}

/// Stops after a fixed number of samples.
#[derive(Debug, Clone)]
pub struct SampleSizeTermination {
    max_samples: u64,
    samples: u64,
}

impl SampleSizeTermination {
    pub fn new(max_samples: u64) -> Self {
        Self {
            max_samples,
            samples: 0,
        }
    }

    pub fn max_samples(&self) -> u64 {
        self.max_samples
    }
}

impl TerminationStrategy for SampleSizeTermination {
    fn should_terminate(&mut self, _ctx: &dyn ExecutionContext, _result: &SamplingResult) -> bool {
        self.samples += 1;
        self.samples >= self.max_samples
    }
}
