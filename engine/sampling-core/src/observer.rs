//! Run-level observers.

use crate::outcome::OutcomeClass;
use crate::result::{BestResult, SamplingResult};

/// Everything an observer learns about one completed sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleEvent<'a> {
    /// 1-based sample number.
    pub sample: u64,
    pub outcome: OutcomeClass,
    /// Raw (not volume-amplified) reward.
    pub reward: i64,
    pub path_volume: i64,
    /// Best result for `outcome` before this sample was taken into account.
    pub best: &'a BestResult,
    /// The exact same path had been sampled before.
    pub previously_sampled: bool,
}

/// Receives analysis lifecycle events. All methods default to no-ops.
pub trait AnalysisObserver {
    fn analysis_started(&mut self) {}

    fn sample_done(&mut self, _event: &SampleEvent<'_>) {}

    fn analysis_done(&mut self, _result: &SamplingResult) {}
}

impl<T: AnalysisObserver + ?Sized> AnalysisObserver for &mut T {
    fn analysis_started(&mut self) {
        (**self).analysis_started()
    }

    fn sample_done(&mut self, event: &SampleEvent<'_>) {
        (**self).sample_done(event)
    }

    fn analysis_done(&mut self, result: &SamplingResult) {
        (**self).analysis_done(result)
    }
}
