//! Per-sample reward log written as CSV when the analysis finishes.

use sampling_core::{AnalysisObserver, OutcomeClass, SampleEvent, SamplingResult};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Observer collecting `(sample, outcome, reward)` rows.
#[derive(Debug)]
pub struct RewardLog {
    path: PathBuf,
    rows: Vec<(u64, OutcomeClass, i64)>,
}

impl RewardLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn write_csv(&self) -> std::io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(&self.path)?);
        writeln!(out, "sample,outcome,reward")?;
        for (sample, outcome, reward) in &self.rows {
            writeln!(out, "{},{},{}", sample, outcome, reward)?;
        }
        out.flush()
    }
}

impl AnalysisObserver for RewardLog {
    fn sample_done(&mut self, event: &SampleEvent<'_>) {
        self.rows.push((event.sample, event.outcome, event.reward));
    }

    fn analysis_done(&mut self, _result: &SamplingResult) {
        match self.write_csv() {
            Ok(()) => debug!(rows = self.rows.len(), "Wrote reward log to {}", self.path.display()),
            Err(e) => warn!("Failed to write reward log {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampling_core::BestResult;
    use tempfile::tempdir;

    fn event(sample: u64, outcome: OutcomeClass, reward: i64, best: &BestResult) -> SampleEvent<'_> {
        SampleEvent {
            sample,
            outcome,
            reward,
            path_volume: 1,
            best,
            previously_sampled: false,
        }
    }

    #[test]
    fn test_rows_written_in_sample_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rewards.csv");
        let best = BestResult::default();

        let mut log = RewardLog::new(&path);
        log.analysis_started();
        log.sample_done(&event(1, OutcomeClass::Success, 12, &best));
        log.sample_done(&event(2, OutcomeClass::Error, -3, &best));
        log.analysis_done(&SamplingResult::new());

        assert_eq!(log.len(), 2);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "sample,outcome,reward\n1,success,12\n2,error,-3\n");
    }

    #[test]
    fn test_unwritable_path_is_not_fatal() {
        let dir = tempdir().unwrap();
        let mut log = RewardLog::new(dir.path().join("missing").join("rewards.csv"));
        log.analysis_done(&SamplingResult::new());
        assert_eq!(log.len(), 0);
    }
}
