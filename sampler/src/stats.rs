//! Run report persistence.
//!
//! At the end of a run the binary writes one JSON document with:
//! - Program and strategy parameters
//! - Engine counters (samples, decisions, outcomes)
//! - Reward statistics and the best result per outcome class
//! - Search tree shape (MCTS runs only)

use mcts::TreeStats;
use programs::RunSummary;
use sampling_core::{BestResult, OutcomeClass, SampleStatisticsSnapshot, SamplingResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use tracing::{debug, warn};

/// Best result of one outcome class, flattened for JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestEntry {
    pub outcome: OutcomeClass,
    pub reward: i64,
    pub sample: u64,
    pub path: String,
    pub path_condition: String,
}

impl BestEntry {
    fn new(outcome: OutcomeClass, best: &BestResult) -> Self {
        Self {
            outcome,
            reward: best.reward,
            sample: best.sample_number,
            path: best.path.to_string(),
            path_condition: best.snapshot.to_string_lossy(),
        }
    }
}

/// Search tree shape at the end of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeReport {
    pub total_nodes: usize,
    pub in_tree_nodes: usize,
    pub root_visits: u64,
    pub root_mean_reward: f64,
    pub max_depth: u32,
}

impl From<&TreeStats> for TreeReport {
    fn from(stats: &TreeStats) -> Self {
        Self {
            total_nodes: stats.total_nodes,
            in_tree_nodes: stats.in_tree_nodes,
            root_visits: stats.root_visits,
            root_mean_reward: stats.root_mean_reward,
            max_depth: stats.max_depth,
        }
    }
}

/// Serializable report for JSON output.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub strategy: String,
    pub program_depth: usize,
    pub program_branching: usize,
    pub program_seed: u64,
    pub summary: RunSummary,
    pub statistics: SampleStatisticsSnapshot,
    pub best: Vec<BestEntry>,
    pub tree: Option<TreeReport>,
    pub timestamp: u64,
}

impl RunReport {
    /// Collect the set best results, in outcome-class order.
    pub fn best_entries(result: &SamplingResult) -> Vec<BestEntry> {
        OutcomeClass::ALL
            .iter()
            .filter_map(|&outcome| {
                let best = result.best(outcome);
                best.is_set().then(|| BestEntry::new(outcome, best))
            })
            .collect()
    }

    pub fn timestamp_now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Write `report` to `path` as JSON (atomic write-then-rename).
///
/// Failures are logged and otherwise ignored: a lost report never fails a
/// completed run.
pub fn write_report(path: &str, report: &RunReport) {
    let json = match serde_json::to_string_pretty(report) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize run report: {}", e);
            return;
        }
    };

    // Write to temp file then rename (atomic on most filesystems)
    let temp_path = format!("{}.tmp", path);
    match fs::File::create(&temp_path) {
        Ok(mut file) => {
            if let Err(e) = file.write_all(json.as_bytes()) {
                warn!("Failed to write run report: {}", e);
                return;
            }
        }
        Err(e) => {
            warn!("Failed to create temp report file: {}", e);
            return;
        }
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        warn!("Failed to rename report file: {}", e);
        // Try to clean up temp file
        let _ = fs::remove_file(&temp_path);
        return;
    }

    debug!("Wrote run report to {}", path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampling_core::{Path, SampleStatistics, StateSnapshot};
    use tempfile::tempdir;

    fn result_with_error_best() -> SamplingResult {
        let mut result = SamplingResult::new();
        let sample = result.next_sample();
        result.best_mut(OutcomeClass::Error).offer(
            9,
            sample,
            &Path::from(vec![0, 1]),
            &StateSnapshot::from("b0==0 && b1==1"),
        );
        result
    }

    fn report(result: &SamplingResult) -> RunReport {
        RunReport {
            strategy: "mcts".into(),
            program_depth: 4,
            program_branching: 2,
            program_seed: 1,
            summary: RunSummary::default(),
            statistics: SampleStatistics::new().snapshot(),
            best: RunReport::best_entries(result),
            tree: None,
            timestamp: RunReport::timestamp_now(),
        }
    }

    #[test]
    fn test_best_entries_skip_unset_classes() {
        let entries = RunReport::best_entries(&result_with_error_best());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, OutcomeClass::Error);
        assert_eq!(entries[0].reward, 9);
        assert_eq!(entries[0].sample, 1);
        assert_eq!(entries[0].path, "[0,1]");
        assert_eq!(entries[0].path_condition, "b0==0 && b1==1");
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sampler_stats.json");
        let path = path.to_str().unwrap();

        write_report(path, &report(&result_with_error_best()));

        let content = fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["strategy"], "mcts");
        assert_eq!(parsed["best"][0]["outcome"], "error");
        assert!(parsed["tree"].is_null());
        assert!(!std::path::Path::new(&format!("{}.tmp", path)).exists());
    }

    #[test]
    fn test_write_report_to_missing_dir_does_not_panic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("stats.json");
        write_report(path.to_str().unwrap(), &report(&SamplingResult::new()));
        assert!(!path.exists());
    }
}
