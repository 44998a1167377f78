//! Best results per outcome class.

use crate::outcome::OutcomeClass;
use crate::path::Path;
use crate::snapshot::StateSnapshot;

/// Best reward seen so far for one outcome class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestResult {
    /// Highest raw reward observed. Starts below any attainable reward.
    pub reward: i64,
    /// 1-based sample number that achieved `reward` (0 while unset).
    pub sample_number: u64,
    pub path: Path,
    pub snapshot: StateSnapshot,
}

impl BestResult {
    pub const UNSET_REWARD: i64 = i64::MIN;

    pub fn is_set(&self) -> bool {
        self.sample_number > 0
    }

    /// Replace the stored result if `reward` is strictly greater, or if
    /// nothing was stored yet. Returns true when the result was replaced.
    pub fn offer(
        &mut self,
        reward: i64,
        sample_number: u64,
        path: &Path,
        snapshot: &StateSnapshot,
    ) -> bool {
        if self.is_set() && reward <= self.reward {
            return false;
        }
        self.reward = reward;
        self.sample_number = sample_number;
        self.path = path.clone();
        self.snapshot = snapshot.clone();
        true
    }
}

impl Default for BestResult {
    fn default() -> Self {
        Self {
            reward: Self::UNSET_REWARD,
            sample_number: 0,
            path: Path::new(),
            snapshot: StateSnapshot::empty(),
        }
    }
}

/// Aggregate state of one sampling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplingResult {
    sample_count: u64,
    success: BestResult,
    failure: BestResult,
    constraint_boundary: BestResult,
}

impl SamplingResult {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Count one more completed sample and return its 1-based number.
    pub fn next_sample(&mut self) -> u64 {
        self.sample_count += 1;
        self.sample_count
    }

    pub fn best(&self, outcome: OutcomeClass) -> &BestResult {
        match outcome {
            OutcomeClass::Success => &self.success,
            OutcomeClass::Error => &self.failure,
            OutcomeClass::ConstraintBoundary => &self.constraint_boundary,
        }
    }

    pub fn best_mut(&mut self, outcome: OutcomeClass) -> &mut BestResult {
        match outcome {
            OutcomeClass::Success => &mut self.success,
            OutcomeClass::Error => &mut self.failure,
            OutcomeClass::ConstraintBoundary => &mut self.constraint_boundary,
        }
    }

    /// Best result across every outcome class, if any sample was recorded.
    pub fn overall_best(&self) -> Option<(OutcomeClass, &BestResult)> {
        OutcomeClass::ALL
            .iter()
            .map(|&class| (class, self.best(class)))
            .filter(|(_, best)| best.is_set())
            .max_by_key(|(_, best)| best.reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unset() {
        let result = SamplingResult::new();
        assert_eq!(result.sample_count(), 0);
        for class in OutcomeClass::ALL {
            let best = result.best(class);
            assert!(!best.is_set());
            assert_eq!(best.reward, i64::MIN);
        }
        assert!(result.overall_best().is_none());
    }

    #[test]
    fn test_offer_requires_strictly_greater() {
        let mut best = BestResult::default();
        let path = Path::from(vec![0, 1]);
        let pc = StateSnapshot::from("a");

        assert!(best.offer(5, 1, &path, &pc));
        assert!(!best.offer(5, 2, &Path::new(), &StateSnapshot::empty()));
        assert_eq!(best.sample_number, 1);
        assert_eq!(best.path, path);

        assert!(!best.offer(3, 3, &path, &pc));
        assert!(best.offer(9, 4, &Path::from(vec![1]), &StateSnapshot::from("b")));
        assert_eq!(best.reward, 9);
        assert_eq!(best.sample_number, 4);
        assert_eq!(best.snapshot.as_bytes(), b"b");
    }

    #[test]
    fn test_lowest_reward_is_still_recorded() {
        let mut best = BestResult::default();
        let path = Path::from(vec![1]);

        assert!(best.offer(i64::MIN, 1, &path, &StateSnapshot::from("low")));
        assert!(best.is_set());
        assert_eq!(best.sample_number, 1);
        assert_eq!(best.path, path);

        // A second sample at the same reward does not replace it
        assert!(!best.offer(i64::MIN, 2, &Path::new(), &StateSnapshot::empty()));
        assert_eq!(best.sample_number, 1);
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut result = SamplingResult::new();
        let n = result.next_sample();
        result
            .best_mut(OutcomeClass::Error)
            .offer(7, n, &Path::new(), &StateSnapshot::empty());

        assert!(result.best(OutcomeClass::Error).is_set());
        assert!(!result.best(OutcomeClass::Success).is_set());
        assert_eq!(
            result.overall_best().map(|(class, best)| (class, best.reward)),
            Some((OutcomeClass::Error, 7))
        );
    }
}
