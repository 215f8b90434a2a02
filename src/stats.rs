//! Latency sample tracking and percentile computation
//!
//! Samples accumulate for the lifetime of a run and are never removed.
//! Percentiles are recomputed from scratch on every snapshot; sample counts
//! stay in the tens, so a streaming estimator would be complexity for
//! nothing.

use serde::Serialize;

/// Non-interpolated percentile snapshot in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Percentiles {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

impl Percentiles {
    pub const ZERO: Percentiles = Percentiles { p50: 0, p90: 0, p99: 0 };
}

/// Aggregate statistics over a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub count: usize,
    pub mean_ms: u64,
    pub percentiles: Percentiles,
    pub min_ms: u64,
    pub max_ms: u64,
}

/// Compute p50/p90/p99 over the samples.
///
/// Sort ascending, then pick `floor(fraction * count)` with no interpolation.
/// The index is clamped to the last element; for `fraction < 1` and
/// `count >= 1` the floor already stays below `count`, the clamp is
/// defensive. Empty input short-circuits to all zeros.
pub fn calculate_percentiles(samples: &[u64]) -> Percentiles {
    if samples.is_empty() {
        return Percentiles::ZERO;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let len = sorted.len();

    let pick = |fraction: f64| -> u64 {
        let index = ((len as f64 * fraction).floor() as usize).min(len - 1);
        sorted[index]
    };

    Percentiles {
        p50: pick(0.50),
        p90: pick(0.90),
        p99: pick(0.99),
    }
}

/// Process-lifetime latency sample sequence.
///
/// Single-writer in the sequential batch loop; a concurrent caller would need
/// to serialize appends.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    samples: Vec<u64>,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed swap's duration in milliseconds
    pub fn record(&mut self, duration_ms: u64) {
        self.samples.push(duration_ms);
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// Current percentile snapshot over all samples observed so far
    pub fn percentiles(&self) -> Percentiles {
        calculate_percentiles(&self.samples)
    }

    /// Final aggregate statistics over the full sample sequence
    pub fn summary(&self) -> RunSummary {
        let count = self.samples.len();
        let mean_ms = if count == 0 {
            0
        } else {
            let total: u64 = self.samples.iter().sum();
            (total as f64 / count as f64).round() as u64
        };
        RunSummary {
            count,
            mean_ms,
            percentiles: self.percentiles(),
            min_ms: self.samples.iter().copied().min().unwrap_or(0),
            max_ms: self.samples.iter().copied().max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_returns_exact_zeros() {
        assert_eq!(calculate_percentiles(&[]), Percentiles::ZERO);
    }

    #[test]
    fn test_reference_sequence_indices() {
        // 10 samples: p50 index floor(10*0.5)=5, p90 index floor(10*0.9)=9,
        // p99 index floor(10*0.99)=9
        let samples = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100];
        let p = calculate_percentiles(&samples);
        assert_eq!(p.p50, 60);
        assert_eq!(p.p90, 100);
        assert_eq!(p.p99, 100);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let samples = [100, 10, 90, 20, 80, 30, 70, 40, 60, 50];
        let p = calculate_percentiles(&samples);
        assert_eq!(p.p50, 60);
        assert_eq!(p.p90, 100);
    }

    #[test]
    fn test_single_sample() {
        let p = calculate_percentiles(&[42]);
        assert_eq!(p, Percentiles { p50: 42, p90: 42, p99: 42 });
    }

    #[test]
    fn test_tracker_accumulates_and_summarizes() {
        let mut tracker = LatencyTracker::new();
        for sample in [10, 20, 30] {
            tracker.record(sample);
        }
        let summary = tracker.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean_ms, 20);
        assert_eq!(summary.min_ms, 10);
        assert_eq!(summary.max_ms, 30);
    }

    #[test]
    fn test_empty_tracker_summary_is_zeroed() {
        let summary = LatencyTracker::new().summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_ms, 0);
        assert_eq!(summary.min_ms, 0);
        assert_eq!(summary.max_ms, 0);
        assert_eq!(summary.percentiles, Percentiles::ZERO);
    }

    proptest! {
        #[test]
        fn prop_percentiles_are_monotonic(samples in prop::collection::vec(0u64..100_000, 1..200)) {
            let p = calculate_percentiles(&samples);
            prop_assert!(p.p50 <= p.p90);
            prop_assert!(p.p90 <= p.p99);
        }

        #[test]
        fn prop_percentiles_are_observed_values(samples in prop::collection::vec(0u64..100_000, 1..200)) {
            let p = calculate_percentiles(&samples);
            prop_assert!(samples.contains(&p.p50));
            prop_assert!(samples.contains(&p.p90));
            prop_assert!(samples.contains(&p.p99));
        }
    }
}
