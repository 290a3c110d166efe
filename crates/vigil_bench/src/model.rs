//! Threshold reference model.
//!
//! `over(sample, threshold)` is a strict greater-than in the signed 32-bit
//! domain. Unsigned ordering exists only as an explicit [`Comparison`].

use vigil_common::Sample;

pub use vigil_common::Comparison;

/// Returns `true` if `sample` is strictly above `threshold` (signed).
pub fn over(sample: Sample, threshold: Sample) -> bool {
    over_with(sample, threshold, Comparison::Signed)
}

/// Returns `true` if `sample` is strictly above `threshold` under `comparison`.
pub fn over_with(sample: Sample, threshold: Sample, comparison: Comparison) -> bool {
    comparison.greater(sample, threshold)
}

/// Expected flag for each sample against one signed threshold.
pub fn expected_flags(samples: &[Sample], threshold: Sample) -> Vec<bool> {
    samples.iter().map(|&s| over(s, threshold)).collect()
}

/// A fixed set of thresholds, each evaluated independently.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThresholdSet {
    thresholds: Vec<Sample>,
    comparison: Comparison,
}

impl ThresholdSet {
    /// A signed threshold set.
    pub fn new(thresholds: impl IntoIterator<Item = Sample>) -> Self {
        Self::with_comparison(thresholds, Comparison::Signed)
    }

    /// A threshold set with an explicit ordering.
    pub fn with_comparison(
        thresholds: impl IntoIterator<Item = Sample>,
        comparison: Comparison,
    ) -> Self {
        Self {
            thresholds: thresholds.into_iter().collect(),
            comparison,
        }
    }

    /// The thresholds, in construction order.
    pub fn thresholds(&self) -> &[Sample] {
        &self.thresholds
    }

    /// The ordering used.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// One flag per threshold, in construction order.
    pub fn evaluate(&self, sample: Sample) -> Vec<bool> {
        self.thresholds
            .iter()
            .map(|&t| over_with(sample, t, self.comparison))
            .collect()
    }

    /// How many of `samples` are above each threshold.
    pub fn count_over(&self, samples: &[Sample]) -> Vec<usize> {
        self.thresholds
            .iter()
            .map(|&t| {
                samples
                    .iter()
                    .filter(|&&s| over_with(s, t, self.comparison))
                    .count()
            })
            .collect()
    }
}
