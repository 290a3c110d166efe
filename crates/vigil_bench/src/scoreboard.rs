//! Expected-versus-received comparison and failure reporting.

use std::fmt::{self, Write as _};

use serde::Serialize;
use vigil_common::Sample;

/// A value that differs from the expected sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Position in the sequence.
    pub index: usize,
    /// The expected value.
    pub expected: Sample,
    /// The value actually received.
    pub actual: Sample,
}

/// Why a scenario failed. A scenario may report several.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The number of received values differs from the number expected.
    DataCountMismatch {
        /// Values expected.
        expected: usize,
        /// Values received.
        received: usize,
    },
    /// One or more received values differ from the expected values.
    ValueMismatch {
        /// Number of differing positions.
        count: usize,
        /// The first differing position.
        first: Mismatch,
    },
    /// A side-band flag differed from the reference model.
    FlagMismatch {
        /// Beat index.
        index: usize,
        /// The beat's data value.
        data: Sample,
        /// The flag the model expects.
        expected: bool,
        /// The level observed, rendered.
        actual: String,
    },
    /// A wait on the device exceeded its cycle ceiling.
    Timeout {
        /// What the scenario was waiting for.
        waiting_for: String,
        /// The ceiling, in cycles.
        cycles: u64,
    },
    /// A scenario assertion did not hold.
    Check(String),
    /// The simulation kernel reported an error.
    Simulation(String),
    /// The scenario could not be set up.
    Setup(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::DataCountMismatch { expected, received } => write!(
                f,
                "data count mismatch: expected {expected} values, received {received}"
            ),
            FailureReason::ValueMismatch { count, first } => write!(
                f,
                "{count} value mismatch(es), first at index {}: expected {}, got {}",
                first.index, first.expected, first.actual
            ),
            FailureReason::FlagMismatch {
                index,
                data,
                expected,
                actual,
            } => write!(
                f,
                "flag mismatch at beat {index} (data {data}): expected {}, got {actual}",
                u8::from(*expected)
            ),
            FailureReason::Timeout {
                waiting_for,
                cycles,
            } => write!(f, "timeout after {cycles} cycles waiting for {waiting_for}"),
            FailureReason::Check(msg) => write!(f, "check failed: {msg}"),
            FailureReason::Simulation(msg) => write!(f, "simulation error: {msg}"),
            FailureReason::Setup(msg) => write!(f, "setup failed: {msg}"),
        }
    }
}

/// The outcome of comparing a received sequence with an expected one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    /// Length of the expected sequence.
    pub expected_len: usize,
    /// Length of the received sequence.
    pub received_len: usize,
    /// Positions where both sequences agree.
    pub matches: usize,
    /// Positions where both sequences have a value and they differ.
    pub mismatches: Vec<Mismatch>,
}

/// Compares position by position over the shorter of the two sequences.
pub fn compare(expected: &[Sample], received: &[Sample]) -> ComparisonReport {
    let mut matches = 0;
    let mut mismatches = Vec::new();
    for (index, (&e, &a)) in expected.iter().zip(received).enumerate() {
        if e.signed() == a.signed() {
            matches += 1;
        } else {
            mismatches.push(Mismatch {
                index,
                expected: e,
                actual: a,
            });
        }
    }
    ComparisonReport {
        expected_len: expected.len(),
        received_len: received.len(),
        matches,
        mismatches,
    }
}

impl ComparisonReport {
    /// True only if the lengths agree and every value matches.
    pub fn passed(&self) -> bool {
        self.expected_len == self.received_len
            && self.mismatches.is_empty()
            && self.matches == self.expected_len
    }

    /// Percentage of expected values matched.
    pub fn match_percentage(&self) -> f64 {
        if self.expected_len == 0 {
            if self.received_len == 0 {
                100.0
            } else {
                0.0
            }
        } else {
            self.matches as f64 * 100.0 / self.expected_len as f64
        }
    }

    /// The itemised reasons this comparison failed; empty if it passed.
    pub fn failures(&self) -> Vec<FailureReason> {
        let mut reasons = Vec::new();
        if self.expected_len != self.received_len {
            reasons.push(FailureReason::DataCountMismatch {
                expected: self.expected_len,
                received: self.received_len,
            });
        }
        if let Some(&first) = self.mismatches.first() {
            reasons.push(FailureReason::ValueMismatch {
                count: self.mismatches.len(),
                first,
            });
        }
        reasons
    }

    /// Renders totals and the first `max_listed` mismatches.
    pub fn summary(&self, max_listed: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "expected values: {}", self.expected_len);
        let _ = writeln!(out, "received values: {}", self.received_len);
        let _ = writeln!(
            out,
            "matched:         {} ({:.2}%)",
            self.matches,
            self.match_percentage()
        );
        let _ = writeln!(out, "mismatched:      {}", self.mismatches.len());
        if self.expected_len != self.received_len {
            let _ = writeln!(out, "data count mismatch");
        }
        for m in self.mismatches.iter().take(max_listed) {
            let _ = writeln!(
                out,
                "  [{}] expected {} ({}), got {} ({})",
                m.index,
                m.expected,
                m.expected.to_hex(),
                m.actual,
                m.actual.to_hex()
            );
        }
        if self.mismatches.len() > max_listed {
            let _ = writeln!(out, "  ... and {} more", self.mismatches.len() - max_listed);
        }
        out
    }
}
