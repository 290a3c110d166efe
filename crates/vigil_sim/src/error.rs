//! Kernel error types.
//!
//! All errors that can occur while building or advancing a simulation are
//! represented as variants of [`SimError`].

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A signal name was looked up but never declared.
    #[error("unknown signal '{name}'")]
    UnknownSignal {
        /// The name that was looked up.
        name: String,
    },

    /// A signal with this name already exists.
    #[error("signal '{name}' is already declared")]
    DuplicateSignal {
        /// The duplicated name.
        name: String,
    },

    /// A write did not match the declared width of its target.
    #[error("width mismatch on '{signal}': declared {expected} bits, got {actual}")]
    WidthMismatch {
        /// The target signal name.
        signal: String,
        /// The declared width.
        expected: u32,
        /// The width of the written value.
        actual: u32,
    },

    /// A clock generator was configured with an unusable period.
    #[error("clock period must be at least 2 fs, got {period_fs} fs")]
    InvalidClockPeriod {
        /// The rejected period in femtoseconds.
        period_fs: u64,
    },

    /// A task reported a failure while running.
    #[error("task '{task}' failed: {reason}")]
    TaskFailed {
        /// The task name.
        task: String,
        /// Description of the failure.
        reason: String,
    },

    /// A watchdog ceiling was reached before the awaited condition held.
    #[error("timed out after {cycles} cycles waiting for {waiting_for}")]
    Timeout {
        /// Description of the awaited condition.
        waiting_for: String,
        /// The cycle ceiling that was reached.
        cycles: u64,
    },

    /// The driver waited for an edge but no task or timer remains to produce it.
    #[error("simulation stalled at {time_fs} fs waiting for an edge on '{signal}'")]
    Stalled {
        /// The signal whose edge was awaited.
        signal: String,
        /// Time in femtoseconds when the event queue ran dry.
        time_fs: u64,
    },

    /// Too many delta cycles at a single time step, indicating a combinational loop.
    #[error("delta cycle limit exceeded at {fs} fs (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time in femtoseconds where the limit was hit.
        fs: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },
}
