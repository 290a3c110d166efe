//! Deterministic simulated-time scheduler for the Vigil verification harness.
//!
//! The kernel owns a flat set of 4-state signals and a set of cooperative
//! tasks (device models, monitors, stimulus generators). Tasks wait on clock
//! edges, value changes, levels, or delays; the kernel resumes them in a
//! fixed order and defers their writes by one delta cycle, so that every
//! run with the same inputs produces the same trace.
//!
//! A testbench drives the kernel from outside with [`SimKernel::set`] and
//! the `run_*` methods, and reclaims task state through typed
//! [`TaskHandle`]s.

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod kernel;
pub mod process;
pub mod time;
pub mod value;

pub use clock::{spawn_clock, ClockGen};
pub use error::SimError;
pub use kernel::{SimKernel, DEFAULT_MAX_DELTAS};
pub use process::{Process, ProcessContext, ProcessId, TaskHandle, Trigger, Wait};
pub use time::SimTime;
pub use value::{check_edge, Edge, SignalId, SignalState};
