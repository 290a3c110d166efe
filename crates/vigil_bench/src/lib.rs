//! Verification harness for the Vigil threshold and stream devices.
//!
//! The crate holds the pieces a scenario is assembled from:
//!
//! - [`model`]: the signed strict-greater-than reference model
//! - [`loader`]: reference file parsing and writing
//! - [`observer`]: an AXI4-Stream transfer recorder
//! - [`backpressure`]: `tready` stall injection
//! - [`scoreboard`]: expected versus received comparison
//! - [`scenario`] and [`suites`]: the scenario runner and the registered suites
//! - [`datagen`]: generators for reference data files

#![warn(missing_docs)]

pub mod backpressure;
pub mod datagen;
pub mod error;
pub mod loader;
pub mod model;
pub mod observer;
pub mod scenario;
pub mod scoreboard;
pub mod suites;

pub use backpressure::{BackpressureInjector, BackpressureMode};
pub use error::{BenchError, LoadError};
pub use loader::{
    load_reference, parse_reference, render_reference, write_reference, Radix, ReferenceData,
    ReferenceFile, SkippedLine,
};
pub use model::{expected_flags, over, over_with, Comparison, ThresholdSet};
pub use observer::{AxisObserver, StreamTap, Transfer};
pub use scenario::{run, Scenario, ScenarioContext, ScenarioOutcome};
pub use scoreboard::{compare, ComparisonReport, FailureReason, Mismatch};
pub use suites::{find, registry, run_scenario};
