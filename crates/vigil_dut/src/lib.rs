//! Behavioural models of the circuits the Vigil suites verify.
//!
//! Each model declares its ports in a [`vigil_sim::SimKernel`], spawns one
//! task that implements the circuit's behaviour, and hands back a port
//! struct so a scenario can drive inputs and read outputs by [`SignalId`].
//! Outputs read as X until the model has something defined to drive.
//!
//! [`SignalId`]: vigil_sim::SignalId

#![warn(missing_docs)]

pub mod axis;
pub mod axis_dataover;
pub mod comparator;
pub mod dff;

pub use axis::{AxisMasterFile, AxisPorts, ImageSource};
pub use axis_dataover::{AxisDataover, AxisDataoverPorts, DEFAULT_DATAOVER_THRESHOLD};
pub use comparator::{threshold_label, BankOutput, BankPorts, Comparator, ComparatorPorts, ThresholdBank};
pub use dff::{DFlipFlop, DffPorts};
