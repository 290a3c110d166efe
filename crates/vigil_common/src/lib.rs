//! Shared foundational types used across the Vigil verification harness.
//!
//! This crate provides 4-state logic values, the tri-state [`Level`] view used
//! when sampling handshake signals, packed logic vectors, the 32-bit
//! [`Sample`] normalizer, and simulated-duration parsing.

#![warn(missing_docs)]

pub mod duration;
pub mod logic;
pub mod logic_vec;
pub mod sample;

pub use duration::{
    parse_duration, ParseDurationError, FS_PER_MS, FS_PER_NS, FS_PER_PS, FS_PER_S, FS_PER_US,
};
pub use logic::{Level, Logic};
pub use logic_vec::LogicVec;
pub use sample::{normalize, Comparison, ParseSampleError, Sample, SAMPLE_WIDTH};
