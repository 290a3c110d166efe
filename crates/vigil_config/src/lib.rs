//! Parsing and validation of `vigil.toml` bench configuration files.
//!
//! Every table of the file is optional. A missing file section falls back to
//! the defaults the scenario suites were written against: a 10 ns clock,
//! five reset cycles, a signed threshold of 1 000 000, and 30% random
//! backpressure in runs of one to five cycles.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
