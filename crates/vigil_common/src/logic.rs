//! IEEE 1164 four-state logic values and the tri-state [`Level`] view.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A single 4-state logic value following the IEEE 1164 standard.
///
/// The four states represent:
/// - `Zero`: logic low (driven 0)
/// - `One`: logic high (driven 1)
/// - `X`: unknown or uninitialized value
/// - `Z`: high-impedance (tri-state, not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (tri-state).
    Z = 3,
}

impl Logic {
    /// Collapses the value to a [`Level`]; `X` and `Z` both become `Unknown`.
    pub fn level(self) -> Level {
        match self {
            Logic::Zero => Level::Zero,
            Logic::One => Level::One,
            Logic::X | Logic::Z => Level::Unknown,
        }
    }
}

impl From<bool> for Logic {
    fn from(value: bool) -> Self {
        if value {
            Logic::One
        } else {
            Logic::Zero
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::Z => write!(f, "Z"),
        }
    }
}

/// IEEE 1164 NOT:
/// - `!0 = 1`, `!1 = 0`, `!X = X`, `!Z = X`
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        use Logic::*;
        match self {
            Zero => One,
            One => Zero,
            X | Z => X,
        }
    }
}

/// The observable level of a control signal as seen by a monitor.
///
/// Handshake sampling only distinguishes asserted, deasserted, and anything
/// undefined or floating. Matching on a `Level` forces the `Unknown` case to
/// be handled explicitly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Level {
    /// Driven low.
    Zero,
    /// Driven high.
    One,
    /// Undefined (`X`) or floating (`Z`).
    Unknown,
}

impl Level {
    /// Returns the boolean value, or `None` for `Unknown`.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Level::Zero => Some(false),
            Level::One => Some(true),
            Level::Unknown => None,
        }
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Level::One
        } else {
            Level::Zero
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Zero => write!(f, "0"),
            Level::One => write!(f, "1"),
            Level::Unknown => write!(f, "?"),
        }
    }
}
