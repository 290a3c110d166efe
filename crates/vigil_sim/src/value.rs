//! Signal identifiers, runtime signal state, and edge detection.
//!
//! Every signal lives in a single flat namespace owned by the kernel and is
//! addressed by a [`SignalId`]. A [`SignalState`] keeps the value from before
//! its most recent change so that edges can be recognized in the delta cycle
//! in which they happen.

use serde::{Deserialize, Serialize};
use std::fmt;

use vigil_common::{Level, Logic, LogicVec};

/// Opaque ID for a kernel signal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sig#{}", self.0)
    }
}

/// The direction of a single-bit transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// A strict 0 to 1 transition.
    Rising,
    /// A strict 1 to 0 transition.
    Falling,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Rising => write!(f, "rising edge"),
            Edge::Falling => write!(f, "falling edge"),
        }
    }
}

/// The runtime state of a kernel signal.
#[derive(Clone, Debug)]
pub struct SignalState {
    /// Hierarchical or flat signal name.
    pub name: String,
    /// Declared bit width.
    pub width: u32,
    /// Current value.
    pub value: LogicVec,
    /// Value before the most recent change.
    pub previous_value: LogicVec,
}

impl SignalState {
    /// Creates a signal with the given initial value.
    pub fn new(name: impl Into<String>, value: LogicVec) -> Self {
        Self {
            name: name.into(),
            width: value.width(),
            previous_value: value.clone(),
            value,
        }
    }

    /// Returns the tri-state level of bit 0.
    pub fn level(&self) -> Level {
        self.value.level()
    }

    /// Replaces the value, remembering the old one. Returns `true` if it changed.
    pub(crate) fn update(&mut self, value: LogicVec) -> bool {
        if self.value == value {
            return false;
        }
        self.previous_value = std::mem::replace(&mut self.value, value);
        true
    }

    /// Returns `true` if the most recent change was an `edge` on bit 0.
    pub fn has_edge(&self, edge: Edge) -> bool {
        check_edge(&self.previous_value, &self.value, edge)
    }
}

/// Checks bit 0 of two successive values for a strict transition.
///
/// Transitions through X or Z never count.
pub fn check_edge(prev: &LogicVec, curr: &LogicVec, edge: Edge) -> bool {
    if prev.width() == 0 || curr.width() == 0 {
        return false;
    }
    let prev_bit = prev.get(0);
    let curr_bit = curr.get(0);
    match edge {
        Edge::Rising => prev_bit == Logic::Zero && curr_bit == Logic::One,
        Edge::Falling => prev_bit == Logic::One && curr_bit == Logic::Zero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_id_roundtrip() {
        let id = SignalId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.to_string(), "sig#42");
    }

    #[test]
    fn rising_and_falling() {
        let lo = LogicVec::from_bool(false);
        let hi = LogicVec::from_bool(true);
        assert!(check_edge(&lo, &hi, Edge::Rising));
        assert!(!check_edge(&lo, &hi, Edge::Falling));
        assert!(check_edge(&hi, &lo, Edge::Falling));
        assert!(!check_edge(&hi, &lo, Edge::Rising));
    }

    #[test]
    fn x_transitions_are_not_edges() {
        let x = LogicVec::unknown(1);
        let hi = LogicVec::from_bool(true);
        let lo = LogicVec::from_bool(false);
        assert!(!check_edge(&x, &hi, Edge::Rising));
        assert!(!check_edge(&x, &lo, Edge::Falling));
        assert!(!check_edge(&hi, &x, Edge::Falling));
    }

    #[test]
    fn zero_width_never_edges() {
        let empty = LogicVec::new(0);
        assert!(!check_edge(&empty, &empty, Edge::Rising));
    }

    #[test]
    fn update_tracks_previous() {
        let mut s = SignalState::new("clk", LogicVec::from_bool(false));
        assert_eq!(s.width, 1);
        assert!(!s.update(LogicVec::from_bool(false)));
        assert!(s.update(LogicVec::from_bool(true)));
        assert!(s.has_edge(Edge::Rising));
        assert_eq!(s.level(), Level::One);
        assert!(s.update(LogicVec::from_bool(false)));
        assert!(s.has_edge(Edge::Falling));
    }

    #[test]
    fn edge_display() {
        assert_eq!(Edge::Rising.to_string(), "rising edge");
        assert_eq!(Edge::Falling.to_string(), "falling edge");
    }
}
