//! Packed vectors of 4-state logic values for signal representation.

use crate::logic::{Level, Logic};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector of 4-state [`Logic`] values packed for efficient storage.
///
/// Each logic value occupies 2 bits (encoding 4 states), with 32 values packed
/// per `u64` word. Index 0 is the least significant bit.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    /// Packed storage: 2 bits per logic value, 32 values per u64.
    data: Vec<u64>,
}

/// Number of logic values packed per u64 word.
const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates a new `LogicVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        let num_words = word_count(width);
        Self {
            width,
            data: vec![0; num_words],
        }
    }

    /// Creates a `LogicVec` of the given width with every bit set to `X`.
    pub fn unknown(width: u32) -> Self {
        Self::filled(width, Logic::X)
    }

    /// Creates a `LogicVec` of the given width with every bit set to `value`.
    pub fn filled(width: u32, value: Logic) -> Self {
        let mut v = Self::new(width);
        for i in 0..width {
            v.set(i, value);
        }
        v
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let bits = (self.data[word_idx] >> bit_offset) & 0b11;
        match bits {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            3 => Logic::Z,
            _ => unreachable!(),
        }
    }

    /// Sets the logic value at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let bit_offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << bit_offset);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << bit_offset);
    }

    /// Creates a single-bit `LogicVec` from a boolean value.
    pub fn from_bool(value: bool) -> Self {
        let mut v = Self::new(1);
        if value {
            v.set(0, Logic::One);
        }
        v
    }

    /// Creates a `LogicVec` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Converts the `LogicVec` to a `u64`, if all bits are definite (0 or 1).
    ///
    /// Returns `None` if the vector contains X or Z values, or if the width
    /// exceeds 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Returns the [`Level`] of bit 0, the usual view of a 1-bit control line.
    ///
    /// A zero-width vector reads as `Unknown`.
    pub fn level(&self) -> Level {
        if self.width == 0 {
            return Level::Unknown;
        }
        self.get(0).level()
    }

}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({self})")
    }
}

/// Returns the number of u64 words needed to store `width` logic values.
fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_all_zero() {
        let v = LogicVec::new(8);
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_u64(), Some(0));
    }

    #[test]
    fn unknown_has_no_integer_value() {
        let v = LogicVec::unknown(32);
        assert_eq!(v.to_u64(), None);
        assert_eq!(v.level(), Level::Unknown);
    }

    #[test]
    fn u64_roundtrip_32_bits() {
        let v = LogicVec::from_u64(0xDEAD_BEEF, 32);
        assert_eq!(v.to_u64(), Some(0xDEAD_BEEF));
    }

    #[test]
    fn from_u64_truncates_to_width() {
        let v = LogicVec::from_u64(0x1FF, 8);
        assert_eq!(v.to_u64(), Some(0xFF));
    }

    #[test]
    fn wide_vector_spans_words() {
        let mut v = LogicVec::new(40);
        v.set(39, Logic::One);
        v.set(33, Logic::Z);
        assert_eq!(v.get(39), Logic::One);
        assert_eq!(v.get(33), Logic::Z);
        assert_eq!(v.get(32), Logic::Zero);
    }

    #[test]
    fn single_z_bit_poisons_value() {
        let mut v = LogicVec::from_u64(5, 4);
        v.set(3, Logic::Z);
        assert_eq!(v.to_u64(), None);
        assert_eq!(v.level(), Level::One);
    }

    #[test]
    fn level_reads_bit_zero() {
        assert_eq!(LogicVec::from_bool(true).level(), Level::One);
        assert_eq!(LogicVec::from_bool(false).level(), Level::Zero);
        assert_eq!(LogicVec::filled(1, Logic::Z).level(), Level::Unknown);
        assert_eq!(LogicVec::new(0).level(), Level::Unknown);
    }

    #[test]
    fn display_is_msb_first() {
        let mut v = LogicVec::from_u64(0b1000, 4);
        v.set(1, Logic::X);
        v.set(0, Logic::Z);
        assert_eq!(v.to_string(), "10XZ");
        assert_eq!(format!("{v:?}"), "LogicVec(10XZ)");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        LogicVec::new(4).get(4);
    }
}
