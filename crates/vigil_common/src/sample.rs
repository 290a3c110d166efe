//! 32-bit samples and two's-complement normalization.
//!
//! A [`Sample`] is the unit of data that crosses the streaming bus and that
//! reference files describe. It is stored as its raw bit pattern; every
//! comparison goes through [`Sample::signed`] so that values read back from
//! the bus and values loaded from a file always meet in the signed domain.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::logic_vec::LogicVec;

/// Bit width of a [`Sample`] on the bus.
pub const SAMPLE_WIDTH: u32 = 32;

/// Errors produced when normalizing or parsing a sample literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSampleError {
    /// The text is not a decimal or `0x`-prefixed hexadecimal integer.
    #[error("invalid sample literal '{0}'")]
    InvalidFormat(String),

    /// The value does not fit a 32-bit signed or unsigned quantity.
    #[error("sample literal '{0}' is outside the 32-bit range")]
    OutOfRange(String),
}

/// A 32-bit quantity with a raw and a signed interpretation.
///
/// Ordering and `Display` use the signed interpretation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Sample(u32);

impl Sample {
    /// Creates a sample from its raw bit pattern.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Creates a sample from a signed value.
    pub const fn from_signed(value: i32) -> Self {
        Self(value as u32)
    }

    /// Returns the raw bit pattern (0..2^32-1).
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the two's-complement signed value (-2^31..2^31-1).
    pub const fn signed(self) -> i32 {
        self.0 as i32
    }

    /// Parses a decimal or `0x`/`0X` hexadecimal literal.
    ///
    /// An optional leading `-` or `+` is accepted in both radices. Accepted
    /// values span `-2^31..=2^32-1`; negative values and values at or above
    /// `2^31` both land on the same 32-bit pattern space.
    pub fn parse(text: &str) -> Result<Self, ParseSampleError> {
        let literal = Literal::split(text)?;
        let out_of_range = || ParseSampleError::OutOfRange(text.trim().to_string());
        // Only overflow can fail once every character is a digit.
        let magnitude =
            u64::from_str_radix(literal.digits, literal.radix).map_err(|_| out_of_range())?;

        if literal.negative {
            if magnitude > 1 << 31 {
                return Err(out_of_range());
            }
            Ok(Self::from_signed((-(magnitude as i64)) as i32))
        } else {
            let raw = u32::try_from(magnitude).map_err(|_| out_of_range())?;
            Ok(Self::from_raw(raw))
        }
    }

    /// Parses an integer literal of any magnitude and keeps its low 32 bits.
    ///
    /// Accepts the same syntax as [`Sample::parse`]. A negative literal wraps
    /// as its two's-complement pattern, so `4294967296` is `0` and
    /// `-2147483649` is `0x7FFFFFFF`.
    pub fn parse_wrapping(text: &str) -> Result<Self, ParseSampleError> {
        let literal = Literal::split(text)?;
        let low = literal.digits.chars().fold(0u32, |acc, c| {
            let digit = c.to_digit(literal.radix).unwrap_or(0);
            acc.wrapping_mul(literal.radix).wrapping_add(digit)
        });
        Ok(Self::from_raw(if literal.negative {
            low.wrapping_neg()
        } else {
            low
        }))
    }

    /// Renders the raw bit pattern as `0x` followed by eight uppercase hex digits.
    pub fn to_hex(self) -> String {
        format!("0x{:08X}", self.0)
    }

    /// Reads a sample from a bus value.
    ///
    /// Returns `None` if any bit is undefined or the vector is wider than 32 bits.
    pub fn from_logic_vec(value: &LogicVec) -> Option<Self> {
        if value.width() > SAMPLE_WIDTH {
            return None;
        }
        value.to_u64().map(|raw| Self(raw as u32))
    }

    /// Converts the sample to a 32-bit bus value.
    pub fn to_logic_vec(self) -> LogicVec {
        LogicVec::from_u64(u64::from(self.0), SAMPLE_WIDTH)
    }
}

/// A signed literal split into sign, radix and digits.
struct Literal<'a> {
    negative: bool,
    digits: &'a str,
    radix: u32,
}

impl<'a> Literal<'a> {
    fn split(text: &'a str) -> Result<Self, ParseSampleError> {
        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (digits, radix) = match unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            Some(hex) => (hex, 16),
            None => (unsigned, 10),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(ParseSampleError::InvalidFormat(trimmed.to_string()));
        }
        Ok(Self {
            negative,
            digits,
            radix,
        })
    }
}

/// How two samples are ordered when checking a threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Two's-complement ordering.
    #[default]
    Signed,
    /// Raw bit-pattern ordering.
    Unsigned,
}

impl Comparison {
    /// Returns `true` if `value` is strictly greater than `threshold`.
    pub fn greater(self, value: Sample, threshold: Sample) -> bool {
        match self {
            Comparison::Signed => value.signed() > threshold.signed(),
            Comparison::Unsigned => value.raw() > threshold.raw(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Signed => write!(f, "signed"),
            Comparison::Unsigned => write!(f, "unsigned"),
        }
    }
}

/// Converts a raw unsigned value to its canonical signed 32-bit interpretation.
///
/// `normalize(r) == r` for `r < 2^31`, otherwise `r - 2^32`. Raw values at or
/// above `2^32` are rejected.
pub fn normalize(raw: u64) -> Result<i32, ParseSampleError> {
    u32::try_from(raw)
        .map(|r| Sample::from_raw(r).signed())
        .map_err(|_| ParseSampleError::OutOfRange(raw.to_string()))
}

impl FromStr for Sample {
    type Err = ParseSampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i32> for Sample {
    fn from(value: i32) -> Self {
        Self::from_signed(value)
    }
}

impl From<Sample> for i32 {
    fn from(sample: Sample) -> Self {
        sample.signed()
    }
}

impl Ord for Sample {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signed().cmp(&other.signed())
    }
}

impl PartialOrd for Sample {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signed())
    }
}

impl fmt::Debug for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sample({} / {})", self.signed(), self.to_hex())
    }
}
