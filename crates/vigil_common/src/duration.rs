//! Simulated-time units and duration literals such as `"10ns"`.

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = FS_PER_MS * 1_000;

/// Errors produced by [`parse_duration`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDurationError {
    /// The input was empty or whitespace.
    #[error("empty duration string")]
    Empty,

    /// No leading digits were found.
    #[error("invalid duration: no numeric value in '{0}'")]
    NoNumber(String),

    /// The numeric part does not fit in 64 bits once scaled to femtoseconds.
    #[error("duration '{0}' is too large")]
    Overflow(String),

    /// The unit suffix is missing.
    #[error("missing unit in duration '{0}' (use fs, ps, ns, us, ms, or s)")]
    MissingUnit(String),

    /// The unit suffix is not recognized.
    #[error("unknown duration unit '{0}' (use fs, ps, ns, us, ms, or s)")]
    UnknownUnit(String),
}

/// Parses a duration literal like `"10ns"` or `"5 us"` into femtoseconds.
pub fn parse_duration(s: &str) -> Result<u64, ParseDurationError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseDurationError::Empty);
    }

    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return Err(ParseDurationError::NoNumber(s.to_string()));
    }

    let number: u64 = s[..digit_end]
        .parse()
        .map_err(|_| ParseDurationError::Overflow(s.to_string()))?;

    let multiplier = match s[digit_end..].trim() {
        "fs" => 1,
        "ps" => FS_PER_PS,
        "ns" => FS_PER_NS,
        "us" => FS_PER_US,
        "ms" => FS_PER_MS,
        "s" => FS_PER_S,
        "" => return Err(ParseDurationError::MissingUnit(s.to_string())),
        unit => return Err(ParseDurationError::UnknownUnit(unit.to_string())),
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| ParseDurationError::Overflow(s.to_string()))
}
