//! Reference data files.
//!
//! A reference file holds one integer literal per line. Only the first
//! comma-separated field of a line is read, so comparator vector files that
//! carry an expected flag in a second column load their value column.
//! Literals are decimal (optionally signed) or `0x`-prefixed hexadecimal of
//! any magnitude; each keeps its low 32 bits, so a playback word count never
//! depends on whether a literal fits. Lines that are not integers are
//! skipped and reported, never fatal.

use std::error::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use vigil_common::{ParseSampleError, Sample};
use vigil_dut::ImageSource;

use crate::error::LoadError;

/// A line that was skipped while loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// The offending field, trimmed.
    pub text: String,
    /// Why the field was rejected.
    pub reason: ParseSampleError,
}

/// The samples read from a reference file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceData {
    /// Parsed samples in file order.
    pub samples: Vec<Sample>,
    /// Lines that could not be parsed.
    pub skipped: Vec<SkippedLine>,
}

impl ReferenceData {
    /// Number of parsed samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples were parsed.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Parses reference file contents.
pub fn parse_reference(content: &str) -> ReferenceData {
    let mut data = ReferenceData::default();
    for (idx, line) in content.lines().enumerate() {
        let field = line.split(',').next().unwrap_or("").trim();
        if field.is_empty() {
            continue;
        }
        match Sample::parse_wrapping(field) {
            Ok(sample) => data.samples.push(sample),
            Err(reason) => {
                log::warn!("skipping line {}: {reason}", idx + 1);
                data.skipped.push(SkippedLine {
                    line: idx + 1,
                    text: field.to_string(),
                    reason,
                });
            }
        }
    }
    data
}

/// Reads and parses a reference file.
pub fn load_reference(path: &Path) -> Result<ReferenceData, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_reference(&content);
    log::debug!(
        "loaded {} samples from {} ({} skipped)",
        data.samples.len(),
        path.display(),
        data.skipped.len()
    );
    Ok(data)
}

/// How [`write_reference`] renders values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Radix {
    /// Signed decimal.
    #[default]
    Decimal,
    /// `0x` followed by eight uppercase hex digits of the raw pattern.
    Hex,
}

/// Renders samples one per line.
pub fn render_reference(samples: &[Sample], radix: Radix) -> String {
    let mut out = String::with_capacity(samples.len() * 12);
    for sample in samples {
        let _ = match radix {
            Radix::Decimal => writeln!(out, "{}", sample.signed()),
            Radix::Hex => writeln!(out, "{}", sample.to_hex()),
        };
    }
    out
}

/// Writes samples to a reference file, one per line.
pub fn write_reference(path: &Path, samples: &[Sample], radix: Radix) -> Result<(), LoadError> {
    std::fs::write(path, render_reference(samples, radix)).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A reference file used as a playback master's image.
///
/// The file is read on construction of the master and again on each reload.
#[derive(Clone, Debug)]
pub struct ReferenceFile(pub PathBuf);

impl ImageSource for ReferenceFile {
    fn describe(&self) -> String {
        self.0.display().to_string()
    }

    fn load(&mut self) -> Result<Vec<Sample>, Box<dyn Error + Send + Sync>> {
        Ok(load_reference(&self.0)?.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(data: &ReferenceData) -> Vec<i32> {
        data.samples.iter().map(|s| s.signed()).collect()
    }

    #[test]
    fn decimal_and_hex_lines() {
        let data = parse_reference("100\n-50\n0x80000000\n0XFFFFFFFF\n2147483647\n");
        assert_eq!(values(&data), [100, -50, i32::MIN, -1, i32::MAX]);
        assert!(data.skipped.is_empty());
    }

    #[test]
    fn first_csv_field_only() {
        let data = parse_reference("1, 2, 3\n 0x10 ,junk\n");
        assert_eq!(values(&data), [1, 16]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let data = parse_reference("\n  \n7\n\r\n8\r\n");
        assert_eq!(values(&data), [7, 8]);
        assert!(data.skipped.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_and_recorded() {
        let _ = env_logger::builder().is_test(true).try_init();
        let data = parse_reference("value\n5\n0xZZ\n1.5\n6\n");
        assert_eq!(values(&data), [5, 6]);
        let lines: Vec<usize> = data.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, [1, 3, 4]);
        assert_eq!(data.skipped[0].text, "value");
        assert!(data
            .skipped
            .iter()
            .all(|s| matches!(s.reason, ParseSampleError::InvalidFormat(_))));
    }

    #[test]
    fn wide_literals_keep_low_32_bits() {
        let data = parse_reference("4294967296\n-2147483649\n5\n0x1FFFFFFFF\n");
        let raw: Vec<u32> = data.samples.iter().map(|s| s.raw()).collect();
        assert_eq!(raw, [0, 0x7FFF_FFFF, 5, 0xFFFF_FFFF]);
        assert!(data.skipped.is_empty());
    }

    #[test]
    fn empty_content_is_empty_sequence() {
        let data = parse_reference("");
        assert!(data.is_empty());
        assert_eq!(data.len(), 0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_reference(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn write_then_load_hex_preserves_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_hex.csv");
        let samples: Vec<Sample> = [0u32, 1, 0x7FFF_FFFF, 0x8000_0000, 0xFFFF_FFFF]
            .iter()
            .map(|&r| Sample::from_raw(r))
            .collect();
        write_reference(&path, &samples, Radix::Hex).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("0x00000000\n0x00000001\n"));
        let data = load_reference(&path).unwrap();
        assert_eq!(data.samples, samples);
    }

    #[test]
    fn decimal_rendering_is_signed() {
        let samples = [Sample::from_raw(0xFFFF_FFFE), Sample::from_signed(12)];
        assert_eq!(render_reference(&samples, Radix::Decimal), "-2\n12\n");
    }

    #[test]
    fn reference_file_as_image_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "3\n-4\n").unwrap();
        let mut source = ReferenceFile(path.clone());
        let image = source.load().unwrap();
        assert_eq!(image, [Sample::from_signed(3), Sample::from_signed(-4)]);
        assert_eq!(source.describe(), path.display().to_string());

        let mut missing = ReferenceFile(dir.path().join("none.csv"));
        assert!(missing.load().is_err());
    }
}
