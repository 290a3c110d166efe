//! Configuration types deserialized from `vigil.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use vigil_common::{parse_duration, Comparison, ParseDurationError, Sample};

/// The complete bench configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BenchConfig {
    /// Bench metadata.
    #[serde(default)]
    pub bench: BenchMeta,
    /// Clock generation.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Reset sequencing.
    #[serde(default)]
    pub reset: ResetConfig,
    /// Reference data files.
    #[serde(default)]
    pub data: DataConfig,
    /// Threshold used by the streaming comparator suites.
    #[serde(default)]
    pub threshold: ThresholdConfig,
    /// Cycle ceilings for waits on the device.
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    /// Random consumer backpressure.
    #[serde(default)]
    pub backpressure: BackpressureConfig,
    /// Report rendering.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Bench metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenchMeta {
    /// Name shown in report headers.
    pub name: String,
}

impl Default for BenchMeta {
    fn default() -> Self {
        Self {
            name: "vigil".to_string(),
        }
    }
}

/// Clock generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Clock period as a duration literal such as `"10ns"`.
    pub period: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            period: "10ns".to_string(),
        }
    }
}

impl ClockConfig {
    /// The clock period in femtoseconds.
    pub fn period_fs(&self) -> Result<u64, ParseDurationError> {
        parse_duration(&self.period)
    }
}

/// Reset sequencing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResetConfig {
    /// Clock cycles reset is held asserted, and idle cycles after release.
    pub cycles: u64,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self { cycles: 5 }
    }
}

/// Reference data file locations.
///
/// Relative paths are resolved against the directory the configuration was
/// loaded from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Image played back by the streaming master suites.
    pub reference: PathBuf,
    /// Image played back by the streaming comparator suites.
    pub test_data: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            reference: PathBuf::from("data.csv"),
            test_data: PathBuf::from("test_data.csv"),
        }
    }
}

impl DataConfig {
    /// Makes both paths absolute with respect to `base` if they are relative.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.reference, &mut self.test_data] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Threshold settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// The threshold, as an integer or a decimal/hex string.
    #[serde(deserialize_with = "deserialize_sample")]
    pub value: Sample,
    /// Signed (default) or unsigned ordering.
    pub comparison: Comparison,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            value: Sample::from_signed(1_000_000),
            comparison: Comparison::Signed,
        }
    }
}

/// Cycle ceilings for waits on the device.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Ceiling on cycles spent waiting for the end of a transmission.
    pub done_cycles: u64,
    /// Ceiling on cycles spent waiting for a transmission to start.
    pub start_cycles: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            done_cycles: 20_000,
            start_cycles: 1_000,
        }
    }
}

/// Random backpressure settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackpressureConfig {
    /// Chance per cycle of starting a stall while ready is asserted.
    pub probability: f64,
    /// Shortest stall, in cycles.
    pub min_run: u32,
    /// Longest stall, in cycles.
    pub max_run: u32,
    /// Seed for the stall generator.
    pub seed: u64,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            probability: 0.3,
            min_run: 1,
            max_run: 5,
            seed: 1,
        }
    }
}

/// Report rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Mismatches listed individually before the rest are summarised.
    pub max_mismatches: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { max_mismatches: 10 }
    }
}

/// Deserializes a sample from either a TOML integer or a string literal.
///
/// Accepts `value = -100`, `value = "1000000"` and `value = "0x80000000"`.
fn deserialize_sample<'de, D>(deserializer: D) -> Result<Sample, D::Error>
where
    D: Deserializer<'de>,
{
    struct SampleLiteral;

    impl<'de> Visitor<'de> for SampleLiteral {
        type Value = Sample;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a 32-bit integer or a decimal/hex string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Sample::parse(&v.to_string()).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Sample::parse(&v.to_string()).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Sample::parse(v).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(SampleLiteral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.bench.name, "vigil");
        assert_eq!(config.clock.period_fs().unwrap(), 10_000_000);
        assert_eq!(config.reset.cycles, 5);
        assert_eq!(config.threshold.value.signed(), 1_000_000);
        assert_eq!(config.threshold.comparison, Comparison::Signed);
        assert_eq!(config.watchdog.done_cycles, 20_000);
        assert_eq!(config.backpressure.max_run, 5);
        assert_eq!(config.report.max_mismatches, 10);
        assert_eq!(config.data.reference, PathBuf::from("data.csv"));
    }

    #[test]
    fn threshold_accepts_integer_and_strings() {
        let t: ThresholdConfig = toml::from_str("value = -100").unwrap();
        assert_eq!(t.value.signed(), -100);
        let t: ThresholdConfig = toml::from_str("value = \"0x80000000\"").unwrap();
        assert_eq!(t.value.signed(), i32::MIN);
        let t: ThresholdConfig = toml::from_str("value = 4294967295").unwrap();
        assert_eq!(t.value.signed(), -1);
    }

    #[test]
    fn threshold_rejects_out_of_range() {
        assert!(toml::from_str::<ThresholdConfig>("value = 4294967296").is_err());
        assert!(toml::from_str::<ThresholdConfig>("value = \"lots\"").is_err());
    }

    #[test]
    fn comparison_is_lowercase() {
        let t: ThresholdConfig = toml::from_str("comparison = \"unsigned\"").unwrap();
        assert_eq!(t.comparison, Comparison::Unsigned);
        assert_eq!(t.value.signed(), 1_000_000);
    }

    #[test]
    fn relative_data_paths_resolve() {
        let mut data = DataConfig {
            reference: PathBuf::from("data.csv"),
            test_data: PathBuf::from("/abs/test_data.csv"),
        };
        data.resolve_relative_to(Path::new("/bench"));
        assert_eq!(data.reference, PathBuf::from("/bench/data.csv"));
        assert_eq!(data.test_data, PathBuf::from("/abs/test_data.csv"));
    }
}
