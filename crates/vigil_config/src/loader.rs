//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::BenchConfig;
use std::path::Path;

/// The configuration file looked up in a bench directory.
pub const CONFIG_FILE_NAME: &str = "vigil.toml";

/// Loads and validates `vigil.toml` from a bench directory.
///
/// A missing file yields the default configuration. Relative data paths are
/// resolved against `bench_dir`.
pub fn load_config(bench_dir: &Path) -> Result<BenchConfig, ConfigError> {
    let config_path = bench_dir.join(CONFIG_FILE_NAME);
    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        load_config_from_str(&content)?
    } else {
        BenchConfig::default()
    };
    config.data.resolve_relative_to(bench_dir);
    Ok(config)
}

/// Loads and validates an explicit configuration file.
///
/// Relative data paths are resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<BenchConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config = load_config_from_str(&content)?;
    if let Some(dir) = path.parent() {
        config.data.resolve_relative_to(dir);
    }
    Ok(config)
}

/// Parses and validates a `vigil.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<BenchConfig, ConfigError> {
    let config: BenchConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that configuration values are usable and consistent.
fn validate_config(config: &BenchConfig) -> Result<(), ConfigError> {
    if config.bench.name.trim().is_empty() {
        return Err(ConfigError::MissingField("bench.name".to_string()));
    }

    let period = config
        .clock
        .period_fs()
        .map_err(|e| ConfigError::ValidationError(format!("clock.period: {e}")))?;
    if period < 2 {
        return Err(ConfigError::ValidationError(format!(
            "clock.period must be at least 2 fs, got '{}'",
            config.clock.period
        )));
    }

    let bp = &config.backpressure;
    if !(0.0..=1.0).contains(&bp.probability) {
        return Err(ConfigError::ValidationError(format!(
            "backpressure.probability must be between 0 and 1, got {}",
            bp.probability
        )));
    }
    if bp.min_run == 0 {
        return Err(ConfigError::ValidationError(
            "backpressure.min_run must be at least 1".to_string(),
        ));
    }
    if bp.min_run > bp.max_run {
        return Err(ConfigError::ValidationError(format!(
            "backpressure.min_run ({}) exceeds max_run ({})",
            bp.min_run, bp.max_run
        )));
    }

    if config.watchdog.done_cycles == 0 || config.watchdog.start_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "watchdog cycle ceilings must be non-zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::Comparison;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.bench.name, "vigil");
        assert_eq!(config.reset.cycles, 5);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[bench]
name = "axis_master_file"

[clock]
period = "8ns"

[reset]
cycles = 3

[data]
reference = "vectors/data.csv"
test_data = "vectors/test_data.csv"

[threshold]
value = -100
comparison = "unsigned"

[watchdog]
done_cycles = 500
start_cycles = 50

[backpressure]
probability = 0.5
min_run = 2
max_run = 4
seed = 99

[report]
max_mismatches = 3
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.bench.name, "axis_master_file");
        assert_eq!(config.clock.period_fs().unwrap(), 8_000_000);
        assert_eq!(config.reset.cycles, 3);
        assert_eq!(config.threshold.value.signed(), -100);
        assert_eq!(config.threshold.comparison, Comparison::Unsigned);
        assert_eq!(config.watchdog.start_cycles, 50);
        assert_eq!(config.backpressure.seed, 99);
        assert_eq!(config.report.max_mismatches, 3);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = load_config_from_str("[backpressure]\nseed = 7\n").unwrap();
        assert_eq!(config.backpressure.seed, 7);
        assert_eq!(config.backpressure.probability, 0.3);
        assert_eq!(config.backpressure.min_run, 1);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_name_errors() {
        let err = load_config_from_str("[bench]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn rejects_bad_probability() {
        for p in ["1.5", "-0.1", "nan"] {
            let err =
                load_config_from_str(&format!("[backpressure]\nprobability = {p}\n")).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)), "accepted {p}");
        }
    }

    #[test]
    fn rejects_bad_runs() {
        let err = load_config_from_str("[backpressure]\nmin_run = 0\n").unwrap_err();
        assert!(err.to_string().contains("min_run must be at least 1"));
        let err = load_config_from_str("[backpressure]\nmin_run = 6\nmax_run = 5\n").unwrap_err();
        assert!(err.to_string().contains("exceeds max_run"));
    }

    #[test]
    fn rejects_bad_period() {
        for period in ["\"10\"", "\"fast\"", "\"0ns\"", "\"1fs\""] {
            let err = load_config_from_str(&format!("[clock]\nperiod = {period}\n")).unwrap_err();
            assert!(matches!(err, ConfigError::ValidationError(_)), "accepted {period}");
        }
    }

    #[test]
    fn rejects_zero_watchdog() {
        let err = load_config_from_str("[watchdog]\ndone_cycles = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[data]\nreference = \"ref.csv\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.data.reference, dir.path().join("ref.csv"));
        assert_eq!(config.data.test_data, dir.path().join("test_data.csv"));
    }

    #[test]
    fn missing_file_in_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.data.reference, dir.path().join("data.csv"));
    }

    #[test]
    fn explicit_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
