//! Error types for the verification core.

use std::path::PathBuf;

use vigil_config::ConfigError;
use vigil_sim::SimError;

/// Errors raised while reading or writing reference data files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened, read or written.
    #[error("cannot access reference file '{}': {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors surfaced by the bench outside of a running scenario.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A reference file could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The bench configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The simulation kernel reported an error.
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),

    /// No registered scenario has the requested name.
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_io() {
        let err = LoadError::Io {
            path: PathBuf::from("data.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "cannot access reference file 'data.csv': not found"
        );
    }

    #[test]
    fn display_unknown_scenario() {
        let err = BenchError::UnknownScenario("axis_master::warp".to_string());
        assert_eq!(err.to_string(), "unknown scenario 'axis_master::warp'");
    }

    #[test]
    fn sim_errors_convert() {
        let err: BenchError = SimError::Timeout {
            waiting_for: "o_done_pulse".to_string(),
            cycles: 10,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "simulation error: timed out after 10 cycles waiting for o_done_pulse"
        );
    }

    #[test]
    fn load_errors_are_transparent() {
        let err: BenchError = LoadError::Io {
            path: PathBuf::from("x.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.to_string(), "cannot access reference file 'x.csv': denied");
    }
}
