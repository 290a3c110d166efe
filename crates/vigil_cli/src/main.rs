//! Vigil CLI, the command-line front end of the Vigil verification harness.
//!
//! Provides `vigil run` for running registered scenarios, `vigil list` for
//! listing them, `vigil check` for inspecting a reference file against
//! thresholds, and `vigil generate` for writing reference data files.

#![warn(missing_docs)]

mod check;
mod generate;
mod list;
mod run;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use vigil_common::Sample;
use vigil_config::BenchConfig;

/// Vigil, a simulated-time testbench for threshold and stream devices.
#[derive(Parser, Debug)]
#[command(name = "vigil", version, about = "Vigil verification harness")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `vigil.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run registered scenarios.
    Run(RunArgs),
    /// List registered scenarios.
    List,
    /// Load a reference file and count samples above thresholds.
    Check(CheckArgs),
    /// Write a generated reference data file.
    Generate {
        /// What to generate.
        #[command(subcommand)]
        kind: GenerateKind,
    },
}

/// Arguments for the `vigil run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Exact scenario id (`suite::name`) to run.
    pub name: Option<String>,

    /// Substring filter on scenario ids.
    #[arg(long)]
    pub filter: Option<String>,

    /// Only run scenarios of this suite.
    #[arg(long)]
    pub suite: Option<String>,

    /// Output format for results.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Worker threads (defaults to one per core).
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Arguments for the `vigil check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Reference file to load.
    pub file: PathBuf,

    /// Threshold to count against; repeatable. Defaults to `threshold.value`.
    #[arg(short, long, allow_negative_numbers = true)]
    pub threshold: Vec<Sample>,

    /// Compare raw bit patterns instead of signed values.
    #[arg(long)]
    pub unsigned: bool,
}

/// Generated data kinds.
#[derive(Subcommand, Debug)]
pub enum GenerateKind {
    /// A Q31 sine wave.
    Sine {
        /// Output file.
        out: PathBuf,
        /// Sample rate in Hz.
        #[arg(long, default_value_t = 5_000)]
        rate: u32,
        /// Sine frequency in Hz.
        #[arg(long, default_value_t = 50.0)]
        frequency: f64,
        /// Duration in seconds.
        #[arg(long, default_value_t = 1)]
        seconds: u32,
        /// Write hex words instead of decimal.
        #[arg(long)]
        hex: bool,
    },
    /// Vectors around a threshold.
    Thresholds {
        /// Output file.
        out: PathBuf,
        /// Threshold to build vectors around. Defaults to `threshold.value`.
        #[arg(short, long, allow_negative_numbers = true)]
        threshold: Option<Sample>,
        /// Rounds of random draws.
        #[arg(long, default_value_t = 20)]
        rounds: usize,
        /// Random seed.
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Write hex words instead of decimal.
        #[arg(long)]
        hex: bool,
    },
}

/// Result output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Loads the explicit config file, or `vigil.toml` from the current directory.
    pub fn bench_config(&self) -> Result<BenchConfig, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => vigil_config::load_config_file(Path::new(path))?,
            None => vigil_config::load_config(&std::env::current_dir()?)?,
        };
        Ok(config)
    }
}

fn log_level(global: &GlobalArgs) -> log::LevelFilter {
    if global.quiet {
        log::LevelFilter::Error
    } else if global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    }
}

fn init_logging(global: &GlobalArgs) {
    env_logger::Builder::new()
        .filter_level(log_level(global))
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::List => list::run(&global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Generate { ref kind } => generate::run(kind, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_run_default() {
        let cli = Cli::parse_from(["vigil", "run"]);
        match cli.command {
            Command::Run(ref args) => {
                assert!(args.name.is_none());
                assert!(args.filter.is_none());
                assert!(args.suite.is_none());
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.jobs.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_run_with_args() {
        let cli = Cli::parse_from([
            "vigil",
            "run",
            "--suite",
            "dataover",
            "--filter",
            "boundary",
            "--format",
            "json",
            "--jobs",
            "2",
        ]);
        match cli.command {
            Command::Run(ref args) => {
                assert_eq!(args.suite.as_deref(), Some("dataover"));
                assert_eq!(args.filter.as_deref(), Some("boundary"));
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.jobs, Some(2));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_run_by_name() {
        let cli = Cli::parse_from(["vigil", "run", "flipflop::reset"]);
        match cli.command {
            Command::Run(ref args) => assert_eq!(args.name.as_deref(), Some("flipflop::reset")),
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn parse_check_thresholds() {
        let cli = Cli::parse_from([
            "vigil",
            "check",
            "data.csv",
            "--threshold",
            "-100",
            "--threshold",
            "0x7FFFFFFF",
            "--unsigned",
        ]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.file, PathBuf::from("data.csv"));
                assert_eq!(
                    args.threshold,
                    vec![Sample::from_signed(-100), Sample::from_signed(i32::MAX)]
                );
                assert!(args.unsigned);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_check_rejects_bad_threshold() {
        assert!(Cli::try_parse_from(["vigil", "check", "d.csv", "--threshold", "lots"]).is_err());
        assert!(
            Cli::try_parse_from(["vigil", "check", "d.csv", "--threshold", "4294967296"]).is_err()
        );
    }

    #[test]
    fn parse_generate_sine() {
        let cli = Cli::parse_from(["vigil", "generate", "sine", "out.csv", "--hex", "--rate", "48000"]);
        match cli.command {
            Command::Generate {
                kind: GenerateKind::Sine { out, rate, seconds, hex, .. },
            } => {
                assert_eq!(out, PathBuf::from("out.csv"));
                assert_eq!(rate, 48_000);
                assert_eq!(seconds, 1);
                assert!(hex);
            }
            _ => panic!("expected Generate sine"),
        }
    }

    #[test]
    fn generate_sine_defaults_match_reference_data() {
        let cli = Cli::parse_from(["vigil", "generate", "sine", "data.csv"]);
        match cli.command {
            Command::Generate {
                kind:
                    GenerateKind::Sine {
                        rate,
                        frequency,
                        seconds,
                        hex,
                        ..
                    },
            } => {
                assert_eq!(rate, 5_000);
                assert_eq!(frequency, 50.0);
                assert_eq!(seconds, 1);
                assert!(!hex);
            }
            _ => panic!("expected Generate sine"),
        }
    }

    #[test]
    fn parse_generate_thresholds() {
        let cli = Cli::parse_from(["vigil", "generate", "thresholds", "t.csv", "-t", "-50"]);
        match cli.command {
            Command::Generate {
                kind: GenerateKind::Thresholds { threshold, rounds, hex, .. },
            } => {
                assert_eq!(threshold, Some(Sample::from_signed(-50)));
                assert_eq!(rounds, 20);
                assert!(!hex);
            }
            _ => panic!("expected Generate thresholds"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["vigil", "--quiet", "--config", "/tmp/vigil.toml", "list"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/tmp/vigil.toml"));
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn log_level_follows_flags() {
        let mut global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: None,
        };
        assert_eq!(log_level(&global), log::LevelFilter::Warn);
        global.verbose = true;
        assert_eq!(log_level(&global), log::LevelFilter::Debug);
        global.quiet = true;
        assert_eq!(log_level(&global), log::LevelFilter::Error);
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(&path, "[threshold]\nvalue = -7\n").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(path.to_str().unwrap().to_string()),
        };
        let config = global.bench_config().unwrap();
        assert_eq!(config.threshold.value, Sample::from_signed(-7));
        assert_eq!(config.data.reference, tmp.path().join("data.csv"));
    }
}
