//! CLI argument definitions for `degree-forecast`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use degree_forecast::config::ConfigOverrides;
use degree_forecast::core::simulation::check_stddev;
use degree_forecast::logger::Level;

/// Parse `--stddev`, rejecting values a normal distribution cannot use
fn parse_stddev(value: &str) -> Result<f64, String> {
    let stddev: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    check_stddev(stddev).map_err(|e| e.to_string())
}

/// CLI log level argument
///
/// Converts to lowercase strings for config storage and to
/// `logger::Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `simulations`, `charts_dir`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Predict the final degree grade.
    ///
    /// Prints the weighted prediction, the guaranteed minimum, the best case
    /// and a Monte Carlo forecast, and saves a histogram of the simulated grades.
    Calculate {
        /// Gradebook YAML file (defaults to config `units_file`)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Seed the random source for a reproducible forecast
        #[arg(long, value_name = "N")]
        seed: Option<u64>,

        /// Noise scale for the simulation instead of the fitted spread
        #[arg(long, value_name = "X", value_parser = parse_stddev)]
        stddev: Option<f64>,

        /// Skip writing the distribution chart
        #[arg(long)]
        no_chart: bool,
    },
    /// Check a gradebook file without running any calculation.
    Validate {
        /// Gradebook YAML file (defaults to config `units_file`)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "degreeforecast",
    about = "Degree grade calculator and forecaster",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override the number of Monte Carlo trials
    #[arg(long, value_name = "COUNT")]
    pub simulations: Option<usize>,

    /// Override the chart output directory
    #[arg(long = "charts-dir", value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// `--seed` and `--stddev` given to `calculate` are folded in as well so
    /// the command sees one merged configuration.
    ///
    /// # Returns
    /// A `ConfigOverrides` struct with values from CLI flags, where `None` means no override.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let (seed, stddev) = match &self.command {
            Command::Calculate { seed, stddev, .. } => (*seed, *stddev),
            _ => (None, None),
        };

        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self
                .config_log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            verbose: self.config_verbose,
            simulations: self.simulations,
            seed,
            stddev,
            units_file: None,
            charts_dir: self
                .charts_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("degreeforecast").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevelArg::Info), Level::Info);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = parse(&["config"]).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.simulations.is_none());
        assert!(overrides.seed.is_none());
        assert!(overrides.stddev.is_none());
        assert!(overrides.charts_dir.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let cli = parse(&[
            "--config-level",
            "debug",
            "--config-log-file",
            "/tmp/test.log",
            "--config-verbose",
            "true",
            "--simulations",
            "500",
            "--charts-dir",
            "/charts",
            "calculate",
            "grades.yml",
            "--seed",
            "7",
            "--stddev",
            "2.5",
        ]);

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.file, Some("/tmp/test.log".to_string()));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.simulations, Some(500));
        assert_eq!(overrides.seed, Some(7));
        assert_eq!(overrides.stddev, Some(2.5));
        assert_eq!(overrides.charts_dir, Some("/charts".to_string()));
    }

    #[test]
    fn test_stddev_must_be_finite_and_non_negative() {
        for bad in ["--stddev=NaN", "--stddev=-1", "--stddev=inf", "--stddev=wide"] {
            let parsed = Cli::try_parse_from(["degreeforecast", "calculate", bad]);
            assert!(parsed.is_err(), "{bad} should be rejected");
        }

        let overrides = parse(&["calculate", "--stddev", "0"]).to_config_overrides();
        assert_eq!(overrides.stddev, Some(0.0));
    }

    #[test]
    fn test_calculate_defaults() {
        match parse(&["calculate"]).command {
            Command::Calculate {
                file,
                seed,
                stddev,
                no_chart,
            } => {
                assert!(file.is_none());
                assert!(seed.is_none());
                assert!(stddev.is_none());
                assert!(!no_chart);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_takes_file() {
        match parse(&["validate", "mine.yml"]).command {
            Command::Validate { file } => assert_eq!(file, Some(PathBuf::from("mine.yml"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
