//! CLI command handlers for `degree-forecast`.
//!
//! Each command is implemented in its own submodule.

pub mod calculate;
pub mod config;
pub mod validate;

use degree_forecast::config::Config;
use degree_forecast::core::input::{load_gradebook, LoadError};
use degree_forecast::core::models::Gradebook;
use degree_forecast::error;
use std::path::{Path, PathBuf};

/// Gradebook path from the command line, or the configured default
pub fn resolve_input(file: Option<PathBuf>, config: &Config) -> PathBuf {
    file.unwrap_or_else(|| PathBuf::from(&config.paths.units_file))
}

/// Load a gradebook, printing every problem and exiting on failure
pub fn load_or_exit(path: &Path) -> Gradebook {
    match load_gradebook(path) {
        Ok(gradebook) => gradebook,
        Err(LoadError::Invalid(issues)) => {
            eprintln!("Config file is invalid:");
            for issue in &issues {
                eprintln!("  {issue}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e}");
            eprintln!("✗ Could not load {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}
