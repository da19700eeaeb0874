//! Validate command handler

use super::{load_or_exit, resolve_input};
use degree_forecast::config::Config;
use degree_forecast::verbose;
use std::path::PathBuf;

/// Check a gradebook file and report whether it can be used
pub fn run(file: Option<PathBuf>, config: &Config) {
    let path = resolve_input(file, config);
    let gradebook = load_or_exit(&path);

    verbose!(
        "{} unit(s), {} credit(s), {} classification band(s)",
        gradebook.units.len(),
        gradebook.total_credits(),
        gradebook.bands().len()
    );
    #[cfg(feature = "verbose")]
    for unit in &gradebook.units {
        verbose!(
            "  {}: {}/{} assessment(s) marked",
            unit.name,
            unit.marked_count(),
            unit.assessments.len()
        );
    }
    println!("✓ {} is valid", path.display());
}
