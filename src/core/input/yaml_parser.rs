//! YAML loader for gradebook files

use super::validation::{validate, ValidationIssue};
use crate::core::models::Gradebook;
use crate::{debug, info};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading a gradebook
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The file is not well-formed YAML
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The YAML does not describe a valid gradebook
    #[error("config file is invalid ({} issue(s))", .0.len())]
    Invalid(Vec<ValidationIssue>),
}

impl LoadError {
    /// Validation issues carried by this error, empty for other kinds
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

/// Parse and validate a gradebook from YAML text
///
/// # Arguments
/// * `content` - YAML document with `units` and optional `classifications`
///
/// # Errors
/// Returns [`LoadError::Yaml`] for malformed YAML and [`LoadError::Invalid`]
/// with every issue found when the document fails validation
pub fn parse_gradebook(content: &str) -> Result<Gradebook, LoadError> {
    let document: Value = serde_yaml::from_str(content)?;

    let issues = validate(&document);
    if !issues.is_empty() {
        debug!("Gradebook failed validation with {} issue(s)", issues.len());
        return Err(LoadError::Invalid(issues));
    }

    Ok(serde_yaml::from_value(document)?)
}

/// Read, parse and validate a gradebook file
///
/// # Arguments
/// * `path` - Path to the YAML file
///
/// # Errors
/// Returns [`LoadError::Io`] if the file cannot be read, otherwise the errors
/// of [`parse_gradebook`]
pub fn load_gradebook<P: AsRef<Path>>(path: P) -> Result<Gradebook, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let gradebook = parse_gradebook(&content)?;
    info!(
        "Loaded {} unit(s) and {} classification band(s) from {}",
        gradebook.units.len(),
        gradebook.bands().len(),
        path.display()
    );
    Ok(gradebook)
}
