//! Assessment model

use serde::{Deserialize, Serialize};

/// A single graded component of a unit (coursework, exam, lab, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Assessment name (display only)
    pub name: String,

    /// Percentage of the unit this assessment is worth (0-100)
    pub weight: u8,

    /// Mark achieved (0-100), `None` while not yet graded
    #[serde(default)]
    pub mark: Option<f64>,
}

impl Assessment {
    /// Create a marked assessment
    ///
    /// # Arguments
    /// * `name` - Assessment name
    /// * `weight` - Percentage weight within the unit
    /// * `mark` - Mark achieved
    #[must_use]
    pub const fn marked(name: String, weight: u8, mark: f64) -> Self {
        Self {
            name,
            weight,
            mark: Some(mark),
        }
    }

    /// Create an assessment that has not been graded yet
    #[must_use]
    pub const fn pending(name: String, weight: u8) -> Self {
        Self {
            name,
            weight,
            mark: None,
        }
    }

    /// Whether a mark has been recorded
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.mark.is_some()
    }

    /// Weight as a fraction of the whole unit (e.g. 40 -> 0.4)
    #[must_use]
    pub fn weight_fraction(&self) -> f64 {
        f64::from(self.weight) / 100.0
    }
}
