//! Classification band model

use serde::{Deserialize, Serialize};

/// A named grade tier (e.g., "First") with an inclusive lower bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationBand {
    /// Band name (e.g., "First", "2:1", "Pass")
    pub name: String,

    /// Lowest grade (0-100) that falls into this band
    pub threshold: f64,
}

impl ClassificationBand {
    /// Create a new classification band
    #[must_use]
    pub const fn new(name: String, threshold: f64) -> Self {
        Self { name, threshold }
    }

    /// Whether `grade` meets this band's threshold
    #[must_use]
    pub fn admits(&self, grade: f64) -> bool {
        grade >= self.threshold
    }
}
