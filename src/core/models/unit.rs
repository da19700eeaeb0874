//! Unit model

use super::Assessment;
use serde::{Deserialize, Serialize};

/// A credit-bearing course component contributing to the degree grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unit name (e.g., "Algorithms and Data Structures")
    pub name: String,

    /// Relative weight of the unit within the degree
    pub credits: u32,

    /// Assessments making up the unit, in the order they were listed
    pub assessments: Vec<Assessment>,
}

/// One assessment reduced to what the grade arithmetic needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedMark {
    /// Weight as a fraction of the unit, in `[0, 1]`
    pub weight: f64,
    /// Mark achieved, if graded
    pub mark: Option<f64>,
}

/// A unit with its assessment weights expressed as fractions of 1
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedUnit {
    /// Unit name
    pub name: String,
    /// Credit weight
    pub credits: u32,
    /// Normalized assessments
    pub assessments: Vec<WeightedMark>,
}

impl Unit {
    /// Create a new unit with no assessments
    ///
    /// # Arguments
    /// * `name` - Unit name
    /// * `credits` - Credit weight within the degree
    #[must_use]
    pub const fn new(name: String, credits: u32) -> Self {
        Self {
            name,
            credits,
            assessments: Vec::new(),
        }
    }

    /// Add an assessment to the unit
    pub fn add_assessment(&mut self, assessment: Assessment) {
        self.assessments.push(assessment);
    }

    /// Builder-style variant of [`add_assessment`](Self::add_assessment)
    #[must_use]
    pub fn with_assessment(mut self, assessment: Assessment) -> Self {
        self.add_assessment(assessment);
        self
    }

    /// Number of assessments that already carry a mark
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.assessments.iter().filter(|a| a.is_marked()).count()
    }

    /// Convert percentage weights into fractions for the grade arithmetic
    #[must_use]
    pub fn normalize(&self) -> NormalizedUnit {
        NormalizedUnit {
            name: self.name.clone(),
            credits: self.credits,
            assessments: self
                .assessments
                .iter()
                .map(|a| WeightedMark {
                    weight: a.weight_fraction(),
                    mark: a.mark,
                })
                .collect(),
        }
    }
}

/// Normalize every unit, preserving order
#[must_use]
pub fn normalize_units(units: &[Unit]) -> Vec<NormalizedUnit> {
    units.iter().map(Unit::normalize).collect()
}
