//! Gradebook model: everything loaded from one input file

use super::{ClassificationBand, Unit};
use serde::{Deserialize, Serialize};

/// Validated calculation input: the units plus optional classification bands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gradebook {
    /// Units contributing to the degree
    pub units: Vec<Unit>,

    /// Classification bands; `None` or empty disables banding
    #[serde(default)]
    pub classifications: Option<Vec<ClassificationBand>>,
}

impl Gradebook {
    /// Create a gradebook from units and bands
    #[must_use]
    pub const fn new(units: Vec<Unit>, classifications: Vec<ClassificationBand>) -> Self {
        Self {
            units,
            classifications: Some(classifications),
        }
    }

    /// Classification bands, empty when none were configured
    #[must_use]
    pub fn bands(&self) -> &[ClassificationBand] {
        self.classifications.as_deref().unwrap_or_default()
    }

    /// Sum of all unit credits, including units without any marks
    #[must_use]
    pub fn total_credits(&self) -> u64 {
        self.units.iter().map(|u| u64::from(u.credits)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_defaults_to_empty() {
        let book = Gradebook {
            units: vec![Unit::new("Maths".to_string(), 20)],
            classifications: None,
        };

        assert!(book.bands().is_empty());
        assert_eq!(book.total_credits(), 20);
    }

    #[test]
    fn test_total_credits_sums_all_units() {
        let book = Gradebook::new(
            vec![
                Unit::new("A".to_string(), 20),
                Unit::new("B".to_string(), 10),
            ],
            vec![ClassificationBand::new("Pass".to_string(), 40.0)],
        );

        assert_eq!(book.total_credits(), 30);
        assert_eq!(book.bands().len(), 1);
    }

    #[test]
    fn test_total_credits_does_not_wrap() {
        let book = Gradebook::new(
            vec![
                Unit::new("A".to_string(), u32::MAX),
                Unit::new("B".to_string(), u32::MAX),
            ],
            Vec::new(),
        );

        assert_eq!(book.total_credits(), 2 * u64::from(u32::MAX));
    }
}
