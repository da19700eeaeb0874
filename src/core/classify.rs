//! Grade classification against named threshold bands

use crate::core::models::ClassificationBand;

/// Return bands ordered from the highest threshold to the lowest.
///
/// The sort is stable, so bands sharing a threshold keep their configured order.
#[must_use]
pub fn bands_descending(bands: &[ClassificationBand]) -> Vec<&ClassificationBand> {
    let mut sorted: Vec<&ClassificationBand> = bands.iter().collect();
    sorted.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
    sorted
}

/// Find the highest band whose threshold `grade` meets or exceeds.
///
/// Returns `None` when no bands are configured or the grade is below every
/// threshold.
#[must_use]
pub fn band_for(grade: f64, bands: &[ClassificationBand]) -> Option<&ClassificationBand> {
    bands_descending(bands)
        .into_iter()
        .find(|band| band.admits(grade))
}

/// Render a grade for display, appending the band name when one applies.
///
/// The grade is always shown with two decimal places, e.g. `"71.25 (First)"`
/// or `"38.00"`.
#[must_use]
pub fn classify(grade: f64, bands: &[ClassificationBand]) -> String {
    match band_for(grade, bands) {
        Some(band) => format!("{grade:.2} ({})", band.name),
        None => format!("{grade:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass_first() -> Vec<ClassificationBand> {
        vec![
            ClassificationBand::new("Pass".to_string(), 40.0),
            ClassificationBand::new("First".to_string(), 70.0),
        ]
    }

    #[test]
    fn test_classify_without_bands_is_plain_number() {
        assert_eq!(classify(65.0, &[]), "65.00");
        assert_eq!(classify(65.456, &[]), "65.46");
    }

    #[test]
    fn test_classify_is_monotonic_across_thresholds() {
        let bands = pass_first();

        assert_eq!(classify(39.99, &bands), "39.99");
        assert_eq!(classify(40.0, &bands), "40.00 (Pass)");
        assert_eq!(classify(69.99, &bands), "69.99 (Pass)");
        assert_eq!(classify(70.0, &bands), "70.00 (First)");
        assert_eq!(classify(100.0, &bands), "100.00 (First)");
    }

    #[test]
    fn test_band_order_in_config_does_not_matter() {
        let mut bands = pass_first();
        bands.reverse();

        assert_eq!(band_for(75.0, &bands).map(|b| b.name.as_str()), Some("First"));
        assert_eq!(band_for(55.0, &bands).map(|b| b.name.as_str()), Some("Pass"));
        assert!(band_for(10.0, &bands).is_none());
    }

    #[test]
    fn test_bands_descending_is_stable_for_ties() {
        let bands = vec![
            ClassificationBand::new("Low".to_string(), 10.0),
            ClassificationBand::new("Merit".to_string(), 60.0),
            ClassificationBand::new("Also Merit".to_string(), 60.0),
        ];

        let names: Vec<&str> = bands_descending(&bands)
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["Merit", "Also Merit", "Low"]);
    }

    #[test]
    fn test_zero_threshold_band_catches_everything() {
        let bands = vec![ClassificationBand::new("Fail".to_string(), 0.0)];
        assert_eq!(classify(0.0, &bands), "0.00 (Fail)");
    }
}
