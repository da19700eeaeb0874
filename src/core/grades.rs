//! Unit and degree grade calculations
//!
//! Every degree-level figure is a credit-weighted average. Credit weights are
//! kept as exact fractions (`credits / credit_total`) and only turned into a
//! float when applied to a unit's score, so rounding error does not build up
//! across many units.

use crate::core::classify::classify;
use crate::core::models::{ClassificationBand, NormalizedUnit, WeightedMark};
use crate::core::report::LineSink;
use num_rational::Ratio;

/// Tolerance used when deciding whether a unit's weights add up to the whole
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Exact share of the degree carried by some number of credits
pub type CreditShare = Ratio<u64>;

/// Errors from the degree-level calculations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradeError {
    /// The units carry no credits at all, so no average can be formed
    #[error("total credits across all units is zero; cannot weight unit grades")]
    NoCredits,
}

/// How assessments without a mark are treated when totalling a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMarkPolicy {
    /// Unmarked assessments contribute neither score nor weight
    Ignore,
    /// Unmarked assessments count as a mark of zero
    Zero,
    /// Unmarked assessments count as a mark of 100
    Full,
}

/// Weighted score of a unit and the weight that score covers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreTotals {
    /// Sum of `mark * weight` over counted assessments
    pub total_score: f64,
    /// Sum of the weights that were counted
    pub total_weight: f64,
}

impl ScoreTotals {
    /// Whether the counted weight covers the whole unit
    #[must_use]
    pub fn is_complete(&self) -> bool {
        (self.total_weight - 1.0).abs() < WEIGHT_TOLERANCE
    }

    /// Average mark over the counted weight, `None` when nothing was counted
    #[must_use]
    pub fn grade(&self) -> Option<f64> {
        if self.total_weight > 0.0 {
            Some(self.total_score / self.total_weight)
        } else {
            None
        }
    }
}

/// Total a unit's assessments under the given missing-mark policy.
///
/// Marked assessments always add `mark * weight` to the score and `weight` to
/// the counted weight. Empty input yields `(0, 0)`.
#[must_use]
pub fn aggregate(assessments: &[WeightedMark], policy: MissingMarkPolicy) -> ScoreTotals {
    assessments
        .iter()
        .fold(ScoreTotals::default(), |mut totals, assessment| {
            match (assessment.mark, policy) {
                (Some(mark), _) => {
                    totals.total_score += mark * assessment.weight;
                    totals.total_weight += assessment.weight;
                }
                (None, MissingMarkPolicy::Ignore) => {}
                (None, MissingMarkPolicy::Zero) => {
                    totals.total_weight += assessment.weight;
                }
                (None, MissingMarkPolicy::Full) => {
                    totals.total_score += 100.0 * assessment.weight;
                    totals.total_weight += assessment.weight;
                }
            }
            totals
        })
}

/// Predict a unit's grade from the marks recorded so far.
///
/// Returns `None` while no marked weight exists for the unit.
#[must_use]
pub fn predict(assessments: &[WeightedMark]) -> Option<f64> {
    aggregate(assessments, MissingMarkPolicy::Ignore).grade()
}

/// Predicted grade of one unit within the degree
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPrediction {
    /// Unit name
    pub name: String,
    /// Credit weight
    pub credits: u32,
    /// Predicted grade, `None` when no marks exist yet
    pub grade: Option<f64>,
    /// Whether every assessment in the unit has been marked
    pub is_final: bool,
}

/// Result of the predicted-grade calculation
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedDegree {
    /// Per-unit predictions in input order
    pub units: Vec<UnitPrediction>,
    /// Credits of every unit
    pub credit_total: u64,
    /// Credits of units with a determined grade
    pub credit_accounted_for: u64,
    /// Projected degree grade, `None` when no unit has marks
    pub grade: Option<f64>,
}

/// Sum the credits of all units, failing when there are none.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] when the total is zero.
pub fn credit_total(units: &[NormalizedUnit]) -> Result<u64, GradeError> {
    let total: u64 = units.iter().map(|unit| u64::from(unit.credits)).sum();
    if total == 0 {
        return Err(GradeError::NoCredits);
    }
    Ok(total)
}

/// Exact fraction of `credit_total` represented by `credits`.
///
/// `credit_total` must be non-zero.
#[must_use]
pub fn credit_share(credits: u32, credit_total: u64) -> CreditShare {
    Ratio::new(u64::from(credits), credit_total)
}

/// Scale `value` by an exact credit share
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn apply_share(value: f64, share: CreditShare) -> f64 {
    // Totals stay far below 2^53, so both terms convert exactly
    value * (*share.numer() as f64) / (*share.denom() as f64)
}

/// Compute the credit-weighted predicted degree grade.
///
/// Units without marks are left out of both the weighted sum and the
/// accounted-for credits. The partial weighted total is then scaled by
/// `credit_total / credit_accounted_for`, projecting the graded average onto
/// the ungraded remainder of the degree.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] if the units carry no credits.
pub fn compute_predicted(units: &[NormalizedUnit]) -> Result<PredictedDegree, GradeError> {
    let credit_total = credit_total(units)?;

    let predictions: Vec<UnitPrediction> = units
        .iter()
        .map(|unit| {
            let totals = aggregate(&unit.assessments, MissingMarkPolicy::Ignore);
            UnitPrediction {
                name: unit.name.clone(),
                credits: unit.credits,
                grade: totals.grade(),
                is_final: totals.is_complete(),
            }
        })
        .collect();

    let mut credit_accounted_for = 0u64;
    let mut weighted_total = 0.0;
    for prediction in &predictions {
        if let Some(grade) = prediction.grade {
            credit_accounted_for += u64::from(prediction.credits);
            weighted_total += apply_share(grade, credit_share(prediction.credits, credit_total));
        }
    }

    let grade = (credit_accounted_for != 0).then(|| {
        apply_share(
            weighted_total,
            Ratio::new(credit_total, credit_accounted_for),
        )
    });

    Ok(PredictedDegree {
        units: predictions,
        credit_total,
        credit_accounted_for,
        grade,
    })
}

/// Credit-weighted sum of raw unit scores under `policy`.
///
/// Each unit contributes its aggregated `total_score` (not divided by the
/// counted weight) at its full credit share.
fn weighted_raw_scores(
    units: &[NormalizedUnit],
    policy: MissingMarkPolicy,
) -> Result<f64, GradeError> {
    let credit_total = credit_total(units)?;

    Ok(units
        .iter()
        .map(|unit| {
            let totals = aggregate(&unit.assessments, policy);
            apply_share(totals.total_score, credit_share(unit.credits, credit_total))
        })
        .sum())
}

/// Compute the guaranteed minimum degree grade.
///
/// Unmarked assessments score zero and every unit keeps its full credit
/// weight, so a half-marked unit can contribute at most 50.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] if the units carry no credits.
pub fn compute_minimum(units: &[NormalizedUnit]) -> Result<f64, GradeError> {
    weighted_raw_scores(units, MissingMarkPolicy::Zero)
}

/// Compute the best achievable degree grade, assuming full marks on
/// everything still outstanding.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] if the units carry no credits.
pub fn compute_maximum(units: &[NormalizedUnit]) -> Result<f64, GradeError> {
    weighted_raw_scores(units, MissingMarkPolicy::Full)
}

/// Run the predicted calculation and write its status lines to `sink`.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] if the units carry no credits.
pub fn report_predicted(
    units: &[NormalizedUnit],
    bands: &[ClassificationBand],
    sink: &mut impl LineSink,
) -> Result<Option<f64>, GradeError> {
    let predicted = compute_predicted(units)?;

    for unit in &predicted.units {
        if let Some(grade) = unit.grade {
            let status = if unit.is_final { "Final" } else { "Predicted" };
            sink.push_line(format!(
                "{status} unit grade for '{}': {}",
                unit.name,
                classify(grade, bands)
            ));
        }
    }

    match predicted.grade {
        Some(grade) => sink.push_line(format!(
            "Predicted final degree grade: {}",
            classify(grade, bands)
        )),
        None => sink.push_line("Unable to calculate predicted grade; not enough data".to_string()),
    }

    Ok(predicted.grade)
}

/// Run the minimum calculation and write its summary line to `sink`.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] if the units carry no credits.
pub fn report_minimum(
    units: &[NormalizedUnit],
    bands: &[ClassificationBand],
    sink: &mut impl LineSink,
) -> Result<f64, GradeError> {
    let grade = compute_minimum(units)?;
    sink.push_line(format!(
        "Minimum/actual degree grade: {}",
        classify(grade, bands)
    ));
    Ok(grade)
}

/// Run the maximum calculation and write its summary line to `sink`.
///
/// # Errors
///
/// Returns [`GradeError::NoCredits`] if the units carry no credits.
pub fn report_maximum(
    units: &[NormalizedUnit],
    bands: &[ClassificationBand],
    sink: &mut impl LineSink,
) -> Result<f64, GradeError> {
    let grade = compute_maximum(units)?;
    sink.push_line(format!(
        "Maximum possible degree grade: {}",
        classify(grade, bands)
    ));
    Ok(grade)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(weight: f64, mark: f64) -> WeightedMark {
        WeightedMark {
            weight,
            mark: Some(mark),
        }
    }

    fn pending(weight: f64) -> WeightedMark {
        WeightedMark { weight, mark: None }
    }

    fn unit(name: &str, credits: u32, assessments: Vec<WeightedMark>) -> NormalizedUnit {
        NormalizedUnit {
            name: name.to_string(),
            credits,
            assessments,
        }
    }

    /// Two units: 20 credits fully marked at 80, 10 credits with nothing marked
    fn reference_units() -> Vec<NormalizedUnit> {
        vec![
            unit("Algorithms", 20, vec![marked(1.0, 80.0)]),
            unit("Compilers", 10, vec![pending(1.0)]),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn aggregate_empty_is_zero() {
        for policy in [
            MissingMarkPolicy::Ignore,
            MissingMarkPolicy::Zero,
            MissingMarkPolicy::Full,
        ] {
            assert_eq!(aggregate(&[], policy), ScoreTotals::default());
        }
    }

    #[test]
    fn aggregate_policies_differ_only_on_missing_marks() {
        let assessments = vec![marked(0.4, 50.0), pending(0.6)];

        let ignore = aggregate(&assessments, MissingMarkPolicy::Ignore);
        assert!(close(ignore.total_score, 20.0));
        assert!(close(ignore.total_weight, 0.4));

        let zero = aggregate(&assessments, MissingMarkPolicy::Zero);
        assert!(close(zero.total_score, 20.0));
        assert!(close(zero.total_weight, 1.0));

        let full = aggregate(&assessments, MissingMarkPolicy::Full);
        assert!(close(full.total_score, 80.0));
        assert!(close(full.total_weight, 1.0));
    }

    #[test]
    fn predict_is_undetermined_without_marks() {
        let assessments = vec![pending(0.5), pending(0.5)];

        assert!(close(
            aggregate(&assessments, MissingMarkPolicy::Ignore).total_weight,
            0.0
        ));
        assert!(predict(&assessments).is_none());
        assert!(predict(&[]).is_none());
    }

    #[test]
    fn predict_averages_over_marked_weight_only() {
        let assessments = vec![marked(0.2, 90.0), marked(0.2, 70.0), pending(0.6)];
        let grade = predict(&assessments).expect("grade");
        assert!(close(grade, 80.0));
    }

    #[test]
    fn zero_weight_marks_do_not_determine_a_grade() {
        assert!(predict(&[marked(0.0, 90.0)]).is_none());
    }

    #[test]
    fn credit_shares_are_reduced_fractions() {
        let share = credit_share(20, 30);
        assert_eq!(*share.numer(), 2);
        assert_eq!(*share.denom(), 3);
        assert!(close(apply_share(90.0, share), 60.0));
    }

    #[test]
    fn credits_beyond_u32_total_keep_shares_exact() {
        let units = vec![
            NormalizedUnit {
                name: "A".to_string(),
                credits: u32::MAX,
                assessments: vec![marked(1.0, 50.0)],
            },
            NormalizedUnit {
                name: "B".to_string(),
                credits: u32::MAX,
                assessments: vec![marked(1.0, 50.0)],
            },
        ];

        assert_eq!(credit_total(&units), Ok(2 * u64::from(u32::MAX)));
        assert_eq!(credit_share(u32::MAX, 2 * u64::from(u32::MAX)), Ratio::new(1, 2));

        let predicted = compute_predicted(&units).expect("predicted");
        assert!(close(predicted.grade.expect("grade"), 50.0));
        assert!(close(compute_minimum(&units).expect("minimum"), 50.0));
        assert!(close(compute_maximum(&units).expect("maximum"), 50.0));
    }

    #[test]
    fn predicted_matches_reference_example() {
        let predicted = compute_predicted(&reference_units()).expect("predicted");

        assert_eq!(predicted.credit_total, 30);
        assert_eq!(predicted.credit_accounted_for, 20);
        assert!(close(predicted.grade.expect("grade"), 80.0));

        assert!(predicted.units[0].is_final);
        assert!(predicted.units[1].grade.is_none());
    }

    #[test]
    fn minimum_and_maximum_match_reference_example() {
        let units = reference_units();

        let minimum = compute_minimum(&units).expect("minimum");
        let maximum = compute_maximum(&units).expect("maximum");

        assert_eq!(format!("{minimum:.2}"), "53.33");
        assert_eq!(format!("{maximum:.2}"), "86.67");
    }

    #[test]
    fn minimum_uses_raw_score_of_partially_marked_unit() {
        // 40% marked at 100 contributes 40, not 100
        let units = vec![unit("Thesis", 10, vec![marked(0.4, 100.0), pending(0.6)])];

        assert!(close(compute_minimum(&units).expect("minimum"), 40.0));
        assert!(close(compute_maximum(&units).expect("maximum"), 100.0));
        assert!(close(
            compute_predicted(&units).expect("predicted").grade.expect("grade"),
            100.0
        ));
    }

    #[test]
    fn predicted_with_no_marks_is_undetermined() {
        let units = vec![unit("A", 10, vec![pending(1.0)]), unit("B", 10, vec![])];
        let predicted = compute_predicted(&units).expect("predicted");

        assert!(predicted.grade.is_none());
        assert_eq!(predicted.credit_accounted_for, 0);
    }

    #[test]
    fn bounds_coincide_when_everything_is_marked() {
        let units = vec![
            unit("A", 15, vec![marked(0.5, 60.0), marked(0.5, 70.0)]),
            unit("B", 45, vec![marked(1.0, 55.0)]),
        ];

        let predicted = compute_predicted(&units)
            .expect("predicted")
            .grade
            .expect("grade");
        let minimum = compute_minimum(&units).expect("minimum");
        let maximum = compute_maximum(&units).expect("maximum");

        assert!(close(predicted, minimum));
        assert!(close(predicted, maximum));
        assert!(close(predicted, 57.5));
    }

    #[test]
    fn zero_credit_total_is_an_error() {
        let units = vec![unit("Audit", 0, vec![marked(1.0, 50.0)])];

        assert_eq!(compute_predicted(&units).err(), Some(GradeError::NoCredits));
        assert_eq!(compute_minimum(&[]).err(), Some(GradeError::NoCredits));
        assert_eq!(compute_maximum(&units).err(), Some(GradeError::NoCredits));
    }

    #[test]
    fn report_predicted_writes_unit_status_lines() {
        let units = vec![
            unit("Algorithms", 20, vec![marked(1.0, 80.0)]),
            unit("Compilers", 10, vec![marked(0.5, 60.0), pending(0.5)]),
            unit("Robotics", 10, vec![pending(1.0)]),
        ];
        let bands = vec![
            ClassificationBand::new("Pass".to_string(), 40.0),
            ClassificationBand::new("First".to_string(), 70.0),
        ];
        let mut lines: Vec<String> = Vec::new();

        let grade = report_predicted(&units, &bands, &mut lines).expect("report");

        assert_eq!(
            lines,
            vec![
                "Final unit grade for 'Algorithms': 80.00 (First)",
                "Predicted unit grade for 'Compilers': 60.00 (Pass)",
                "Predicted final degree grade: 73.33 (First)",
            ]
        );
        assert!(close(grade.expect("grade"), 220.0 / 3.0));
    }

    #[test]
    fn report_predicted_explains_missing_data() {
        let units = vec![unit("Robotics", 10, vec![pending(1.0)])];
        let mut lines: Vec<String> = Vec::new();

        let grade = report_predicted(&units, &[], &mut lines).expect("report");

        assert!(grade.is_none());
        assert_eq!(
            lines,
            vec!["Unable to calculate predicted grade; not enough data"]
        );
    }

    #[test]
    fn report_bounds_write_summary_lines() {
        let units = reference_units();
        let mut lines: Vec<String> = Vec::new();

        report_minimum(&units, &[], &mut lines).expect("minimum");
        report_maximum(&units, &[], &mut lines).expect("maximum");

        assert_eq!(
            lines,
            vec![
                "Minimum/actual degree grade: 53.33",
                "Maximum possible degree grade: 86.67",
            ]
        );
    }
}
