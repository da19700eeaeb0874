//! Property tests for the grade calculations

use degree_forecast::core::classify::{band_for, classify};
use degree_forecast::core::grades::{compute_maximum, compute_minimum, compute_predicted, predict};
use degree_forecast::core::models::{normalize_units, Assessment, ClassificationBand, Unit};
use degree_forecast::core::simulation::{simulate, SimulationOptions};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const EPS: f64 = 1e-9;

fn standard_bands() -> Vec<ClassificationBand> {
    vec![
        ClassificationBand::new("First".to_string(), 70.0),
        ClassificationBand::new("Upper Second".to_string(), 60.0),
        ClassificationBand::new("Lower Second".to_string(), 50.0),
        ClassificationBand::new("Third".to_string(), 40.0),
    ]
}

/// Split 100 into consecutive weights at the given cut points
fn weights_from_cuts(mut cuts: Vec<u8>) -> Vec<u8> {
    cuts.push(0);
    cuts.push(100);
    cuts.sort_unstable();
    cuts.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

fn build_unit(credits: u32, cuts: Vec<u8>, marks: &[Option<f64>]) -> Unit {
    weights_from_cuts(cuts)
        .into_iter()
        .zip(marks)
        .enumerate()
        .fold(Unit::new(format!("Unit {credits}"), credits), |unit, (idx, (weight, mark))| {
            let name = format!("Assessment {idx}");
            unit.with_assessment(match mark {
                Some(mark) => Assessment::marked(name, weight, *mark),
                None => Assessment::pending(name, weight),
            })
        })
}

prop_compose! {
    /// A unit whose assessment weights add up to 100, some of them marked
    fn arb_unit()(
        credits in 1u32..=60,
        cuts in prop::collection::vec(0u8..=100, 0..4),
        marks in prop::collection::vec(prop::option::of(0.0f64..=100.0), 4),
    ) -> Unit {
        build_unit(credits, cuts, &marks)
    }
}

prop_compose! {
    /// A unit whose assessments are all marked
    fn arb_marked_unit()(
        credits in 1u32..=60,
        cuts in prop::collection::vec(0u8..=100, 0..4),
        marks in prop::collection::vec(0.0f64..=100.0, 4),
    ) -> Unit {
        let marks: Vec<Option<f64>> = marks.into_iter().map(Some).collect();
        build_unit(credits, cuts, &marks)
    }
}

proptest! {
    #[test]
    fn unit_prediction_stays_in_range(unit in arb_unit()) {
        let normalized = unit.normalize();
        if let Some(grade) = predict(&normalized.assessments) {
            prop_assert!((-EPS..=100.0 + EPS).contains(&grade), "grade {grade}");
        }
    }

    #[test]
    fn minimum_le_predicted_le_maximum(units in prop::collection::vec(arb_unit(), 1..6)) {
        let normalized = normalize_units(&units);
        let minimum = compute_minimum(&normalized).expect("credits");
        let maximum = compute_maximum(&normalized).expect("credits");
        let predicted = compute_predicted(&normalized).expect("credits");

        prop_assert!(minimum <= maximum + EPS);
        if let Some(grade) = predicted.grade {
            prop_assert!(minimum <= grade + EPS, "min {minimum} > predicted {grade}");
            prop_assert!(grade <= maximum + EPS, "predicted {grade} > max {maximum}");
        }
    }

    #[test]
    fn bounds_meet_when_everything_is_marked(units in prop::collection::vec(arb_marked_unit(), 1..6)) {
        let normalized = normalize_units(&units);
        let minimum = compute_minimum(&normalized).expect("credits");
        let maximum = compute_maximum(&normalized).expect("credits");
        let predicted = compute_predicted(&normalized)
            .expect("credits")
            .grade
            .expect("every unit is marked");

        prop_assert!((minimum - predicted).abs() < 1e-6);
        prop_assert!((maximum - predicted).abs() < 1e-6);
    }

    #[test]
    fn formatted_grade_parses_back(grade in 0.0f64..=100.0) {
        let text = classify(grade, &standard_bands());
        let leading = text.split_whitespace().next().expect("numeric token");
        let parsed: f64 = leading.parse().expect("leading token is a number");

        prop_assert!((parsed - grade).abs() <= 0.01);
    }

    #[test]
    fn classification_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let bands = standard_bands();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let threshold = |g: f64| band_for(g, &bands).map_or(f64::NEG_INFINITY, |band| band.threshold);

        prop_assert!(threshold(low) <= threshold(high));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn simulation_is_well_formed(
        units in prop::collection::vec(arb_unit(), 2..6),
        seed in any::<u64>(),
    ) {
        let normalized = normalize_units(&units);
        let bands = standard_bands();
        let options = SimulationOptions { simulations: 200, stddev: None };
        let mut rng = StdRng::seed_from_u64(seed);

        if let Some(result) = simulate(&normalized, &bands, options, &mut rng).expect("fitted stddev") {
            prop_assert_eq!(result.samples.len(), 200);
            prop_assert!(result.low <= result.median && result.median <= result.high);
            prop_assert!(result.samples.iter().all(|s| (0.0..=100.0).contains(s)));

            let total: f64 = result
                .band_probabilities
                .iter()
                .map(|band| band.probability)
                .sum::<f64>()
                + result.below_all;
            prop_assert!((total - 1.0).abs() < 1e-9, "probabilities sum to {total}");
        }
    }
}
