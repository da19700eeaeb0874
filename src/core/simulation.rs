//! Monte Carlo forecast of the final degree grade
//!
//! Each unit's current predicted grade is treated as a noisy estimate. A
//! single credit-weighted standard deviation is fitted to the spread of those
//! estimates and every unit is resampled from `Normal(grade, stddev)` many
//! times, giving an empirical distribution of the credit-weighted final grade.

use crate::core::classify::{bands_descending, classify};
use crate::core::grades::predict;
use crate::core::models::{ClassificationBand, NormalizedUnit};
use crate::core::report::{ChartRequest, ChartSink, LineSink};
use crate::{debug, warn};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Number of trials used when none is configured
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Fewest units with a determined grade needed to fit a spread
pub const MIN_DETERMINED_UNITS: usize = 2;

/// Errors from the Monte Carlo forecast
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// The noise scale cannot parameterise a normal distribution
    #[error("simulation stddev must be a finite, non-negative number (got {0})")]
    InvalidStddev(f64),
}

/// Accept `stddev` only when it is finite and non-negative
///
/// # Errors
/// Returns [`SimulationError::InvalidStddev`] for NaN, infinite or negative values.
pub fn check_stddev(stddev: f64) -> Result<f64, SimulationError> {
    if stddev.is_finite() && stddev >= 0.0 {
        Ok(stddev)
    } else {
        Err(SimulationError::InvalidStddev(stddev))
    }
}

/// Tunables for a simulation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Number of trials (at least one trial is always run)
    pub simulations: usize,
    /// Use this noise scale instead of the fitted pooled deviation
    pub stddev: Option<f64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            stddev: None,
        }
    }
}

/// Share of trials that landed in one classification band
#[derive(Debug, Clone, PartialEq)]
pub struct BandProbability {
    /// Band name
    pub name: String,
    /// Band threshold
    pub threshold: f64,
    /// Fraction of trials at or above this threshold and below the next one up
    pub probability: f64,
}

/// Outcome of a Monte Carlo run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Final grade of every trial, in the order they were drawn
    pub samples: Vec<f64>,
    /// 50th percentile of the trials
    pub median: f64,
    /// 5th percentile of the trials
    pub low: f64,
    /// 95th percentile of the trials
    pub high: f64,
    /// Noise scale every unit was resampled with
    pub stddev: f64,
    /// Per-band probabilities in ascending threshold order (empty without bands)
    pub band_probabilities: Vec<BandProbability>,
    /// Fraction of trials below every band threshold
    pub below_all: f64,
}

/// `(grade, credits)` for every unit whose predicted grade is determined
#[must_use]
pub fn determined_grades(units: &[NormalizedUnit]) -> Vec<(f64, u32)> {
    units
        .iter()
        .filter_map(|unit| predict(&unit.assessments).map(|grade| (grade, unit.credits)))
        .collect()
}

/// Credit-weighted mean of `(value, credits)` pairs
fn weighted_mean(values: &[(f64, u32)]) -> f64 {
    let credit_sum: f64 = values.iter().map(|(_, c)| f64::from(*c)).sum();
    values.iter().map(|(v, c)| v * f64::from(*c)).sum::<f64>() / credit_sum
}

/// Credit-weighted standard deviation of unit grades around their weighted mean
#[must_use]
pub fn pooled_stddev(grades: &[(f64, u32)]) -> f64 {
    let mean = weighted_mean(grades);
    let squared: Vec<(f64, u32)> = grades
        .iter()
        .map(|(grade, credits)| ((grade - mean).powi(2), *credits))
        .collect();
    weighted_mean(&squared).sqrt()
}

/// Percentile `p` (0-100) of ascending `sorted` data with linear interpolation
/// between the closest ranks.
///
/// Returns `NaN` for empty input.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - rank.floor();
    (sorted[upper] - sorted[lower]).mul_add(fraction, sorted[lower])
}

/// Bucket every trial into exactly one band (or none).
///
/// Each trial is claimed by the highest band whose threshold it meets. Returns
/// the per-band shares in ascending threshold order and the share of trials
/// below every threshold.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn band_probabilities(
    samples: &[f64],
    bands: &[ClassificationBand],
) -> (Vec<BandProbability>, f64) {
    let mut ascending = bands_descending(bands);
    ascending.reverse();

    let mut counts = vec![0usize; ascending.len()];
    let mut below = 0usize;
    for &grade in samples {
        match ascending.iter().rposition(|band| band.admits(grade)) {
            Some(idx) => counts[idx] += 1,
            None => below += 1,
        }
    }

    let total = samples.len().max(1) as f64;
    let probabilities = ascending
        .iter()
        .zip(counts)
        .map(|(band, count)| BandProbability {
            name: band.name.clone(),
            threshold: band.threshold,
            probability: count as f64 / total,
        })
        .collect();

    (probabilities, below as f64 / total)
}

/// Run the Monte Carlo forecast.
///
/// Returns `Ok(None)` when fewer than [`MIN_DETERMINED_UNITS`] units have a
/// determined predicted grade. Units without one are left out of every trial.
///
/// # Errors
/// Returns [`SimulationError::InvalidStddev`] when the configured (or fitted)
/// noise scale is NaN, infinite or negative.
pub fn simulate<R: Rng + ?Sized>(
    units: &[NormalizedUnit],
    bands: &[ClassificationBand],
    options: SimulationOptions,
    rng: &mut R,
) -> Result<Option<SimulationResult>, SimulationError> {
    if let Some(stddev) = options.stddev {
        check_stddev(stddev)?;
    }

    let grades = determined_grades(units);
    if grades.len() < MIN_DETERMINED_UNITS {
        return Ok(None);
    }

    let stddev = check_stddev(options.stddev.unwrap_or_else(|| pooled_stddev(&grades)))?;
    let trials = options.simulations.max(1);
    let credit_sum: f64 = grades.iter().map(|(_, c)| f64::from(*c)).sum();
    debug!(
        "Simulating {trials} trials over {} units (stddev {stddev:.4})",
        grades.len()
    );

    let draws = grades
        .iter()
        .map(|&(grade, credits)| {
            Normal::new(grade, stddev)
                .map(|normal| (normal, f64::from(credits)))
                .map_err(|_| SimulationError::InvalidStddev(stddev))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let samples: Vec<f64> = (0..trials)
        .map(|_| {
            draws
                .iter()
                .map(|(normal, credits)| normal.sample(rng).clamp(0.0, 100.0) * credits)
                .sum::<f64>()
                / credit_sum
        })
        .collect();

    let mut sorted = samples.clone();
    sorted.sort_by(f64::total_cmp);

    let (band_probabilities, below_all) = band_probabilities(&samples, bands);

    Ok(Some(SimulationResult {
        median: percentile(&sorted, 50.0),
        low: percentile(&sorted, 5.0),
        high: percentile(&sorted, 95.0),
        samples,
        stddev,
        band_probabilities,
        below_all,
    }))
}

/// Run the forecast, write its summary lines to `sink` and hand the
/// distribution to `chart` when one is given.
///
/// A chart that fails to render is reported as a line; it never aborts the
/// calculation.
///
/// # Errors
/// Propagates [`SimulationError`] from [`simulate`].
pub fn report_simulation<R: Rng + ?Sized>(
    units: &[NormalizedUnit],
    bands: &[ClassificationBand],
    options: SimulationOptions,
    rng: &mut R,
    sink: &mut impl LineSink,
    chart: Option<&mut dyn ChartSink>,
) -> Result<Option<SimulationResult>, SimulationError> {
    let Some(result) = simulate(units, bands, options, rng)? else {
        sink.push_line("Not enough data to simulate grades".to_string());
        return Ok(None);
    };

    sink.push_line(format!(
        "Median (predicted final grade): {}",
        classify(result.median, bands)
    ));
    sink.push_line(format!("5th percentile: {}", classify(result.low, bands)));
    sink.push_line(format!("95th percentile: {}", classify(result.high, bands)));

    for band in &result.band_probabilities {
        sink.push_line(format!(
            "Simulated probability of {}: {:.2}",
            band.name, band.probability
        ));
    }

    if let Some(chart) = chart {
        let request = ChartRequest {
            samples: &result.samples,
            median: result.median,
            low: result.low,
            high: result.high,
            bands,
        };
        match chart.render(&request) {
            Ok(path) => sink.push_line(format!("Saved histogram to '{}'", path.display())),
            Err(e) => {
                warn!("Histogram rendering failed: {e}");
                sink.push_line(format!("Could not save histogram: {e}"));
            }
        }
    }

    Ok(Some(result))
}
