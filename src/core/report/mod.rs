//! Report generation for a gradebook
//!
//! Runs the four calculations in order (predicted, minimum, maximum,
//! probabilistic), each writing into its own titled [`Section`]. Rendering the
//! sections is left to the caller.

pub mod chart;
pub mod section;

use crate::core::grades::{report_maximum, report_minimum, report_predicted, GradeError};
use crate::core::models::{normalize_units, Gradebook};
use crate::core::simulation::{
    report_simulation, SimulationError, SimulationOptions, SimulationResult,
};
use rand::Rng;

pub use chart::{ChartError, ChartRequest, ChartSink, SvgChartWriter, DEFAULT_CHART_FILE};
pub use section::{LineSink, Section};

/// Section heading for the credit-weighted prediction
pub const PREDICTED_TITLE: &str = "WEIGHTED AVERAGE PREDICTION:";
/// Section heading for the guaranteed minimum
pub const MINIMUM_TITLE: &str = "MINIMUM/ACTUAL";
/// Section heading for the best case
pub const MAXIMUM_TITLE: &str = "MAXIMUM";
/// Section heading for the Monte Carlo forecast
pub const SIMULATION_TITLE: &str = "PROBABILISTIC PREDICTION";

/// Indentation applied to section lines when rendered for the console
pub const SECTION_INDENT: &str = "  ";

/// Errors that stop a forecast from being produced
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    /// Degree-level calculation failed
    #[error(transparent)]
    Grades(#[from] GradeError),
    /// Monte Carlo step was misconfigured
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Results of all four calculations plus their printable sections
#[derive(Debug, Clone)]
pub struct ForecastReport {
    /// Sections in calculation order
    pub sections: Vec<Section>,
    /// Projected degree grade, `None` when no unit has marks
    pub predicted: Option<f64>,
    /// Guaranteed minimum degree grade
    pub minimum: f64,
    /// Best achievable degree grade
    pub maximum: f64,
    /// Monte Carlo outcome, `None` when fewer than two units have marks
    pub simulation: Option<SimulationResult>,
}

impl ForecastReport {
    /// Render every section for the console
    #[must_use]
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| section.render(SECTION_INDENT))
            .collect()
    }
}

/// Run all four calculations over `gradebook`.
///
/// # Arguments
/// * `gradebook` - Validated units and classification bands
/// * `options` - Simulation count and optional noise override
/// * `rng` - Random source for the Monte Carlo step
/// * `chart` - Where to send the distribution chart, if anywhere
///
/// # Errors
/// Returns [`ForecastError::Grades`] if the units carry no credits and
/// [`ForecastError::Simulation`] if the noise scale is unusable.
pub fn generate<R: Rng + ?Sized>(
    gradebook: &Gradebook,
    options: SimulationOptions,
    rng: &mut R,
    chart: Option<&mut dyn ChartSink>,
) -> Result<ForecastReport, ForecastError> {
    let units = normalize_units(&gradebook.units);
    let bands = gradebook.bands();

    let mut predicted_section = Section::new(PREDICTED_TITLE);
    let predicted = report_predicted(&units, bands, &mut predicted_section)?;

    let mut minimum_section = Section::new(MINIMUM_TITLE);
    let minimum = report_minimum(&units, bands, &mut minimum_section)?;

    let mut maximum_section = Section::new(MAXIMUM_TITLE);
    let maximum = report_maximum(&units, bands, &mut maximum_section)?;

    let mut simulation_section = Section::new(SIMULATION_TITLE);
    let simulation = report_simulation(
        &units,
        bands,
        options,
        rng,
        &mut simulation_section,
        chart,
    )?;

    Ok(ForecastReport {
        sections: vec![
            predicted_section,
            minimum_section,
            maximum_section,
            simulation_section,
        ],
        predicted,
        minimum,
        maximum,
        simulation,
    })
}
