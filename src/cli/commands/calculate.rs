//! Calculate command handler

use super::{load_or_exit, resolve_input};
use degree_forecast::config::Config;
use degree_forecast::core::report::{generate, ChartSink, SvgChartWriter};
use degree_forecast::{debug, error, verbose};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Run every calculation over a gradebook and print the report
///
/// The simulation seed and noise scale come from `config`, which already has
/// the command-line overrides applied.
pub fn run(file: Option<PathBuf>, no_chart: bool, config: &Config) {
    let path = resolve_input(file, config);
    let gradebook = load_or_exit(&path);

    let options = config.simulation_options();
    let mut rng = match config.simulation.seed {
        Some(seed) => {
            debug!("Seeding simulation with {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let mut writer = SvgChartWriter::in_dir(Path::new(&config.paths.charts_dir));
    let chart: Option<&mut dyn ChartSink> = if no_chart {
        None
    } else {
        verbose!("Chart will be written to {}", writer.output_path().display());
        Some(&mut writer)
    };

    verbose!(
        "Running {} simulation(s) over {} unit(s)",
        options.simulations,
        gradebook.units.len()
    );

    match generate(&gradebook, options, &mut rng, chart) {
        Ok(report) => print!("{}", report.render()),
        Err(e) => {
            error!("{e}");
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    }
}
