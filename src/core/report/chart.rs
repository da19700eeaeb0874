//! Distribution chart rendering
//!
//! Draws the Monte Carlo trial distribution as a 50-bin histogram with
//! markers for the median, the 5th/95th percentiles and every classification
//! threshold. The chart is a standalone SVG document rendered from an askama
//! template.

use crate::core::classify::classify;
use crate::core::models::ClassificationBand;
use askama::Template;
use std::fs;
use std::path::{Path, PathBuf};

/// File name used when no explicit chart path is configured
pub const DEFAULT_CHART_FILE: &str = "final_grade_distribution.svg";

/// Number of histogram bins
const BINS: usize = 50;

/// Canvas size in pixels
const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;

/// Plot area margins in pixels
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;

/// Extra room either side of the data, as a fraction of its range
const AXIS_PADDING: f64 = 0.05;

/// Everything needed to draw the distribution of simulated grades
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    /// Final grade of every trial
    pub samples: &'a [f64],
    /// 50th percentile
    pub median: f64,
    /// 5th percentile
    pub low: f64,
    /// 95th percentile
    pub high: f64,
    /// Classification bands; their thresholds are drawn as markers
    pub bands: &'a [ClassificationBand],
}

/// Errors raised while rendering or saving a chart
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// Nothing to plot
    #[error("no samples to plot")]
    Empty,
    /// The SVG template failed to render
    #[error("failed to render chart template: {0}")]
    Template(#[from] askama::Error),
    /// The chart could not be written to disk
    #[error("failed to write chart to {}: {source}", .path.display())]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Destination for the simulation's distribution chart
pub trait ChartSink {
    /// Render and persist the chart, returning where it was saved
    ///
    /// # Errors
    /// Returns an error if the chart cannot be rendered or written
    fn render(&mut self, request: &ChartRequest<'_>) -> Result<PathBuf, ChartError>;
}

/// Writes the distribution chart as an SVG file
#[derive(Debug, Clone)]
pub struct SvgChartWriter {
    output_path: PathBuf,
}

impl SvgChartWriter {
    /// Create a writer saving to `output_path`
    #[must_use]
    pub const fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// Create a writer saving [`DEFAULT_CHART_FILE`] inside `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_CHART_FILE))
    }

    /// Destination path of the chart
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl ChartSink for SvgChartWriter {
    fn render(&mut self, request: &ChartRequest<'_>) -> Result<PathBuf, ChartError> {
        let svg = render_svg(request)?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ChartError::Io {
                    path: self.output_path.clone(),
                    source,
                })?;
            }
        }
        fs::write(&self.output_path, svg).map_err(|source| ChartError::Io {
            path: self.output_path.clone(),
            source,
        })?;

        Ok(self.output_path.clone())
    }
}

struct Bar {
    x: String,
    y: String,
    width: String,
    height: String,
}

struct Tick {
    pos: String,
    label: String,
}

struct Marker {
    x: String,
    color: &'static str,
    dash: &'static str,
    opacity: &'static str,
}

struct LegendEntry {
    line_y: String,
    text_y: String,
    color: &'static str,
    dash: &'static str,
    label: String,
}

#[derive(Template)]
#[template(path = "distribution.svg")]
struct DistributionSvg {
    width: String,
    height: String,
    plot_left: String,
    plot_right: String,
    plot_top: String,
    plot_bottom: String,
    centre_x: String,
    centre_y: String,
    x_label_y: String,
    title: &'static str,
    x_label: &'static str,
    y_label: &'static str,
    bars: Vec<Bar>,
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
    markers: Vec<Marker>,
    legend_x: String,
    legend_text_x: String,
    legend_line_end: String,
    legend_top: String,
    legend_height: String,
    legend: Vec<LegendEntry>,
}

/// Linear map from data coordinates onto the plot area
struct Axis {
    min: f64,
    max: f64,
    from: f64,
    to: f64,
}

impl Axis {
    fn map(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min) * (self.to - self.from) + self.from
    }

    fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

fn px(value: f64) -> String {
    format!("{value:.1}")
}

/// Upper-case the first character and lower-case the rest
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Count samples into `BINS` equal-width bins spanning `[lo, hi]`
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn histogram(samples: &[f64], lo: f64, hi: f64) -> Vec<usize> {
    let mut counts = vec![0usize; BINS];
    let width = (hi - lo) / BINS as f64;
    for &value in samples {
        let idx = ((value - lo) / width).floor().max(0.0) as usize;
        counts[idx.min(BINS - 1)] += 1;
    }
    counts
}

/// Render the chart for `request` as an SVG document
///
/// # Errors
/// Returns an error if there are no samples or the template fails to render
#[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
pub fn render_svg(request: &ChartRequest<'_>) -> Result<String, ChartError> {
    let (mut lo, mut hi) = request
        .samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if request.samples.is_empty() || !lo.is_finite() || !hi.is_finite() {
        return Err(ChartError::Empty);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }

    let counts = histogram(request.samples, lo, hi);
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let plot_left = MARGIN_LEFT;
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;

    let padding = (hi - lo) * AXIS_PADDING;
    let x_axis = Axis {
        min: lo - padding,
        max: hi + padding,
        from: plot_left,
        to: plot_right,
    };
    let y_axis = Axis {
        min: 0.0,
        max: max_count * (1.0 + AXIS_PADDING),
        from: plot_bottom,
        to: plot_top,
    };

    let bin_width = (hi - lo) / BINS as f64;
    let bars = counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(i, &count)| {
            let left = x_axis.map((i as f64).mul_add(bin_width, lo));
            let right = x_axis.map(((i + 1) as f64).mul_add(bin_width, lo));
            let top = y_axis.map(count as f64);
            Bar {
                x: px(left),
                y: px(top),
                width: px(right - left),
                height: px(plot_bottom - top),
            }
        })
        .collect();

    let x_ticks = (0..=5)
        .map(|i| {
            let value = (f64::from(i) / 5.0).mul_add(x_axis.max - x_axis.min, x_axis.min);
            Tick {
                pos: px(x_axis.map(value)),
                label: format!("{value:.1}"),
            }
        })
        .collect();
    let y_ticks = (0..=4)
        .map(|i| {
            let value = f64::from(i) / 4.0 * y_axis.max;
            Tick {
                pos: px(y_axis.map(value)),
                label: format!("{value:.0}"),
            }
        })
        .collect();

    let mut markers = Vec::new();
    let mut legend_items: Vec<(&'static str, &'static str, String)> = Vec::new();

    for band in request.bands {
        if x_axis.contains(band.threshold) {
            markers.push(Marker {
                x: px(x_axis.map(band.threshold)),
                color: "black",
                dash: "2,3",
                opacity: "0.6",
            });
            legend_items.push((
                "black",
                "2,3",
                format!("{} threshold ({}%)", capitalize(&band.name), band.threshold),
            ));
        }
    }

    for (value, color, label) in [
        (request.median, "red", "Median"),
        (request.low, "orange", "5th percentile"),
        (request.high, "green", "95th percentile"),
    ] {
        markers.push(Marker {
            x: px(x_axis.map(value)),
            color,
            dash: "8,4",
            opacity: "1",
        });
        legend_items.push((color, "8,4", format!("{label}: {}", classify(value, request.bands))));
    }

    let legend_x = plot_right - 290.0;
    let legend_top = plot_top + 10.0;
    let legend = legend_items
        .into_iter()
        .enumerate()
        .map(|(i, (color, dash, label))| {
            let y = (i as f64).mul_add(20.0, legend_top + 16.0);
            LegendEntry {
                line_y: px(y - 4.0),
                text_y: px(y),
                color,
                dash,
                label,
            }
        })
        .collect::<Vec<_>>();
    let legend_height = (legend.len() as f64).mul_add(20.0, 12.0);

    let template = DistributionSvg {
        width: px(WIDTH),
        height: px(HEIGHT),
        plot_left: px(plot_left),
        plot_right: px(plot_right),
        plot_top: px(plot_top),
        plot_bottom: px(plot_bottom),
        centre_x: px((plot_left + plot_right) / 2.0),
        centre_y: px((plot_top + plot_bottom) / 2.0),
        x_label_y: px(HEIGHT - 20.0),
        title: "Monte Carlo Simulated Final Grade Distribution",
        x_label: "Final Grade (%)",
        y_label: "Frequency",
        bars,
        x_ticks,
        y_ticks,
        markers,
        legend_x: px(legend_x),
        legend_text_x: px(legend_x + 44.0),
        legend_line_end: px(legend_x + 36.0),
        legend_top: px(legend_top),
        legend_height: px(legend_height),
        legend,
    };

    Ok(template.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bands() -> Vec<ClassificationBand> {
        vec![
            ClassificationBand::new("first".to_string(), 70.0),
            ClassificationBand::new("pass".to_string(), 40.0),
        ]
    }

    #[test]
    fn test_histogram_counts_every_sample() {
        let samples: Vec<f64> = (0..100).map(f64::from).collect();
        let counts = histogram(&samples, 0.0, 99.0);

        assert_eq!(counts.len(), BINS);
        assert_eq!(counts.iter().sum::<usize>(), 100);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("first class"), "First class");
        assert_eq!(capitalize("UPPER"), "Upper");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_render_svg_contains_markers_and_legend() {
        let samples = [62.0, 65.0, 68.0, 71.0, 74.0];
        let bands = bands();
        let request = ChartRequest {
            samples: &samples,
            median: 68.0,
            low: 62.6,
            high: 73.4,
            bands: &bands,
        };

        let svg = render_svg(&request).expect("svg");

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Monte Carlo Simulated Final Grade Distribution"));
        assert!(svg.contains("Median: 68.00"));
        assert!(svg.contains("5th percentile: 62.60"));
        assert!(svg.contains("95th percentile: 73.40 (First)"));
        assert!(svg.contains("First threshold (70%)"));
        // 40 lies outside the plotted range
        assert!(!svg.contains("Pass threshold"));
    }

    #[test]
    fn test_render_svg_handles_identical_samples() {
        let samples = [75.0; 20];
        let request = ChartRequest {
            samples: &samples,
            median: 75.0,
            low: 75.0,
            high: 75.0,
            bands: &[],
        };

        assert!(render_svg(&request).is_ok());
    }

    #[test]
    fn test_render_svg_rejects_empty_samples() {
        let request = ChartRequest {
            samples: &[],
            median: 0.0,
            low: 0.0,
            high: 0.0,
            bands: &[],
        };

        assert!(matches!(render_svg(&request), Err(ChartError::Empty)));
    }

    #[test]
    fn test_svg_writer_creates_file() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut writer = SvgChartWriter::in_dir(&temp_dir.path().join("charts"));
        let samples = [50.0, 55.0, 60.0];
        let request = ChartRequest {
            samples: &samples,
            median: 55.0,
            low: 50.5,
            high: 59.5,
            bands: &[],
        };

        let path = writer.render(&request).expect("render");

        assert_eq!(path, temp_dir.path().join("charts").join(DEFAULT_CHART_FILE));
        let content = fs::read_to_string(&path).expect("read chart");
        assert!(content.contains("<rect"));
    }
}
