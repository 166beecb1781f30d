// src/plot_functions/plot_error_histogram.rs

use std::path::Path;

use crate::constants::ERROR_HISTOGRAM_BINS;
use crate::data_analysis::accuracy::FilterComparison;
use crate::data_analysis::histogram::histogram;
use crate::plot_framework::{draw_single_plot, output_file, range_of, BarSeries, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::{BarBin, PlotResult};

fn bars(values: &[f64]) -> Vec<BarBin> {
    histogram(values, ERROR_HISTOGRAM_BINS)
        .into_iter()
        .map(|b| (b.lower, b.upper, b.count as f64))
        .collect()
}

/// Distribution of absolute distance errors with and without the Kalman
/// filter, each with a dashed line at its mean.
pub fn plot_error_histogram(comparison: &FilterComparison, style: &PlotStyle, output_dir: &Path) -> PlotResult {
    let plot_type_name = "Distance Error Histogram";
    let output_file_name = output_file(output_dir, "accuracy_error_histogram.png");

    let raw_bins = bars(&comparison.raw_errors);
    let kalman_bins = bars(&comparison.kalman_errors);

    let config = range_of(raw_bins.iter().chain(kalman_bins.iter()).flat_map(|b| [b.0, b.1])).map(|x_range| {
        let peak = raw_bins.iter().chain(kalman_bins.iter()).map(|b| b.2).fold(1.0f64, f64::max);
        let y_top = peak * 1.1;
        let raw_color = to_rgb_color(style.raw.mean);
        let kalman_color = to_rgb_color(style.kalman.mean);

        let mut config = PlotConfig::new(
            "Distance Error Distribution (Raw vs Kalman)",
            x_range,
            0.0..y_top,
            "Absolute Error (m)",
            "Frequency",
        );
        config.bars.push(BarSeries {
            bins: raw_bins.clone(),
            label: "Raw RSSI Error".to_string(),
            color: raw_color,
            opacity: 0.7,
        });
        config.bars.push(BarSeries {
            bins: kalman_bins.clone(),
            label: "Kalman RSSI Error".to_string(),
            color: kalman_color,
            opacity: 0.7,
        });
        for (mean, name, color) in [
            (comparison.mean_raw_error, "Raw", raw_color),
            (comparison.mean_kalman_error, "Kalman", kalman_color),
        ] {
            if mean.is_finite() {
                config.series.push(
                    PlotSeries::line(
                        vec![(mean, 0.0), (mean, y_top)],
                        format!("{name} Mean: {mean:.2}m"),
                        color,
                        style.line_width,
                    )
                    .with_shape(SeriesShape::DashedLine),
                );
            }
        }
        config
    });

    draw_single_plot(&output_file_name, plot_type_name, config, style)
}

// src/plot_functions/plot_error_histogram.rs
