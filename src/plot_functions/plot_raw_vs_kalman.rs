// src/plot_functions/plot_raw_vs_kalman.rs

use std::path::Path;

use crate::constants::{SAMPLES_PER_TRIAL, SMOOTHING_WINDOW};
use crate::data_analysis::accuracy::{first_trial_signal, unique_tags};
use crate::data_analysis::smoothing::centered_moving_average;
use crate::data_input::accuracy_log::AccuracySample;
use crate::plot_framework::{draw_single_plot, output_file, range_of, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_functions::plot_estimated_distance::file_token;
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::{PlotResult, Point};

/// Per tag: raw RSSI of the first trial at every distance against the
/// Kalman-filtered RSSI, the latter smoothed by a centered rolling mean.
pub fn plot_raw_vs_kalman(samples: &[AccuracySample], style: &PlotStyle, output_dir: &Path) -> PlotResult {
    let plot_type_name = "Raw vs Kalman RSSI";

    for tag in unique_tags(samples) {
        let output_file_name = output_file(output_dir, &format!("accuracy_signal_{}.png", file_token(&tag)));
        let (raw, kalman) = first_trial_signal(samples, &tag, SAMPLES_PER_TRIAL);
        let kalman_smooth = centered_moving_average(&kalman, SMOOTHING_WINDOW);

        let index = |values: &[f64]| -> Vec<Point> {
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| ((i + 1) as f64, v))
                .collect()
        };
        let raw_series = index(&raw);
        let kalman_series = index(&kalman_smooth);

        let config = range_of(raw_series.iter().map(|p| p.0)).and_then(|x_range| {
            let y_range = range_of(raw.iter().chain(kalman_smooth.iter()).copied())?;
            let mut config = PlotConfig::new(
                format!("RSSI Signal (Raw vs Kalman) - {tag}"),
                x_range,
                y_range,
                format!("Sample Index ({SAMPLES_PER_TRIAL} of Each Distance)"),
                style.labels.ylabel_rssi.clone(),
            );
            config.series.push(PlotSeries::line(
                raw_series.clone(),
                "Raw RSSI",
                to_rgb_color(style.raw.mean),
                style.line_width,
            ));
            config.series.push(
                PlotSeries::line(
                    kalman_series.clone(),
                    "Kalman Filtered RSSI",
                    to_rgb_color(style.kalman.mean),
                    style.line_width + 1,
                )
                .with_shape(SeriesShape::DashedLine),
            );
            Some(config)
        });

        draw_single_plot(&output_file_name, plot_type_name, config, style)?;
    }
    Ok(())
}

// src/plot_functions/plot_raw_vs_kalman.rs
