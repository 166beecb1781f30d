// src/plot_functions/plot_cumulative_logs.rs

use std::path::Path;

use crate::data_analysis::scalability::CumulativeCounts;
use crate::plot_framework::{draw_single_plot, output_file, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::{PlotResult, Point};

/// Cumulative logs per minute for the room reader, the hallway reader and
/// both together.
pub fn plot_cumulative_logs(counts: &CumulativeCounts, style: &PlotStyle, output_dir: &Path) -> PlotResult {
    let plot_type_name = "Cumulative Logs";
    let output_file_name = output_file(output_dir, "scalability_cumulative_logs.png");

    let series_of = |values: &[u64]| -> Vec<Point> {
        counts
            .minutes
            .iter()
            .zip(values)
            .map(|(&m, &c)| (f64::from(m), c as f64))
            .collect()
    };

    let config = (!counts.minutes.is_empty()).then(|| {
        let last_minute = counts.minutes.last().copied().unwrap_or(0).max(1);
        let y_top = (counts.grand_total().max(30) as f64) * 1.08;
        let mut config = PlotConfig::new(
            "Cumulative Log Count per Minute",
            0.0..f64::from(last_minute),
            0.0..y_top,
            "Minutes Since Start",
            "Cumulative Logs",
        );
        config.series.push(
            PlotSeries::line(series_of(&counts.room), "Room Reader", to_rgb_color(style.raw.mean), style.line_width)
                .with_shape(SeriesShape::LineWithMarkers)
                .with_marker_size(3),
        );
        config.series.push(
            PlotSeries::line(
                series_of(&counts.hall),
                "Hallway Reader",
                to_rgb_color(style.kalman.mean),
                style.line_width,
            )
            .with_shape(SeriesShape::LineWithMarkers)
            .with_marker_size(3),
        );
        config.series.push(
            PlotSeries::line(
                series_of(&counts.total),
                "Total Logs",
                to_rgb_color(style.total_logs_color),
                style.line_width + 1,
            )
            .with_shape(SeriesShape::DashedLine),
        );
        config
    });

    draw_single_plot(&output_file_name, plot_type_name, config, style)
}

// src/plot_functions/plot_cumulative_logs.rs
