// src/plot_functions/plot_success_failed.rs

use std::path::Path;

use crate::data_analysis::summary::{failed_points, success_points, SummaryRow};
use crate::data_input::log_data::{ExperimentKind, Observation};
use crate::plot_framework::{
    draw_single_plot, output_file, range_of, Annotation, PlotConfig, PlotSeries, SeriesShape,
};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::PlotResult;

/// Every reading as a marker (success green, failed red cross at the zero
/// sentinel), annotated with `S:<n>` / `F:<n>` counts above each distance.
pub fn plot_success_failed_markers(
    kind: ExperimentKind,
    observations: &[Observation],
    rows: &[SummaryRow],
    style: &PlotStyle,
    output_dir: &Path,
) -> PlotResult {
    let output_file_name = output_file(output_dir, &format!("{}_scatter.png", kind.file_base()));
    let plot_type_name = "Success/Failed RSSI";

    let success = success_points(observations);
    let failed = failed_points(observations);

    let all_points = success.iter().chain(failed.iter());
    let config = range_of(all_points.clone().map(|p| p.0)).and_then(|x_range| {
        let y_range = range_of(all_points.map(|p| p.1))?;

        let mut config = PlotConfig::new(
            format!("{} - Success/Failed RSSI Markers", kind.title()),
            x_range,
            y_range,
            style.labels.xlabel_rssi.clone(),
            style.labels.ylabel_rssi.clone(),
        );
        config.x_tick_step = Some(style.xtick_step);

        let s = &style.scatter_success;
        config.series.push(
            PlotSeries::points(success.clone(), s.label.clone(), to_rgb_color(s.color), SeriesShape::Scatter, s.radius_px())
                .with_opacity(s.alpha),
        );
        let f = &style.scatter_failed;
        config.series.push(
            PlotSeries::points(failed.clone(), f.label.clone(), to_rgb_color(f.color), SeriesShape::Cross, f.radius_px())
                .with_opacity(f.alpha),
        );

        config.annotations = rows
            .iter()
            .map(|row| Annotation {
                x: row.key,
                y: row.mean_rssi,
                text: format!("S:{}\nF:{}", row.success_count, row.failed_count),
                offset_px: (0, style.annotation.offset_px),
                background: Some((style.annotation.bg_color, style.annotation.bg_alpha)),
            })
            .collect();
        Some(config)
    });

    draw_single_plot(&output_file_name, plot_type_name, config, style)
}

// src/plot_functions/plot_success_failed.rs
