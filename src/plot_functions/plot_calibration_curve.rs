// src/plot_functions/plot_calibration_curve.rs

use std::path::Path;

use crate::data_analysis::path_loss::dbm_to_linear_power;
use crate::data_analysis::summary::SummaryRow;
use crate::plot_framework::{draw_panel_plot, output_file, range_of, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::{PlotResult, Point};

/// Mean RSSI against distance for the clear path, once in dBm and once as
/// linear power on a logarithmic axis.
pub fn plot_calibration_curve(rows: &[SummaryRow], style: &PlotStyle, output_dir: &Path) -> PlotResult {
    let plot_type_name = "Calibration Curve";
    let output_file_name = output_file(output_dir, "calibration_curve.png");

    let dbm: Vec<Point> = rows
        .iter()
        .filter(|r| r.success_count > 0)
        .map(|r| (r.key, r.mean_rssi))
        .collect();
    let linear: Vec<Point> = dbm.iter().map(|&(d, rssi)| (d, dbm_to_linear_power(rssi))).collect();
    let color = to_rgb_color(style.error_bar.color);

    let dbm_panel = range_of(dbm.iter().map(|p| p.0)).and_then(|x_range| {
        let y_range = range_of(dbm.iter().map(|p| p.1))?;
        let mut config = PlotConfig::new(
            "RSSI vs Distance",
            x_range,
            y_range,
            style.labels.xlabel_rssi.clone(),
            style.labels.ylabel_rssi.clone(),
        );
        config.x_tick_step = Some(style.xtick_step);
        config.series.push(
            PlotSeries::line(dbm.clone(), "Mean RSSI", color, style.line_width)
                .with_shape(SeriesShape::LineWithMarkers)
                .with_marker_size(5),
        );
        Some(config)
    });

    let linear_panel = range_of(linear.iter().map(|p| p.0)).and_then(|x_range| {
        let lo = linear.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let hi = linear.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        if !(lo > 0.0 && hi.is_finite()) {
            return None;
        }
        let mut config = PlotConfig::new(
            "Linear Power vs Distance (Log Scale)",
            x_range,
            lo / 2.0..hi * 2.0,
            style.labels.xlabel_rssi.clone(),
            "Power (mW)",
        );
        config.y_log_scale = true;
        config.x_tick_step = Some(style.xtick_step);
        config.series.push(
            PlotSeries::line(linear.clone(), "10^(RSSI/10)", color, style.line_width)
                .with_shape(SeriesShape::LineWithMarkers)
                .with_marker_size(5),
        );
        Some(config)
    });

    draw_panel_plot(
        &output_file_name,
        Some("Path-Loss Calibration (Clear Path)"),
        plot_type_name,
        vec![dbm_panel, linear_panel],
        style,
    )
}

// src/plot_functions/plot_calibration_curve.rs
