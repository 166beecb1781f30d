// src/plot_functions/plot_moving.rs

use std::path::Path;

use log::warn;

use crate::constants::{LOG_SCALE_RSSI_MAX, LOG_SCALE_RSSI_MIN, SMOOTHING_WINDOW, SPLINE_SAMPLE_POINTS};
use crate::data_analysis::smoothing::{centered_moving_average, CubicSpline};
use crate::data_analysis::summary::SummaryRow;
use crate::data_input::log_data::{ExperimentKind, Observation};
use crate::plot_framework::{draw_single_plot, output_file, range_of, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::{PlotResult, Point};

/// Display-only smoothing of the per-reading averages: a centered moving
/// average interpolated by a natural cubic spline.
pub fn smoothed_curve(averages: &[Point]) -> Option<Vec<Point>> {
    let values: Vec<f64> = averages.iter().map(|p| p.1).collect();
    let smoothed = centered_moving_average(&values, SMOOTHING_WINDOW);
    let knots: Vec<Point> = averages.iter().map(|p| p.0).zip(smoothed).collect();
    match CubicSpline::natural(&knots) {
        Ok(spline) => Some(spline.sample(SPLINE_SAMPLE_POINTS)),
        Err(e) => {
            warn!("Moving experiment smoothing skipped: {e}");
            None
        }
    }
}

/// PNG name of the moving chart, `moving_rssi.png` or `moving_rssi_log.png`.
pub fn chart_file_name(log_scale: bool) -> String {
    let base = ExperimentKind::Moving.file_base();
    if log_scale {
        format!("{base}_rssi_log.png")
    } else {
        format!("{base}_rssi.png")
    }
}

/// Average RSSI per reading number with failed readings as crosses.
///
/// On the log-scale variant RSSI is plotted as |RSSI| and failed readings,
/// whose zero sentinel has no place on a log axis, are left out.
pub fn plot_moving_experiment(
    observations: &[Observation],
    rows: &[SummaryRow],
    style: &PlotStyle,
    output_dir: &Path,
    log_scale: bool,
    smooth: bool,
) -> PlotResult {
    let kind = ExperimentKind::Moving;
    let plot_type_name = "Moving RSSI";
    let file_name = chart_file_name(log_scale);
    let transform = |rssi: f64| if log_scale { rssi.abs() } else { rssi };

    let averages: Vec<Point> = rows
        .iter()
        .filter(|r| r.success_count > 0)
        .map(|r| (r.key, transform(r.mean_rssi)))
        .collect();
    let failed: Vec<Point> = if log_scale {
        Vec::new()
    } else {
        observations
            .iter()
            .filter(|o| !o.reading.is_success())
            .map(|o| (o.reading.sequence_index as f64, o.reading.rssi as f64))
            .collect()
    };
    let smoothed = if smooth { smoothed_curve(&averages) } else { None };

    let x_values: Vec<f64> = averages.iter().chain(failed.iter()).map(|p| p.0).collect();
    let config = range_of(x_values.iter().copied()).and_then(|x_range| {
        let y_range = if log_scale {
            LOG_SCALE_RSSI_MIN..LOG_SCALE_RSSI_MAX
        } else {
            range_of(averages.iter().chain(failed.iter()).map(|p| p.1))?
        };
        let (title, y_label) = if log_scale {
            (
                format!("{} - RSSI Over Time (Log Scale)", kind.title()),
                format!("|{}| - Log Scale", style.labels.ylabel_moving),
            )
        } else {
            (
                format!("{} - RSSI Over Time", kind.title()),
                style.labels.ylabel_moving.clone(),
            )
        };

        let mut config = PlotConfig::new(title, x_range, y_range, style.labels.xlabel_moving.clone(), y_label);
        let (x_min, x_max) = x_values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        config.x_tick_step = Some(if log_scale {
            ((x_max - x_min) / 10.0).floor().max(1.0)
        } else {
            style.xtick_step
        });

        let avg_style = &style.moving_avg;
        config.series.push(
            PlotSeries::line(averages.clone(), avg_style.label.clone(), to_rgb_color(avg_style.color), avg_style.stroke_px())
                .with_shape(SeriesShape::LineWithMarkers)
                .with_marker_size(4),
        );
        if let Some(curve) = &smoothed {
            config.series.push(
                PlotSeries::line(curve.clone(), "Smoothed RSSI", to_rgb_color(style.regression.color), style.line_width)
                    .with_shape(SeriesShape::DashedLine),
            );
        }
        let f = &style.scatter_failed;
        config.series.push(
            PlotSeries::points(failed.clone(), f.label.clone(), to_rgb_color(f.color), SeriesShape::Cross, f.radius_px())
                .with_opacity(f.alpha),
        );
        Some(config)
    });

    draw_single_plot(&output_file(output_dir, &file_name), plot_type_name, config, style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothed_curve_spans_readings() {
        let averages: Vec<Point> = (1..=12).map(|i| (i as f64, -60.0 - (i % 3) as f64)).collect();
        let curve = smoothed_curve(&averages).unwrap();
        assert_eq!(curve.len(), SPLINE_SAMPLE_POINTS);
        assert_eq!(curve[0].0, 1.0);
        assert_eq!(curve[SPLINE_SAMPLE_POINTS - 1].0, 12.0);
        assert!(curve.iter().all(|p| p.1 <= -59.0 && p.1 >= -63.0));
    }

    #[test]
    fn test_chart_file_names() {
        assert_eq!(chart_file_name(false), "moving_rssi.png");
        assert_eq!(chart_file_name(true), "moving_rssi_log.png");
    }

    #[test]
    fn test_smoothing_needs_two_readings() {
        assert!(smoothed_curve(&[(1.0, -70.0)]).is_none());
    }
}

// src/plot_functions/plot_moving.rs
