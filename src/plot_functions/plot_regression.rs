// src/plot_functions/plot_regression.rs

use std::path::Path;

use log::warn;

use crate::constants::REGRESSION_LINE_POINTS;
use crate::data_analysis::regression::regression_line;
use crate::data_analysis::summary::success_points;
use crate::data_input::log_data::{ExperimentKind, Observation};
use crate::plot_framework::{draw_single_plot, output_file, range_of, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::PlotResult;

/// Successful readings with their least-squares line. The line is left out
/// when the points cannot support a fit.
pub fn plot_regression(
    kind: ExperimentKind,
    observations: &[Observation],
    style: &PlotStyle,
    output_dir: &Path,
) -> PlotResult {
    let output_file_name = output_file(output_dir, &format!("{}_regression.png", kind.file_base()));
    let plot_type_name = "Regression";

    let success = success_points(observations);
    let fitted = match regression_line(&success, REGRESSION_LINE_POINTS) {
        Ok(((slope, intercept), line)) => {
            println!(
                "  {} regression: RSSI = {:.3} * distance + {:.3}",
                kind.title(),
                slope,
                intercept
            );
            Some(line)
        }
        Err(e) => {
            warn!("{} regression skipped: {e}", kind.title());
            None
        }
    };

    let config = range_of(success.iter().map(|p| p.0)).and_then(|x_range| {
        let y_values = success
            .iter()
            .map(|p| p.1)
            .chain(fitted.iter().flatten().map(|p| p.1));
        let y_range = range_of(y_values)?;

        let mut config = PlotConfig::new(
            format!("{} - Regression Line for Success RSSI", kind.title()),
            x_range,
            y_range,
            style.labels.xlabel_rssi.clone(),
            style.labels.ylabel_rssi.clone(),
        );
        config.x_tick_step = Some(style.xtick_step);

        if let Some(line) = &fitted {
            let reg = &style.regression;
            config
                .series
                .push(PlotSeries::line(line.clone(), reg.label.clone(), to_rgb_color(reg.color), reg.stroke_px()));
        }
        let s = &style.scatter_success;
        config.series.push(
            PlotSeries::points(success.clone(), s.label.clone(), to_rgb_color(s.color), SeriesShape::Scatter, s.radius_px())
                .with_opacity(s.alpha),
        );
        Some(config)
    });

    draw_single_plot(&output_file_name, plot_type_name, config, style)
}

// src/plot_functions/plot_regression.rs
