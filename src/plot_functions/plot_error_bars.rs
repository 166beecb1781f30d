// src/plot_functions/plot_error_bars.rs

use std::path::Path;

use crate::constants::{LOG_SCALE_RSSI_MAX, LOG_SCALE_RSSI_MIN};
use crate::data_analysis::summary::SummaryRow;
use crate::data_input::log_data::ExperimentKind;
use crate::plot_framework::{draw_single_plot, output_file, range_of, ErrorBarSeries, PlotConfig, PlotSeries};
use crate::plot_style::{to_rgb_color, PlotStyle};
use crate::types::{ErrorBarPoint, PlotResult};

/// Min/average/max RSSI per reference distance as error bars joined by a line.
///
/// The log-scale variant plots |RSSI|, so the weakest reading becomes the
/// top of each bar.
pub fn plot_rssi_error_bars(
    kind: ExperimentKind,
    rows: &[SummaryRow],
    style: &PlotStyle,
    output_dir: &Path,
    log_scale: bool,
) -> PlotResult {
    let plot_type_name = "Min/Avg/Max RSSI";
    let (file_name, title) = if log_scale {
        (
            format!("{}_errorbar_log.png", kind.file_base()),
            format!("{} - Min/Average/Max RSSI Values (Log Scale)", kind.title()),
        )
    } else {
        (
            format!("{}_errorbar.png", kind.file_base()),
            format!("{} - Min/Average/Max RSSI Values", kind.title()),
        )
    };

    let rows: Vec<&SummaryRow> = rows.iter().filter(|r| r.success_count > 0).collect();
    let points: Vec<ErrorBarPoint> = rows
        .iter()
        .map(|r| {
            if log_scale {
                (r.key, r.max_rssi.abs(), r.mean_rssi.abs(), r.min_rssi.abs())
            } else {
                (r.key, r.min_rssi, r.mean_rssi, r.max_rssi)
            }
        })
        .collect();

    let config = range_of(points.iter().map(|p| p.0)).and_then(|x_range| {
        let y_range = if log_scale {
            LOG_SCALE_RSSI_MIN..LOG_SCALE_RSSI_MAX
        } else {
            range_of(points.iter().flat_map(|p| [p.1, p.3]))?
        };
        let y_label = if log_scale {
            format!("|{}| - Log Scale", style.labels.ylabel_rssi)
        } else {
            style.labels.ylabel_rssi.clone()
        };

        let color = to_rgb_color(style.error_bar.color);
        let mut config = PlotConfig::new(title.clone(), x_range, y_range, style.labels.xlabel_rssi.clone(), y_label);
        config.y_log_scale = log_scale;
        config.x_tick_step = Some(style.xtick_step);
        config.series.push(PlotSeries::line(
            points.iter().map(|p| (p.0, p.2)).collect(),
            "",
            color,
            style.error_bar.line_width.round().max(1.0) as u32,
        ));
        config.error_bars.push(ErrorBarSeries {
            points: points.clone(),
            label: style.error_bar.label.clone(),
            color,
            capsize: style.error_bar.capsize.round() as u32,
            marker_size: style.error_bar.marker_size.round() as u32,
            stroke_width: style.error_bar.line_width.round().max(1.0) as u32,
        });
        Some(config)
    });

    draw_single_plot(&output_file(output_dir, &file_name), plot_type_name, config, style)
}

// src/plot_functions/plot_error_bars.rs
