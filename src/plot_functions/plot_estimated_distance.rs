// src/plot_functions/plot_estimated_distance.rs

use std::path::Path;

use plotters::style::colors::BLACK;

use crate::data_analysis::accuracy::{estimated_series, reference_distances, unique_tags};
use crate::data_input::accuracy_log::AccuracySample;
use crate::plot_framework::{categorical_color, draw_single_plot, output_file, PlotConfig, PlotSeries, SeriesShape};
use crate::plot_style::PlotStyle;
use crate::types::{PlotResult, Point};

/// Filesystem-safe form of a label.
pub fn file_token(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// One chart per reference distance: each tag's estimated distance by sample
/// index against a dashed line at the true distance.
pub fn plot_estimated_distance(samples: &[AccuracySample], style: &PlotStyle, output_dir: &Path) -> PlotResult {
    let plot_type_name = "Estimated Distance";
    let tags = unique_tags(samples);

    for ref_distance in reference_distances(samples) {
        let output_file_name = output_file(
            output_dir,
            &format!("accuracy_estimated_{}m.png", file_token(&format!("{ref_distance}"))),
        );

        let per_tag: Vec<(usize, &String, Vec<Point>)> = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                let series = estimated_series(samples, tag, ref_distance)
                    .into_iter()
                    .enumerate()
                    .map(|(n, d)| ((n + 1) as f64, d))
                    .collect();
                (i, tag, series)
            })
            .collect();

        let longest = per_tag.iter().map(|(_, _, s)| s.len()).max().unwrap_or(0);
        let max_estimate = per_tag
            .iter()
            .flat_map(|(_, _, s)| s.iter().map(|p| p.1))
            .fold(0.0f64, f64::max);

        let config = (longest > 0).then(|| {
            let x_end = (longest as f64).max(2.0);
            let y_end = 11f64.max(ref_distance + 2.0).max(max_estimate * 1.05);
            let mut config = PlotConfig::new(
                format!("Estimated Distance at Reference = {ref_distance} m"),
                1.0..x_end,
                0.0..y_end,
                "Sample Index",
                "Estimated Distance (m)",
            );
            config.x_tick_step = Some(1.0);
            config.series.push(
                PlotSeries::line(
                    vec![(1.0, ref_distance), (x_end, ref_distance)],
                    format!("Distance: {ref_distance} m"),
                    BLACK,
                    style.line_width,
                )
                .with_shape(SeriesShape::DashedLine)
                .with_opacity(0.8),
            );
            for (i, tag, series) in per_tag {
                config.series.push(
                    PlotSeries::line(series, tag.clone(), categorical_color(i), style.line_width)
                        .with_shape(SeriesShape::LineWithMarkers)
                        .with_marker_size(5)
                        .with_opacity(0.85),
                );
            }
            config
        });

        draw_single_plot(&output_file_name, plot_type_name, config, style)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_token() {
        assert_eq!(file_token("TAG 01/a"), "TAG_01_a");
        assert_eq!(file_token("2.5"), "2_5");
    }
}

// src/plot_functions/plot_estimated_distance.rs
