// src/plot_functions/plot_rssi_bands.rs

use std::path::Path;

use crate::data_analysis::accuracy::{rssi_bands, unique_tags, RssiBand, Spread};
use crate::data_input::accuracy_log::AccuracySample;
use crate::plot_framework::{
    draw_single_plot, output_file, range_of, PlotConfig, PlotSeries, SeriesShape, SpanSeries,
};
use crate::plot_functions::plot_estimated_distance::file_token;
use crate::plot_style::{to_rgb_color, PlotStyle, SignalPalette};
use crate::types::{PlotResult, Point};

// Raw and Kalman bands sit either side of the reference distance.
const BAND_OFFSET_M: f64 = 0.055;
const BAND_STROKE_PX: u32 = 14;

#[allow(clippy::too_many_arguments)]
fn push_signal(
    config: &mut PlotConfig,
    bands: &[RssiBand],
    pick: fn(&RssiBand) -> Spread,
    offset: f64,
    name: &str,
    palette: &SignalPalette,
    style: &PlotStyle,
    dashed_mean: bool,
) {
    let at = |f: fn(&Spread) -> f64| -> Vec<Point> {
        bands.iter().map(|b| (b.ref_distance + offset, f(&pick(b)))).collect()
    };

    config.spans.push(SpanSeries {
        spans: bands
            .iter()
            .map(|b| {
                let s = pick(b);
                (b.ref_distance + offset, s.min, s.max)
            })
            .collect(),
        color: to_rgb_color(palette.mean),
        opacity: 0.3,
        stroke_width: BAND_STROKE_PX,
    });

    let mean_shape = if dashed_mean { SeriesShape::DashedLine } else { SeriesShape::LineWithMarkers };
    config.series.push(
        PlotSeries::line(at(|s| s.mean), format!("{name} Mean"), to_rgb_color(palette.mean), style.line_width)
            .with_shape(mean_shape)
            .with_marker_size(4),
    );
    if dashed_mean {
        config.series.push(PlotSeries::points(
            at(|s| s.mean),
            "",
            to_rgb_color(palette.mean),
            SeriesShape::Scatter,
            4,
        ));
    }
    config.series.push(PlotSeries::points(
        at(|s| s.max),
        format!("{name} Max"),
        to_rgb_color(palette.max),
        SeriesShape::Tick,
        8,
    ));
    config.series.push(PlotSeries::points(
        at(|s| s.min),
        format!("{name} Min"),
        to_rgb_color(palette.min),
        SeriesShape::Tick,
        8,
    ));
}

/// Per tag: min/mean/max of raw and Kalman RSSI at each reference distance.
pub fn plot_rssi_bands(samples: &[AccuracySample], style: &PlotStyle, output_dir: &Path) -> PlotResult {
    let plot_type_name = "RSSI Bands";

    for tag in unique_tags(samples) {
        let output_file_name = output_file(output_dir, &format!("accuracy_bands_{}.png", file_token(&tag)));
        let bands = rssi_bands(samples, &tag);

        let config = range_of(bands.iter().map(|b| b.ref_distance)).and_then(|x_range| {
            let y_range = range_of(bands.iter().flat_map(|b| [b.raw.min, b.raw.max, b.kalman.min, b.kalman.max]))?;
            let mut config = PlotConfig::new(
                format!("RSSI Min/Mean/Max (Raw vs Kalman) - {tag}"),
                x_range,
                y_range,
                "Reference Distance (m)",
                style.labels.ylabel_rssi.clone(),
            );
            config.x_tick_step = Some(1.0);
            push_signal(&mut config, &bands, |b| b.raw, -BAND_OFFSET_M, "Raw", &style.raw, style, false);
            push_signal(&mut config, &bands, |b| b.kalman, BAND_OFFSET_M, "Kalman", &style.kalman, style, true);
            Some(config)
        });

        draw_single_plot(&output_file_name, plot_type_name, config, style)?;
    }
    Ok(())
}

// src/plot_functions/plot_rssi_bands.rs
