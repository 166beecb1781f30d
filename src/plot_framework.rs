// src/plot_framework.rs

use plotters::backend::{BitMapBackend, DrawingBackend};
use plotters::chart::{ChartBuilder, ChartContext, SeriesLabelPosition};
use plotters::coord::ranged1d::ValueFormatter;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, Cross, EmptyElement, ErrorBar, PathElement, Rectangle, Text};
use plotters::prelude::{Cartesian2d, IntoLogRange, Ranged};
use plotters::series::{DashedLineSeries, LineSeries};
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::iter;
use std::ops::Range;
use std::path::Path;

use crate::font_config::ChartFonts;
use crate::plot_style::{to_rgb_color, PlotStyle, Rgb};
use crate::types::{BarBin, ErrorBarPoint, PlotResult, Point, Span};

const LEGEND_SAMPLE_PX: i32 = 20;

/// Calculate plot range with padding.
/// Adds 15% padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-6 { 0.5 } else { range * 0.15 };
    (min - padding, max + padding)
}

/// Padded range over every finite value, `None` when there is none.
pub fn range_of<I: IntoIterator<Item = f64>>(values: I) -> Option<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return None;
    }
    let (start, end) = calculate_range(lo, hi);
    Some(start..end)
}

/// Y-axis tick label. dB-style axes keep whole numbers; tiny linear powers
/// switch to scientific notation; large counts use k/M notation.
pub fn format_y_axis_label(y: f64, y_label: &str) -> String {
    if y_label.contains("dB") {
        return format!("{:.0}", y);
    }
    if y.abs() >= 1_000_000.0 {
        format!("{:.1}M", y / 1_000_000.0)
    } else if y.abs() >= 1000.0 {
        format!("{:.0}k", y / 1000.0)
    } else if y != 0.0 && y.abs() < 0.01 {
        format!("{:.0e}", y)
    } else if y.abs() < 10.0 && y.fract() != 0.0 {
        format!("{:.1}", y)
    } else {
        format!("{:.0}", y)
    }
}

fn format_x_axis_label(x: f64) -> String {
    if x.fract().abs() < 1e-9 {
        format!("{:.0}", x)
    } else {
        format!("{:.1}", x)
    }
}

/// PNG path inside `output_dir`.
pub fn output_file(output_dir: &Path, file_name: &str) -> String {
    output_dir.join(file_name).to_string_lossy().into_owned()
}

/// Per-series color from a categorical palette, for series that have no fixed role.
pub fn categorical_color(index: usize) -> RGBColor {
    let c = colorous::TABLEAU10[index % colorous::TABLEAU10.len()];
    RGBColor(c.r, c.g, c.b)
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    plot_type: &str,
    reason: &str,
    fonts: &ChartFonts,
) -> PlotResult {
    const CHAR_WIDTH_RATIO: f32 = 0.6; // Approximate character width relative to font size
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (x_range, y_range) = area.get_pixel_range();
    let (width, height) = (x_range.end - x_range.start, y_range.end - y_range.start);
    let message = format!("{plot_type} Data Unavailable: {reason}");

    let estimated_text_width = (message.len() as f32 * fonts.message.size as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_text_height = fonts.message.size + LINE_HEIGHT_SPACING;
    let top_left = (
        width / 2 - estimated_text_width / 2,
        height / 2 - estimated_text_height / 2,
    );

    let text_style = fonts.message.tuple().into_font().color(&RED);
    area.draw(&Text::new(message, top_left, text_style))?;
    Ok(())
}

/// How a series' points are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesShape {
    Line,
    DashedLine,
    LineWithMarkers,
    Scatter,
    Cross,
    /// Short horizontal tick at each point.
    Tick,
}

#[derive(Clone)]
pub struct PlotSeries {
    pub data: Vec<Point>,
    pub label: String,
    pub color: RGBColor,
    pub stroke_width: u32,
    pub shape: SeriesShape,
    pub opacity: f64,
    pub marker_size: u32,
}

impl PlotSeries {
    pub fn line(data: Vec<Point>, label: impl Into<String>, color: RGBColor, stroke_width: u32) -> Self {
        Self {
            data,
            label: label.into(),
            color,
            stroke_width,
            shape: SeriesShape::Line,
            opacity: 1.0,
            marker_size: 0,
        }
    }

    pub fn points(data: Vec<Point>, label: impl Into<String>, color: RGBColor, shape: SeriesShape, marker_size: u32) -> Self {
        Self {
            data,
            label: label.into(),
            color,
            stroke_width: 2,
            shape,
            opacity: 1.0,
            marker_size,
        }
    }

    pub fn with_shape(mut self, shape: SeriesShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_marker_size(mut self, marker_size: u32) -> Self {
        self.marker_size = marker_size;
        self
    }
}

#[derive(Clone)]
pub struct ErrorBarSeries {
    pub points: Vec<ErrorBarPoint>,
    pub label: String,
    pub color: RGBColor,
    pub capsize: u32,
    pub marker_size: u32,
    pub stroke_width: u32,
}

#[derive(Clone)]
pub struct BarSeries {
    pub bins: Vec<BarBin>,
    pub label: String,
    pub color: RGBColor,
    pub opacity: f64,
}

/// Vertical segments, e.g. min..max whiskers without caps.
#[derive(Clone)]
pub struct SpanSeries {
    pub spans: Vec<Span>,
    pub color: RGBColor,
    pub opacity: f64,
    pub stroke_width: u32,
}

/// Text anchored at a data point and shifted by a pixel offset.
/// Lines are separated by `\n`.
#[derive(Clone)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub offset_px: (i32, i32),
    pub background: Option<(Rgb, f64)>,
}

#[derive(Clone)]
pub struct PlotConfig {
    pub title: String,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub series: Vec<PlotSeries>,
    pub error_bars: Vec<ErrorBarSeries>,
    pub bars: Vec<BarSeries>,
    pub spans: Vec<SpanSeries>,
    pub annotations: Vec<Annotation>,
    pub x_label: String,
    pub y_label: String,
    pub y_log_scale: bool,
    pub x_tick_step: Option<f64>,
}

impl PlotConfig {
    pub fn new(
        title: impl Into<String>,
        x_range: Range<f64>,
        y_range: Range<f64>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_range,
            y_range,
            series: Vec::new(),
            error_bars: Vec::new(),
            bars: Vec::new(),
            spans: Vec::new(),
            annotations: Vec::new(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            y_log_scale: false,
            x_tick_step: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.data.is_empty())
            || self.error_bars.iter().any(|e| !e.points.is_empty())
            || self.bars.iter().any(|b| !b.bins.is_empty())
    }

    pub fn has_valid_ranges(&self) -> bool {
        let finite = self.x_range.start.is_finite()
            && self.x_range.end.is_finite()
            && self.y_range.start.is_finite()
            && self.y_range.end.is_finite();
        finite
            && self.x_range.end > self.x_range.start
            && self.y_range.end > self.y_range.start
            && (!self.y_log_scale || self.y_range.start > 0.0)
    }

    fn x_label_count(&self) -> usize {
        match self.x_tick_step {
            Some(step) if step.is_finite() && step > 0.0 => {
                let intervals = ((self.x_range.end - self.x_range.start) / step).round();
                if intervals.is_finite() {
                    (intervals.clamp(1.0, 29.0) as usize) + 1
                } else {
                    15
                }
            }
            _ => 15,
        }
    }
}

fn draw_chart(area: &DrawingArea<BitMapBackend, Shift>, config: &PlotConfig, style: &PlotStyle) -> PlotResult {
    let fonts = ChartFonts::from_style(style);
    let mut builder = ChartBuilder::on(area);
    builder
        .caption(&config.title, fonts.chart_title.tuple())
        .margin(10)
        .x_label_area_size(70)
        .y_label_area_size(90);

    if config.y_log_scale {
        let mut chart = builder.build_cartesian_2d(config.x_range.clone(), config.y_range.clone().log_scale())?;
        draw_chart_contents(&mut chart, config, style, &fonts)
    } else {
        let mut chart = builder.build_cartesian_2d(config.x_range.clone(), config.y_range.clone())?;
        draw_chart_contents(&mut chart, config, style, &fonts)
    }
}

fn draw_chart_contents<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    config: &PlotConfig,
    style: &PlotStyle,
    fonts: &ChartFonts,
) -> PlotResult
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    chart
        .configure_mesh()
        .x_desc(&config.x_label)
        .y_desc(&config.y_label)
        .x_labels(config.x_label_count())
        .y_labels(10)
        .x_label_formatter(&|x| format_x_axis_label(*x))
        .y_label_formatter(&|y| format_y_axis_label(*y, &config.y_label))
        .light_line_style(WHITE.mix(0.7))
        .bold_line_style(BLACK.mix(style.grid_alpha * 0.2))
        .label_style(fonts.axis_label.tuple())
        .axis_desc_style(fonts.axis_label.tuple())
        .draw()?;

    let legend_width = style.legend_line_width;
    let mut legend_series_count = 0;

    // Bars and spans first so lines and markers stay on top
    for bar in &config.bars {
        let fill = bar.color.mix(bar.opacity);
        let drawn = chart.draw_series(
            bar.bins
                .iter()
                .map(|&(x0, x1, h)| Rectangle::new([(x0, 0.0), (x1, h)], fill.filled())),
        )?;
        if !bar.label.is_empty() {
            drawn.label(&bar.label).legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + LEGEND_SAMPLE_PX, y + 6)], fill.filled())
            });
            legend_series_count += 1;
        }
        chart.draw_series(
            bar.bins
                .iter()
                .map(|&(x0, x1, h)| Rectangle::new([(x0, 0.0), (x1, h)], WHITE.stroke_width(2))),
        )?;
    }

    for span in &config.spans {
        let stroke = span.color.mix(span.opacity).stroke_width(span.stroke_width);
        chart.draw_series(
            span.spans
                .iter()
                .map(|&(x, y0, y1)| PathElement::new(vec![(x, y0), (x, y1)], stroke)),
        )?;
    }

    for s in &config.series {
        if s.data.is_empty() {
            continue;
        }
        let color = s.color.mix(s.opacity);
        let stroke = color.stroke_width(s.stroke_width);
        let labelled = !s.label.is_empty();

        match s.shape {
            SeriesShape::Line | SeriesShape::LineWithMarkers => {
                let mut series = LineSeries::new(s.data.iter().copied(), stroke);
                if s.shape == SeriesShape::LineWithMarkers {
                    series = series.point_size(s.marker_size);
                }
                let drawn = chart.draw_series(series)?;
                if labelled {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + LEGEND_SAMPLE_PX, y)], color.stroke_width(legend_width))
                    });
                }
            }
            SeriesShape::DashedLine => {
                let drawn = chart.draw_series(DashedLineSeries::new(s.data.iter().copied(), 10, 6, stroke))?;
                if labelled {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + LEGEND_SAMPLE_PX, y)], color.stroke_width(legend_width))
                    });
                }
            }
            SeriesShape::Scatter => {
                let radius = s.marker_size.max(1);
                let drawn = chart.draw_series(s.data.iter().map(|&p| Circle::new(p, radius, color.filled())))?;
                if labelled {
                    drawn
                        .label(&s.label)
                        .legend(move |(x, y)| Circle::new((x + LEGEND_SAMPLE_PX / 2, y), radius, color.filled()));
                }
            }
            SeriesShape::Cross => {
                let size = s.marker_size.max(2);
                let drawn = chart.draw_series(s.data.iter().map(|&p| Cross::new(p, size, stroke)))?;
                if labelled {
                    drawn
                        .label(&s.label)
                        .legend(move |(x, y)| Cross::new((x + LEGEND_SAMPLE_PX / 2, y), size, stroke));
                }
            }
            SeriesShape::Tick => {
                let half = s.marker_size.max(2) as i32;
                let drawn = chart.draw_series(s.data.iter().map(|&p| {
                    EmptyElement::at(p) + PathElement::new(vec![(-half, 0), (half, 0)], stroke)
                }))?;
                if labelled {
                    drawn.label(&s.label).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + LEGEND_SAMPLE_PX, y)], stroke)
                    });
                }
            }
        }
        if labelled {
            legend_series_count += 1;
        }
    }

    for bars in &config.error_bars {
        let color = bars.color;
        let stroke = color.stroke_width(bars.stroke_width);
        let capsize = bars.capsize * 2;
        let drawn = chart.draw_series(
            bars.points
                .iter()
                .map(|&(x, min, avg, max)| ErrorBar::new_vertical(x, min, avg, max, stroke, capsize)),
        )?;
        if !bars.label.is_empty() {
            let marker = bars.marker_size.max(2);
            drawn.label(&bars.label).legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (LEGEND_SAMPLE_PX, 0)], color.stroke_width(legend_width))
                    + Circle::new((LEGEND_SAMPLE_PX / 2, 0), marker / 2, color.filled())
            });
            legend_series_count += 1;
        }
        let radius = bars.marker_size / 2;
        chart.draw_series(
            bars.points
                .iter()
                .map(|&(x, _, avg, _)| Circle::new((x, avg), radius, color.filled())),
        )?;
    }

    draw_annotations(chart, &config.annotations, fonts)?;

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(fonts.legend.tuple())
            .draw()?;
    }
    Ok(())
}

fn draw_annotations<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    annotations: &[Annotation],
    fonts: &ChartFonts,
) -> PlotResult
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    Y: Ranged<ValueType = f64>,
{
    let size = fonts.annotation.size;
    let line_height = size + 4;
    let char_width = (size as f64 * 0.6) as i32;

    for a in annotations {
        let lines: Vec<&str> = a.text.split('\n').collect();
        let width = lines.iter().map(|l| l.len() as i32).max().unwrap_or(0) * char_width;
        let height = lines.len() as i32 * line_height;
        // Offset is upward in screen space, matching an "offset points" annotation.
        let (left, top) = (a.offset_px.0 - width / 2, -a.offset_px.1 - height / 2);

        if let Some((bg, alpha)) = a.background {
            let fill = to_rgb_color(bg).mix(alpha);
            chart.draw_series(iter::once(
                EmptyElement::at((a.x, a.y))
                    + Rectangle::new([(left - 4, top - 2), (left + width + 4, top + height + 2)], fill.filled()),
            ))?;
        }
        for (i, line) in lines.iter().enumerate() {
            let font = fonts.annotation.tuple().into_font().color(&BLACK);
            chart.draw_series(iter::once(
                EmptyElement::at((a.x, a.y)) + Text::new(line.to_string(), (left, top + i as i32 * line_height), font),
            ))?;
        }
    }
    Ok(())
}

/// Renders one chart into its own PNG. A missing config or one without
/// drawable data produces the unavailable message instead.
pub fn draw_single_plot(
    output_filename: &str,
    plot_type_name: &str,
    config: Option<PlotConfig>,
    style: &PlotStyle,
) -> PlotResult {
    draw_panel_plot(output_filename, None, plot_type_name, vec![config], style)
}

/// Renders configs side by side under an optional shared title.
pub fn draw_panel_plot(
    output_filename: &str,
    root_name: Option<&str>,
    plot_type_name: &str,
    panels: Vec<Option<PlotConfig>>,
    style: &PlotStyle,
) -> PlotResult {
    let fonts = ChartFonts::from_style(style);
    let root_area = BitMapBackend::new(output_filename, (style.width, style.height)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let content_area = match root_name {
        Some(name) => {
            root_area.draw(&Text::new(
                name.to_string(),
                (10, 10),
                fonts.main_title.tuple().into_font().color(&BLACK),
            ))?;
            root_area.margin(50, 5, 5, 5)
        }
        None => root_area.margin(5, 5, 5, 5),
    };
    let panel_count = panels.len().max(1);
    let areas = content_area.split_evenly((1, panel_count));

    let mut any_plotted = false;
    for (area, panel) in areas.iter().zip(panels) {
        match panel {
            Some(config) if config.has_data() && config.has_valid_ranges() => {
                draw_chart(area, &config, style)?;
                any_plotted = true;
            }
            Some(config) => {
                let reason = if !config.has_data() {
                    "No data points"
                } else {
                    "Invalid ranges"
                };
                draw_unavailable_message(area, plot_type_name, reason, &fonts)?;
            }
            None => {
                draw_unavailable_message(area, plot_type_name, "Calculation/Data Extraction Failed", &fonts)?;
            }
        }
    }

    root_area.present()?;
    if any_plotted {
        println!("  {plot_type_name} plot saved as '{output_filename}'.");
    } else {
        println!("  '{output_filename}' has no data to plot, only placeholder messages shown.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_range_padding() {
        assert_eq!(calculate_range(0.0, 10.0), (-1.5, 11.5));
        assert_eq!(calculate_range(10.0, 0.0), (-1.5, 11.5));
        assert_eq!(calculate_range(-70.0, -70.0), (-70.5, -69.5));
    }

    #[test]
    fn test_range_of_skips_non_finite() {
        let r = range_of([1.0, f64::NAN, 3.0]).unwrap();
        assert!((r.start - 0.7).abs() < 1e-12);
        assert!((r.end - 3.3).abs() < 1e-12);
        assert!(range_of(Vec::new()).is_none());
    }

    #[test]
    fn test_config_validity() {
        let mut config = PlotConfig::new("t", 0.0..1.0, 0.0..1.0, "x", "y");
        assert!(!config.has_data());
        config.series.push(PlotSeries::line(vec![(0.0, 0.5)], "", RED, 1));
        assert!(config.has_data());
        assert!(config.has_valid_ranges());
        config.y_log_scale = true;
        assert!(!config.has_valid_ranges());
        config.y_range = 1e-9..1.0;
        assert!(config.has_valid_ranges());
    }

    #[test]
    fn test_draws_linear_and_log_panels_with_legend() {
        let dir = tempfile::tempdir().unwrap();
        let file = output_file(dir.path(), "panels.png");

        let mut linear = PlotConfig::new("linear", 0.0..4.0, -80.0..-50.0, "Distance (m)", "RSSI (dBm)");
        linear.series.push(
            PlotSeries::line(vec![(1.0, -60.0), (3.0, -75.0)], "Mean RSSI", RED, 2)
                .with_shape(SeriesShape::LineWithMarkers),
        );
        linear.error_bars.push(ErrorBarSeries {
            points: vec![(1.0, -62.0, -60.0, -58.0)],
            label: "RSSI Reading".to_string(),
            color: BLACK,
            capsize: 5,
            marker_size: 6,
            stroke_width: 2,
        });
        linear.annotations.push(Annotation {
            x: 1.0,
            y: -60.0,
            text: "S:2\nF:1".to_string(),
            offset_px: (0, 10),
            background: Some(([255, 255, 255], 0.7)),
        });

        let mut log = PlotConfig::new("log", 0.0..4.0, 1e-9..1e-5, "Distance (m)", "Power (mW)");
        log.y_log_scale = true;
        log.series.push(
            PlotSeries::line(vec![(1.0, 1e-6), (3.0, 1e-8)], "10^(RSSI/10)", RED, 2)
                .with_shape(SeriesShape::DashedLine),
        );

        draw_panel_plot(&file, Some("Panels"), "Test", vec![Some(linear), Some(log), None], &PlotStyle::default())
            .unwrap();
        assert!(Path::new(&file).is_file());
    }

    #[test]
    fn test_x_label_count_follows_tick_step() {
        let mut config = PlotConfig::new("t", 1.0..15.0, 0.0..1.0, "x", "y");
        config.x_tick_step = Some(1.0);
        assert_eq!(config.x_label_count(), 15);
        config.x_tick_step = None;
        assert_eq!(config.x_label_count(), 15);
        config.x_range = 0.0..1000.0;
        config.x_tick_step = Some(1.0);
        assert_eq!(config.x_label_count(), 30);
        config.x_tick_step = Some(1e-300);
        assert_eq!(config.x_label_count(), 30);
        config.x_tick_step = Some(f64::NAN);
        assert_eq!(config.x_label_count(), 15);
    }
}
