// src/plot_style.rs

// Presentation configuration shared by every chart and by the figure exporter.
// Nothing in the statistics pipeline reads it.

use std::fs;
use std::path::Path;

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::AnalysisError;

pub type Rgb = [u8; 3];

/// Converts a configured color into a plotters color.
pub fn to_rgb_color(color: Rgb) -> RGBColor {
    RGBColor(color[0], color[1], color[2])
}

/// Converts a configured color into `[0..1]` channels for the export bundles.
pub fn to_unit_rgb(color: Rgb) -> [f64; 3] {
    [
        color[0] as f64 / 255.0,
        color[1] as f64 / 255.0,
        color[2] as f64 / 255.0,
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorBarStyle {
    pub color: Rgb,
    pub capsize: f64,
    pub marker_size: f64,
    pub line_width: f64,
    pub label: String,
}

impl Default for ErrorBarStyle {
    fn default() -> Self {
        Self {
            color: COLOR_TEAL,
            capsize: 5.0,
            marker_size: 8.0,
            line_width: 1.5,
            label: "RSSI Reading".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub color: Rgb,
    pub alpha: f64,
    pub size_pts2: f64, // marker area in points squared
    pub marker: String,
    pub label: String,
}

impl MarkerStyle {
    /// Radius in pixels matching the configured marker area.
    pub fn radius_px(&self) -> u32 {
        self.size_pts2.max(1.0).sqrt().round() as u32
    }

    fn success() -> Self {
        Self {
            color: COLOR_GREEN,
            alpha: 0.7,
            size_pts2: 36.0,
            marker: "o".to_string(),
            label: "Success".to_string(),
        }
    }

    fn failed() -> Self {
        Self {
            color: COLOR_RED,
            alpha: 0.8,
            size_pts2: 36.0,
            marker: "x".to_string(),
            label: "Failed".to_string(),
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::success()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub color: Rgb,
    pub line_width: f64,
    pub label: String,
}

impl LineStyle {
    pub fn stroke_px(&self) -> u32 {
        self.line_width.max(1.0).round() as u32
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: COLOR_BLUE,
            line_width: 2.0,
            label: "Regression Line".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    pub y_offset_frac: f64,
    pub offset_px: i32,
    pub bg_color: Rgb,
    pub bg_alpha: f64,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            y_offset_frac: 0.05,
            offset_px: 50,
            bg_color: COLOR_WHITE,
            bg_alpha: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabels {
    pub xlabel_rssi: String,
    pub ylabel_rssi: String,
    pub xlabel_moving: String,
    pub ylabel_moving: String,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            xlabel_rssi: "Reference Distance (meters)".to_string(),
            ylabel_rssi: "RSSI (dBm)".to_string(),
            xlabel_moving: "Time (Reading Number)".to_string(),
            ylabel_moving: "RSSI (dBm)".to_string(),
        }
    }
}

/// Mean / max / min colors of one RSSI signal (raw or Kalman filtered).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalPalette {
    pub mean: Rgb,
    pub max: Rgb,
    pub min: Rgb,
}

impl SignalPalette {
    pub fn raw() -> Self {
        Self {
            mean: COLOR_RAW_MEAN,
            max: COLOR_RAW_MAX,
            min: COLOR_RAW_MIN,
        }
    }

    pub fn kalman() -> Self {
        Self {
            mean: COLOR_KALMAN_MEAN,
            max: COLOR_KALMAN_MAX,
            min: COLOR_KALMAN_MIN,
        }
    }
}

impl Default for SignalPalette {
    fn default() -> Self {
        Self::raw()
    }
}

/// Single configuration structure for all presentation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub export_width: u32,
    pub export_height: u32,
    pub grid_linestyle: String,
    pub grid_alpha: f64,
    pub xtick_step: f64,
    pub font_size_title: i32,
    pub font_size_chart_title: i32,
    pub font_size_axis_label: i32,
    pub font_size_legend: i32,
    pub font_size_annotation: i32,
    pub font_size_message: i32,
    pub line_width: u32,
    pub legend_line_width: u32,
    pub error_bar: ErrorBarStyle,
    pub scatter_success: MarkerStyle,
    pub scatter_failed: MarkerStyle,
    pub regression: LineStyle,
    pub moving_avg: LineStyle,
    pub annotation: AnnotationStyle,
    pub labels: AxisLabels,
    pub raw: SignalPalette,
    pub kalman: SignalPalette,
    pub total_logs_color: Rgb,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: PLOT_WIDTH,
            height: PLOT_HEIGHT,
            export_width: EXPORT_FIG_WIDTH_PX,
            export_height: EXPORT_FIG_HEIGHT_PX,
            grid_linestyle: "--".to_string(),
            grid_alpha: 0.7,
            xtick_step: 1.0,
            font_size_title: FONT_SIZE_MAIN_TITLE,
            font_size_chart_title: FONT_SIZE_CHART_TITLE,
            font_size_axis_label: FONT_SIZE_AXIS_LABEL,
            font_size_legend: FONT_SIZE_LEGEND,
            font_size_annotation: FONT_SIZE_ANNOTATION,
            font_size_message: FONT_SIZE_MESSAGE,
            line_width: LINE_WIDTH_PLOT,
            legend_line_width: LINE_WIDTH_LEGEND,
            error_bar: ErrorBarStyle::default(),
            scatter_success: MarkerStyle::success(),
            scatter_failed: MarkerStyle::failed(),
            regression: LineStyle::default(),
            moving_avg: LineStyle {
                color: COLOR_DARK_BLUE,
                line_width: 1.5,
                label: "Average RSSI".to_string(),
            },
            annotation: AnnotationStyle::default(),
            labels: AxisLabels::default(),
            raw: SignalPalette::raw(),
            kalman: SignalPalette::kalman(),
            total_logs_color: COLOR_TOTAL_LOGS,
        }
    }
}

impl PlotStyle {
    /// Parses a TOML style override. Omitted keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, AnalysisError> {
        let text = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let style = Self::from_toml_str(&text).map_err(|source| AnalysisError::Style {
            path: path.to_path_buf(),
            source,
        })?;
        style.validate().map_err(|reason| AnalysisError::InvalidStyle {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(style)
    }

    /// Checks values the charts divide by.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.xtick_step.is_finite() && self.xtick_step >= MIN_XTICK_STEP) {
            return Err(format!(
                "xtick_step must be a finite value of at least {MIN_XTICK_STEP}, got {}",
                self.xtick_step
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!("figure size {}x{} is empty", self.width, self.height));
        }
        Ok(())
    }

    /// Loads the style file when one is given, otherwise the built-in style.
    pub fn load(path: Option<&Path>) -> Result<Self, AnalysisError> {
        match path {
            Some(p) => {
                log::info!("Loading plot style from '{}'", p.display());
                Self::from_toml_file(p)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let style = PlotStyle::from_toml_str(
            r#"
            width = 800
            [regression]
            line_width = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(style.width, 800);
        assert_eq!(style.height, PLOT_HEIGHT);
        assert_eq!(style.regression.line_width, 3.0);
        assert_eq!(style.regression.color, COLOR_BLUE);
        assert_eq!(style.regression.label, "Regression Line");
        assert_eq!(style.scatter_failed.label, "Failed");
        assert_eq!(style.error_bar.label, "RSSI Reading");
    }

    #[test]
    fn test_unit_rgb_conversion() {
        let teal = to_unit_rgb(COLOR_TEAL);
        assert_eq!(teal[0], 0.0);
        assert!((teal[1] - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(to_unit_rgb(COLOR_RED), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_rejects_unusable_tick_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.toml");
        fs::write(&path, "xtick_step = 1e-300\n").unwrap();
        match PlotStyle::load(Some(&path)) {
            Err(AnalysisError::InvalidStyle { reason, .. }) => assert!(reason.contains("xtick_step")),
            other => panic!("expected an invalid style, got {other:?}"),
        }

        fs::write(&path, "xtick_step = 0.5\n").unwrap();
        assert_eq!(PlotStyle::load(Some(&path)).unwrap().xtick_step, 0.5);
        assert!(PlotStyle::default().validate().is_ok());
    }

    #[test]
    fn test_marker_radius() {
        assert_eq!(PlotStyle::default().scatter_success.radius_px(), 6);
    }
}
