// src/figure_export.rs

// Interchange bundles (.npz) carrying chart data plus the style needed to
// redraw the same figure in another plotting environment.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::{arr0, Array1};
use ndarray_npy::NpzWriter;

use crate::constants::MAX_EXPORT_XTICKS;
use crate::data_analysis::regression::linear_regression;
use crate::data_analysis::summary::{failed_points, success_points, SummaryRow};
use crate::data_input::log_data::{ExperimentKind, Observation};
use crate::error::AnalysisError;
use crate::plot_style::{to_unit_rgb, PlotStyle, Rgb};

#[derive(Debug, Clone, PartialEq)]
pub enum BundleValue {
    Floats(Vec<f64>),
    Ints(Vec<i64>),
    Scalar(f64),
    /// Stored as a UTF-8 byte array.
    Text(String),
}

/// Ordered name → value map written as one `.npz` archive.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureBundle {
    pub name: String,
    pub entries: Vec<(String, BundleValue)>,
}

impl FigureBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    fn push(mut self, key: &str, value: BundleValue) -> Self {
        self.entries.push((key.to_string(), value));
        self
    }

    pub fn floats(self, key: &str, values: Vec<f64>) -> Self {
        self.push(key, BundleValue::Floats(values))
    }

    pub fn ints(self, key: &str, values: Vec<i64>) -> Self {
        self.push(key, BundleValue::Ints(values))
    }

    pub fn scalar(self, key: &str, value: f64) -> Self {
        self.push(key, BundleValue::Scalar(value))
    }

    pub fn text(self, key: &str, value: impl Into<String>) -> Self {
        self.push(key, BundleValue::Text(value.into()))
    }

    /// Adds `<prefix>_r`, `<prefix>_g`, `<prefix>_b` in `[0, 1]`.
    pub fn rgb(self, prefix: &str, color: Rgb) -> Self {
        let [r, g, b] = to_unit_rgb(color);
        self.scalar(&format!("{prefix}_r"), r)
            .scalar(&format!("{prefix}_g"), g)
            .scalar(&format!("{prefix}_b"), b)
    }

    pub fn get(&self, key: &str) -> Option<&BundleValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn file_name(&self) -> String {
        format!("{}.npz", self.name)
    }

    pub fn write_npz(&self, path: &Path) -> Result<(), AnalysisError> {
        let file = File::create(path).map_err(|e| AnalysisError::io(path, e))?;
        let mut npz = NpzWriter::new(file);
        for (key, value) in &self.entries {
            match value {
                BundleValue::Floats(v) => npz.add_array(key.as_str(), &Array1::from(v.clone()))?,
                BundleValue::Ints(v) => npz.add_array(key.as_str(), &Array1::from(v.clone()))?,
                BundleValue::Scalar(x) => npz.add_array(key.as_str(), &arr0(*x))?,
                BundleValue::Text(s) => npz.add_array(key.as_str(), &Array1::from(s.as_bytes().to_vec()))?,
            }
        }
        npz.finish()?;
        debug!("Wrote {} entries to '{}'", self.entries.len(), path.display());
        Ok(())
    }
}

/// `min..=max` stepped by `step`; `[0]` when there is nothing to span.
pub fn xticks_vec(xs: &[f64], step: f64) -> Vec<f64> {
    let finite = xs.iter().copied().filter(|x| x.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if lo > hi {
        return vec![0.0];
    }
    if !(step.is_finite() && step > 0.0) || lo == hi {
        return vec![lo];
    }
    let intervals = ((hi - lo) / step + 1e-9).floor();
    if !intervals.is_finite() || intervals >= MAX_EXPORT_XTICKS as f64 {
        let step = (hi - lo) / (MAX_EXPORT_XTICKS - 1) as f64;
        return (0..MAX_EXPORT_XTICKS).map(|i| lo + step * i as f64).collect();
    }
    let count = intervals as usize + 1;
    (0..count).map(|i| lo + step * i as f64).collect()
}

fn with_figure_frame(bundle: FigureBundle, style: &PlotStyle) -> FigureBundle {
    bundle
        .scalar("fig_w", style.export_width as f64)
        .scalar("fig_h", style.export_height as f64)
        .text("grid_linestyle", style.grid_linestyle.as_str())
}

fn with_rssi_labels(bundle: FigureBundle, style: &PlotStyle, title: String) -> FigureBundle {
    bundle
        .text("xlabel", style.labels.xlabel_rssi.as_str())
        .text("ylabel", style.labels.ylabel_rssi.as_str())
        .text("title", title)
}

fn with_success_marker(bundle: FigureBundle, style: &PlotStyle) -> FigureBundle {
    let marker = &style.scatter_success;
    bundle
        .rgb("sc_s", marker.color)
        .scalar("sc_s_alpha", marker.alpha)
        .scalar("sc_s_size", marker.size_pts2)
        .text("sc_s_marker", marker.marker.as_str())
}

pub fn errorbar_bundle(kind: ExperimentKind, rows: &[SummaryRow], style: &PlotStyle) -> FigureBundle {
    let x: Vec<f64> = rows.iter().map(|r| r.key).collect();
    let (lower, upper): (Vec<f64>, Vec<f64>) = rows.iter().map(SummaryRow::error_bar).unzip();
    let bars = &style.error_bar;

    let bundle = FigureBundle::new(format!("{}_errorbar", kind.file_base()))
        .floats("avg", rows.iter().map(|r| r.mean_rssi).collect())
        .floats("yerr_lower", lower)
        .floats("yerr_upper", upper)
        .floats("xticks_vec", xticks_vec(&x, style.xtick_step))
        .floats("x", x);
    let bundle = with_rssi_labels(bundle, style, format!("{} - Min/Average/Max RSSI Values", kind.title()))
        .text("legend_rssi", bars.label.as_str());
    with_figure_frame(bundle, style)
        .rgb("color_err", bars.color)
        .scalar("err_capsize", bars.capsize)
        .scalar("err_marker_size", bars.marker_size)
        .scalar("err_line_width", bars.line_width)
}

pub fn scatter_bundle(
    kind: ExperimentKind,
    observations: &[Observation],
    rows: &[SummaryRow],
    style: &PlotStyle,
) -> FigureBundle {
    let (sx, sy): (Vec<f64>, Vec<f64>) = success_points(observations).into_iter().unzip();
    let (fx, fy): (Vec<f64>, Vec<f64>) = failed_points(observations).into_iter().unzip();
    let dist_vals: Vec<f64> = rows.iter().map(|r| r.key).collect();
    let avg_at_dist: Vec<f64> = rows.iter().map(|r| r.mean_rssi).collect();
    let y_off = annotation_offset(&avg_at_dist, style.annotation.y_offset_frac);
    let failed = &style.scatter_failed;

    let bundle = FigureBundle::new(format!("{}_scatter", kind.file_base()))
        .floats("sx", sx)
        .floats("sy", sy)
        .floats("fx", fx)
        .floats("fy", fy)
        .floats("xticks_vec", xticks_vec(&dist_vals, style.xtick_step))
        .floats("dist_vals", dist_vals)
        .floats("avg_at_dist", avg_at_dist)
        .ints("succ_cnt", rows.iter().map(|r| r.success_count as i64).collect())
        .ints("fail_cnt", rows.iter().map(|r| r.failed_count as i64).collect())
        .scalar("y_off", y_off);
    let bundle = with_rssi_labels(bundle, style, format!("{} - Success/Failed RSSI Markers", kind.title()))
        .text("legend_success", style.scatter_success.label.as_str())
        .text("legend_failed", failed.label.as_str());
    with_success_marker(with_figure_frame(bundle, style), style)
        .rgb("sc_f", failed.color)
        .scalar("sc_f_alpha", failed.alpha)
        .scalar("sc_f_size", failed.size_pts2)
        .text("sc_f_marker", failed.marker.as_str())
        .rgb("text_bg", style.annotation.bg_color)
}

/// Regression coefficients are NaN when too few distinct points exist.
pub fn regression_bundle(kind: ExperimentKind, observations: &[Observation], style: &PlotStyle) -> FigureBundle {
    let (sx, sy): (Vec<f64>, Vec<f64>) = success_points(observations).into_iter().unzip();
    let (slope, intercept) = linear_regression(&sx, &sy).unwrap_or((f64::NAN, f64::NAN));
    let regression = &style.regression;

    let bundle = FigureBundle::new(format!("{}_regression", kind.file_base()))
        .floats("xticks_vec", xticks_vec(&sx, style.xtick_step))
        .floats("sx", sx)
        .floats("sy", sy)
        .scalar("slope", slope)
        .scalar("intercept", intercept);
    let bundle = with_rssi_labels(
        bundle,
        style,
        format!("{} - Regression Line for Success RSSI", kind.title()),
    );
    with_success_marker(with_figure_frame(bundle, style), style)
        .rgb("reg", regression.color)
        .scalar("reg_lw", regression.line_width)
}

pub fn moving_bundle(observations: &[Observation], rows: &[SummaryRow], style: &PlotStyle) -> FigureBundle {
    let rx: Vec<f64> = rows.iter().filter(|r| r.success_count > 0).map(|r| r.key).collect();
    let avg: Vec<f64> = rows
        .iter()
        .filter(|r| r.success_count > 0)
        .map(|r| r.mean_rssi)
        .collect();
    let (fx, fy): (Vec<f64>, Vec<f64>) = observations
        .iter()
        .filter(|o| !o.reading.is_success())
        .map(|o| (o.reading.sequence_index as f64, o.reading.rssi as f64))
        .unzip();
    let failed = &style.scatter_failed;
    let moving = &style.moving_avg;

    let bundle = FigureBundle::new(format!("{}_moving", ExperimentKind::Moving.file_base()))
        .floats("xticks_vec", xticks_vec(&rx, style.xtick_step))
        .floats("rx", rx)
        .floats("avg", avg)
        .floats("fx", fx)
        .floats("fy", fy)
        .text("xlabel", style.labels.xlabel_moving.as_str())
        .text("ylabel", style.labels.ylabel_moving.as_str())
        .text("title", ExperimentKind::Moving.title().to_string() + " - RSSI Over Time")
        .text("legend_avg", moving.label.as_str())
        .text("legend_failed", failed.label.as_str());
    with_figure_frame(bundle, style)
        .rgb("mv", moving.color)
        .scalar("mv_lw", moving.line_width)
        .rgb("fail", failed.color)
        .scalar("fail_size", failed.size_pts2)
        .scalar("fail_alpha", failed.alpha)
}

/// `(max - min) * frac` over the plotted averages, 0 when there are none.
pub fn annotation_offset(averages: &[f64], frac: f64) -> f64 {
    let finite: Vec<f64> = averages.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    (max - min) * frac
}

/// Builds and writes every bundle of one experiment kind. Returns the written paths.
pub fn export_experiment_bundles(
    kind: ExperimentKind,
    observations: &[Observation],
    rows: &[SummaryRow],
    style: &PlotStyle,
    export_dir: &Path,
) -> Result<Vec<PathBuf>, AnalysisError> {
    fs::create_dir_all(export_dir).map_err(|e| AnalysisError::io(export_dir, e))?;

    let bundles = match kind {
        ExperimentKind::Moving => vec![moving_bundle(observations, rows, style)],
        _ => vec![
            errorbar_bundle(kind, rows, style),
            scatter_bundle(kind, observations, rows, style),
            regression_bundle(kind, observations, style),
        ],
    };

    let mut written = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        let path = export_dir.join(bundle.file_name());
        bundle.write_npz(&path)?;
        written.push(path);
    }
    info!("Exported {} {} bundle(s) to '{}'", written.len(), kind.title(), export_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::summary::{summarize, GroupKey};
    use crate::data_input::log_data::Reading;

    fn clear_observations() -> Vec<Observation> {
        vec![
            Observation {
                distance: Some(1.0),
                reading: Reading::success(-60, 0.6, 1),
            },
            Observation {
                distance: Some(1.0),
                reading: Reading::failed(2),
            },
            Observation {
                distance: Some(3.0),
                reading: Reading::success(-80, 3.2, 1),
            },
        ]
    }

    #[test]
    fn test_xticks_vec() {
        assert_eq!(xticks_vec(&[3.0, 1.0, 2.0], 1.0), vec![1.0, 2.0, 3.0]);
        assert_eq!(xticks_vec(&[1.0, 2.0], 0.5), vec![1.0, 1.5, 2.0]);
        assert_eq!(xticks_vec(&[], 1.0), vec![0.0]);
    }

    #[test]
    fn test_xticks_vec_bounded_for_tiny_steps() {
        let ticks = xticks_vec(&[0.0, 10.0], 1e-300);
        assert_eq!(ticks.len(), MAX_EXPORT_XTICKS);
        assert_eq!(ticks[0], 0.0);
        assert!((ticks[MAX_EXPORT_XTICKS - 1] - 10.0).abs() < 1e-9);
        assert_eq!(xticks_vec(&[0.0, 10.0], f64::NAN), vec![0.0]);
        assert_eq!(xticks_vec(&[0.0, 10.0], f64::INFINITY), vec![0.0]);
    }

    #[test]
    fn test_errorbar_bundle_keys() {
        let observations = clear_observations();
        let rows = summarize(&observations, GroupKey::Distance);
        let bundle = errorbar_bundle(ExperimentKind::ClearPath, &rows, &PlotStyle::default());

        assert_eq!(bundle.file_name(), "clear_errorbar.npz");
        assert_eq!(bundle.get("x"), Some(&BundleValue::Floats(vec![1.0, 3.0])));
        assert_eq!(bundle.get("yerr_lower"), Some(&BundleValue::Floats(vec![0.0, 0.0])));
        assert_eq!(bundle.get("err_capsize"), Some(&BundleValue::Scalar(5.0)));
        assert_eq!(bundle.get("color_err_r"), Some(&BundleValue::Scalar(0.0)));
        assert_eq!(
            bundle.get("title"),
            Some(&BundleValue::Text("Clear Path - Min/Average/Max RSSI Values".to_string()))
        );
        assert_eq!(
            bundle.get("xticks_vec"),
            Some(&BundleValue::Floats(vec![1.0, 2.0, 3.0]))
        );
    }

    #[test]
    fn test_scatter_bundle_counts_and_offset() {
        let observations = clear_observations();
        let rows = summarize(&observations, GroupKey::Distance);
        let bundle = scatter_bundle(ExperimentKind::WallPath, &observations, &rows, &PlotStyle::default());

        assert_eq!(bundle.name, "wall_scatter");
        assert_eq!(bundle.get("succ_cnt"), Some(&BundleValue::Ints(vec![1, 1])));
        assert_eq!(bundle.get("fail_cnt"), Some(&BundleValue::Ints(vec![1, 0])));
        assert_eq!(bundle.get("fy"), Some(&BundleValue::Floats(vec![0.0])));
        // (-60 - -80) * 0.05
        assert_eq!(bundle.get("y_off"), Some(&BundleValue::Scalar(1.0)));
        assert_eq!(bundle.get("sc_f_marker"), Some(&BundleValue::Text("x".to_string())));
    }

    #[test]
    fn test_regression_bundle_nan_when_impossible() {
        let observations = vec![Observation {
            distance: Some(1.0),
            reading: Reading::success(-60, 0.6, 1),
        }];
        let bundle = regression_bundle(ExperimentKind::ClearPath, &observations, &PlotStyle::default());
        match bundle.get("slope") {
            Some(BundleValue::Scalar(v)) => assert!(v.is_nan()),
            other => panic!("unexpected slope entry {other:?}"),
        }
    }

    #[test]
    fn test_moving_bundle_skips_failed_only_rows() {
        let observations = vec![
            Observation {
                distance: None,
                reading: Reading::success(-70, 1.6, 1),
            },
            Observation {
                distance: None,
                reading: Reading::failed(2),
            },
        ];
        let rows = summarize(&observations, GroupKey::ReadingIndex);
        let bundle = moving_bundle(&observations, &rows, &PlotStyle::default());
        assert_eq!(bundle.file_name(), "moving_moving.npz");
        assert_eq!(bundle.get("rx"), Some(&BundleValue::Floats(vec![1.0])));
        assert_eq!(bundle.get("fx"), Some(&BundleValue::Floats(vec![2.0])));
    }
}
