// src/data_analysis/accuracy.rs

use std::fmt::Write as _;

use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::constants::DRIFT_WARNING_DBM_PER_CYCLE;
use crate::data_analysis::path_loss::{absolute_error, PathLossModel};
use crate::data_input::accuracy_log::AccuracySample;

/// Mean, sample std (0 below two values), min and max.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spread {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Spread {
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let arr = Array1::from(values.to_vec());
        Self {
            mean: arr.mean().unwrap_or(0.0),
            std: if arr.len() > 1 { arr.std(1.0) } else { 0.0 },
            min: *arr.min_skipnan(),
            max: *arr.max_skipnan(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceAccuracy {
    pub ref_distance: f64,
    pub estimated: Spread,
    pub abs_error: Spread,
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagAccuracy {
    pub tag: String,
    pub per_distance: Vec<DistanceAccuracy>,
    /// Mean of the per-distance mean absolute errors.
    pub overall_mean_abs_error: f64,
}

/// Raw versus Kalman-filtered RSSI, both turned into distances with the same model.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterComparison {
    pub raw_errors: Vec<f64>,
    pub kalman_errors: Vec<f64>,
    pub mean_raw_error: f64,
    pub mean_kalman_error: f64,
    pub improvement: f64,
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    pub min_rssi_per_cycle: Vec<(i64, f64)>,
    pub drift_rate: f64, // dBm per cycle
    pub drifting: bool,
}

/// Min/mean/max of raw and Kalman RSSI at one reference distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RssiBand {
    pub ref_distance: f64,
    pub raw: Spread,
    pub kalman: Spread,
}

/// Tags in order of first appearance.
pub fn unique_tags(samples: &[AccuracySample]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for sample in samples {
        if !tags.iter().any(|t| t == &sample.tag) {
            tags.push(sample.tag.clone());
        }
    }
    tags
}

/// Distinct reference distances, ascending.
pub fn reference_distances(samples: &[AccuracySample]) -> Vec<f64> {
    let mut distances: Vec<f64> = samples.iter().map(|s| s.ref_distance).collect();
    distances.sort_by(f64::total_cmp);
    distances.dedup();
    distances
}

fn samples_at<'a>(
    samples: &'a [AccuracySample],
    tag: &'a str,
    ref_distance: f64,
) -> impl Iterator<Item = &'a AccuracySample> + 'a {
    samples
        .iter()
        .filter(move |s| s.tag == tag && s.ref_distance == ref_distance)
}

/// Estimated distances of one tag at one reference distance, in file order.
pub fn estimated_series(samples: &[AccuracySample], tag: &str, ref_distance: f64) -> Vec<f64> {
    samples_at(samples, tag, ref_distance)
        .map(|s| s.estimated_distance)
        .collect()
}

/// The first `per_trial` raw and Kalman RSSI samples of every reference
/// distance for `tag`, concatenated in ascending distance order.
pub fn first_trial_signal(samples: &[AccuracySample], tag: &str, per_trial: usize) -> (Vec<f64>, Vec<f64>) {
    let mut raw = Vec::new();
    let mut kalman = Vec::new();
    for ref_distance in reference_distances(samples) {
        for s in samples_at(samples, tag, ref_distance).take(per_trial) {
            raw.push(s.raw_rssi);
            kalman.push(s.kalman_rssi);
        }
    }
    (raw, kalman)
}

pub fn tag_accuracy(samples: &[AccuracySample]) -> Vec<TagAccuracy> {
    let distances = reference_distances(samples);
    unique_tags(samples)
        .into_iter()
        .map(|tag| {
            let per_distance: Vec<DistanceAccuracy> = distances
                .iter()
                .filter_map(|&ref_distance| {
                    let rows: Vec<&AccuracySample> = samples_at(samples, &tag, ref_distance).collect();
                    if rows.is_empty() {
                        return None;
                    }
                    let estimated: Vec<f64> = rows.iter().map(|s| s.estimated_distance).collect();
                    let errors: Vec<f64> = rows
                        .iter()
                        .map(|s| absolute_error(s.estimated_distance, s.ref_distance))
                        .collect();
                    Some(DistanceAccuracy {
                        ref_distance,
                        estimated: Spread::of(&estimated),
                        abs_error: Spread::of(&errors),
                        sample_count: rows.len(),
                    })
                })
                .collect();
            let means: Vec<f64> = per_distance.iter().map(|d| d.abs_error.mean).collect();
            TagAccuracy {
                tag,
                overall_mean_abs_error: Spread::of(&means).mean,
                per_distance,
            }
        })
        .collect()
}

pub fn compare_filters(samples: &[AccuracySample], model: &PathLossModel) -> FilterComparison {
    let raw_errors: Vec<f64> = samples
        .iter()
        .map(|s| absolute_error(model.estimate_distance(s.raw_rssi), s.ref_distance))
        .collect();
    let kalman_errors: Vec<f64> = samples
        .iter()
        .map(|s| absolute_error(model.estimate_distance(s.kalman_rssi), s.ref_distance))
        .collect();

    let mean_raw_error = Spread::of(&raw_errors).mean;
    let mean_kalman_error = Spread::of(&kalman_errors).mean;
    let improvement = mean_raw_error - mean_kalman_error;
    let improvement_pct = if mean_raw_error > 0.0 {
        improvement / mean_raw_error * 100.0
    } else {
        0.0
    };

    FilterComparison {
        raw_errors,
        kalman_errors,
        mean_raw_error,
        mean_kalman_error,
        improvement,
        improvement_pct,
    }
}

/// Minimum raw RSSI per scan cycle and its mean cycle-to-cycle change.
/// `None` when fewer than two cycles are recorded.
pub fn rssi_drift(samples: &[AccuracySample]) -> Option<DriftReport> {
    let mut per_cycle: Vec<(i64, f64)> = Vec::new();
    for s in samples {
        let Some(cycle) = s.cycle else { continue };
        match per_cycle.iter_mut().find(|(c, _)| *c == cycle) {
            Some((_, min)) => *min = min.min(s.raw_rssi),
            None => per_cycle.push((cycle, s.raw_rssi)),
        }
    }
    if per_cycle.len() < 2 {
        return None;
    }
    per_cycle.sort_by_key(|(c, _)| *c);

    let diffs: Vec<f64> = per_cycle.windows(2).map(|w| w[1].1 - w[0].1).collect();
    let drift_rate = diffs.iter().sum::<f64>() / diffs.len() as f64;
    Some(DriftReport {
        min_rssi_per_cycle: per_cycle,
        drift_rate,
        drifting: drift_rate < DRIFT_WARNING_DBM_PER_CYCLE,
    })
}

pub fn rssi_bands(samples: &[AccuracySample], tag: &str) -> Vec<RssiBand> {
    reference_distances(samples)
        .into_iter()
        .filter_map(|ref_distance| {
            let (raw, kalman): (Vec<f64>, Vec<f64>) = samples_at(samples, tag, ref_distance)
                .map(|s| (s.raw_rssi, s.kalman_rssi))
                .unzip();
            if raw.is_empty() {
                return None;
            }
            Some(RssiBand {
                ref_distance,
                raw: Spread::of(&raw),
                kalman: Spread::of(&kalman),
            })
        })
        .collect()
}

/// Console insights: per-tag accuracy tables, filter comparison and drift.
pub fn render_accuracy_report(
    tags: &[TagAccuracy],
    comparison: &FilterComparison,
    drift: Option<&DriftReport>,
) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}\nKEY ACCURACY INSIGHTS\n{rule}");
    for tag in tags {
        let _ = writeln!(out, "\n{} Performance Analysis\n{}", tag.tag, "-".repeat(30));
        let _ = writeln!(
            out,
            "{:>8} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Ref (m)", "Mean Est", "Std Est", "Mean Err", "Std Err", "Min Err", "Max Err"
        );
        for d in &tag.per_distance {
            let _ = writeln!(
                out,
                "{:>8.2} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                d.ref_distance,
                d.estimated.mean,
                d.estimated.std,
                d.abs_error.mean,
                d.abs_error.std,
                d.abs_error.min,
                d.abs_error.max
            );
        }
        let _ = writeln!(out, "\nOverall Mean Absolute Error: {:.2}m", tag.overall_mean_abs_error);
    }

    let _ = writeln!(out, "\n{rule}\nKALMAN FILTER PERFORMANCE\n{rule}");
    let _ = writeln!(out, "Raw RSSI Error:      {:.2}m", comparison.mean_raw_error);
    let _ = writeln!(out, "Kalman Filter Error: {:.2}m", comparison.mean_kalman_error);
    let _ = writeln!(
        out,
        "Improvement:         {:.2}m ({:.1}% better)",
        comparison.improvement, comparison.improvement_pct
    );

    if let Some(drift) = drift {
        if drift.drifting {
            let _ = writeln!(
                out,
                "\nWARNING: RSSI drifting at {:.2} dBm/cycle\n   Possible causes: battery discharge or tag movement",
                drift.drift_rate
            );
        } else {
            let _ = writeln!(out, "\nRSSI stability: Good (drift rate: {:.2} dBm/cycle)", drift.drift_rate);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tag: &str, ref_distance: f64, estimated: f64, raw: f64, kalman: f64, cycle: Option<i64>) -> AccuracySample {
        AccuracySample {
            tag: tag.to_string(),
            ref_distance,
            estimated_distance: estimated,
            raw_rssi: raw,
            kalman_rssi: kalman,
            cycle,
        }
    }

    fn dataset() -> Vec<AccuracySample> {
        vec![
            sample("B", 2.0, 2.5, -76.0, -75.5, None),
            sample("A", 1.0, 1.5, -70.0, -69.0, None),
            sample("A", 1.0, 0.5, -66.0, -67.0, None),
            sample("A", 2.0, 3.0, -78.0, -76.0, None),
        ]
    }

    #[test]
    fn test_tags_and_distances() {
        let data = dataset();
        assert_eq!(unique_tags(&data), vec!["B".to_string(), "A".to_string()]);
        assert_eq!(reference_distances(&data), vec![1.0, 2.0]);
        assert_eq!(estimated_series(&data, "A", 1.0), vec![1.5, 0.5]);
    }

    #[test]
    fn test_per_tag_accuracy() {
        let report = tag_accuracy(&dataset());
        let a = report.iter().find(|t| t.tag == "A").unwrap();
        assert_eq!(a.per_distance.len(), 2);
        assert_eq!(a.per_distance[0].estimated.mean, 1.0);
        assert_eq!(a.per_distance[0].abs_error.mean, 0.5);
        assert_eq!(a.per_distance[1].abs_error.mean, 1.0);
        assert_eq!(a.per_distance[1].abs_error.std, 0.0);
        assert_eq!(a.overall_mean_abs_error, 0.75);

        let b = report.iter().find(|t| t.tag == "B").unwrap();
        assert_eq!(b.per_distance.len(), 1);
    }

    #[test]
    fn test_filter_comparison_uses_model() {
        // -68 dBm is exactly 1 m, -93 dBm exactly 10 m.
        let data = vec![sample("A", 1.0, 0.0, -93.0, -68.0, None)];
        let cmp = compare_filters(&data, &PathLossModel::default());
        assert!((cmp.mean_raw_error - 9.0).abs() < 1e-9);
        assert!(cmp.mean_kalman_error.abs() < 1e-12);
        assert!((cmp.improvement_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_drift_detection() {
        let drifting = vec![
            sample("A", 1.0, 1.0, -70.0, -70.0, Some(1)),
            sample("A", 1.0, 1.0, -72.0, -70.0, Some(1)),
            sample("A", 1.0, 1.0, -73.0, -70.0, Some(2)),
            sample("A", 1.0, 1.0, -75.0, -70.0, Some(3)),
        ];
        let report = rssi_drift(&drifting).unwrap();
        assert_eq!(report.min_rssi_per_cycle, vec![(1, -72.0), (2, -73.0), (3, -75.0)]);
        assert!((report.drift_rate + 1.5).abs() < 1e-12);
        assert!(report.drifting);

        assert!(rssi_drift(&dataset()).is_none());
    }

    #[test]
    fn test_first_trial_signal_truncates() {
        let mut data: Vec<AccuracySample> = (0..12)
            .map(|i| sample("A", 1.0, 1.0, -60.0 - i as f64, -61.0, None))
            .collect();
        data.push(sample("A", 2.0, 2.0, -80.0, -79.0, None));
        let (raw, kalman) = first_trial_signal(&data, "A", 10);
        assert_eq!(raw.len(), 11);
        assert_eq!(kalman.len(), 11);
        assert_eq!(raw[10], -80.0);
    }

    #[test]
    fn test_bands_and_report() {
        let data = dataset();
        let bands = rssi_bands(&data, "A");
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].raw.min, -70.0);
        assert_eq!(bands[0].raw.max, -66.0);
        assert_eq!(bands[0].kalman.mean, -68.0);

        let text = render_accuracy_report(
            &tag_accuracy(&data),
            &compare_filters(&data, &PathLossModel::default()),
            None,
        );
        assert!(text.contains("A Performance Analysis"));
        assert!(text.contains("KALMAN FILTER PERFORMANCE"));
    }
}
