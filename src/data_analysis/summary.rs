// src/data_analysis/summary.rs

use std::cmp::Ordering;
use std::fmt::Write as _;

use ndarray::Array1;
use ndarray_stats::QuantileExt; // .min() / .max() on Array1

use crate::data_analysis::path_loss::absolute_error;
use crate::data_input::log_data::{Observation, ReadingStatus};

/// What the summary rows are bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Reference distance of stationary experiments.
    Distance,
    /// Reading number, used for the moving experiment.
    ReadingIndex,
}

impl GroupKey {
    fn key_of(&self, observation: &Observation) -> Option<f64> {
        match self {
            GroupKey::Distance => observation.distance,
            GroupKey::ReadingIndex => Some(observation.reading.sequence_index as f64),
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            GroupKey::Distance => "Distance (m)",
            GroupKey::ReadingIndex => "Reading",
        }
    }
}

/// Descriptive statistics of one bucket. RSSI and distance figures cover
/// successful readings only and are zero when the bucket has none.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub key: f64,
    pub min_rssi: f64,
    pub mean_rssi: f64,
    pub max_rssi: f64,
    pub std_rssi: f64, // sample standard deviation, 0 below two readings
    pub mean_calculated_distance: f64,
    pub success_count: usize,
    pub failed_count: usize,
}

impl SummaryRow {
    fn empty(key: f64) -> Self {
        Self {
            key,
            min_rssi: 0.0,
            mean_rssi: 0.0,
            max_rssi: 0.0,
            std_rssi: 0.0,
            mean_calculated_distance: 0.0,
            success_count: 0,
            failed_count: 0,
        }
    }

    /// Lower and upper error-bar lengths around the mean.
    pub fn error_bar(&self) -> (f64, f64) {
        (self.mean_rssi - self.min_rssi, self.max_rssi - self.mean_rssi)
    }

    /// Error of the mean calculated distance against the bucket's reference
    /// distance. Only defined for distance buckets with successful readings.
    pub fn distance_error(&self, group_key: GroupKey) -> Option<f64> {
        (group_key == GroupKey::Distance && self.success_count > 0)
            .then(|| absolute_error(self.mean_calculated_distance, self.key))
    }
}

/// Groups observations by `group_key` and computes one row per key, ascending.
///
/// Failed readings only contribute to `failed_count`. A key seen only in
/// failed readings still yields a (zero-filled) row.
pub fn summarize(observations: &[Observation], group_key: GroupKey) -> Vec<SummaryRow> {
    let mut keyed: Vec<(f64, &Observation)> = observations
        .iter()
        .filter_map(|o| group_key.key_of(o).map(|k| (k, o)))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut rows = Vec::new();
    let mut start = 0;
    while start < keyed.len() {
        let key = keyed[start].0;
        let end = keyed[start..]
            .iter()
            .position(|(k, _)| k.total_cmp(&key) != Ordering::Equal)
            .map_or(keyed.len(), |offset| start + offset);
        rows.push(summarize_bucket(key, keyed[start..end].iter().map(|(_, o)| *o)));
        start = end;
    }
    rows
}

fn summarize_bucket<'a>(key: f64, bucket: impl Iterator<Item = &'a Observation>) -> SummaryRow {
    let mut row = SummaryRow::empty(key);
    let mut rssi = Vec::new();
    let mut distances = Vec::new();

    for observation in bucket {
        match observation.reading.status {
            ReadingStatus::Success => {
                rssi.push(observation.reading.rssi as f64);
                distances.push(observation.reading.calculated_distance);
            }
            ReadingStatus::Failed => row.failed_count += 1,
        }
    }

    row.success_count = rssi.len();
    if rssi.is_empty() {
        return row;
    }

    let rssi = Array1::from(rssi);
    let distances = Array1::from(distances);
    row.min_rssi = rssi.min().copied().unwrap_or(0.0);
    row.max_rssi = rssi.max().copied().unwrap_or(0.0);
    row.mean_rssi = rssi.mean().unwrap_or(0.0);
    row.std_rssi = if rssi.len() > 1 { rssi.std(1.0) } else { 0.0 };
    row.mean_calculated_distance = distances.mean().unwrap_or(0.0);
    row
}

/// `(distance, rssi)` pairs of successful stationary readings.
pub fn success_points(observations: &[Observation]) -> Vec<(f64, f64)> {
    points_with_status(observations, ReadingStatus::Success)
}

/// `(distance, rssi)` pairs of failed stationary readings (rssi is the zero sentinel).
pub fn failed_points(observations: &[Observation]) -> Vec<(f64, f64)> {
    points_with_status(observations, ReadingStatus::Failed)
}

fn points_with_status(observations: &[Observation], status: ReadingStatus) -> Vec<(f64, f64)> {
    observations
        .iter()
        .filter(|o| o.reading.status == status)
        .filter_map(|o| o.distance.map(|d| (d, o.reading.rssi as f64)))
        .collect()
}

/// Renders rows as a console table with two-decimal figures.
pub fn render_summary_table(rows: &[SummaryRow], group_key: GroupKey) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>12} {:>9} {:>9} {:>9} {:>8} {:>11} {:>10} {:>8} {:>7}",
        group_key.header(),
        "Min RSSI",
        "Avg RSSI",
        "Max RSSI",
        "Std",
        "Avg Dist",
        "Dist Err",
        "Success",
        "Failed"
    );
    for row in rows {
        let dist_err = row
            .distance_error(group_key)
            .map(|e| format!("{e:.2}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>12.2} {:>9.2} {:>9.2} {:>9.2} {:>8.2} {:>11.2} {:>10} {:>8} {:>7}",
            row.key,
            row.min_rssi,
            row.mean_rssi,
            row.max_rssi,
            row.std_rssi,
            row.mean_calculated_distance,
            dist_err,
            row.success_count,
            row.failed_count
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::log_data::Reading;

    fn at(distance: f64, reading: Reading) -> Observation {
        Observation {
            distance: Some(distance),
            reading,
        }
    }

    #[test]
    fn test_single_key_statistics() {
        let observations = vec![
            at(1.0, Reading::success(-60, 0.6, 1)),
            at(1.0, Reading::success(-70, 1.2, 2)),
            at(1.0, Reading::failed(3)),
        ];
        let rows = summarize(&observations, GroupKey::Distance);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.min_rssi, -70.0);
        assert_eq!(row.mean_rssi, -65.0);
        assert_eq!(row.max_rssi, -60.0);
        assert_eq!(row.success_count, 2);
        assert_eq!(row.failed_count, 1);
        assert!((row.mean_calculated_distance - 0.9).abs() < 1e-12);
        assert!((row.std_rssi - 50f64.sqrt()).abs() < 1e-12);
        assert_eq!(row.error_bar(), (5.0, 5.0));
    }

    #[test]
    fn test_rows_are_sorted_and_failures_default_to_zero() {
        let observations = vec![
            at(3.0, Reading::success(-80, 3.0, 1)),
            at(1.0, Reading::success(-66, 0.9, 1)),
            at(2.0, Reading::success(-75, 2.0, 1)),
            at(1.0, Reading::success(-64, 0.8, 2)),
        ];
        let rows = summarize(&observations, GroupKey::Distance);
        let keys: Vec<f64> = rows.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1.0, 2.0, 3.0]);
        assert!(rows.iter().all(|r| r.failed_count == 0));
        assert_eq!(rows[0].success_count, 2);
        assert_eq!(rows[1].std_rssi, 0.0);
    }

    #[test]
    fn test_failed_only_bucket_is_zero_filled() {
        let observations = vec![at(4.0, Reading::failed(1)), at(4.0, Reading::failed(2))];
        let rows = summarize(&observations, GroupKey::Distance);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].success_count, 0);
        assert_eq!(rows[0].failed_count, 2);
        assert_eq!(rows[0].mean_rssi, 0.0);
    }

    #[test]
    fn test_reading_index_key_and_missing_distance() {
        let observations = vec![
            Observation {
                distance: None,
                reading: Reading::success(-90, 9.0, 2),
            },
            Observation {
                distance: None,
                reading: Reading::success(-88, 8.0, 1),
            },
        ];
        assert!(summarize(&observations, GroupKey::Distance).is_empty());
        let rows = summarize(&observations, GroupKey::ReadingIndex);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, 1.0);
        assert_eq!(rows[0].mean_rssi, -88.0);
    }

    #[test]
    fn test_point_extraction() {
        let observations = vec![
            at(1.0, Reading::success(-60, 0.6, 1)),
            at(2.0, Reading::failed(1)),
        ];
        assert_eq!(success_points(&observations), vec![(1.0, -60.0)]);
        assert_eq!(failed_points(&observations), vec![(2.0, 0.0)]);
    }

    #[test]
    fn test_table_has_one_line_per_row() {
        let observations = vec![at(1.0, Reading::success(-60, 0.6, 1))];
        let table = render_summary_table(&summarize(&observations, GroupKey::Distance), GroupKey::Distance);
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("-60.00"));
    }

    #[test]
    fn test_distance_error_only_for_distance_buckets_with_successes() {
        let stationary = vec![
            at(1.0, Reading::success(-60, 1.5, 1)),
            at(2.0, Reading::failed(1)),
        ];
        let rows = summarize(&stationary, GroupKey::Distance);
        assert_eq!(rows[0].distance_error(GroupKey::Distance), Some(0.5));
        assert_eq!(rows[1].distance_error(GroupKey::Distance), None);
        let table = render_summary_table(&rows, GroupKey::Distance);
        let lines: Vec<&str> = table.lines().collect();
        let columns = |line: &str| line.split_whitespace().map(str::to_string).collect::<Vec<_>>();
        assert_eq!(columns(lines[1]).len(), 9);
        assert_eq!(columns(lines[1])[6], "0.50");
        // Failed-only bucket leaves the error column blank
        assert_eq!(columns(lines[2]).len(), 8);

        let moving = vec![Observation {
            distance: None,
            reading: Reading::success(-90, 9.0, 1),
        }];
        let rows = summarize(&moving, GroupKey::ReadingIndex);
        assert_eq!(rows[0].distance_error(GroupKey::ReadingIndex), None);
        let table = render_summary_table(&rows, GroupKey::ReadingIndex);
        let row_line = table.lines().nth(1).unwrap_or_default();
        assert_eq!(row_line.split_whitespace().count(), 8);
        assert!(!row_line.contains("8.00"));
    }
}
