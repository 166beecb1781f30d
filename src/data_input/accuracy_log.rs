// src/data_input/accuracy_log.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use log::{info, warn};
use serde::Deserialize;

use crate::error::AnalysisError;

/// One row of the accuracy-test export: a tag sampled at a known distance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccuracySample {
    pub tag: String,
    pub ref_distance: f64,
    pub estimated_distance: f64,
    pub raw_rssi: f64,
    pub kalman_rssi: f64,
    /// Scan cycle, only present in longer stability runs.
    #[serde(default)]
    pub cycle: Option<i64>,
}

/// Reads accuracy samples from any reader. Unknown columns are ignored and
/// malformed rows skipped with a warning.
pub fn read_accuracy_records<R: Read>(reader: R) -> Result<Vec<AccuracySample>, AnalysisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (row_index, result) in rdr.deserialize::<AccuracySample>().enumerate() {
        match result {
            Ok(sample) => samples.push(sample),
            Err(e) => warn!("Skipping accuracy row {}: {e}", row_index + 1),
        }
    }
    Ok(samples)
}

pub fn read_accuracy_csv(path: &Path) -> Result<Vec<AccuracySample>, AnalysisError> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let samples = read_accuracy_records(BufReader::new(file))?;
    if samples.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "accuracy samples in '{}'",
            path.display()
        )));
    }
    info!("Loaded {} accuracy samples from '{}'", samples.len(), path.display());
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_cycle_and_extra_columns() {
        let text = "\
id,tag,ref_distance,estimated_distance,raw_rssi,kalman_rssi,note
1,TAG_A,1,1.2,-70,-69.5,x
2,TAG_B,2,2.9,-79,-77.0,y
";
        let samples = read_accuracy_records(text.as_bytes()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].tag, "TAG_A");
        assert_eq!(samples[0].ref_distance, 1.0);
        assert_eq!(samples[1].kalman_rssi, -77.0);
        assert!(samples.iter().all(|s| s.cycle.is_none()));
    }

    #[test]
    fn test_cycle_column_is_read() {
        let text = "\
tag,ref_distance,estimated_distance,raw_rssi,kalman_rssi,cycle
T,1,1.0,-68,-68,3
";
        let samples = read_accuracy_records(text.as_bytes()).unwrap();
        assert_eq!(samples[0].cycle, Some(3));
    }
}
