// src/data_input/experiment_csv.rs

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::data_input::log_data::{
    ExperimentGroup, ExperimentKind, Experiments, Observation, Reading, ReadingStatus,
};
use crate::error::AnalysisError;

/// Row of `clear_path_experiment.csv` / `wall_experiment.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationaryRecord {
    #[serde(rename = "Distance (meters)")]
    pub distance: f64,
    #[serde(rename = "Reading Number")]
    pub reading_number: u32,
    #[serde(rename = "RSSI")]
    pub rssi: i32,
    #[serde(rename = "Calculated Distance")]
    pub calculated_distance: f64,
    #[serde(rename = "Status")]
    pub status: ReadingStatus,
    #[serde(rename = "Experiment Type")]
    pub experiment_type: String,
}

/// Row of `moving_experiment.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingRecord {
    #[serde(rename = "Experiment Type")]
    pub experiment_type: String,
    #[serde(rename = "Reading Number")]
    pub reading_number: u32,
    #[serde(rename = "RSSI")]
    pub rssi: i32,
    #[serde(rename = "Calculated Distance")]
    pub calculated_distance: f64,
    #[serde(rename = "Status")]
    pub status: ReadingStatus,
}

impl StationaryRecord {
    fn into_observation(self) -> Observation {
        Observation {
            distance: Some(self.distance),
            reading: Reading {
                rssi: self.rssi,
                calculated_distance: self.calculated_distance,
                status: self.status,
                sequence_index: self.reading_number,
            },
        }
    }
}

impl MovingRecord {
    fn into_observation(self) -> Observation {
        Observation {
            distance: None,
            reading: Reading {
                rssi: self.rssi,
                calculated_distance: self.calculated_distance,
                status: self.status,
                sequence_index: self.reading_number,
            },
        }
    }
}

/// Writes clear or wall groups in the stationary schema.
pub fn write_stationary_csv<W: Write>(
    writer: W,
    kind: ExperimentKind,
    groups: &[ExperimentGroup],
) -> Result<usize, AnalysisError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut rows = 0;
    for group in groups {
        let Some(distance) = group.distance() else {
            continue;
        };
        for reading in group.readings() {
            wtr.serialize(StationaryRecord {
                distance,
                reading_number: reading.sequence_index,
                rssi: reading.rssi,
                calculated_distance: reading.calculated_distance,
                status: reading.status,
                experiment_type: kind.label().to_string(),
            })?;
            rows += 1;
        }
    }
    if rows == 0 {
        // serde only emits the header with the first record
        wtr.write_record([
            "Distance (meters)",
            "Reading Number",
            "RSSI",
            "Calculated Distance",
            "Status",
            "Experiment Type",
        ])?;
    }
    wtr.flush().map_err(|e| AnalysisError::io("<csv writer>", e))?;
    Ok(rows)
}

/// Writes moving runs in the moving schema.
pub fn write_moving_csv<W: Write>(writer: W, groups: &[ExperimentGroup]) -> Result<usize, AnalysisError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut rows = 0;
    for reading in groups.iter().flat_map(|g| g.readings()) {
        wtr.serialize(MovingRecord {
            experiment_type: ExperimentKind::Moving.label().to_string(),
            reading_number: reading.sequence_index,
            rssi: reading.rssi,
            calculated_distance: reading.calculated_distance,
            status: reading.status,
        })?;
        rows += 1;
    }
    if rows == 0 {
        wtr.write_record([
            "Experiment Type",
            "Reading Number",
            "RSSI",
            "Calculated Distance",
            "Status",
        ])?;
    }
    wtr.flush().map_err(|e| AnalysisError::io("<csv writer>", e))?;
    Ok(rows)
}

/// Writes the three experiment CSV files into `output_dir`, creating it if needed.
pub fn write_experiment_csvs(
    experiments: &Experiments,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, AnalysisError> {
    fs::create_dir_all(output_dir).map_err(|e| AnalysisError::io(output_dir, e))?;

    let mut written = Vec::new();
    for kind in ExperimentKind::ALL {
        let path = output_dir.join(kind.csv_file_name());
        let file = File::create(&path).map_err(|e| AnalysisError::io(&path, e))?;
        let rows = match kind {
            ExperimentKind::Moving => write_moving_csv(file, experiments.groups(kind))?,
            _ => write_stationary_csv(file, kind, experiments.groups(kind))?,
        };
        info!("  {} rows written to '{}'", rows, path.display());
        written.push(path);
    }
    Ok(written)
}

/// Reads stationary rows of one experiment type from any reader.
/// Rows that fail to deserialize are skipped with a warning.
pub fn read_stationary_records<R: Read>(
    reader: R,
    kind: ExperimentKind,
) -> Result<Vec<Observation>, AnalysisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut observations = Vec::new();
    for (row_index, result) in rdr.deserialize::<StationaryRecord>().enumerate() {
        match result {
            Ok(record) => {
                if ExperimentKind::from_label(&record.experiment_type) == Some(kind) {
                    observations.push(record.into_observation());
                }
            }
            Err(e) => warn!("Skipping row {} of {} CSV: {e}", row_index + 1, kind.label()),
        }
    }
    Ok(observations)
}

/// Reads moving rows from any reader.
pub fn read_moving_records<R: Read>(reader: R) -> Result<Vec<Observation>, AnalysisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut observations = Vec::new();
    for (row_index, result) in rdr.deserialize::<MovingRecord>().enumerate() {
        match result {
            Ok(record) => observations.push(record.into_observation()),
            Err(e) => warn!("Skipping row {} of moving CSV: {e}", row_index + 1),
        }
    }
    Ok(observations)
}

/// Loads the observations of one experiment kind from its CSV file in `input_dir`.
pub fn read_experiment_csv(
    input_dir: &Path,
    kind: ExperimentKind,
) -> Result<Vec<Observation>, AnalysisError> {
    let path = input_dir.join(kind.csv_file_name());
    let file = File::open(&path).map_err(|e| AnalysisError::io(&path, e))?;
    let reader = BufReader::new(file);
    let observations = match kind {
        ExperimentKind::Moving => read_moving_records(reader)?,
        _ => read_stationary_records(reader, kind)?,
    };
    info!(
        "Loaded {} {} observations from '{}'",
        observations.len(),
        kind.label(),
        path.display()
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_groups() -> Vec<ExperimentGroup> {
        vec![
            ExperimentGroup::ClearPath {
                distance: 1.0,
                readings: vec![Reading::success(-60, 0.8, 1), Reading::failed(2)],
            },
            ExperimentGroup::ClearPath {
                distance: 2.0,
                readings: vec![Reading::success(-72, 1.4, 1)],
            },
        ]
    }

    #[test]
    fn test_stationary_header_and_rows() {
        let mut buf = Vec::new();
        let rows = write_stationary_csv(&mut buf, ExperimentKind::ClearPath, &sample_groups()).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Distance (meters),Reading Number,RSSI,Calculated Distance,Status,Experiment Type")
        );
        assert_eq!(lines.next(), Some("1.0,1,-60,0.8,Success,Clear"));
        assert_eq!(lines.next(), Some("1.0,2,0,0.0,Failed,Clear"));
        assert_eq!(lines.next(), Some("2.0,1,-72,1.4,Success,Clear"));
    }

    #[test]
    fn test_moving_header_on_empty_output() {
        let mut buf = Vec::new();
        let rows = write_moving_csv(&mut buf, &[]).unwrap();
        assert_eq!(rows, 0);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text.trim_end(),
            "Experiment Type,Reading Number,RSSI,Calculated Distance,Status"
        );
    }

    #[test]
    fn test_read_filters_experiment_type_and_skips_bad_rows() {
        let csv_text = "\
Distance (meters),Reading Number,RSSI,Calculated Distance,Status,Experiment Type
1.0,1,-60,0.8,Success,Clear
1.0,2,oops,0.8,Success,Clear
3.0,1,-80,3.1,Success,Wall
";
        let observations =
            read_stationary_records(csv_text.as_bytes(), ExperimentKind::ClearPath).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].distance, Some(1.0));
        assert_eq!(observations[0].reading.rssi, -60);
    }

    #[test]
    fn test_moving_rows_have_no_distance() {
        let csv_text = "\
Experiment Type,Reading Number,RSSI,Calculated Distance,Status
Moving,1,-88,8.1,Success
Moving,2,0,0,Failed
";
        let observations = read_moving_records(csv_text.as_bytes()).unwrap();
        assert_eq!(observations.len(), 2);
        assert!(observations.iter().all(|o| o.distance.is_none()));
        assert_eq!(observations[1].reading.status, ReadingStatus::Failed);
        assert_eq!(observations[1].reading.sequence_index, 2);
    }
}

// src/data_input/experiment_csv.rs
