// src/data_input/location_log.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use csv::ReaderBuilder;
use log::{info, warn};

use crate::error::AnalysisError;

// Column positions of the headerless asset location-log export.
const COLUMN_ID: usize = 0;
const COLUMN_READER_NAME: usize = 8;
const COLUMN_CREATED_AT: usize = 9;
const COLUMN_COUNT: usize = 11;

/// The fields of a location-log row the scalability analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationLogEntry {
    pub id: String,
    pub reader_name: String,
    pub created_at: NaiveDateTime,
}

/// Parses `YYYY-MM-DD HH:MM:SS` (optionally with fractional seconds) or RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_utc()))
}

pub fn read_location_records<R: Read>(reader: R) -> Result<Vec<LocationLogEntry>, AnalysisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping location-log row {}: {e}", row_index + 1);
                continue;
            }
        };
        if record.len() < COLUMN_COUNT {
            warn!(
                "Skipping location-log row {}: expected {} columns, found {}",
                row_index + 1,
                COLUMN_COUNT,
                record.len()
            );
            continue;
        }
        let created_at = match record.get(COLUMN_CREATED_AT).and_then(parse_timestamp) {
            Some(ts) => ts,
            None => {
                warn!(
                    "Skipping location-log row {} due to invalid created_at {:?}",
                    row_index + 1,
                    record.get(COLUMN_CREATED_AT).unwrap_or("")
                );
                continue;
            }
        };
        entries.push(LocationLogEntry {
            id: record.get(COLUMN_ID).unwrap_or("").to_string(),
            reader_name: record.get(COLUMN_READER_NAME).unwrap_or("").to_string(),
            created_at,
        });
    }
    Ok(entries)
}

pub fn read_location_csv(path: &Path) -> Result<Vec<LocationLogEntry>, AnalysisError> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let entries = read_location_records(BufReader::new(file))?;
    if entries.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "location logs in '{}'",
            path.display()
        )));
    }
    info!("Loaded {} location-log entries from '{}'", entries.len(), path.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_formats() {
        let a = parse_timestamp("2025-05-11 14:07:38").unwrap();
        let b = parse_timestamp("2025-05-11T14:07:38Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("2025-05-11 14:07:38.250").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_rows_are_read_by_position() {
        let text = "\
1,3,7,-61,-62.5,1.3,explicit,present,Asset_Reader_01,2025-05-11 14:00:05,2025-05-11 14:00:05
2,4,8,-75,-74.0,2.9,pattern,present,Asset_Reader_02,not-a-date,2025-05-11 14:00:09
3,4,8,-75,-74.0,2.9,pattern,present,Asset_Reader_02
";
        let entries = read_location_records(text.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1");
        assert_eq!(entries[0].reader_name, "Asset_Reader_01");
    }
}
