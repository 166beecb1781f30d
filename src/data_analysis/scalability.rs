// src/data_analysis/scalability.rs

use std::fmt::Write as _;

use crate::constants::{HALL_AVG_TAGS_PER_SCAN, ROOM_TAGS_PER_SCAN, SCAN_INTERVAL_S};
use crate::data_input::location_log::LocationLogEntry;

/// Cumulative log counts per whole minute since the first entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeCounts {
    pub minutes: Vec<u32>,
    pub room: Vec<u64>,
    pub hall: Vec<u64>,
    pub total: Vec<u64>,
}

impl CumulativeCounts {
    pub fn room_total(&self) -> u64 {
        self.room.last().copied().unwrap_or(0)
    }

    pub fn hall_total(&self) -> u64 {
        self.hall.last().copied().unwrap_or(0)
    }

    pub fn grand_total(&self) -> u64 {
        self.total.last().copied().unwrap_or(0)
    }
}

/// Buckets entries by minute and accumulates counts for the two readers and
/// overall. Every minute from 0 to the last one gets a value, so minutes
/// without logs repeat the previous count.
pub fn cumulative_counts(entries: &[LocationLogEntry], room_reader: &str, hall_reader: &str) -> CumulativeCounts {
    let Some(start) = entries.iter().map(|e| e.created_at).min() else {
        return CumulativeCounts {
            minutes: Vec::new(),
            room: Vec::new(),
            hall: Vec::new(),
            total: Vec::new(),
        };
    };

    let minute_of = |e: &LocationLogEntry| (e.created_at - start).num_seconds().max(0) as usize / 60;
    let last_minute = entries.iter().map(minute_of).max().unwrap_or(0);

    let mut room = vec![0u64; last_minute + 1];
    let mut hall = vec![0u64; last_minute + 1];
    let mut total = vec![0u64; last_minute + 1];
    for entry in entries {
        let minute = minute_of(entry);
        total[minute] += 1;
        if entry.reader_name == room_reader {
            room[minute] += 1;
        } else if entry.reader_name == hall_reader {
            hall[minute] += 1;
        }
    }

    for series in [&mut room, &mut hall, &mut total] {
        for i in 1..series.len() {
            series[i] += series[i - 1];
        }
    }

    CumulativeCounts {
        minutes: (0..=last_minute as u32).collect(),
        room,
        hall,
        total,
    }
}

/// Log volume an hour of scanning would produce without deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanCapacity {
    pub scan_interval_s: u32,
    pub room_tags_per_scan: u32,
    pub hall_tags_per_scan: u32,
}

impl Default for ScanCapacity {
    fn default() -> Self {
        Self {
            scan_interval_s: SCAN_INTERVAL_S,
            room_tags_per_scan: ROOM_TAGS_PER_SCAN,
            hall_tags_per_scan: HALL_AVG_TAGS_PER_SCAN,
        }
    }
}

impl ScanCapacity {
    pub fn scans_per_hour(&self) -> u64 {
        3600 / u64::from(self.scan_interval_s.max(1))
    }

    pub fn room_theoretical(&self) -> u64 {
        self.scans_per_hour() * u64::from(self.room_tags_per_scan)
    }

    pub fn hall_theoretical(&self) -> u64 {
        self.scans_per_hour() * u64::from(self.hall_tags_per_scan)
    }

    pub fn total_theoretical(&self) -> u64 {
        self.room_theoretical() + self.hall_theoretical()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReductionReport {
    pub room_logs: u64,
    pub hall_logs: u64,
    pub total_logs: u64,
    pub room_theoretical: u64,
    pub hall_theoretical: u64,
    pub total_theoretical: u64,
    pub room_reduction_pct: f64,
    pub hall_reduction_pct: f64,
    pub total_reduction_pct: f64,
}

fn reduction_pct(actual: u64, theoretical: u64) -> f64 {
    if theoretical == 0 {
        return 0.0;
    }
    100.0 * (1.0 - actual as f64 / theoretical as f64)
}

pub fn reduction_report(counts: &CumulativeCounts, capacity: &ScanCapacity) -> ReductionReport {
    let (room_logs, hall_logs, total_logs) = (counts.room_total(), counts.hall_total(), counts.grand_total());
    let (room_theoretical, hall_theoretical, total_theoretical) = (
        capacity.room_theoretical(),
        capacity.hall_theoretical(),
        capacity.total_theoretical(),
    );
    ReductionReport {
        room_logs,
        hall_logs,
        total_logs,
        room_theoretical,
        hall_theoretical,
        total_theoretical,
        room_reduction_pct: reduction_pct(room_logs, room_theoretical),
        hall_reduction_pct: reduction_pct(hall_logs, hall_theoretical),
        total_reduction_pct: reduction_pct(total_logs, total_theoretical),
    }
}

pub fn render_reduction_report(report: &ReductionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "LOG COUNTS SUMMARY (Real Data)");
    let _ = writeln!(out, "Room Reader logs:    {}", report.room_logs);
    let _ = writeln!(out, "Hallway Reader logs: {}", report.hall_logs);
    let _ = writeln!(out, "Total logs:          {}", report.total_logs);
    let _ = writeln!(out, "\nTHEORETICAL LOG COUNTS (No Dedup/Threshold)");
    let _ = writeln!(out, "Room Reader (max):    {}", report.room_theoretical);
    let _ = writeln!(out, "Hallway Reader (max): {}", report.hall_theoretical);
    let _ = writeln!(out, "Total (max):          {}", report.total_theoretical);
    let _ = writeln!(out, "\nThreshold/deduplication effectiveness:");
    let _ = writeln!(out, "  Room reduction:    {:.1}% fewer logs", report.room_reduction_pct);
    let _ = writeln!(out, "  Hall reduction:    {:.1}% fewer logs", report.hall_reduction_pct);
    let _ = writeln!(out, "  Overall reduction: {:.1}% fewer logs", report.total_reduction_pct);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::location_log::parse_timestamp;

    fn entry(id: u32, reader: &str, at: &str) -> LocationLogEntry {
        LocationLogEntry {
            id: id.to_string(),
            reader_name: reader.to_string(),
            created_at: parse_timestamp(at).unwrap(),
        }
    }

    #[test]
    fn test_cumulative_counts_forward_fill() {
        let entries = vec![
            entry(1, "R", "2025-05-11 14:00:10"),
            entry(2, "H", "2025-05-11 14:00:50"),
            entry(3, "R", "2025-05-11 14:03:15"),
            entry(4, "X", "2025-05-11 14:01:20"),
        ];
        let counts = cumulative_counts(&entries, "R", "H");
        assert_eq!(counts.minutes, vec![0, 1, 2, 3]);
        assert_eq!(counts.room, vec![1, 1, 1, 2]);
        assert_eq!(counts.hall, vec![1, 1, 1, 1]);
        assert_eq!(counts.total, vec![2, 3, 3, 4]);
        assert_eq!(counts.grand_total(), 4);
    }

    #[test]
    fn test_empty_log() {
        let counts = cumulative_counts(&[], "R", "H");
        assert!(counts.minutes.is_empty());
        assert_eq!(counts.grand_total(), 0);
    }

    #[test]
    fn test_theoretical_capacity() {
        let capacity = ScanCapacity::default();
        assert_eq!(capacity.scans_per_hour(), 120);
        assert_eq!(capacity.room_theoretical(), 600);
        assert_eq!(capacity.hall_theoretical(), 360);
        assert_eq!(capacity.total_theoretical(), 960);
    }

    #[test]
    fn test_reduction_percentages() {
        let counts = CumulativeCounts {
            minutes: vec![0],
            room: vec![60],
            hall: vec![90],
            total: vec![150],
        };
        let report = reduction_report(&counts, &ScanCapacity::default());
        assert!((report.room_reduction_pct - 90.0).abs() < 1e-9);
        assert!((report.hall_reduction_pct - 75.0).abs() < 1e-9);
        assert!(render_reduction_report(&report).contains("Room reduction:    90.0% fewer logs"));
    }
}
