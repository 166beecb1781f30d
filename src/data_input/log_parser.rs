// src/data_input/log_parser.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;
use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;

use crate::constants::{DEFAULT_MOVING_PREFIX, DEFAULT_RETRY_MARKER, DEFAULT_WALL_LABEL};
use crate::data_input::log_data::{ExperimentGroup, ExperimentKind, Experiments, Reading};
use crate::error::{AnalysisError, ParseError};

/// Literal marker lines recognised in a ranging transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMarkers {
    pub wall_label: String,    // whole line
    pub moving_prefix: String, // line prefix
    pub retry_marker: String,  // whole line
}

impl Default for TranscriptMarkers {
    fn default() -> Self {
        Self {
            wall_label: DEFAULT_WALL_LABEL.to_string(),
            moving_prefix: DEFAULT_MOVING_PREFIX.to_string(),
            retry_marker: DEFAULT_RETRY_MARKER.to_string(),
        }
    }
}

/// Classification of a single transcript line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    WallSection,
    MovingSection,
    Distance(f64),
    SuccessReading { rssi: i32, calculated_distance: f64 },
    Retry,
    Other,
}

fn distance_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d[\d.]*) meters").expect("distance marker pattern"))
}

fn reading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Reading \d+: RSSI = (\S+) \| Calculated Distance = (\S+) meters")
            .expect("reading marker pattern")
    })
}

/// Classifies one line. Marker checks run in priority order, first match wins.
/// A line shaped like a marker whose number does not convert is a `ParseError`.
pub fn classify_line(
    raw_line: &str,
    line_number: usize,
    markers: &TranscriptMarkers,
) -> Result<LineEvent, ParseError> {
    let line = raw_line.trim();

    if line == markers.wall_label {
        return Ok(LineEvent::WallSection);
    }
    if !markers.moving_prefix.is_empty() && line.starts_with(markers.moving_prefix.as_str()) {
        return Ok(LineEvent::MovingSection);
    }
    if let Some(caps) = distance_pattern().captures(line) {
        let value = caps[1].parse::<f64>().map_err(|e| {
            ParseError::new(line_number, raw_line, format!("invalid distance '{}': {e}", &caps[1]))
        })?;
        return Ok(LineEvent::Distance(value));
    }
    if let Some(caps) = reading_pattern().captures(line) {
        let rssi = caps[1].parse::<i32>().map_err(|e| {
            ParseError::new(line_number, raw_line, format!("invalid RSSI '{}': {e}", &caps[1]))
        })?;
        let calculated_distance = caps[2].parse::<f64>().map_err(|e| {
            ParseError::new(
                line_number,
                raw_line,
                format!("invalid calculated distance '{}': {e}", &caps[2]),
            )
        })?;
        return Ok(LineEvent::SuccessReading {
            rssi,
            calculated_distance,
        });
    }
    if line == markers.retry_marker {
        return Ok(LineEvent::Retry);
    }
    Ok(LineEvent::Other)
}

/// Section currently open in the transcript.
#[derive(Debug)]
enum SectionState {
    /// Clear or wall path: readings accumulate per reference distance.
    Stationary {
        kind: ExperimentKind,
        distance: Option<f64>,
        readings: Vec<Reading>,
    },
    /// Moving run: readings are numbered globally and never batched per distance.
    Moving { next_index: u32, readings: Vec<Reading> },
}

impl SectionState {
    fn stationary(kind: ExperimentKind) -> Self {
        SectionState::Stationary {
            kind,
            distance: None,
            readings: Vec::new(),
        }
    }

    fn moving() -> Self {
        SectionState::Moving {
            next_index: 1,
            readings: Vec::new(),
        }
    }

    /// Pushes a reading built from its sequence index into the open accumulator.
    fn record(&mut self, make: impl FnOnce(u32) -> Reading) {
        match self {
            SectionState::Stationary { readings, .. } => {
                let index = readings.len() as u32 + 1;
                readings.push(make(index));
            }
            SectionState::Moving {
                next_index,
                readings,
            } => {
                readings.push(make(*next_index));
                *next_index += 1;
            }
        }
    }

    /// Closes the open group. Groups without a distance or without readings are dropped.
    fn take_group(&mut self) -> Option<ExperimentGroup> {
        match self {
            SectionState::Stationary {
                kind,
                distance,
                readings,
            } => {
                let readings = mem::take(readings);
                match distance.take() {
                    Some(d) if !readings.is_empty() => Some(ExperimentGroup::new(*kind, d, readings)),
                    _ => None,
                }
            }
            SectionState::Moving { readings, .. } => {
                let readings = mem::take(readings);
                if readings.is_empty() {
                    None
                } else {
                    Some(ExperimentGroup::Moving { readings })
                }
            }
        }
    }
}

/// Result of parsing a whole transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTranscript {
    pub experiments: Experiments,
    pub errors: Vec<ParseError>,
}

/// Line-at-a-time transcript parser with an explicit section state.
#[derive(Debug)]
pub struct TranscriptParser {
    markers: TranscriptMarkers,
    state: SectionState,
    // Survives section switches; cleared only by a distance marker or a success.
    pending_failure: bool,
    line_number: usize,
    experiments: Experiments,
    errors: Vec<ParseError>,
}

impl TranscriptParser {
    pub fn new(markers: TranscriptMarkers) -> Self {
        Self {
            markers,
            state: SectionState::stationary(ExperimentKind::ClearPath),
            pending_failure: false,
            line_number: 0,
            experiments: Experiments::default(),
            errors: Vec::new(),
        }
    }

    /// Classifies and applies the next line. Malformed lines are recorded and skipped.
    pub fn feed_line(&mut self, line: &str) {
        self.line_number += 1;
        match classify_line(line, self.line_number, &self.markers) {
            Ok(event) => self.apply(event),
            Err(e) => {
                warn!("Skipping malformed transcript line: {e}");
                self.errors.push(e);
            }
        }
    }

    /// Transition function of the parser.
    pub fn apply(&mut self, event: LineEvent) {
        match event {
            LineEvent::WallSection => {
                self.flush();
                self.state = SectionState::stationary(ExperimentKind::WallPath);
                debug!("line {}: entering wall-path section", self.line_number);
            }
            LineEvent::MovingSection => {
                self.flush();
                self.state = SectionState::moving();
                debug!("line {}: entering moving section", self.line_number);
            }
            LineEvent::Distance(value) => {
                // Distance announcements inside a moving run do not split it.
                if matches!(self.state, SectionState::Stationary { .. }) {
                    self.flush();
                    if let SectionState::Stationary { distance, .. } = &mut self.state {
                        *distance = Some(value);
                    }
                }
                self.pending_failure = false;
            }
            LineEvent::SuccessReading {
                rssi,
                calculated_distance,
            } => {
                self.state
                    .record(|index| Reading::success(rssi, calculated_distance, index));
                self.pending_failure = false;
            }
            LineEvent::Retry => {
                // A second retry marker without a success in between confirms a failure.
                if self.pending_failure {
                    self.state.record(Reading::failed);
                }
                self.pending_failure = true;
            }
            LineEvent::Other => {}
        }
    }

    fn flush(&mut self) {
        if let Some(group) = self.state.take_group() {
            self.experiments.push(group);
        }
    }

    /// Performs the final flush and returns everything parsed so far.
    pub fn finish(mut self) -> ParsedTranscript {
        self.flush();
        ParsedTranscript {
            experiments: self.experiments,
            errors: self.errors,
        }
    }
}

/// Parses an in-memory sequence of transcript lines.
pub fn parse_transcript_lines<I, S>(lines: I, markers: &TranscriptMarkers) -> ParsedTranscript
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = TranscriptParser::new(markers.clone());
    for line in lines {
        parser.feed_line(line.as_ref());
    }
    parser.finish()
}

/// Reads and parses a transcript file.
pub fn parse_transcript_file(
    input_file_path: &Path,
    markers: &TranscriptMarkers,
) -> Result<ParsedTranscript, AnalysisError> {
    let file = File::open(input_file_path).map_err(|e| AnalysisError::io(input_file_path, e))?;
    let reader = BufReader::new(file);

    let mut parser = TranscriptParser::new(markers.clone());
    for line_result in reader.lines() {
        let line = line_result.map_err(|e| AnalysisError::io(input_file_path, e))?;
        parser.feed_line(&line);
    }
    let parsed = parser.finish();

    info!(
        "Parsed '{}': {} clear-path groups, {} wall-path groups, {} moving readings, {} malformed lines",
        input_file_path.display(),
        parsed.experiments.clear_path.len(),
        parsed.experiments.wall_path.len(),
        parsed.experiments.reading_count(ExperimentKind::Moving),
        parsed.errors.len()
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::log_data::ReadingStatus;

    fn parse(lines: &[&str]) -> ParsedTranscript {
        parse_transcript_lines(lines.iter(), &TranscriptMarkers::default())
    }

    #[test]
    fn test_classify_markers() {
        let m = TranscriptMarkers::default();
        assert_eq!(classify_line("Wall", 1, &m), Ok(LineEvent::WallSection));
        assert_eq!(classify_line("  Wall  ", 1, &m), Ok(LineEvent::WallSection));
        assert_eq!(
            classify_line("From 15 meters to 1 meter", 1, &m),
            Ok(LineEvent::MovingSection)
        );
        assert_eq!(classify_line("2.5 meters", 1, &m), Ok(LineEvent::Distance(2.5)));
        assert_eq!(
            classify_line("Reading 3: RSSI = -71 | Calculated Distance = 1.26 meters", 1, &m),
            Ok(LineEvent::SuccessReading {
                rssi: -71,
                calculated_distance: 1.26
            })
        );
        assert_eq!(classify_line("Scanning...", 1, &m), Ok(LineEvent::Retry));
        assert_eq!(classify_line("Wall test begins", 1, &m), Ok(LineEvent::Other));
        assert_eq!(classify_line("", 1, &m), Ok(LineEvent::Other));
    }

    #[test]
    fn test_malformed_numbers_are_parse_errors() {
        let m = TranscriptMarkers::default();
        let err = classify_line("1.2.3 meters", 7, &m).unwrap_err();
        assert_eq!(err.line_number, 7);
        assert_eq!(err.content, "1.2.3 meters");

        let err = classify_line(
            "Reading 1: RSSI = -7x | Calculated Distance = 1.0 meters",
            2,
            &m,
        )
        .unwrap_err();
        assert!(err.reason.contains("RSSI"));

        let err = classify_line(
            "Reading 1: RSSI = -70 | Calculated Distance = 1..0 meters",
            3,
            &m,
        )
        .unwrap_err();
        assert!(err.reason.contains("calculated distance"));
    }

    #[test]
    fn test_parsing_continues_after_error() {
        let parsed = parse(&[
            "1 meters",
            "Reading 1: RSSI = abc | Calculated Distance = 1.0 meters",
            "Reading 2: RSSI = -65 | Calculated Distance = 0.9 meters",
        ]);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line_number, 2);
        let readings = parsed.experiments.clear_path[0].readings();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].sequence_index, 1);
    }

    #[test]
    fn test_pending_failure_survives_section_switch() {
        let parsed = parse(&[
            "1 meters",
            "Reading 1: RSSI = -66 | Calculated Distance = 0.8 meters",
            "Scanning...",
            "From 15 meters",
            "Scanning...",
        ]);
        assert_eq!(parsed.experiments.clear_path.len(), 1);
        assert_eq!(parsed.experiments.moving.len(), 1);
        let moving = parsed.experiments.moving[0].readings();
        assert_eq!(moving.len(), 1);
        assert_eq!(moving[0].status, ReadingStatus::Failed);
        assert_eq!(moving[0].sequence_index, 1);
    }

    #[test]
    fn test_distance_marker_clears_pending_failure() {
        let parsed = parse(&["1 meters", "Scanning...", "2 meters", "Scanning..."]);
        assert!(parsed.experiments.clear_path.is_empty());
    }

    #[test]
    fn test_three_retries_record_two_failures() {
        let parsed = parse(&[
            "1 meters",
            "Reading 1: RSSI = -62 | Calculated Distance = 0.6 meters",
            "Scanning...",
            "Scanning...",
            "Scanning...",
            "2 meters",
        ]);
        let readings = parsed.experiments.clear_path[0].readings();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[1].status, ReadingStatus::Failed);
        assert_eq!(readings[2].status, ReadingStatus::Failed);
        assert_eq!(readings[2].sequence_index, 3);
    }

    #[test]
    fn test_empty_distance_group_is_not_emitted() {
        let parsed = parse(&[
            "1 meters",
            "2 meters",
            "Reading 1: RSSI = -72 | Calculated Distance = 1.4 meters",
        ]);
        let groups = &parsed.experiments.clear_path;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].distance(), Some(2.0));
        assert_eq!(groups[0].readings().len(), 1);
    }

    #[test]
    fn test_readings_without_distance_are_dropped() {
        let parsed = parse(&[
            "Wall",
            "Reading 1: RSSI = -60 | Calculated Distance = 0.7 meters",
            "3 meters",
            "Reading 1: RSSI = -75 | Calculated Distance = 1.9 meters",
        ]);
        assert_eq!(parsed.experiments.wall_path.len(), 1);
        assert_eq!(parsed.experiments.wall_path[0].distance(), Some(3.0));
        assert_eq!(parsed.experiments.wall_path[0].readings().len(), 1);
    }

    #[test]
    fn test_distance_inside_moving_run_keeps_numbering() {
        let parsed = parse(&[
            "From 15 meters walking towards the reader",
            "Reading 1: RSSI = -90 | Calculated Distance = 9.1 meters",
            "10 meters",
            "Reading 2: RSSI = -85 | Calculated Distance = 6.9 meters",
        ]);
        assert_eq!(parsed.experiments.moving.len(), 1);
        let indices: Vec<u32> = parsed.experiments.moving[0]
            .readings()
            .iter()
            .map(|r| r.sequence_index)
            .collect();
        assert_eq!(indices, vec![1, 2]);
    }
}

// src/data_input/log_parser.rs
