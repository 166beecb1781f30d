// src/data_input/log_data.rs

use serde::{Deserialize, Serialize};

use crate::constants::{CLEAR_PATH_CSV, MOVING_CSV, WALL_PATH_CSV};

/// Outcome of a single measurement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingStatus {
    Success,
    Failed,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Success => "Success",
            ReadingStatus::Failed => "Failed",
        }
    }
}

/// One measurement event. Failed readings carry `rssi = 0` and
/// `calculated_distance = 0.0` as sentinels, never real values.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub rssi: i32,                // dBm
    pub calculated_distance: f64, // meters, as reported at capture time
    pub status: ReadingStatus,
    pub sequence_index: u32, // 1-based within its group or moving run
}

impl Reading {
    pub fn success(rssi: i32, calculated_distance: f64, sequence_index: u32) -> Self {
        Self {
            rssi,
            calculated_distance,
            status: ReadingStatus::Success,
            sequence_index,
        }
    }

    pub fn failed(sequence_index: u32) -> Self {
        Self {
            rssi: 0,
            calculated_distance: 0.0,
            status: ReadingStatus::Failed,
            sequence_index,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReadingStatus::Success
    }
}

/// The three experiment sections of a ranging transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperimentKind {
    ClearPath,
    WallPath,
    Moving,
}

impl ExperimentKind {
    pub const ALL: [ExperimentKind; 3] = [
        ExperimentKind::ClearPath,
        ExperimentKind::WallPath,
        ExperimentKind::Moving,
    ];

    /// Value of the `Experiment Type` CSV column.
    pub fn label(&self) -> &'static str {
        match self {
            ExperimentKind::ClearPath => "Clear",
            ExperimentKind::WallPath => "Wall",
            ExperimentKind::Moving => "Moving",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Clear" => Some(ExperimentKind::ClearPath),
            "Wall" => Some(ExperimentKind::WallPath),
            "Moving" => Some(ExperimentKind::Moving),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ExperimentKind::ClearPath => "Clear Path",
            ExperimentKind::WallPath => "Wall Path",
            ExperimentKind::Moving => "Moving Experiment",
        }
    }

    /// Short name used as prefix of exported bundles.
    pub fn file_base(&self) -> &'static str {
        match self {
            ExperimentKind::ClearPath => "clear",
            ExperimentKind::WallPath => "wall",
            ExperimentKind::Moving => "moving",
        }
    }

    pub fn csv_file_name(&self) -> &'static str {
        match self {
            ExperimentKind::ClearPath => CLEAR_PATH_CSV,
            ExperimentKind::WallPath => WALL_PATH_CSV,
            ExperimentKind::Moving => MOVING_CSV,
        }
    }
}

/// A closed group of readings. Stationary groups share one reference distance.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperimentGroup {
    ClearPath { distance: f64, readings: Vec<Reading> },
    WallPath { distance: f64, readings: Vec<Reading> },
    Moving { readings: Vec<Reading> },
}

impl ExperimentGroup {
    /// Builds a group of the given kind. `distance` is ignored for `Moving`.
    pub fn new(kind: ExperimentKind, distance: f64, readings: Vec<Reading>) -> Self {
        match kind {
            ExperimentKind::ClearPath => ExperimentGroup::ClearPath { distance, readings },
            ExperimentKind::WallPath => ExperimentGroup::WallPath { distance, readings },
            ExperimentKind::Moving => ExperimentGroup::Moving { readings },
        }
    }

    pub fn kind(&self) -> ExperimentKind {
        match self {
            ExperimentGroup::ClearPath { .. } => ExperimentKind::ClearPath,
            ExperimentGroup::WallPath { .. } => ExperimentKind::WallPath,
            ExperimentGroup::Moving { .. } => ExperimentKind::Moving,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            ExperimentGroup::ClearPath { distance, .. }
            | ExperimentGroup::WallPath { distance, .. } => Some(*distance),
            ExperimentGroup::Moving { .. } => None,
        }
    }

    pub fn readings(&self) -> &[Reading] {
        match self {
            ExperimentGroup::ClearPath { readings, .. }
            | ExperimentGroup::WallPath { readings, .. }
            | ExperimentGroup::Moving { readings } => readings,
        }
    }
}

/// A reading flattened together with its reference distance, i.e. one CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub distance: Option<f64>,
    pub reading: Reading,
}

/// Parser output: ordered groups per experiment kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Experiments {
    pub clear_path: Vec<ExperimentGroup>,
    pub wall_path: Vec<ExperimentGroup>,
    pub moving: Vec<ExperimentGroup>,
}

impl Experiments {
    pub fn groups(&self, kind: ExperimentKind) -> &[ExperimentGroup] {
        match kind {
            ExperimentKind::ClearPath => &self.clear_path,
            ExperimentKind::WallPath => &self.wall_path,
            ExperimentKind::Moving => &self.moving,
        }
    }

    pub(crate) fn push(&mut self, group: ExperimentGroup) {
        match group.kind() {
            ExperimentKind::ClearPath => self.clear_path.push(group),
            ExperimentKind::WallPath => self.wall_path.push(group),
            ExperimentKind::Moving => self.moving.push(group),
        }
    }

    /// Flattens the groups of one kind into CSV-shaped rows, preserving order.
    pub fn observations(&self, kind: ExperimentKind) -> Vec<Observation> {
        self.groups(kind)
            .iter()
            .flat_map(|group| {
                let distance = group.distance();
                group.readings().iter().map(move |reading| Observation {
                    distance,
                    reading: reading.clone(),
                })
            })
            .collect()
    }

    pub fn reading_count(&self, kind: ExperimentKind) -> usize {
        self.groups(kind).iter().map(|g| g.readings().len()).sum()
    }
}

// src/data_input/log_data.rs
