// src/data_analysis/path_loss.rs

use crate::constants::{DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_POWER_DBM};
use crate::data_input::log_data::Observation;

/// Log-distance path-loss model: `d = 10 ^ ((P_ref - rssi) / (10 * n))`.
///
/// Not clamped: RSSI values far from the calibration range produce extreme
/// but finite and positive distances.
pub fn estimate_distance(rssi: f64, reference_power: f64, path_loss_exponent: f64) -> f64 {
    10f64.powf((reference_power - rssi) / (10.0 * path_loss_exponent))
}

pub fn absolute_error(estimated: f64, reference: f64) -> f64 {
    (estimated - reference).abs()
}

/// Converts dBm into linear power (milliwatts).
pub fn dbm_to_linear_power(rssi: f64) -> f64 {
    10f64.powf(rssi / 10.0)
}

/// Calibrated path-loss parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLossModel {
    pub reference_power_dbm: f64, // RSSI at 1 meter
    pub path_loss_exponent: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            reference_power_dbm: DEFAULT_REFERENCE_POWER_DBM,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
        }
    }
}

impl PathLossModel {
    pub fn new(reference_power_dbm: f64, path_loss_exponent: f64) -> Self {
        Self {
            reference_power_dbm,
            path_loss_exponent,
        }
    }

    pub fn estimate_distance(&self, rssi: f64) -> f64 {
        estimate_distance(rssi, self.reference_power_dbm, self.path_loss_exponent)
    }
}

/// Replaces the recorded distance of every successful reading with the model
/// estimate. Failed readings keep their zero sentinel.
pub fn recompute_distances(observations: &mut [Observation], model: &PathLossModel) {
    for observation in observations.iter_mut().filter(|o| o.reading.is_success()) {
        observation.reading.calculated_distance = model.estimate_distance(observation.reading.rssi as f64);
    }
}
