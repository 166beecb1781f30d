// src/plot_functions/mod.rs

pub mod plot_calibration_curve;
pub mod plot_cumulative_logs;
pub mod plot_error_bars;
pub mod plot_error_histogram;
pub mod plot_estimated_distance;
pub mod plot_moving;
pub mod plot_raw_vs_kalman;
pub mod plot_regression;
pub mod plot_rssi_bands;
pub mod plot_success_failed;

// src/plot_functions/mod.rs
