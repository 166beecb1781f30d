// src/data_input/mod.rs

pub mod accuracy_log;
pub mod experiment_csv;
pub mod location_log;
pub mod log_data;
pub mod log_parser;

// src/data_input/mod.rs
