// src/data_analysis/mod.rs

pub mod accuracy;
pub mod histogram;
pub mod path_loss;
pub mod regression;
pub mod scalability;
pub mod smoothing;
pub mod summary;

// src/data_analysis/mod.rs
