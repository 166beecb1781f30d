// src/lib.rs - Library interface for the analysis pipeline and the CLI

pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod figure_export;
pub mod font_config;
pub mod plot_framework;
pub mod plot_functions;
pub mod plot_style;
pub mod types;
pub mod workflows;

// Expose crate version fixed at compile time.
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
