// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// A transcript line that looked like a marker but carried an unreadable number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line_number}: {reason} in {content:?}")]
pub struct ParseError {
    pub line_number: usize, // 1-based
    pub content: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(line_number: usize, content: &str, reason: impl Into<String>) -> Self {
        Self {
            line_number,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}

/// Too few points for a regression or an interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("insufficient data: {required} distinct points required, {available} available")]
pub struct InsufficientDataError {
    pub required: usize,
    pub available: usize,
}

/// Failures of the collaborators around the core: files, CSV, bundles, style.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write NPZ bundle: {0}")]
    Npz(#[from] ndarray_npy::WriteNpzError),

    #[error("invalid style file '{}': {source}", path.display())]
    Style {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid style file '{}': {reason}", path.display())]
    InvalidStyle { path: PathBuf, reason: String },

    #[error("no usable {0} found")]
    NoData(String),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}

// src/error.rs
