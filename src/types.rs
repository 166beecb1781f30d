// src/types.rs
// Type aliases shared by the analysis and plotting layers

use std::error::Error;

/// Result type returned by every chart function.
pub type PlotResult = Result<(), Box<dyn Error>>;

/// `(x, y)` in data coordinates.
pub type Point = (f64, f64);

/// `(x, min, mean, max)` of one error bar.
pub type ErrorBarPoint = (f64, f64, f64, f64);

/// `(x_start, x_end, height)` of one histogram bar.
pub type BarBin = (f64, f64, f64);

/// `(x, y_low, y_high)` of a vertical span.
pub type Span = (f64, f64, f64);
