// src/data_analysis/regression.rs

use crate::data_analysis::smoothing::linspace;
use crate::error::InsufficientDataError;

/// Ordinary least-squares fit `y = slope * x + intercept`.
///
/// Needs at least two points with two distinct x values, otherwise the
/// slope is undefined.
pub fn linear_regression(xs: &[f64], ys: &[f64]) -> Result<(f64, f64), InsufficientDataError> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(InsufficientDataError {
            required: 2,
            available: n,
        });
    }
    let xs = &xs[..n];
    let ys = &ys[..n];

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    if sxx == 0.0 {
        return Err(InsufficientDataError {
            required: 2,
            available: 1,
        });
    }

    let slope = sxy / sxx;
    Ok((slope, mean_y - slope * mean_x))
}

/// Fits `points` and samples the line over their x extent.
pub fn regression_line(
    points: &[(f64, f64)],
    samples: usize,
) -> Result<((f64, f64), Vec<(f64, f64)>), InsufficientDataError> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().copied().unzip();
    let (slope, intercept) = linear_regression(&xs, &ys)?;

    let x_min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let line = linspace(x_min, x_max, samples)
        .into_iter()
        .map(|x| (x, slope * x + intercept))
        .collect();
    Ok(((slope, intercept), line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line_is_recovered() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| -3.0 * x - 60.0).collect();
        let (slope, intercept) = linear_regression(&xs, &ys).unwrap();
        assert!((slope + 3.0).abs() < 1e-12);
        assert!((intercept + 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_noisy_fit() {
        // Hand-computed: mean x = 2, mean y = 4, sxy = 3, sxx = 2.
        let (slope, intercept) = linear_regression(&[1.0, 2.0, 3.0], &[2.0, 5.0, 5.0]).unwrap();
        assert!((slope - 1.5).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            linear_regression(&[1.0], &[2.0]),
            Err(InsufficientDataError {
                required: 2,
                available: 1
            })
        );
        assert!(linear_regression(&[], &[]).is_err());
    }

    #[test]
    fn test_single_distinct_x_is_rejected() {
        assert!(linear_regression(&[2.0, 2.0, 2.0], &[-70.0, -71.0, -69.0]).is_err());
    }

    #[test]
    fn test_line_spans_x_extent() {
        let points = [(1.0, -60.0), (5.0, -80.0), (3.0, -70.0)];
        let ((slope, _), line) = regression_line(&points, 5).unwrap();
        assert!((slope + 5.0).abs() < 1e-12);
        assert_eq!(line.len(), 5);
        assert_eq!(line[0].0, 1.0);
        assert_eq!(line[4].0, 5.0);
        assert!((line[4].1 + 80.0).abs() < 1e-9);
    }
}
