// src/data_analysis/smoothing.rs
//
// Display-only smoothing. Nothing here feeds back into summary numbers.

use crate::error::InsufficientDataError;

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Centered rolling mean. Near the edges the window shrinks to the samples
/// that exist, so the output always has the input's length.
///
/// For even windows the extra sample sits on the left.
pub fn centered_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let left = window / 2;
    let right = window - left - 1;

    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(values.len() - 1);
            let slice = &values[lo..=hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Natural cubic spline (zero second derivative at both ends).
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    /// Builds the spline through `points`. Points are sorted by x; repeated
    /// x values keep their first y. At least two distinct x values are needed.
    pub fn natural(points: &[(f64, f64)]) -> Result<Self, InsufficientDataError> {
        let mut sorted: Vec<(f64, f64)> = points.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        sorted.dedup_by(|b, a| a.0 == b.0);

        let n = sorted.len();
        if n < 2 {
            return Err(InsufficientDataError {
                required: 2,
                available: n,
            });
        }

        let (xs, ys): (Vec<f64>, Vec<f64>) = sorted.into_iter().unzip();

        // Tridiagonal sweep for the interior second derivatives.
        let mut y2 = vec![0.0; n];
        let mut u = vec![0.0; n];
        for i in 1..n - 1 {
            let sig = (xs[i] - xs[i - 1]) / (xs[i + 1] - xs[i - 1]);
            let p = sig * y2[i - 1] + 2.0;
            y2[i] = (sig - 1.0) / p;
            let slope_diff = (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]) - (ys[i] - ys[i - 1]) / (xs[i] - xs[i - 1]);
            u[i] = (6.0 * slope_diff / (xs[i + 1] - xs[i - 1]) - sig * u[i - 1]) / p;
        }
        y2[n - 1] = 0.0;
        for k in (0..n - 1).rev() {
            y2[k] = y2[k] * y2[k + 1] + u[k];
        }
        y2[0] = 0.0;

        Ok(Self {
            xs,
            ys,
            second_derivatives: y2,
        })
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Value at `x`; outside the knots the end polynomial is extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let hi = self.xs.partition_point(|&k| k <= x).clamp(1, n - 1);
        let lo = hi - 1;

        let h = self.xs[hi] - self.xs[lo];
        let a = (self.xs[hi] - x) / h;
        let b = (x - self.xs[lo]) / h;
        a * self.ys[lo]
            + b * self.ys[hi]
            + ((a * a * a - a) * self.second_derivatives[lo] + (b * b * b - b) * self.second_derivatives[hi]) * (h * h)
                / 6.0
    }

    /// `samples` evenly spaced points across the knot range.
    pub fn sample(&self, samples: usize) -> Vec<(f64, f64)> {
        let (start, end) = self.x_range();
        linspace(start, end, samples)
            .into_iter()
            .map(|x| (x, self.evaluate(x)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let v = linspace(1.0, 3.0, 5);
        assert_eq!(v, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(4.0, 9.0, 1), vec![4.0]);
    }

    #[test]
    fn test_moving_average_shrinks_at_edges() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let smoothed = centered_moving_average(&values, 3);
        assert_eq!(smoothed, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
    }

    #[test]
    fn test_moving_average_window_seven() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let smoothed = centered_moving_average(&values, 7);
        assert_eq!(smoothed.len(), values.len());
        assert_eq!(smoothed[0], 1.5); // mean of 0..=3
        assert_eq!(smoothed[5], 5.0); // full window 2..=8
        assert_eq!(smoothed[9], 7.5); // mean of 6..=9
    }

    #[test]
    fn test_moving_average_degenerate_inputs() {
        assert!(centered_moving_average(&[], 7).is_empty());
        assert_eq!(centered_moving_average(&[-70.0], 7), vec![-70.0]);
        assert_eq!(centered_moving_average(&[1.0, 3.0], 0), vec![1.0, 3.0]);
    }

    #[test]
    fn test_spline_passes_through_knots() {
        let points = [(1.0, -60.0), (2.0, -66.0), (3.0, -64.0), (4.0, -71.0), (5.0, -75.0)];
        let spline = CubicSpline::natural(&points).unwrap();
        for (x, y) in points {
            assert!((spline.evaluate(x) - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spline_reproduces_a_line() {
        // Natural boundary conditions are exact for linear data.
        let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let spline = CubicSpline::natural(&points).unwrap();
        assert!((spline.evaluate(2.5) - 6.0).abs() < 1e-9);
        let samples = spline.sample(11);
        assert_eq!(samples.len(), 11);
        assert_eq!(samples[10].0, 5.0);
    }

    #[test]
    fn test_spline_sorts_and_dedups() {
        let points = [(3.0, 9.0), (1.0, 1.0), (1.0, 100.0), (2.0, 4.0)];
        let spline = CubicSpline::natural(&points).unwrap();
        assert_eq!(spline.x_range(), (1.0, 3.0));
        assert!((spline.evaluate(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_spline_needs_two_points() {
        assert!(CubicSpline::natural(&[(1.0, 2.0)]).is_err());
        assert!(CubicSpline::natural(&[(1.0, 2.0), (1.0, 3.0)]).is_err());
    }
}
