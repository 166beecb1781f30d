// src/data_analysis/histogram.rs

/// One histogram bin `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over the data's own range. A constant input gets a
/// unit-wide range centred on its value. Non-finite values are ignored.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i == bins - 1 { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_cover_all_values() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, 1.0];
        let bins = histogram(&values, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2); // 0.5 falls into the upper bin
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[1].upper, 1.0);
    }

    #[test]
    fn test_constant_input() {
        let bins = histogram(&[2.0, 2.0], 15);
        assert_eq!(bins.len(), 15);
        assert_eq!(bins[0].lower, 1.5);
        assert_eq!(bins[14].upper, 2.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_empty_and_nan() {
        assert!(histogram(&[], 15).is_empty());
        assert!(histogram(&[f64::NAN], 15).is_empty());
    }
}
