//! Percentiles with linear interpolation between closest ranks
//!
//! For `n` sorted samples the `p`-th percentile sits at fractional rank
//! `p / 100 * (n - 1)`; the value is interpolated between the two samples
//! around that rank.

use ndarray::ArrayView2;

/// Percentile `p` (0..=100) of an ascending-sorted slice.
///
/// Returns `None` for an empty slice or a `p` outside 0..=100.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=100.0).contains(&p) {
        return None;
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Strictly nonzero, non-NaN samples, sorted ascending.
///
/// Zero is the no-data sentinel of L1T band files.
pub fn nonzero_samples(data: ArrayView2<'_, f64>) -> Vec<f64> {
    let mut samples: Vec<f64> = data
        .iter()
        .copied()
        .filter(|v| *v != 0.0 && !v.is_nan())
        .collect();
    samples.sort_unstable_by(f64::total_cmp);
    samples
}

/// Low and high percentiles of the nonzero samples of `data`.
///
/// `None` when the band has no nonzero sample.
pub fn nonzero_percentiles(data: ArrayView2<'_, f64>, low: f64, high: f64) -> Option<(f64, f64)> {
    let samples = nonzero_samples(data);
    Some((percentile(&samples, low)?, percentile(&samples, high)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_percentile_interpolates_between_ranks() {
        let sorted = [10.0, 20.0, 30.0, 40.0];
        assert_relative_eq!(percentile(&sorted, 0.0).unwrap(), 10.0);
        assert_relative_eq!(percentile(&sorted, 1.0).unwrap(), 10.3, epsilon = 1e-12);
        assert_relative_eq!(percentile(&sorted, 50.0).unwrap(), 25.0);
        assert_relative_eq!(percentile(&sorted, 97.0).unwrap(), 39.1, epsilon = 1e-12);
        assert_relative_eq!(percentile(&sorted, 100.0).unwrap(), 40.0);
    }

    #[test]
    fn test_percentile_edge_cases() {
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[7.0], 97.0), Some(7.0));
        assert_eq!(percentile(&[1.0, 2.0], 101.0), None);
    }

    #[test]
    fn test_zero_samples_excluded() {
        let data = array![[0.0, 40.0], [10.0, 0.0], [30.0, 20.0]];
        assert_eq!(nonzero_samples(data.view()), vec![10.0, 20.0, 30.0, 40.0]);
        let (lo, hi) = nonzero_percentiles(data.view(), 1.0, 97.0).unwrap();
        assert_relative_eq!(lo, 10.3, epsilon = 1e-12);
        assert_relative_eq!(hi, 39.1, epsilon = 1e-12);
    }

    #[test]
    fn test_all_zero_band_has_no_percentiles() {
        let data = ndarray::Array2::<f64>::zeros((3, 3));
        assert_eq!(nonzero_percentiles(data.view(), 1.0, 97.0), None);
    }
}
