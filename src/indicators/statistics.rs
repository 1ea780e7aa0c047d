/// Arithmetic mean, or None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
///
/// Needs at least two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Rolling sample standard deviation aligned with the input
///
/// Entry `i` covers `values[i + 1 - period..=i]`; entries before the first
/// full window are None.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                sample_std_dev(&values[i + 1 - period..=i])
            }
        })
        .collect()
}

/// Largest value, ignoring NaN
pub fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).reduce(f64::max)
}

/// Smallest value, ignoring NaN
pub fn min_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[100.0, 102.0, 104.0, 106.0, 108.0]), Some(104.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_std_dev() {
        // Classic example: population std 2.0, sample std sqrt(32/7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = sample_std_dev(&values).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_dev_insufficient_data() {
        assert!(sample_std_dev(&[1.0]).is_none());
    }

    #[test]
    fn test_constant_series_has_zero_std() {
        assert_eq!(sample_std_dev(&[5.0; 10]), Some(0.0));
    }

    #[test]
    fn test_rolling_std_alignment() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let rolling = rolling_std(&values, 3);

        assert_eq!(rolling.len(), 5);
        assert!(rolling[0].is_none());
        assert!(rolling[1].is_none());
        // Window [1, 2, 3] -> sample std 1.0
        assert!((rolling[2].unwrap() - 1.0).abs() < 1e-12);
        assert!((rolling[4].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_zero_period() {
        assert!(rolling_std(&[1.0, 2.0], 0).iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_max_min() {
        let values = [3.0, 9.0, f64::NAN, -1.0];
        assert_eq!(max_value(&values), Some(9.0));
        assert_eq!(min_value(&values), Some(-1.0));
        assert_eq!(max_value(&[]), None);
    }
}
