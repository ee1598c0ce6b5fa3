//! Batch statistics and advantage standardization

/// Standard deviations below this are treated as zero variance
pub const MIN_STD: f32 = 1e-8;

/// Population mean and standard deviation
///
/// Accumulates in f64 so long batches of small advantages keep their
/// precision. Returns `(0.0, 0.0)` for an empty slice.
pub fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
    (mean as f32, var.sqrt() as f32)
}

/// Shift and scale `values` in place to zero mean and unit variance
///
/// A batch whose standard deviation is below [`MIN_STD`] is left untouched.
///
/// # Returns
/// Whether the values were rescaled
pub fn standardize(values: &mut [f32]) -> bool {
    let (mean, std) = mean_std(values);
    if std < MIN_STD {
        return false;
    }

    for v in values.iter_mut() {
        *v = (*v - mean) / std;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_std() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((mean - 2.5).abs() < 1e-6);
        assert!((std - 1.25_f32.sqrt()).abs() < 1e-6);

        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_standardize_unit_variance() {
        let mut values = vec![3.0, -1.0, 7.5, 0.25, 2.0, 10.0];
        assert!(standardize(&mut values));

        let (mean, std) = mean_std(&values);
        assert!(mean.abs() < 1e-5);
        assert!((std - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_standardize_zero_variance_unchanged() {
        let mut values = vec![2.5; 10];
        assert!(!standardize(&mut values));
        assert_eq!(values, vec![2.5; 10]);

        let mut single = vec![-4.0];
        assert!(!standardize(&mut single));
        assert_eq!(single, vec![-4.0]);
    }

    #[test]
    fn test_standardize_preserves_order() {
        let mut values = vec![1.0, 5.0, 3.0];
        standardize(&mut values);
        assert!(values[0] < values[2] && values[2] < values[1]);
    }
}
