//! Column standardization routines

use serde::{Deserialize, Serialize};

/// Mean and standard deviation fitted on one training column.
///
/// `std` is never degenerate: a zero standard deviation (constant column)
/// is replaced by 1.0, so standardizing a constant column yields zeros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub mean: f64,
    pub std: f64,
}

impl ScalingParams {
    /// Neutral parameters: identity shift, unit scale.
    pub fn neutral() -> Self {
        Self { mean: 0.0, std: 1.0 }
    }

    /// Fit parameters from a column using population formulas.
    ///
    /// Empty input returns the neutral (0.0, 1.0) default.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::neutral();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let variance_sum: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std = (variance_sum / n).sqrt();

        Self {
            mean,
            std: if std == 0.0 { 1.0 } else { std },
        }
    }
}

/// Fit scaling parameters from a training column.
pub fn scaling_parameters(values: &[f64]) -> ScalingParams {
    ScalingParams::from_values(values)
}

/// Apply z-score standardization with already-fitted parameters.
pub fn apply_standardization(values: &[f64], params: &ScalingParams) -> Vec<f64> {
    let mut scaled = Vec::with_capacity(values.len());
    for &val in values {
        scaled.push((val - params.mean) / params.std);
    }
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_population_formula() {
        let params = scaling_parameters(&[10.0, 20.0, 30.0]);
        assert!((params.mean - 20.0).abs() < TOL);
        // population std: sqrt(200/3)
        assert!((params.std - (200.0f64 / 3.0).sqrt()).abs() < TOL);
        assert!((params.std - 8.165).abs() < 1e-3);
    }

    #[test]
    fn test_empty_input_neutral() {
        assert_eq!(scaling_parameters(&[]), ScalingParams::neutral());
    }

    #[test]
    fn test_constant_column_scales_to_zeros() {
        let params = scaling_parameters(&[5.0, 5.0, 5.0, 5.0]);
        assert_eq!(params.std, 1.0);
        let scaled = apply_standardization(&[5.0, 5.0, 5.0, 5.0], &params);
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_scaled_mean_zero_std_one() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let params = scaling_parameters(&values);
        let scaled = apply_standardization(&values, &params);

        let n = scaled.len() as f64;
        let mean = scaled.iter().sum::<f64>() / n;
        let std = (scaled.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt();

        assert!(mean.abs() < TOL);
        assert!((std - 1.0).abs() < TOL);
    }

    #[test]
    fn test_empty_column_scales_to_empty() {
        let scaled = apply_standardization(&[], &ScalingParams::neutral());
        assert!(scaled.is_empty());
    }
}
