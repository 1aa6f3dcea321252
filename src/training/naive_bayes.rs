//! Gaussian Naive Bayes

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-class Gaussian statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassStats {
    prior_ln: f64,
    means: Vec<f64>,
    variances: Vec<f64>,
}

/// Gaussian Naive Bayes for binary targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes {
    negative: Option<ClassStats>,
    positive: Option<ClassStats>,
    /// Variance smoothing to keep likelihoods finite
    pub var_smoothing: f64,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            negative: None,
            positive: None,
            var_smoothing: 1e-9,
        }
    }

    fn class_stats(x: &Array2<f64>, indices: &[usize], prior_ln: f64, smoothing: f64) -> ClassStats {
        let n_features = x.ncols();
        let n = indices.len() as f64;

        let mut means = vec![0.0; n_features];
        for &i in indices {
            for (j, &val) in x.row(i).iter().enumerate() {
                means[j] += val;
            }
        }
        for m in means.iter_mut() {
            *m /= n;
        }

        let mut variances = vec![0.0; n_features];
        for &i in indices {
            for (j, &val) in x.row(i).iter().enumerate() {
                let d = val - means[j];
                variances[j] += d * d;
            }
        }
        for v in variances.iter_mut() {
            *v = *v / n + smoothing;
        }

        ClassStats {
            prior_ln,
            means,
            variances,
        }
    }

    fn log_likelihood(stats: &ClassStats, sample: &[f64]) -> f64 {
        stats.prior_ln
            + sample
                .iter()
                .zip(stats.means.iter())
                .zip(stats.variances.iter())
                .map(|((&xi, &mean), &var)| {
                    -0.5 * ((xi - mean).powi(2) / var + var.ln() + (2.0 * PI).ln())
                })
                .sum::<f64>()
    }
}

impl Classifier for GaussianNaiveBayes {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(BiobeatError::ShapeError {
                expected: format!("{n_samples} labels"),
                actual: format!("{}", y.len()),
            });
        }

        let pos_idx: Vec<usize> = (0..n_samples).filter(|&i| y[i] > 0.5).collect();
        let neg_idx: Vec<usize> = (0..n_samples).filter(|&i| y[i] <= 0.5).collect();

        if pos_idx.is_empty() || neg_idx.is_empty() {
            return Err(BiobeatError::TrainingError(
                "naive bayes requires both classes in the training data".to_string(),
            ));
        }

        let prior_pos = (pos_idx.len() as f64 / n_samples as f64).ln();
        let prior_neg = (neg_idx.len() as f64 / n_samples as f64).ln();

        self.positive = Some(Self::class_stats(x, &pos_idx, prior_pos, self.var_smoothing));
        self.negative = Some(Self::class_stats(x, &neg_idx, prior_neg, self.var_smoothing));
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (neg, pos) = match (&self.negative, &self.positive) {
            (Some(n), Some(p)) => (n, p),
            _ => return Err(BiobeatError::ModelNotFitted),
        };

        let mut proba = Array1::zeros(x.nrows());
        for (i, row) in x.rows().into_iter().enumerate() {
            let sample = row.to_vec();
            let log_pos = Self::log_likelihood(pos, &sample);
            let log_neg = Self::log_likelihood(neg, &sample);

            // P(pos | x) via the log-sum-exp trick
            let max = log_pos.max(log_neg);
            let denom = (log_pos - max).exp() + (log_neg - max).exp();
            proba[i] = (log_pos - max).exp() / denom;
        }
        Ok(proba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_data() -> (Array2<f64>, Array1<f64>) {
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(vec![-1.0 + (i as f64) * 0.1, -1.0 - (i as f64) * 0.05]);
        }
        for i in 0..10 {
            rows.push(vec![4.0 + (i as f64) * 0.1, 5.0 - (i as f64) * 0.05]);
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let x = Array2::from_shape_vec((20, 2), flat).unwrap();
        let y = Array1::from_shape_fn(20, |i| if i < 10 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn test_separates_clusters() {
        let (x, y) = clustered_data();
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();

        let proba = nb.predict_proba(&x).unwrap();
        for i in 0..10 {
            assert!(proba[i] < 0.5, "negative cluster got p = {}", proba[i]);
        }
        for i in 10..20 {
            assert!(proba[i] > 0.5, "positive cluster got p = {}", proba[i]);
        }
    }

    #[test]
    fn test_single_class_errors() {
        let x = Array2::zeros((5, 2));
        let y = Array1::from_vec(vec![1.0; 5]);
        let mut nb = GaussianNaiveBayes::new();
        assert!(nb.fit(&x, &y).is_err());
    }

    #[test]
    fn test_proba_bounds() {
        let (x, y) = clustered_data();
        let mut nb = GaussianNaiveBayes::new();
        nb.fit(&x, &y).unwrap();
        let proba = nb.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}
