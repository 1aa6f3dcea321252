//! Linear support vector machine
//!
//! Hinge loss with L2 regularization, trained by SGD over shuffled epochs.
//! Probabilities come from a fixed logistic squashing of the margin.

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmClassifier {
    weights: Option<Array1<f64>>,
    bias: f64,
    /// Regularization strength (weight decay per update)
    pub lambda: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub random_state: Option<u64>,
    is_fitted: bool,
}

impl Default for SvmClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SvmClassifier {
    pub fn new() -> Self {
        Self {
            weights: None,
            bias: 0.0,
            lambda: 1e-4,
            epochs: 50,
            learning_rate: 0.01,
            random_state: None,
            is_fitted: false,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }
}

impl Classifier for SvmClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(BiobeatError::ShapeError {
                expected: format!("{n_samples} labels"),
                actual: format!("{}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(BiobeatError::TrainingError(
                "cannot fit an SVM on zero samples".to_string(),
            ));
        }

        // Hinge loss works on {-1, +1} targets
        let targets: Vec<f64> = y.iter().map(|&v| if v > 0.5 { 1.0 } else { -1.0 }).collect();

        let mut weights = Array1::zeros(x.ncols());
        let mut bias = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));
        let mut order: Vec<usize> = (0..n_samples).collect();

        for epoch in 0..self.epochs {
            order.shuffle(&mut rng);
            let lr = self.learning_rate / (1.0 + epoch as f64 * 0.1);

            for &i in &order {
                let row = x.row(i);
                let margin = row.dot(&weights) + bias;

                if targets[i] * margin < 1.0 {
                    let update = &row.mapv(|v| v * targets[i] * lr) - &(&weights * (lr * self.lambda));
                    weights = weights + update;
                    bias += lr * targets[i];
                } else {
                    weights = &weights - &(&weights * (lr * self.lambda));
                }
            }
        }

        self.weights = Some(weights);
        self.bias = bias;
        self.is_fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(BiobeatError::ModelNotFitted);
        }
        let weights = self.weights.as_ref().ok_or(BiobeatError::ModelNotFitted)?;

        let margins = x.dot(weights) + self.bias;
        Ok(margins.mapv(|m| 1.0 / (1.0 + (-m).exp())))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.weights.as_ref().map(|w| w.mapv(f64::abs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let n = 40;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let base = if i < n / 2 { -2.0 } else { 2.0 };
            base + ((i * 5 + j * 3) % 7) as f64 * 0.1
        });
        let y = Array1::from_shape_fn(n, |i| if i < n / 2 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn test_svm_separates() {
        let (x, y) = separable_data();
        let mut model = SvmClassifier::new().with_random_state(42);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        let correct = proba
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (**p >= 0.5) == (**t > 0.5))
            .count();
        assert!(correct as f64 / y.len() as f64 > 0.9);
    }

    #[test]
    fn test_unfitted_errors() {
        let model = SvmClassifier::new();
        assert!(model.predict_proba(&Array2::zeros((1, 2))).is_err());
    }
}
