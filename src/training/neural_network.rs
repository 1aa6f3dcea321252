//! Multi-layer perceptron
//!
//! One hidden layer with tanh activation and a sigmoid output, trained by
//! full-batch gradient descent on binary cross-entropy.

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpConfig {
    pub hidden_units: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub random_state: Option<u64>,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_units: 16,
            epochs: 300,
            learning_rate: 0.05,
            random_state: Some(42),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    config: MlpConfig,
    w1: Option<Array2<f64>>,
    b1: Option<Array1<f64>>,
    w2: Option<Array1<f64>>,
    b2: f64,
}

impl MlpClassifier {
    pub fn new(config: MlpConfig) -> Self {
        Self {
            config,
            w1: None,
            b1: None,
            w2: None,
            b2: 0.0,
        }
    }

    fn sigmoid(v: f64) -> f64 {
        1.0 / (1.0 + (-v).exp())
    }

    fn forward(
        &self,
        x: &Array2<f64>,
        w1: &Array2<f64>,
        b1: &Array1<f64>,
        w2: &Array1<f64>,
        b2: f64,
    ) -> (Array2<f64>, Array1<f64>) {
        let hidden = (x.dot(w1) + b1).mapv(f64::tanh);
        let out = (hidden.dot(w2) + b2).mapv(Self::sigmoid);
        (hidden, out)
    }
}

impl Classifier for MlpClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(BiobeatError::ShapeError {
                expected: format!("{n_samples} labels"),
                actual: format!("{}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(BiobeatError::TrainingError(
                "cannot fit an MLP on zero samples".to_string(),
            ));
        }

        let h = self.config.hidden_units;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state.unwrap_or(42));

        // Small symmetric init scaled by fan-in
        let scale = (1.0 / n_features as f64).sqrt();
        let mut w1 = Array2::from_shape_fn((n_features, h), |_| (rng.gen::<f64>() - 0.5) * scale);
        let mut b1 = Array1::zeros(h);
        let mut w2 = Array1::from_shape_fn(h, |_| (rng.gen::<f64>() - 0.5) * scale);
        let mut b2 = 0.0;

        let n = n_samples as f64;
        let lr = self.config.learning_rate;

        for _ in 0..self.config.epochs {
            let (hidden, out) = self.forward(x, &w1, &b1, &w2, b2);

            // Output gradient of BCE with sigmoid: p - y
            let delta_out = &out - y;

            let grad_w2 = hidden.t().dot(&delta_out) / n;
            let grad_b2 = delta_out.mean().unwrap_or(0.0);

            // Backprop through tanh: (1 - h^2)
            let mut delta_hidden = Array2::zeros(hidden.raw_dim());
            for i in 0..n_samples {
                for j in 0..h {
                    delta_hidden[[i, j]] =
                        delta_out[i] * w2[j] * (1.0 - hidden[[i, j]] * hidden[[i, j]]);
                }
            }

            let grad_w1 = x.t().dot(&delta_hidden) / n;
            let grad_b1 = delta_hidden.mean_axis(ndarray::Axis(0)).unwrap_or(Array1::zeros(h));

            w1 = w1 - lr * &grad_w1;
            b1 = b1 - lr * &grad_b1;
            w2 = w2 - lr * &grad_w2;
            b2 -= lr * grad_b2;
        }

        self.w1 = Some(w1);
        self.b1 = Some(b1);
        self.w2 = Some(w2);
        self.b2 = b2;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let (w1, b1, w2) = match (&self.w1, &self.b1, &self.w2) {
            (Some(w1), Some(b1), Some(w2)) => (w1, b1, w2),
            _ => return Err(BiobeatError::ModelNotFitted),
        };

        let (_, out) = self.forward(x, w1, b1, w2, self.b2);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let n = 40;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let base = if i < n / 2 { -1.5 } else { 1.5 };
            base + ((i * 3 + j * 7) % 5) as f64 * 0.1
        });
        let y = Array1::from_shape_fn(n, |i| if i < n / 2 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn test_mlp_separates() {
        let (x, y) = separable_data();
        let mut model = MlpClassifier::new(MlpConfig::default());
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        let correct = proba
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (**p >= 0.5) == (**t > 0.5))
            .count();
        assert!(correct as f64 / y.len() as f64 > 0.85);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = separable_data();
        let config = MlpConfig {
            epochs: 50,
            random_state: Some(3),
            ..Default::default()
        };
        let mut a = MlpClassifier::new(config.clone());
        let mut b = MlpClassifier::new(config);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(
            a.predict_proba(&x).unwrap().to_vec(),
            b.predict_proba(&x).unwrap().to_vec()
        );
    }

    #[test]
    fn test_unfitted_errors() {
        let model = MlpClassifier::new(MlpConfig::default());
        assert!(model.predict_proba(&Array2::zeros((1, 2))).is_err());
    }
}
