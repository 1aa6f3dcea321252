//! Linear probability model
//!
//! Ridge-regularized least squares on the 0/1 labels, predictions clipped
//! to the unit interval. A weak baseline kept in the roster for reference.

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    /// L2 regularization strength
    pub alpha: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    pub tol: f64,
    is_fitted: bool,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearModel {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            alpha: 0.1,
            max_iter: 500,
            learning_rate: 0.05,
            tol: 1e-6,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

impl Classifier for LinearModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(BiobeatError::ShapeError {
                expected: format!("{n_samples} labels"),
                actual: format!("{}", y.len()),
            });
        }

        let mut weights = Array1::zeros(x.ncols());
        let mut bias = y.mean().unwrap_or(0.0);

        for _ in 0..self.max_iter {
            let predictions = x.dot(&weights) + bias;
            let errors = &predictions - y;

            let dw = (x.t().dot(&errors) * 2.0 / n_samples as f64) + self.alpha * &weights;
            let db = 2.0 * errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - self.learning_rate * dw;
            bias -= self.learning_rate * db;
        }

        self.coefficients = Some(weights);
        self.intercept = bias;
        self.is_fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(BiobeatError::ModelNotFitted);
        }
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(BiobeatError::ModelNotFitted)?;

        let raw = x.dot(coefficients) + self.intercept;
        Ok(raw.mapv(|v| v.clamp(0.0, 1.0)))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.coefficients.as_ref().map(|c| c.mapv(f64::abs))
    }
}
