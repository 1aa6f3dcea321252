//! First-order gradient boosting
//!
//! Classic GBM: each round fits a regression tree to the residual
//! y - sigmoid(raw) and nudges the raw score by the shrunken tree output.

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use crate::training::tree::{RegressionTree, TreeConfig};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub subsample: f64,
    pub random_state: Option<u64>,
}

impl Default for GbmConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            subsample: 1.0,
            random_state: Some(42),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmClassifier {
    config: GbmConfig,
    trees: Vec<RegressionTree>,
    base_score: f64,
    is_fitted: bool,
}

impl GbmClassifier {
    pub fn new(config: GbmConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            is_fitted: false,
        }
    }

    fn sigmoid(v: f64) -> f64 {
        1.0 / (1.0 + (-v).exp())
    }
}

impl Classifier for GbmClassifier {
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
                "cannot boost on zero samples".to_string(),
            ));
        }

        let p = y.mean().unwrap_or(0.5).clamp(1e-7, 1.0 - 1e-7);
        self.base_score = (p / (1.0 - p)).ln();
        let mut raw = Array1::from_elem(n_samples, self.base_score);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            ..Default::default()
        };

        self.trees.clear();
        for _ in 0..self.config.n_estimators {
            let residuals: Array1<f64> = y - &raw.mapv(Self::sigmoid);

            let mut tree = RegressionTree::new(tree_config);
            if self.config.subsample < 1.0 {
                let k = ((n_samples as f64) * self.config.subsample).ceil() as usize;
                let mut rows: Vec<usize> = (0..n_samples).collect();
                rows.shuffle(&mut rng);
                rows.truncate(k.max(1));
                rows.sort_unstable();

                let x_sub = x.select(Axis(0), &rows);
                let r_sub: Array1<f64> =
                    Array1::from_vec(rows.iter().map(|&i| residuals[i]).collect());
                tree.fit(&x_sub, &r_sub)?;
            } else {
                tree.fit(x, &residuals)?;
            }

            raw = raw + self.config.learning_rate * tree.predict(x);
            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(BiobeatError::ModelNotFitted);
        }

        let mut raw = Array1::from_elem(x.nrows(), self.base_score);
        for tree in &self.trees {
            raw = raw + self.config.learning_rate * tree.predict(x);
        }
        Ok(raw.mapv(Self::sigmoid))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        let tree = self.trees.first()?;
        let n_features = tree.split_counts().len();
        let mut totals = vec![0.0f64; n_features];
        for tree in &self.trees {
            for (i, &c) in tree.split_counts().iter().enumerate() {
                totals[i] += c;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for t in totals.iter_mut() {
                *t /= sum;
            }
        }
        Some(Array1::from_vec(totals))
    }
}
