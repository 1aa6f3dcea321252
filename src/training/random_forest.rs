//! Random forest classifier

use crate::error::{BiobeatError, Result};
use crate::training::models::Classifier;
use crate::training::tree::{RegressionTree, TreeConfig};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged trees over bootstrap samples with a random feature subspace per
/// tree. Probabilities are the mean of the trees' leaf values on the 0/1
/// labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub random_state: Option<u64>,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: 10,
            min_samples_leaf: 2,
            random_state: None,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }
}

impl Classifier for RandomForestClassifier {
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
                "cannot fit a forest on zero samples".to_string(),
            ));
        }

        self.n_features = n_features;
        let max_features = ((n_features as f64).sqrt().ceil() as usize).max(1);
        let base_seed = self.random_state.unwrap_or(42);
        let tree_config = TreeConfig {
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            ..Default::default()
        };

        let trees: Vec<Result<RegressionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                // Bootstrap rows
                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();
                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                // Random feature subspace for this tree
                let mut features: Vec<usize> = (0..n_features).collect();
                features.shuffle(&mut rng);
                features.truncate(max_features);
                features.sort_unstable();

                let mut tree = RegressionTree::new(tree_config);
                tree.fit_with_features(&x_boot, &y_boot, &features)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees.into_iter().collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(BiobeatError::ModelNotFitted);
        }

        let mut proba = Array1::zeros(x.nrows());
        for tree in &self.trees {
            proba = proba + tree.predict(x);
        }
        proba /= self.trees.len() as f64;
        Ok(proba.mapv(|p| p.clamp(0.0, 1.0)))
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.trees.is_empty() || self.n_features == 0 {
            return None;
        }

        let mut totals = vec![0.0f64; self.n_features];
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

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let n = 60;
        let x = Array2::from_shape_fn((n, 3), |(i, j)| {
            let base = if i < n / 2 { 0.0 } else { 5.0 };
            base + ((i * 7 + j * 13) % 11) as f64 * 0.1
        });
        let y = Array1::from_shape_fn(n, |i| if i < n / 2 { 0.0 } else { 1.0 });
        (x, y)
    }

    #[test]
    fn test_forest_separates() {
        let (x, y) = separable_data();
        let mut forest = RandomForestClassifier::new(20).with_random_state(42);
        forest.fit(&x, &y).unwrap();

        let proba = forest.predict_proba(&x).unwrap();
        let correct = proba
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (**p >= 0.5) == (**t > 0.5))
            .count();
        assert!(correct as f64 / y.len() as f64 > 0.9);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = separable_data();
        let mut a = RandomForestClassifier::new(10).with_random_state(7);
        let mut b = RandomForestClassifier::new(10).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(
            a.predict_proba(&x).unwrap().to_vec(),
            b.predict_proba(&x).unwrap().to_vec()
        );
    }

    #[test]
    fn test_importances_normalized() {
        let (x, y) = separable_data();
        let mut forest = RandomForestClassifier::new(10).with_random_state(1);
        forest.fit(&x, &y).unwrap();
        let imp = forest.feature_importances().unwrap();
        assert_eq!(imp.len(), 3);
        assert!((imp.sum() - 1.0).abs() < 1e-9);
    }
}
