//! Stratified cross-validation

use crate::error::{BiobeatError, Result};
use crate::training::models::{Classifier, ModelKind};
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/validation split
#[derive(Debug, Clone)]
pub struct CvSplit {
    pub train_indices: Vec<usize>,
    pub val_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Held-out labels and probabilities from one fold
#[derive(Debug, Clone)]
pub struct FoldResult {
    pub y_true: Array1<f64>,
    pub y_prob: Array1<f64>,
}

/// Stratified k-fold splitter, deterministic for a fixed seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate splits preserving the class balance of `y` per fold.
    ///
    /// Every row lands in exactly one validation fold. Train and validation
    /// index lists come out in ascending row order.
    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<CvSplit>> {
        let n_samples = y.len();
        if self.n_splits < 2 {
            return Err(BiobeatError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(BiobeatError::ValidationError(format!(
                "n_samples ({n_samples}) must be >= n_splits ({})",
                self.n_splits
            )));
        }

        // Group rows per class, classes in sorted order for determinism
        let mut classes: Vec<i64> = y.iter().map(|&v| v.round() as i64).collect();
        classes.sort_unstable();
        classes.dedup();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut fold_of = vec![0usize; n_samples];

        for &class in &classes {
            let mut members: Vec<usize> = (0..n_samples)
                .filter(|&i| y[i].round() as i64 == class)
                .collect();
            if self.shuffle {
                members.shuffle(&mut rng);
            }
            for (pos, &idx) in members.iter().enumerate() {
                fold_of[idx] = pos % self.n_splits;
            }
        }

        let splits = (0..self.n_splits)
            .map(|fold_idx| {
                let val_indices: Vec<usize> =
                    (0..n_samples).filter(|&i| fold_of[i] == fold_idx).collect();
                let train_indices: Vec<usize> =
                    (0..n_samples).filter(|&i| fold_of[i] != fold_idx).collect();
                CvSplit {
                    train_indices,
                    val_indices,
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }
}

/// Run k-fold CV with a fresh model per fold from an arbitrary factory.
///
/// Holdout labels never reach `fit`; the factory guarantees no state leaks
/// across folds.
pub fn run_cv_with<F>(
    factory: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    n_splits: usize,
    seed: u64,
) -> Result<Vec<FoldResult>>
where
    F: Fn() -> Box<dyn Classifier>,
{
    let splitter = StratifiedKFold::new(n_splits).with_seed(seed);
    let splits = splitter.split(y)?;

    let mut results = Vec::with_capacity(splits.len());
    for split in splits {
        let x_train = x.select(Axis(0), &split.train_indices);
        let y_train: Array1<f64> =
            Array1::from_vec(split.train_indices.iter().map(|&i| y[i]).collect());
        let x_val = x.select(Axis(0), &split.val_indices);
        let y_val: Array1<f64> =
            Array1::from_vec(split.val_indices.iter().map(|&i| y[i]).collect());

        let mut model = factory();
        model.fit(&x_train, &y_train)?;
        let y_prob = model.predict_proba(&x_val)?;

        results.push(FoldResult {
            y_true: y_val,
            y_prob,
        });
    }

    Ok(results)
}

/// Run k-fold CV for one roster model.
pub fn run_cv(
    kind: ModelKind,
    x: &Array2<f64>,
    y: &Array1<f64>,
    n_splits: usize,
    seed: u64,
) -> Result<Vec<FoldResult>> {
    run_cv_with(|| kind.build(seed), x, y, n_splits, seed)
}
