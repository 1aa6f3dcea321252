//! Hyperparameter search for the boosted-tree model
//!
//! Seeded random search over {n_estimators, max_depth, learning_rate},
//! scored by 3-fold CV mean AUC.

use crate::error::{BiobeatError, Result};
use crate::evaluation::roc_auc_score;
use crate::training::boosted_trees::{BoostedTreesClassifier, BoostedTreesConfig};
use crate::training::cross_validation::run_cv_with;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

const TUNING_FOLDS: usize = 3;

/// Best parameters found by the search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningResult {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub auc: f64,
}

fn cv_auc(config: &BoostedTreesConfig, x: &Array2<f64>, y: &Array1<f64>, seed: u64) -> Result<f64> {
    let folds = run_cv_with(
        || {
            Box::new(BoostedTreesClassifier::new(config.clone()))
        },
        x,
        y,
        TUNING_FOLDS,
        seed,
    )?;

    let mut total = 0.0;
    for fold in &folds {
        total += roc_auc_score(&fold.y_true, &fold.y_prob)?;
    }
    Ok(total / folds.len() as f64)
}

/// Random search over boosted-tree parameters.
pub fn tune_boosted_trees(
    x: &Array2<f64>,
    y: &Array1<f64>,
    n_trials: usize,
    seed: u64,
) -> Result<TuningResult> {
    if n_trials == 0 {
        return Err(BiobeatError::TrainingError(
            "tuning requires at least one trial".to_string(),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut best: Option<TuningResult> = None;

    for trial in 0..n_trials {
        let n_estimators = rng.gen_range(50..=300);
        let max_depth = rng.gen_range(3..=10);
        // log-uniform over [0.01, 0.3]
        let ln_lo = 0.01f64.ln();
        let ln_hi = 0.3f64.ln();
        let learning_rate = (ln_lo + rng.gen::<f64>() * (ln_hi - ln_lo)).exp();

        let config = BoostedTreesConfig {
            n_estimators,
            max_depth,
            learning_rate,
            random_state: Some(seed),
            ..Default::default()
        };

        let auc = cv_auc(&config, x, y, seed)?;
        info!(trial, n_estimators, max_depth, learning_rate, auc, "tuning trial");

        let improves = match &best {
            Some(b) => auc > b.auc,
            None => true,
        };
        if improves {
            best = Some(TuningResult {
                n_estimators,
                max_depth,
                learning_rate,
                auc,
            });
        }
    }

    best.ok_or_else(|| BiobeatError::TrainingError("no tuning trial succeeded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_returns_best_of_trials() {
        let n = 30;
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i + j) as f64);
        let y = Array1::from_shape_fn(n, |i| if i < n / 2 { 0.0 } else { 1.0 });

        let result = tune_boosted_trees(&x, &y, 2, 42).unwrap();
        assert!(result.n_estimators >= 50 && result.n_estimators <= 300);
        assert!(result.max_depth >= 3 && result.max_depth <= 10);
        assert!(result.learning_rate >= 0.01 && result.learning_rate <= 0.3);
        assert!(result.auc > 0.5);
    }

    #[test]
    fn test_zero_trials_errors() {
        let x = Array2::zeros((10, 1));
        let y = Array1::from_shape_fn(10, |i| (i % 2) as f64);
        assert!(tune_boosted_trees(&x, &y, 0, 42).is_err());
    }
}
