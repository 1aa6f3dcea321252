//! Binary classification metrics

use crate::error::{BiobeatError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Per-fold (or aggregated) classification metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub auc: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

impl ClassificationMetrics {
    /// Compute all metrics from true labels, thresholded predictions, and
    /// probabilities.
    pub fn compute(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        y_prob: &Array1<f64>,
    ) -> Result<Self> {
        Ok(Self {
            accuracy: accuracy_score(y_true, y_pred),
            auc: roc_auc_score(y_true, y_prob)?,
            f1: f1_score(y_true, y_pred),
            precision: precision_score(y_true, y_pred),
            recall: recall_score(y_true, y_pred),
        })
    }

    /// Arithmetic mean of a set of fold metrics.
    pub fn mean(folds: &[Self]) -> Self {
        let n = folds.len().max(1) as f64;
        Self {
            accuracy: folds.iter().map(|m| m.accuracy).sum::<f64>() / n,
            auc: folds.iter().map(|m| m.auc).sum::<f64>() / n,
            f1: folds.iter().map(|m| m.f1).sum::<f64>() / n,
            precision: folds.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: folds.iter().map(|m| m.recall).sum::<f64>() / n,
        }
    }
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        match (*t > 0.5, *p > 0.5) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}

/// Fraction of correct predictions.
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t > 0.5) == (*p > 0.5))
        .count();
    correct as f64 / y_true.len() as f64
}

/// Precision with zero-division defined as 0.
pub fn precision_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let (tp, fp, _, _) = confusion_counts(y_true, y_pred);
    if tp + fp == 0 {
        0.0
    } else {
        tp as f64 / (tp + fp) as f64
    }
}

/// Recall with zero-division defined as 0.
pub fn recall_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let (tp, _, _, fn_) = confusion_counts(y_true, y_pred);
    if tp + fn_ == 0 {
        0.0
    } else {
        tp as f64 / (tp + fn_) as f64
    }
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub fn f1_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let p = precision_score(y_true, y_pred);
    let r = recall_score(y_true, y_pred);
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Area under the ROC curve via the rank-sum formulation.
///
/// Tied probabilities receive averaged ranks. A sample containing only one
/// class has no defined AUC and is an error, so a degenerate fold surfaces
/// as a model-evaluation failure instead of a silent score.
pub fn roc_auc_score(y_true: &Array1<f64>, y_prob: &Array1<f64>) -> Result<f64> {
    let n = y_true.len();
    if n != y_prob.len() {
        return Err(BiobeatError::ShapeError {
            expected: format!("{n} probabilities"),
            actual: format!("{}", y_prob.len()),
        });
    }

    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(BiobeatError::ComputationError(
            "ROC AUC is undefined for a single-class sample".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| y_prob[a].total_cmp(&y_prob[b]));

    // Assign ranks, averaging over ties
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && y_prob[order[j + 1]] == y_prob[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(t, _)| **t > 0.5)
        .map(|(_, r)| r)
        .sum();

    let auc = (rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64;
    Ok(auc)
}
