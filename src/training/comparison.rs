//! Model comparison
//!
//! Runs cross-validation for each roster model, averages per-fold metrics,
//! and ranks the results by AUC. A model that fails anywhere is logged and
//! omitted; a bad model never blocks the rest of the roster.

use crate::error::{BiobeatError, Result};
use crate::evaluation::ClassificationMetrics;
use crate::training::cross_validation::{run_cv_with, FoldResult};
use crate::training::models::{Classifier, ModelKind};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One leaderboard row: a model with its fold-averaged metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub accuracy: f64,
    pub auc: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

/// Comparison results ordered descending by AUC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonTable {
    rows: Vec<ModelScore>,
}

impl ComparisonTable {
    /// Build a table from unordered rows; sorts descending by AUC with a
    /// stable sort so ties keep their roster order.
    pub fn from_rows(mut rows: Vec<ModelScore>) -> Self {
        rows.sort_by(|a, b| b.auc.partial_cmp(&a.auc).unwrap_or(std::cmp::Ordering::Equal));
        Self { rows }
    }

    pub fn rows(&self) -> &[ModelScore] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest-AUC row.
    pub fn winner(&self) -> Option<&ModelScore> {
        self.rows.first()
    }

    /// Save the table to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let table: Self = serde_json::from_str(&json)?;
        Ok(table)
    }
}

/// Average per-fold metrics for one model's CV results.
fn aggregate_folds(folds: &[FoldResult]) -> Result<ClassificationMetrics> {
    let mut per_fold = Vec::with_capacity(folds.len());
    for fold in folds {
        let y_pred: Array1<f64> = fold.y_prob.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 });
        per_fold.push(ClassificationMetrics::compute(
            &fold.y_true,
            &y_pred,
            &fold.y_prob,
        )?);
    }
    Ok(ClassificationMetrics::mean(&per_fold))
}

/// Evaluate one model factory under CV and produce its leaderboard row.
pub fn evaluate_model<F>(
    name: &str,
    factory: F,
    x: &Array2<f64>,
    y: &Array1<f64>,
    n_splits: usize,
    seed: u64,
) -> Result<ModelScore>
where
    F: Fn() -> Box<dyn Classifier>,
{
    let folds = run_cv_with(factory, x, y, n_splits, seed)?;
    let mean = aggregate_folds(&folds)?;
    Ok(ModelScore {
        model: name.to_string(),
        accuracy: mean.accuracy,
        auc: mean.auc,
        f1: mean.f1,
        precision: mean.precision,
        recall: mean.recall,
    })
}

/// Compare every roster model under k-fold CV.
pub fn compare_models(
    roster: &[ModelKind],
    x: &Array2<f64>,
    y: &Array1<f64>,
    n_splits: usize,
    seed: u64,
) -> Result<ComparisonTable> {
    if roster.is_empty() {
        return Err(BiobeatError::TrainingError(
            "empty model roster".to_string(),
        ));
    }

    let mut rows = Vec::with_capacity(roster.len());
    for &kind in roster {
        info!(model = kind.name(), folds = n_splits, "running cross-validation");
        match evaluate_model(kind.name(), || kind.build(seed), x, y, n_splits, seed) {
            Ok(score) => {
                info!(model = kind.name(), auc = score.auc, "finished");
                rows.push(score);
            }
            Err(e) => {
                warn!(model = kind.name(), error = %e, "model failed, omitting from comparison");
            }
        }
    }

    Ok(ComparisonTable::from_rows(rows))
}
