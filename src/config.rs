//! Run configuration
//!
//! One `RunConfig` is built up front and threaded through every stage.
//! Workspace paths live here so concurrent runs can use disjoint roots.

use crate::training::ModelKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Raw training CSV (features + id + binary target)
    pub train_path: PathBuf,

    /// Raw test CSV (features + id, no target)
    pub test_path: PathBuf,

    /// Workspace root owned by this run
    pub workspace: PathBuf,

    /// Identifier column name
    pub id_column: String,

    /// Binary target column name
    pub target_column: String,

    /// Extra columns excluded from feature processing
    pub exclude_columns: Vec<String>,

    /// Number of cross-validation folds
    pub cv_folds: usize,

    /// Seed for fold shuffling and model initialization
    pub seed: u64,

    /// Apply bio-signal interaction features before column processing
    pub engineer_features: bool,

    /// Models to benchmark, in roster order
    pub roster: Vec<ModelKind>,

    /// Per-model blending weights (model name -> weight); missing models get 1.0
    pub blend_weights: Option<HashMap<String, f64>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/raw/train.csv"),
            test_path: PathBuf::from("data/raw/test.csv"),
            workspace: PathBuf::from("data"),
            id_column: "id".to_string(),
            target_column: "smoking".to_string(),
            exclude_columns: Vec::new(),
            cv_folds: 5,
            seed: 42,
            engineer_features: false,
            roster: ModelKind::ROSTER.to_vec(),
            blend_weights: None,
        }
    }
}

impl RunConfig {
    /// Create a configuration for the given input files and workspace root
    pub fn new(
        train_path: impl Into<PathBuf>,
        test_path: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            train_path: train_path.into(),
            test_path: test_path.into(),
            workspace: workspace.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the id column
    pub fn with_id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = name.into();
        self
    }

    /// Builder method to set the target column
    pub fn with_target_column(mut self, name: impl Into<String>) -> Self {
        self.target_column = name.into();
        self
    }

    /// Builder method to set the fold count
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Builder method to set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to restrict the model roster
    pub fn with_roster(mut self, roster: Vec<ModelKind>) -> Self {
        self.roster = roster;
        self
    }

    /// Builder method to enable interaction features
    pub fn with_engineered_features(mut self, enabled: bool) -> Self {
        self.engineer_features = enabled;
        self
    }

    /// Builder method to set blending weights
    pub fn with_blend_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.blend_weights = Some(weights);
        self
    }

    /// Columns never treated as features
    pub fn excluded_columns(&self) -> Vec<String> {
        let mut excluded = vec![self.id_column.clone(), self.target_column.clone()];
        excluded.extend(self.exclude_columns.iter().cloned());
        excluded
    }

    /// Directory for processed tables and scaling parameters
    pub fn processed_dir(&self) -> PathBuf {
        self.workspace.join("processed")
    }

    /// Directory for per-model and blended submission files
    pub fn submissions_dir(&self) -> PathBuf {
        self.processed_dir().join("submissions")
    }

    /// Processed training table (CSV)
    pub fn processed_train_csv(&self) -> PathBuf {
        self.processed_dir().join("train_standardized.csv")
    }

    /// Processed test table (CSV)
    pub fn processed_test_csv(&self) -> PathBuf {
        self.processed_dir().join("test_standardized.csv")
    }

    /// Processed training table (parquet)
    pub fn train_parquet(&self) -> PathBuf {
        self.processed_dir().join("train.parquet")
    }

    /// Processed test table (parquet)
    pub fn test_parquet(&self) -> PathBuf {
        self.processed_dir().join("test.parquet")
    }

    /// Per-column scaling parameters (JSON)
    pub fn scaling_params_path(&self) -> PathBuf {
        self.processed_dir().join("scaling_params.json")
    }

    /// Comparison table artifact (JSON)
    pub fn comparison_path(&self) -> PathBuf {
        self.processed_dir().join("comparison.json")
    }

    /// Leaderboard report path
    pub fn leaderboard_path(&self) -> PathBuf {
        self.processed_dir().join("leaderboard.txt")
    }

    /// Blended submission output path
    pub fn blended_path(&self) -> PathBuf {
        self.submissions_dir().join("blended_final.csv")
    }

    /// Path of a per-model submission file
    pub fn submission_path(&self, model_name: &str) -> PathBuf {
        self.submissions_dir()
            .join(format!("{model_name}_submission.csv"))
    }

    /// Create the workspace directory tree
    pub fn ensure_workspace(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.processed_dir())?;
        std::fs::create_dir_all(self.submissions_dir())?;
        Ok(())
    }
}
