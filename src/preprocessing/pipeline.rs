//! Per-column preprocessing pipeline
//!
//! Processes one feature column at a time: parse (bad cells become NaN to
//! keep rows aligned), clean, impute non-finite cells with the clean
//! median, fit scaling parameters, standardize. Parameters and the median
//! always come from the training column and are reused verbatim on the
//! test column.
//!
//! Each scaled column lands in a transient single-column CSV; after all
//! columns the transients are combined side by side and deleted. A column
//! that fails is skipped on BOTH sides with a diagnostic, so the processed
//! train/test pair keeps schema parity.

use crate::config::RunConfig;
use crate::data::columns::{
    column_mapping, combine_columns, read_column_values, read_string_column, write_single_column,
    write_string_column,
};
use crate::engine::{clean_median, remove_invalids, scaling_parameters, apply_standardization};
use crate::error::{BiobeatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-column statistics fitted on the training split
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Median of the cleaned training column, used to impute bad cells
    pub median: f64,
    pub mean: f64,
    pub std: f64,
}

/// Output artifacts of one preprocessing run
#[derive(Debug, Clone)]
pub struct ProcessedTables {
    pub train_csv: PathBuf,
    pub test_csv: PathBuf,
    pub params_path: PathBuf,
    /// Feature columns that survived processing, in output order
    pub feature_columns: Vec<String>,
    /// Columns skipped with a diagnostic
    pub skipped_columns: Vec<String>,
}

/// Drives cleaning and scaling across all feature columns
pub struct ColumnPipeline<'a> {
    config: &'a RunConfig,
}

impl<'a> ColumnPipeline<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Process the train/test pair given as raw CSV paths.
    pub fn run(&self, train_path: &Path, test_path: &Path) -> Result<ProcessedTables> {
        let config = self.config;
        config.ensure_workspace()?;
        let processed_dir = config.processed_dir();

        let train_mapping = column_mapping(train_path)?;
        let test_mapping = column_mapping(test_path)?;
        let excluded = config.excluded_columns();

        let test_index_of = |header: &str| -> Option<usize> {
            test_mapping
                .iter()
                .find(|(_, name)| name == header)
                .map(|(i, _)| *i)
        };

        let mut stats_by_column: BTreeMap<String, ColumnStats> = BTreeMap::new();
        let mut feature_columns = Vec::new();
        let mut skipped_columns = Vec::new();
        let mut train_parts: Vec<PathBuf> = Vec::new();
        let mut test_parts: Vec<PathBuf> = Vec::new();
        let mut transients: Vec<PathBuf> = Vec::new();

        // Test rows are identified by the id column, carried through first
        let test_id_index = test_index_of(&config.id_column).ok_or_else(|| {
            BiobeatError::FeatureNotFound(config.id_column.clone())
        })?;
        let test_ids = read_string_column(test_path, test_id_index)?;
        let test_id_part = processed_dir.join("part_test_id.csv");
        write_string_column(&test_id_part, &config.id_column, &test_ids)?;
        test_parts.push(test_id_part.clone());
        transients.push(test_id_part);

        for (col_index, header) in &train_mapping {
            if excluded.contains(header) {
                continue;
            }

            match self.process_column(
                train_path,
                test_path,
                *col_index,
                header,
                test_index_of(header),
                &processed_dir,
            ) {
                Ok((train_part, test_part, stats)) => {
                    debug!(
                        column = header.as_str(),
                        mean = stats.mean,
                        std = stats.std,
                        "column standardized"
                    );
                    stats_by_column.insert(header.clone(), stats);
                    feature_columns.push(header.clone());
                    transients.push(train_part.clone());
                    transients.push(test_part.clone());
                    train_parts.push(train_part);
                    test_parts.push(test_part);
                }
                Err(e) => {
                    warn!(column = header.as_str(), error = %e, "skipping column");
                    skipped_columns.push(header.clone());
                }
            }
        }

        if feature_columns.is_empty() {
            self.cleanup(&transients);
            return Err(BiobeatError::PreprocessingError(
                "no usable feature columns after cleaning".to_string(),
            ));
        }

        // Train rows keep the raw target as the last column
        let train_target_index = train_mapping
            .iter()
            .find(|(_, name)| name == &config.target_column)
            .map(|(i, _)| *i)
            .ok_or_else(|| BiobeatError::FeatureNotFound(config.target_column.clone()))?;
        let targets = read_string_column(train_path, train_target_index)?;
        let target_part = processed_dir.join("part_train_target.csv");
        write_string_column(&target_part, &config.target_column, &targets)?;
        train_parts.push(target_part.clone());
        transients.push(target_part);

        let train_csv = config.processed_train_csv();
        let test_csv = config.processed_test_csv();
        let combine_result = combine_columns(&train_parts, &train_csv)
            .and_then(|()| combine_columns(&test_parts, &test_csv));
        self.cleanup(&transients);
        combine_result?;

        let params_path = config.scaling_params_path();
        let json = serde_json::to_string_pretty(&stats_by_column)?;
        std::fs::write(&params_path, json)?;

        info!(
            features = feature_columns.len(),
            skipped = skipped_columns.len(),
            "preprocessing complete"
        );

        Ok(ProcessedTables {
            train_csv,
            test_csv,
            params_path,
            feature_columns,
            skipped_columns,
        })
    }

    /// Clean, fit, and scale one column on both sides.
    fn process_column(
        &self,
        train_path: &Path,
        test_path: &Path,
        train_index: usize,
        header: &str,
        test_index: Option<usize>,
        processed_dir: &Path,
    ) -> Result<(PathBuf, PathBuf, ColumnStats)> {
        let test_index = test_index.ok_or_else(|| {
            BiobeatError::FeatureNotFound(format!("{header} not present in test file"))
        })?;

        let raw_train = read_column_values(train_path, train_index)?;
        let clean_train = remove_invalids(&raw_train);
        if clean_train.is_empty() {
            return Err(BiobeatError::PreprocessingError(format!(
                "column {header} has no numeric values"
            )));
        }

        let median = clean_median(&raw_train);
        let imputed_train = impute(&raw_train, median);
        let params = scaling_parameters(&imputed_train);
        let stats = ColumnStats {
            median,
            mean: params.mean,
            std: params.std,
        };

        let scaled_train = apply_standardization(&imputed_train, &params);
        let train_part = processed_dir.join(format!("part_train_{header}.csv"));
        write_single_column(&train_part, header, &scaled_train)?;

        // Test side reuses the training median and parameters
        let raw_test = read_column_values(test_path, test_index)?;
        let imputed_test = impute(&raw_test, median);
        let scaled_test = apply_standardization(&imputed_test, &params);
        let test_part = processed_dir.join(format!("part_test_{header}.csv"));
        write_single_column(&test_part, header, &scaled_test)?;

        Ok((train_part, test_part, stats))
    }

    fn cleanup(&self, transients: &[PathBuf]) {
        for path in transients {
            if let Err(e) = std::fs::remove_file(path) {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "failed to remove transient column file");
                }
            }
        }
    }
}

/// Replace non-finite cells with the training median.
fn impute(values: &[f64], median: f64) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v.is_finite() { v } else { median })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impute_replaces_only_non_finite() {
        let values = vec![1.0, f64::NAN, 3.0, f64::INFINITY];
        assert_eq!(impute(&values, 2.0), vec![1.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_impute_noop_on_clean_column() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(impute(&values, 9.0), values);
    }
}
