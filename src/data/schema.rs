//! Train/test schema validation

use crate::data::columns::column_mapping;
use crate::error::{BiobeatError, Result};
use std::path::Path;

/// Verify that the test file carries every training feature.
///
/// Features are every training column except the target. Runs before any
/// modeling; a mismatch aborts the run.
pub fn validate_schemas(train_path: &Path, test_path: &Path, target_col: &str) -> Result<()> {
    let train_cols: Vec<String> = column_mapping(train_path)?
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    let test_cols: Vec<String> = column_mapping(test_path)?
        .into_iter()
        .map(|(_, name)| name)
        .collect();

    let train_features: Vec<&String> =
        train_cols.iter().filter(|c| c.as_str() != target_col).collect();

    if train_features.is_empty() {
        return Err(BiobeatError::ValidationError(
            "training file has no feature columns".to_string(),
        ));
    }

    let missing: Vec<&str> = train_features
        .iter()
        .filter(|c| !test_cols.contains(c))
        .map(|c| c.as_str())
        .collect();

    if !missing.is_empty() {
        return Err(BiobeatError::ValidationError(format!(
            "missing columns in test file: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}
