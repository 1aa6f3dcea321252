//! Submission file writing

use crate::error::{BiobeatError, Result};
use ndarray::Array1;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write an (identifier, probability) submission CSV.
///
/// Row order matches the test input; the file is never rewritten once
/// complete.
pub fn write_submission(
    path: &Path,
    id_header: &str,
    prob_header: &str,
    ids: &[String],
    probs: &Array1<f64>,
) -> Result<()> {
    if ids.len() != probs.len() {
        return Err(BiobeatError::ShapeError {
            expected: format!("{} probabilities", ids.len()),
            actual: format!("{}", probs.len()),
        });
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{id_header},{prob_header}")?;
    for (id, prob) in ids.iter().zip(probs.iter()) {
        writeln!(writer, "{id},{prob}")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn test_write_submission_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model_submission.csv");
        let ids = vec!["10".to_string(), "11".to_string()];
        let probs = array![0.25, 0.9];

        write_submission(&path, "id", "smoking", &ids, &probs).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,smoking\n10,0.25\n11,0.9\n");
    }

    #[test]
    fn test_length_mismatch_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        let ids = vec!["1".to_string()];
        let probs = array![0.5, 0.6];
        assert!(write_submission(&path, "id", "smoking", &ids, &probs).is_err());
    }
}
