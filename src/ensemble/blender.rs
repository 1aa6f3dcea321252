//! Weighted submission blending
//!
//! Reads every per-model submission in a directory and writes one file of
//! weighted-average probabilities. Previous blend outputs are excluded so
//! a re-run never folds a blend into itself.

use crate::error::{BiobeatError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary of one blending run
#[derive(Debug, Clone)]
pub struct BlendOutcome {
    pub output_path: PathBuf,
    pub blended_models: Vec<String>,
    pub total_weight: f64,
}

/// One parsed submission file
struct Submission {
    model_name: String,
    header: String,
    ids: Vec<String>,
    probs: Vec<f64>,
}

fn read_submission(path: &Path) -> Result<Submission> {
    let model_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .trim_end_matches("_submission")
        .to_string();

    let file = File::open(path)
        .map_err(|e| BiobeatError::BlendingError(format!("{}: {e}", path.display())))?;
    let mut lines = BufReader::new(file).lines();

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| BiobeatError::BlendingError(format!("{}: empty file", path.display())))?;

    let mut ids = Vec::new();
    let mut probs = Vec::new();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let (id, prob) = line.split_once(',').ok_or_else(|| {
            BiobeatError::BlendingError(format!("{}: malformed row '{line}'", path.display()))
        })?;
        let prob: f64 = prob.trim().parse().map_err(|_| {
            BiobeatError::BlendingError(format!(
                "{}: non-numeric probability '{prob}'",
                path.display()
            ))
        })?;
        ids.push(id.trim().to_string());
        probs.push(prob);
    }

    Ok(Submission {
        model_name,
        header,
        ids,
        probs,
    })
}

/// Blend all eligible submissions in `submission_dir` into `output_path`.
///
/// Eligibility: `.csv` files whose stem does not contain "blended". Missing
/// weights default to 1.0. All files must agree on identifier order; zero
/// eligible files is a fatal error and nothing is written.
pub fn blend_submissions(
    submission_dir: &Path,
    output_path: &Path,
    weights: Option<&HashMap<String, f64>>,
) -> Result<BlendOutcome> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(submission_dir)
        .map_err(|e| {
            BiobeatError::BlendingError(format!("{}: {e}", submission_dir.display()))
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().and_then(|e| e.to_str()) == Some("csv")
                && p.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| !s.contains("blended"))
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(BiobeatError::BlendingError(format!(
            "no submission files found in {}",
            submission_dir.display()
        )));
    }

    info!(models = files.len(), "blending submissions");

    let mut blended: Option<Vec<f64>> = None;
    let mut reference_ids: Vec<String> = Vec::new();
    let mut reference_header = String::new();
    let mut blended_models = Vec::new();
    let mut total_weight = 0.0;

    for path in &files {
        let submission = read_submission(path)?;
        let weight = weights
            .and_then(|w| w.get(&submission.model_name).copied())
            .unwrap_or(1.0);

        match &mut blended {
            None => {
                reference_ids = submission.ids;
                reference_header = submission.header;
                blended = Some(submission.probs.iter().map(|p| p * weight).collect());
            }
            Some(acc) => {
                if submission.ids != reference_ids {
                    return Err(BiobeatError::BlendingError(format!(
                        "{}: identifier rows do not match the other submissions",
                        path.display()
                    )));
                }
                for (sum, p) in acc.iter_mut().zip(submission.probs.iter()) {
                    *sum += p * weight;
                }
            }
        }

        blended_models.push(submission.model_name);
        total_weight += weight;
    }

    let mut sums = blended.unwrap_or_default();
    for v in sums.iter_mut() {
        *v /= total_weight;
    }

    let mut writer = BufWriter::new(File::create(output_path)?);
    writeln!(writer, "{reference_header}")?;
    for (id, prob) in reference_ids.iter().zip(sums.iter()) {
        writeln!(writer, "{id},{prob}")?;
    }
    writer.flush()?;

    info!(output = %output_path.display(), total_weight, "blend written");

    Ok(BlendOutcome {
        output_path: output_path.to_path_buf(),
        blended_models,
        total_weight,
    })
}
