//! Full benchmark run
//!
//! Stages run to completion in order: schema validation, per-column
//! preprocessing, parquet conversion, model comparison, final fits with
//! submission files, blending, leaderboard report.

use crate::config::RunConfig;
use crate::data::columns::read_string_column;
use crate::data::{convert_to_parquet, feature_matrix, load_csv, load_parquet, target_vector};
use crate::data::schema::validate_schemas;
use crate::ensemble::blend_submissions;
use crate::error::{BiobeatError, Result};
use crate::preprocessing::{apply_feature_engineering, ColumnPipeline, ProcessedTables};
use crate::report::write_leaderboard;
use crate::submission::write_submission;
use crate::training::{compare_models, ComparisonTable, ModelKind};
use ndarray::Array1;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything a completed run produced
#[derive(Debug)]
pub struct RunArtifacts {
    pub processed: ProcessedTables,
    pub comparison: ComparisonTable,
    pub submission_paths: Vec<PathBuf>,
    pub blended_path: PathBuf,
    pub leaderboard_path: PathBuf,
}

/// Write an engineered copy of a raw table into the workspace.
fn engineer_table(raw_path: &Path, output_path: &Path) -> Result<PathBuf> {
    let df = load_csv(raw_path)?;
    let mut engineered = apply_feature_engineering(&df)?;

    let mut file = File::create(output_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut engineered)
        .map_err(|e| BiobeatError::DataError(e.to_string()))?;
    Ok(output_path.to_path_buf())
}

/// Run preprocessing only: schema check, column pipeline, parquet
/// conversion.
pub fn run_preprocessing(config: &RunConfig) -> Result<ProcessedTables> {
    validate_schemas(&config.train_path, &config.test_path, &config.target_column)?;
    config.ensure_workspace()?;

    let (train_input, test_input) = if config.engineer_features {
        info!("applying interaction features");
        let train = engineer_table(
            &config.train_path,
            &config.processed_dir().join("engineered_train.csv"),
        )?;
        let test = engineer_table(
            &config.test_path,
            &config.processed_dir().join("engineered_test.csv"),
        )?;
        (train, test)
    } else {
        (config.train_path.clone(), config.test_path.clone())
    };

    let processed = ColumnPipeline::new(config).run(&train_input, &test_input)?;

    convert_to_parquet(&processed.train_csv, &config.train_parquet())?;
    convert_to_parquet(&processed.test_csv, &config.test_parquet())?;
    info!("converted processed tables to parquet");

    Ok(processed)
}

/// Run the whole benchmark and emit every output artifact.
pub fn run_benchmark(config: &RunConfig) -> Result<RunArtifacts> {
    let processed = run_preprocessing(config)?;

    // Train side
    let train_df = load_parquet(&config.train_parquet())?;
    let (feature_names, x) = feature_matrix(&train_df, &[config.target_column.as_str()])?;
    let y = target_vector(&train_df, &config.target_column)?;
    info!(
        rows = x.nrows(),
        features = x.ncols(),
        "training table loaded"
    );

    // Cross-validated comparison over the roster
    let comparison = compare_models(&config.roster, &x, &y, config.cv_folds, config.seed)?;
    if comparison.is_empty() {
        return Err(BiobeatError::TrainingError(
            "every roster model failed evaluation".to_string(),
        ));
    }
    comparison.save(&config.comparison_path())?;

    // Test side; processed pair shares its feature schema by construction
    let test_df = load_parquet(&config.test_parquet())?;
    let (test_features, x_test) = feature_matrix(&test_df, &[config.id_column.as_str()])?;
    if test_features != feature_names {
        return Err(BiobeatError::ValidationError(format!(
            "processed train/test feature mismatch: {feature_names:?} vs {test_features:?}"
        )));
    }
    let test_ids = read_string_column(&processed.test_csv, 0)?;

    // Final fit on 100% of training data per ranked model, best first
    let mut submission_paths = Vec::new();
    let mut winner_importances: Option<Array1<f64>> = None;
    for row in comparison.rows() {
        let kind = match ModelKind::from_name(&row.model) {
            Some(kind) => kind,
            None => continue,
        };

        info!(model = row.model.as_str(), "refitting on full training set");
        let mut model = kind.build(config.seed);
        let fitted = model
            .fit(&x, &y)
            .and_then(|()| model.predict_proba(&x_test));

        match fitted {
            Ok(probs) => {
                let path = config.submission_path(&row.model);
                write_submission(
                    &path,
                    &config.id_column,
                    &config.target_column,
                    &test_ids,
                    &probs,
                )?;
                if winner_importances.is_none() {
                    winner_importances = model.feature_importances();
                }
                submission_paths.push(path);
            }
            Err(e) => {
                warn!(model = row.model.as_str(), error = %e, "final fit failed, no submission");
            }
        }
    }

    // Blend everything that made it to disk
    let blended = blend_submissions(
        &config.submissions_dir(),
        &config.blended_path(),
        config.blend_weights.as_ref(),
    )?;

    let leaderboard_path = config.leaderboard_path();
    write_leaderboard(
        &comparison,
        &leaderboard_path,
        winner_importances
            .as_ref()
            .map(|imp| (feature_names.as_slice(), imp)),
    )?;

    info!(
        submissions = submission_paths.len(),
        leaderboard = %leaderboard_path.display(),
        "benchmark run complete"
    );

    Ok(RunArtifacts {
        processed,
        comparison,
        submission_paths,
        blended_path: blended.output_path,
        leaderboard_path,
    })
}
