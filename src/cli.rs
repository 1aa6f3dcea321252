//! Command-line interface

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::data::{feature_matrix, load_parquet, target_vector};
use crate::ensemble::blend_submissions;
use crate::error::{BiobeatError, Result};
use crate::pipeline::{run_benchmark, run_preprocessing};
use crate::report::{render_leaderboard, write_leaderboard};
use crate::training::{tune_boosted_trees, ComparisonTable, ModelKind};

#[derive(Parser)]
#[command(name = "biobeat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tabular ML benchmarking pipeline for bio-signal classification")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Preprocess, benchmark every model, write submissions and a report
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Restrict the roster to a comma-separated list of model names
        #[arg(long)]
        models: Option<String>,

        /// Blending weights as model=weight pairs, comma-separated
        #[arg(long)]
        weights: Option<String>,
    },

    /// Clean and standardize the input tables only
    Preprocess {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Blend the submission files already in a directory
    Blend {
        /// Directory of per-model submission files
        #[arg(short, long)]
        submissions: PathBuf,

        /// Output file (defaults to blended_final.csv in the directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Blending weights as model=weight pairs, comma-separated
        #[arg(long)]
        weights: Option<String>,
    },

    /// Re-render the leaderboard from a saved comparison table
    Report {
        /// Comparison table JSON written by a previous run
        #[arg(short, long, default_value = "data/processed/comparison.json")]
        comparison: PathBuf,

        /// Also write the rendered leaderboard to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Random-search the boosted-tree hyperparameters on processed data
    Tune {
        /// Processed training parquet
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long, default_value = "smoking")]
        target: String,

        /// Number of search trials
        #[arg(long, default_value = "20")]
        trials: usize,

        /// Search seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

/// Shared input/workspace arguments
#[derive(clap::Args)]
pub struct DataArgs {
    /// Raw training CSV
    #[arg(long)]
    pub train: PathBuf,

    /// Raw test CSV
    #[arg(long)]
    pub test: PathBuf,

    /// Workspace root for this run
    #[arg(short, long, default_value = "data")]
    pub workspace: PathBuf,

    /// Identifier column
    #[arg(long, default_value = "id")]
    pub id_column: String,

    /// Binary target column
    #[arg(long, default_value = "smoking")]
    pub target: String,

    /// Number of cross-validation folds
    #[arg(long, default_value = "5")]
    pub folds: usize,

    /// Seed for folds and models
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Add bio-signal interaction features before processing
    #[arg(long)]
    pub engineer_features: bool,
}

fn parse_weights(spec: &str) -> Result<HashMap<String, f64>> {
    let mut weights = HashMap::new();
    for pair in spec.split(',') {
        let (model, weight) = pair.split_once('=').ok_or_else(|| {
            BiobeatError::ValidationError(format!("bad weight spec '{pair}', expected model=weight"))
        })?;
        let weight: f64 = weight.trim().parse().map_err(|_| {
            BiobeatError::ValidationError(format!("non-numeric weight in '{pair}'"))
        })?;
        weights.insert(model.trim().to_string(), weight);
    }
    Ok(weights)
}

fn parse_roster(spec: &str) -> Result<Vec<ModelKind>> {
    spec.split(',')
        .map(|name| {
            ModelKind::from_name(name.trim()).ok_or_else(|| {
                BiobeatError::ValidationError(format!("unknown model '{}'", name.trim()))
            })
        })
        .collect()
}

fn build_config(data: DataArgs) -> RunConfig {
    RunConfig::new(data.train, data.test, data.workspace)
        .with_id_column(data.id_column)
        .with_target_column(data.target)
        .with_cv_folds(data.folds)
        .with_seed(data.seed)
        .with_engineered_features(data.engineer_features)
}

pub fn cmd_run(data: DataArgs, models: Option<String>, weights: Option<String>) -> Result<()> {
    let mut config = build_config(data);
    if let Some(spec) = models {
        config = config.with_roster(parse_roster(&spec)?);
    }
    if let Some(spec) = weights {
        config = config.with_blend_weights(parse_weights(&spec)?);
    }

    let artifacts = run_benchmark(&config)?;

    println!();
    println!("{}", "model leaderboard".bold());
    println!("{}", render_leaderboard(&artifacts.comparison));
    println!(
        "{} {} submissions, blend at {}",
        "done:".green(),
        artifacts.submission_paths.len(),
        artifacts.blended_path.display()
    );
    println!("report: {}", artifacts.leaderboard_path.display());
    Ok(())
}

pub fn cmd_preprocess(data: DataArgs) -> Result<()> {
    let config = build_config(data);
    let processed = run_preprocessing(&config)?;

    println!(
        "{} {} feature columns standardized",
        "done:".green(),
        processed.feature_columns.len()
    );
    if !processed.skipped_columns.is_empty() {
        println!(
            "{} skipped columns: {}",
            "note:".yellow(),
            processed.skipped_columns.join(", ")
        );
    }
    println!("train: {}", processed.train_csv.display());
    println!("test:  {}", processed.test_csv.display());
    Ok(())
}

pub fn cmd_blend(
    submissions: PathBuf,
    output: Option<PathBuf>,
    weights: Option<String>,
) -> Result<()> {
    let output = output.unwrap_or_else(|| submissions.join("blended_final.csv"));
    let weights = weights.map(|spec| parse_weights(&spec)).transpose()?;

    let outcome = blend_submissions(&submissions, &output, weights.as_ref())?;
    println!(
        "{} blended {} models (total weight {}) into {}",
        "done:".green(),
        outcome.blended_models.len(),
        outcome.total_weight,
        outcome.output_path.display()
    );
    Ok(())
}

pub fn cmd_report(comparison: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let table = ComparisonTable::load(&comparison)?;

    println!("{}", "model leaderboard".bold());
    println!("{}", render_leaderboard(&table));

    if let Some(path) = output {
        write_leaderboard(&table, &path, None)?;
        println!("report: {}", path.display());
    }
    Ok(())
}

pub fn cmd_tune(data: PathBuf, target: String, trials: usize, seed: u64) -> Result<()> {
    let df = load_parquet(&data)?;
    let (_, x) = feature_matrix(&df, &[target.as_str()])?;
    let y = target_vector(&df, &target)?;

    let result = tune_boosted_trees(&x, &y, trials, seed)?;
    println!("{} best AUC {:.4}", "done:".green(), result.auc);
    println!(
        "n_estimators={} max_depth={} learning_rate={:.4}",
        result.n_estimators, result.max_depth, result.learning_rate
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights() {
        let weights = parse_weights("gradient_boosted=2.0, svm=1.5").unwrap();
        assert_eq!(weights["gradient_boosted"], 2.0);
        assert_eq!(weights["svm"], 1.5);
        assert!(parse_weights("oops").is_err());
    }

    #[test]
    fn test_parse_roster() {
        let roster = parse_roster("logistic,naive_bayes").unwrap();
        assert_eq!(roster, vec![ModelKind::Logistic, ModelKind::NaiveBayes]);
        assert!(parse_roster("not_a_model").is_err());
    }
}
