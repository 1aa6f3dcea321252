//! Leaderboard reporting

use crate::error::Result;
use crate::training::ComparisonTable;
use chrono::Utc;
use ndarray::Array1;
use std::path::Path;

/// Render the comparison table as a fixed-width text leaderboard.
pub fn render_leaderboard(table: &ComparisonTable) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<5} {:<22} {:>8} {:>10} {:>8} {:>11} {:>8}\n",
        "rank", "model", "auc", "accuracy", "f1", "precision", "recall"
    ));
    out.push_str(&"-".repeat(78));
    out.push('\n');

    for (rank, row) in table.rows().iter().enumerate() {
        let marker = if rank == 0 { " *" } else { "" };
        out.push_str(&format!(
            "{:<5} {:<22} {:>8.4} {:>10.4} {:>8.4} {:>11.4} {:>8.4}{}\n",
            rank + 1,
            row.model,
            row.auc,
            row.accuracy,
            row.f1,
            row.precision,
            row.recall,
            marker,
        ));
    }

    out
}

/// Render the winner's top features by importance.
fn render_importances(feature_names: &[String], importances: &Array1<f64>) -> String {
    let mut pairs: Vec<(&String, f64)> = feature_names
        .iter()
        .zip(importances.iter().copied())
        .collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(10);

    let mut out = String::from("\ntop features (winner):\n");
    for (name, importance) in pairs {
        out.push_str(&format!("  {name:<30} {importance:.4}\n"));
    }
    out
}

/// Write the leaderboard report, with the winner's feature importances
/// appended when available.
pub fn write_leaderboard(
    table: &ComparisonTable,
    path: &Path,
    importances: Option<(&[String], &Array1<f64>)>,
) -> Result<()> {
    let mut content = format!(
        "model leaderboard (generated {})\n\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    content.push_str(&render_leaderboard(table));

    if let Some((names, values)) = importances {
        if names.len() == values.len() {
            content.push_str(&render_importances(names, values));
        }
    }

    std::fs::write(path, content)?;
    Ok(())
}
