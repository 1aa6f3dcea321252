//! End-to-end pipeline tests on small synthetic tables

use biobeat::config::RunConfig;
use biobeat::error::BiobeatError;
use biobeat::pipeline::run_benchmark;
use biobeat::training::ModelKind;
use tempfile::TempDir;

/// Synthetic bio-signal style tables: one informative feature, one noisy
/// feature, binary target correlated with the informative one.
fn write_synthetic_inputs(dir: &TempDir, n_rows: usize) -> (std::path::PathBuf, std::path::PathBuf) {
    let mut train = String::from("id,signal,noise,smoking\n");
    for i in 0..n_rows {
        let label = usize::from(i % 2 == 0);
        let signal = if label == 1 { 10.0 } else { 0.0 } + (i % 7) as f64 * 0.3;
        let noise = ((i * 31) % 17) as f64;
        train.push_str(&format!("{i},{signal},{noise},{label}\n"));
    }

    let mut test = String::from("id,signal,noise\n");
    for i in 0..10 {
        let signal = if i % 2 == 0 { 10.0 } else { 0.0 } + (i % 5) as f64 * 0.3;
        let noise = ((i * 13) % 17) as f64;
        test.push_str(&format!("{},{signal},{noise}\n", 1000 + i));
    }

    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    std::fs::write(&train_path, train).unwrap();
    std::fs::write(&test_path, test).unwrap();
    (train_path, test_path)
}

#[test]
fn test_full_run_produces_all_artifacts() {
    let dir = TempDir::new().unwrap();
    let (train, test) = write_synthetic_inputs(&dir, 60);

    let config = RunConfig::new(train, test, dir.path().join("ws"))
        .with_roster(vec![ModelKind::Logistic, ModelKind::NaiveBayes])
        .with_seed(42);

    let artifacts = run_benchmark(&config).unwrap();

    // Leaderboard has both models
    assert_eq!(artifacts.comparison.rows().len(), 2);
    assert!(artifacts.leaderboard_path.exists());
    let report = std::fs::read_to_string(&artifacts.leaderboard_path).unwrap();
    assert!(report.contains("logistic"));
    assert!(report.contains("naive_bayes"));

    // Comparison table persisted for later `report` invocations
    let saved = biobeat::training::ComparisonTable::load(&config.comparison_path()).unwrap();
    assert_eq!(saved.rows().len(), 2);
    assert_eq!(
        saved.winner().unwrap().model,
        artifacts.comparison.winner().unwrap().model
    );

    // One submission per model, row count matches the test table
    assert_eq!(artifacts.submission_paths.len(), 2);
    for path in &artifacts.submission_paths {
        let content = std::fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("id,smoking"));
        assert_eq!(lines.count(), 10);
    }

    // Blended output exists with the same ids as the submissions
    assert!(artifacts.blended_path.exists());
    let blended = std::fs::read_to_string(&artifacts.blended_path).unwrap();
    assert!(blended.starts_with("id,smoking\n"));
    assert_eq!(blended.lines().count(), 11);
    for line in blended.lines().skip(1) {
        let prob: f64 = line.split(',').nth(1).unwrap().parse().unwrap();
        assert!((0.0..=1.0).contains(&prob));
    }
}

#[test]
fn test_submission_row_order_matches_test_input() {
    let dir = TempDir::new().unwrap();
    let (train, test) = write_synthetic_inputs(&dir, 40);

    let config = RunConfig::new(train, test, dir.path().join("ws"))
        .with_roster(vec![ModelKind::Logistic]);

    let artifacts = run_benchmark(&config).unwrap();
    let content = std::fs::read_to_string(&artifacts.submission_paths[0]).unwrap();
    let ids: Vec<&str> = content
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap())
        .collect();
    let expected: Vec<String> = (0..10).map(|i| format!("{}", 1000 + i)).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_schema_mismatch_aborts_before_modeling() {
    let dir = TempDir::new().unwrap();
    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    std::fs::write(&train_path, "id,a,b,smoking\n1,1,2,0\n2,3,4,1\n").unwrap();
    std::fs::write(&test_path, "id,a\n10,1\n").unwrap();

    let config = RunConfig::new(train_path, test_path, dir.path().join("ws"))
        .with_roster(vec![ModelKind::Logistic]);

    let err = run_benchmark(&config).unwrap_err();
    match err {
        BiobeatError::ValidationError(msg) => assert!(msg.contains('b'), "{msg}"),
        other => panic!("expected a validation error, got {other}"),
    }
    // Nothing was modeled, so no submissions dir contents
    assert!(!config.blended_path().exists());
}

#[test]
fn test_run_with_engineered_features() {
    let dir = TempDir::new().unwrap();
    let mut train = String::from("id,height(cm),weight(kg),smoking\n");
    for i in 0..40 {
        let label = usize::from(i % 2 == 0);
        let height = 160.0 + (i % 10) as f64;
        let weight = if label == 1 { 90.0 } else { 60.0 } + (i % 5) as f64;
        train.push_str(&format!("{i},{height},{weight},{label}\n"));
    }
    let mut test = String::from("id,height(cm),weight(kg)\n");
    for i in 0..6 {
        test.push_str(&format!("{},170,{}\n", 100 + i, 70 + i * 3));
    }

    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    std::fs::write(&train_path, train).unwrap();
    std::fs::write(&test_path, test).unwrap();

    let config = RunConfig::new(train_path, test_path, dir.path().join("ws"))
        .with_roster(vec![ModelKind::Logistic])
        .with_engineered_features(true);

    let artifacts = run_benchmark(&config).unwrap();
    assert!(artifacts
        .processed
        .feature_columns
        .contains(&"bmi_proxy".to_string()));
}

#[test]
fn test_weighted_blend_in_full_run() {
    let dir = TempDir::new().unwrap();
    let (train, test) = write_synthetic_inputs(&dir, 40);

    let mut weights = std::collections::HashMap::new();
    weights.insert("logistic".to_string(), 3.0);
    weights.insert("naive_bayes".to_string(), 1.0);

    let config = RunConfig::new(train, test, dir.path().join("ws"))
        .with_roster(vec![ModelKind::Logistic, ModelKind::NaiveBayes])
        .with_blend_weights(weights);

    let artifacts = run_benchmark(&config).unwrap();
    assert!(artifacts.blended_path.exists());
}
