//! Integration tests for the per-column preprocessing pipeline

use biobeat::config::RunConfig;
use biobeat::preprocessing::ColumnPipeline;
use biobeat::training::ModelKind;
use tempfile::TempDir;

fn write_inputs(dir: &TempDir, train: &str, test: &str) -> RunConfig {
    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    std::fs::write(&train_path, train).unwrap();
    std::fs::write(&test_path, test).unwrap();

    RunConfig::new(train_path, test_path, dir.path().join("ws"))
        .with_target_column("smoking")
        .with_roster(vec![ModelKind::Logistic])
}

#[test]
fn test_pipeline_standardizes_train_columns() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,age,weight,smoking\n1,20,60,0\n2,30,70,1\n3,40,80,0\n4,50,90,1\n",
        "id,age,weight\n10,25,65\n11,35,75\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    let processed = pipeline.run(&config.train_path, &config.test_path).unwrap();

    assert_eq!(
        processed.feature_columns,
        vec!["age".to_string(), "weight".to_string()]
    );
    assert!(processed.skipped_columns.is_empty());

    let content = std::fs::read_to_string(&processed.train_csv).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("age,weight,smoking"));

    // Scaled age column has mean ~0 and population std ~1
    let values: Vec<f64> = lines
        .map(|l| l.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(values.len(), 4);
    let mean: f64 = values.iter().sum::<f64>() / 4.0;
    let std = (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 4.0).sqrt();
    assert!(mean.abs() < 1e-9);
    assert!((std - 1.0).abs() < 1e-9);
}

#[test]
fn test_test_columns_use_train_parameters() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,age,smoking\n1,10,0\n2,20,1\n3,30,0\n",
        "id,age\n10,20\n11,40\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    let processed = pipeline.run(&config.train_path, &config.test_path).unwrap();

    // Train age: mean 20, population std sqrt(200/3)
    let expected_std = (200.0f64 / 3.0).sqrt();
    let content = std::fs::read_to_string(&processed.test_csv).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("id,age"));

    let row1: Vec<&str> = lines.next().unwrap().split(',').collect();
    let row2: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row1[0], "10");
    let scaled_20: f64 = row1[1].parse().unwrap();
    let scaled_40: f64 = row2[1].parse().unwrap();
    assert!(scaled_20.abs() < 1e-9, "20 is the train mean");
    assert!((scaled_40 - 20.0 / expected_std).abs() < 1e-9);
}

#[test]
fn test_non_numeric_column_skipped_on_both_sides() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,age,notes,smoking\n1,20,hello,0\n2,30,world,1\n3,40,foo,0\n",
        "id,age,notes\n10,25,bar\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    let processed = pipeline.run(&config.train_path, &config.test_path).unwrap();

    assert_eq!(processed.feature_columns, vec!["age".to_string()]);
    assert_eq!(processed.skipped_columns, vec!["notes".to_string()]);

    let train = std::fs::read_to_string(&processed.train_csv).unwrap();
    assert!(train.starts_with("age,smoking\n"));
    let test = std::fs::read_to_string(&processed.test_csv).unwrap();
    assert!(test.starts_with("id,age\n"));
}

#[test]
fn test_bad_cells_imputed_with_train_median() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,age,smoking\n1,10,0\n2,,1\n3,30,0\n4,20,1\n",
        "id,age\n10,\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    let processed = pipeline.run(&config.train_path, &config.test_path).unwrap();

    // Clean median of {10, 30, 20} is 20; the blank train cell becomes 20
    // and so does the blank test cell, which then scales to the same value.
    let train = std::fs::read_to_string(&processed.train_csv).unwrap();
    let train_row2: f64 = train
        .lines()
        .nth(2)
        .unwrap()
        .split(',')
        .next()
        .unwrap()
        .parse()
        .unwrap();
    let test = std::fs::read_to_string(&processed.test_csv).unwrap();
    let test_row1: f64 = test
        .lines()
        .nth(1)
        .unwrap()
        .split(',')
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    assert!((train_row2 - test_row1).abs() < 1e-12);
}

#[test]
fn test_constant_column_scales_to_zeros() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,flat,smoking\n1,7,0\n2,7,1\n3,7,0\n",
        "id,flat\n10,7\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    let processed = pipeline.run(&config.train_path, &config.test_path).unwrap();

    let train = std::fs::read_to_string(&processed.train_csv).unwrap();
    for line in train.lines().skip(1) {
        let flat: f64 = line.split(',').next().unwrap().parse().unwrap();
        assert_eq!(flat, 0.0);
    }
}

#[test]
fn test_scaling_params_persisted() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,age,smoking\n1,10,0\n2,20,1\n3,30,0\n",
        "id,age\n10,15\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    let processed = pipeline.run(&config.train_path, &config.test_path).unwrap();

    let json = std::fs::read_to_string(&processed.params_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let age = &parsed["age"];
    assert!((age["mean"].as_f64().unwrap() - 20.0).abs() < 1e-9);
    assert!((age["median"].as_f64().unwrap() - 20.0).abs() < 1e-9);
}

#[test]
fn test_transient_column_files_removed() {
    let dir = TempDir::new().unwrap();
    let config = write_inputs(
        &dir,
        "id,age,smoking\n1,10,0\n2,20,1\n3,30,0\n",
        "id,age\n10,15\n",
    );

    let pipeline = ColumnPipeline::new(&config);
    pipeline.run(&config.train_path, &config.test_path).unwrap();

    let leftovers: Vec<_> = std::fs::read_dir(config.processed_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with("part_"))
        })
        .collect();
    assert!(leftovers.is_empty(), "transient files left: {leftovers:?}");
}
