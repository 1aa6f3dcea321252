//! Whole-table loading and ndarray extraction

use crate::error::{BiobeatError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a CSV file into a DataFrame.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| BiobeatError::DataError(format!("{}: {e}", path.display())))?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader
        .finish()
        .map_err(|e| BiobeatError::DataError(e.to_string()))
}

/// Load a parquet file into a DataFrame.
pub fn load_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| BiobeatError::DataError(format!("{}: {e}", path.display())))?;

    ParquetReader::new(file)
        .finish()
        .map_err(|e| BiobeatError::DataError(e.to_string()))
}

/// Convert a CSV file to parquet for fast repeated reads.
pub fn convert_to_parquet(csv_path: &Path, parquet_path: &Path) -> Result<()> {
    let mut df = load_csv(csv_path)?;

    let file = File::create(parquet_path)?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| BiobeatError::DataError(e.to_string()))?;
    Ok(())
}

/// Extract all columns except the excluded ones into a row-major feature
/// matrix, returning the feature names in table order alongside it.
pub fn feature_matrix(df: &DataFrame, exclude: &[&str]) -> Result<(Vec<String>, Array2<f64>)> {
    let feature_cols: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !exclude.contains(&name.as_str()))
        .map(|s| s.to_string())
        .collect();

    if feature_cols.is_empty() {
        return Err(BiobeatError::DataError(
            "no feature columns after exclusions".to_string(),
        ));
    }

    let x = columns_to_array2(df, &feature_cols)?;
    Ok((feature_cols, x))
}

/// Extract the target column as a label vector.
pub fn target_vector(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let column = df
        .column(target)
        .map_err(|_| BiobeatError::FeatureNotFound(target.to_string()))?;

    let column_f64 = column
        .cast(&DataType::Float64)
        .map_err(|e| BiobeatError::DataError(e.to_string()))?;

    let y: Array1<f64> = column_f64
        .f64()
        .map_err(|e| BiobeatError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    Ok(y)
}

/// Extract named columns from a DataFrame into a row-major Array2<f64>.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let column = df
                .column(col_name)
                .map_err(|_| BiobeatError::FeatureNotFound(col_name.clone()))?;
            let column_f64 = column
                .cast(&DataType::Float64)
                .map_err(|e| BiobeatError::DataError(e.to_string()))?;
            let values: Vec<f64> = column_f64
                .f64()
                .map_err(|e| BiobeatError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_feature_matrix_excludes_columns() {
        let df = df!(
            "id" => &[1i64, 2, 3],
            "a" => &[1.0, 2.0, 3.0],
            "b" => &[4.0, 5.0, 6.0],
            "smoking" => &[0i64, 1, 0]
        )
        .unwrap();

        let (names, x) = feature_matrix(&df, &["id", "smoking"]).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(x.shape(), &[3, 2]);
        assert_eq!(x[[1, 1]], 5.0);
    }

    #[test]
    fn test_target_vector_casts_ints() {
        let df = df!(
            "smoking" => &[0i64, 1, 1]
        )
        .unwrap();

        let y = target_vector(&df, "smoking").unwrap();
        assert_eq!(y.to_vec(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_csv_parquet_round_trip() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("t.csv");
        let pq = dir.path().join("t.parquet");
        std::fs::write(&csv, "a,b\n1.5,2\n3.5,4\n").unwrap();

        convert_to_parquet(&csv, &pq).unwrap();
        let df = load_parquet(&pq).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }
}
