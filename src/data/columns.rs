//! Single-column CSV access
//!
//! The column pipeline reads and writes one column at a time so only one
//! column is ever held in memory. These readers use plain buffered IO on
//! comma-separated files with a header row; quoted fields are not needed
//! for the numeric tables this pipeline consumes.

use crate::error::{BiobeatError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| BiobeatError::DataError(format!("{}: {e}", path.display())))?;
    Ok(BufReader::new(file).lines())
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(|f| f.trim()).collect()
}

/// Header name of each column in source order, with its index.
///
/// Reads only the first row. Unnamed columns are dropped.
pub fn column_mapping(path: &Path) -> Result<Vec<(usize, String)>> {
    let mut lines = open_lines(path)?;
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| BiobeatError::DataError(format!("{}: empty file", path.display())))?;

    Ok(split_fields(&header)
        .into_iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty())
        .map(|(i, name)| (i, name.to_string()))
        .collect())
}

/// Read one column as f64 values, one entry per data row.
///
/// Empty or unparseable cells become NaN so row alignment survives
/// malformed cells; the cleaning stage decides what to do with them.
pub fn read_column_values(path: &Path, column_index: usize) -> Result<Vec<f64>> {
    let mut lines = open_lines(path)?;
    lines.next(); // header

    let mut values = Vec::new();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields = split_fields(&line);
        let parsed = fields
            .get(column_index)
            .and_then(|f| f.parse::<f64>().ok())
            .unwrap_or(f64::NAN);
        values.push(parsed);
    }
    Ok(values)
}

/// Read one column as raw strings, one entry per data row.
pub fn read_string_column(path: &Path, column_index: usize) -> Result<Vec<String>> {
    let mut lines = open_lines(path)?;
    lines.next(); // header

    let mut values = Vec::new();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let fields = split_fields(&line);
        values.push(fields.get(column_index).unwrap_or(&"").to_string());
    }
    Ok(values)
}

/// Write a single-column CSV with the given header.
pub fn write_single_column(path: &Path, header: &str, values: &[f64]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{header}")?;
    for val in values {
        writeln!(writer, "{val}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a single-column CSV of raw strings with the given header.
pub fn write_string_column(path: &Path, header: &str, values: &[String]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{header}")?;
    for val in values {
        writeln!(writer, "{val}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Combine single-column CSVs side by side into one wide CSV.
///
/// Processes row by row; inputs must have identical line counts, a
/// mismatch means the per-column artifacts went out of sync.
pub fn combine_columns(inputs: &[std::path::PathBuf], output: &Path) -> Result<()> {
    if inputs.is_empty() {
        return Err(BiobeatError::PreprocessingError(
            "no column files to combine".to_string(),
        ));
    }

    let mut readers = inputs
        .iter()
        .map(|p| open_lines(p))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = BufWriter::new(File::create(output)?);

    loop {
        let mut row = Vec::with_capacity(readers.len());
        let mut exhausted = 0usize;
        for reader in readers.iter_mut() {
            match reader.next().transpose()? {
                Some(line) => row.push(line),
                None => exhausted += 1,
            }
        }

        if exhausted == readers.len() {
            break;
        }
        if exhausted > 0 {
            return Err(BiobeatError::PreprocessingError(format!(
                "column files have mismatched row counts while writing {}",
                output.display()
            )));
        }

        writeln!(writer, "{}", row.join(","))?;
    }

    writer.flush()?;
    Ok(())
}
