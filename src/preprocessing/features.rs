//! Bio-signal interaction features
//!
//! Derived indicators added before column processing when enabled. Each
//! feature appears only when its source columns exist, so the same code
//! runs on any subset of the bio-signal schema.

use crate::error::{BiobeatError, Result};
use polars::prelude::*;

fn numeric_pair(
    df: &DataFrame,
    a: &str,
    b: &str,
) -> Result<Option<(Float64Chunked, Float64Chunked)>> {
    if df.column(a).is_err() || df.column(b).is_err() {
        return Ok(None);
    }

    let ca = df
        .column(a)?
        .cast(&DataType::Float64)
        .map_err(|e| BiobeatError::DataError(e.to_string()))?
        .f64()
        .map_err(|e| BiobeatError::DataError(e.to_string()))?
        .clone();
    let cb = df
        .column(b)?
        .cast(&DataType::Float64)
        .map_err(|e| BiobeatError::DataError(e.to_string()))?
        .f64()
        .map_err(|e| BiobeatError::DataError(e.to_string()))?
        .clone();

    Ok(Some((ca, cb)))
}

fn derive(
    name: &str,
    a: &Float64Chunked,
    b: &Float64Chunked,
    f: impl Fn(f64, f64) -> f64,
) -> Series {
    let derived: Float64Chunked = a
        .into_iter()
        .zip(b.into_iter())
        .map(|(va, vb)| match (va, vb) {
            (Some(va), Some(vb)) => Some(f(va, vb)),
            _ => None,
        })
        .collect();
    derived.with_name(name.into()).into_series()
}

/// Add interaction features to a raw bio-signal table.
pub fn apply_feature_engineering(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    // Body mass index proxy from height and weight
    if let Some((height, weight)) = numeric_pair(df, "height(cm)", "weight(kg)")? {
        let bmi = derive("bmi_proxy", &weight, &height, |w, h| {
            let meters = h / 100.0;
            w / (meters * meters)
        });
        result
            .with_column(bmi)
            .map_err(|e| BiobeatError::DataError(e.to_string()))?;
    }

    // Pulse pressure from systolic and diastolic readings
    if let Some((systolic, relaxation)) = numeric_pair(df, "systolic", "relaxation")? {
        let pp = derive("pulse_pressure", &systolic, &relaxation, |s, r| s - r);
        result
            .with_column(pp)
            .map_err(|e| BiobeatError::DataError(e.to_string()))?;
    }

    // Liver enzyme ratio; +1 in the denominator avoids division by zero
    if let Some((gtp, alt)) = numeric_pair(df, "GTP", "ALT")? {
        let ratio = derive("gtp_alt_ratio", &gtp, &alt, |g, a| g / (a + 1.0));
        result
            .with_column(ratio)
            .map_err(|e| BiobeatError::DataError(e.to_string()))?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_and_pulse_pressure_added() {
        let df = df!(
            "height(cm)" => &[150.0, 180.0],
            "weight(kg)" => &[45.0, 81.0],
            "systolic" => &[120.0, 140.0],
            "relaxation" => &[80.0, 90.0]
        )
        .unwrap();

        let result = apply_feature_engineering(&df).unwrap();
        assert!(result.column("bmi_proxy").is_ok());
        assert!(result.column("pulse_pressure").is_ok());
        assert!(result.column("gtp_alt_ratio").is_err());

        let bmi = result.column("bmi_proxy").unwrap().f64().unwrap();
        assert!((bmi.get(0).unwrap() - 20.0).abs() < 1e-9);
        let pp = result.column("pulse_pressure").unwrap().f64().unwrap();
        assert_eq!(pp.get(1).unwrap(), 50.0);
    }

    #[test]
    fn test_missing_sources_leave_table_unchanged() {
        let df = df!(
            "age" => &[30.0, 40.0]
        )
        .unwrap();

        let result = apply_feature_engineering(&df).unwrap();
        assert_eq!(result.width(), 1);
    }
}
