//! Column cleaning routines

/// Strip NaN and infinite values from a column, preserving order.
pub fn remove_invalids(column: &[f64]) -> Vec<f64> {
    let mut clean = Vec::with_capacity(column.len());
    for &val in column {
        if val.is_finite() {
            clean.push(val);
        }
    }
    clean
}

/// Median of a column of finite values.
///
/// Even counts average the two middle order statistics; empty input
/// returns 0.0 by convention.
pub fn median(mut column: Vec<f64>) -> f64 {
    if column.is_empty() {
        return 0.0;
    }

    let is_even = column.len() % 2 == 0;
    let n = column.len() / 2;
    let (below, nth, _) = column.select_nth_unstable_by(n, f64::total_cmp);
    let upper = *nth;

    if is_even {
        let lower = below.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lower + upper) / 2.0
    } else {
        upper
    }
}

/// Median of a column after stripping non-finite values.
pub fn clean_median(column: &[f64]) -> f64 {
    if column.is_empty() {
        return 0.0;
    }
    median(remove_invalids(column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_invalids() {
        let data = vec![1.0, f64::NAN, 2.0, f64::INFINITY, 3.0, f64::NEG_INFINITY];
        assert_eq!(remove_invalids(&data), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_remove_invalids_idempotent() {
        let data = vec![5.0, -2.5, 0.0, 1e300];
        let once = remove_invalids(&data);
        assert_eq!(once, data);
        assert_eq!(remove_invalids(&once), once);
    }

    #[test]
    fn test_clean_length_matches_finite_count() {
        let data = vec![f64::NAN, 1.0, f64::INFINITY, 2.0, f64::NAN];
        let clean = remove_invalids(&data);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean, vec![1.0, 2.0]);
    }

    #[test]
    fn test_median_odd() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median(vec![1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(Vec::new()), 0.0);
    }

    #[test]
    fn test_median_single() {
        assert_eq!(median(vec![7.5]), 7.5);
    }

    #[test]
    fn test_clean_median() {
        let data = vec![3.0, f64::NAN, 1.0, f64::INFINITY, 2.0];
        assert_eq!(clean_median(&data), 2.0);
        assert_eq!(clean_median(&[]), 0.0);
    }
}
