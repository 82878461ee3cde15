//! Shared utilities for the ETL stages.
//!
//! Column coercion helpers used by both the transformer and the validator,
//! so a value that counts as "missing" means the same thing in both places.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

// =============================================================================
// Coercion Utilities
// =============================================================================

/// Parse a raw cell as a number.
///
/// Surrounding whitespace is ignored. Empty strings, unparseable text and
/// `NaN` all count as missing; no currency or thousands-separator cleanup
/// is attempted.
pub fn parse_numeric_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Coerce any Series to `f64` values, turning non-numeric cells into `None`.
pub fn coerce_to_f64(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let dtype = series.dtype();

    if is_numeric_dtype(dtype) || matches!(dtype, DataType::Boolean | DataType::Null) {
        let casted = series.cast(&DataType::Float64)?;
        let values = casted
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        return Ok(values);
    }

    let casted = series.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_numeric_value))
        .collect();
    Ok(values)
}

/// Coerce any Series to owned strings, keeping nulls.
pub fn coerce_to_strings(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    let values = casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Keep only the entries of `values` whose `mask` entry is true.
pub fn retain_by_mask<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| v.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_value() {
        assert_eq!(parse_numeric_value("42"), Some(42.0));
        assert_eq!(parse_numeric_value(" 3.5 "), Some(3.5));
        assert_eq!(parse_numeric_value("-7"), Some(-7.0));
        assert_eq!(parse_numeric_value("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_value(""), None);
        assert_eq!(parse_numeric_value("n/a"), None);
        assert_eq!(parse_numeric_value("NaN"), None);
        assert_eq!(parse_numeric_value("$1,000"), None);
    }

    #[test]
    fn test_coerce_string_series() {
        let series = Series::new("gross".into(), [Some("100"), None, Some("abc"), Some(" 2.5")]);
        let values = coerce_to_f64(&series).unwrap();
        assert_eq!(values, vec![Some(100.0), None, None, Some(2.5)]);
    }

    #[test]
    fn test_coerce_numeric_series() {
        let series = Series::new("faces".into(), [Some(1i64), None, Some(-3)]);
        let values = coerce_to_f64(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(-3.0)]);
    }

    #[test]
    fn test_coerce_float_nan_is_missing() {
        let series = Series::new("gross".into(), [1.0f64, f64::NAN]);
        let values = coerce_to_f64(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None]);
    }

    #[test]
    fn test_coerce_to_strings() {
        let series = Series::new("year".into(), [Some(2009i64), None]);
        let values = coerce_to_strings(&series).unwrap();
        assert_eq!(values, vec![Some("2009".to_string()), None]);
    }

    #[test]
    fn test_retain_by_mask() {
        let kept = retain_by_mask(&[1, 2, 3, 4], &[true, false, false, true]);
        assert_eq!(kept, vec![1, 4]);
    }

    #[test]
    fn test_dtype_helpers() {
        assert!(is_integer_dtype(&DataType::Int32));
        assert!(is_float_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::UInt8));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }
}
