//! Rule 1: mean imputation for `gross`.

use crate::utils::{coerce_to_f64, is_integer_dtype};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, warn};

/// Result of filling `gross` with its mean.
#[derive(Debug, Clone, PartialEq)]
pub struct GrossImputation {
    /// Mean of the originally numeric values, `None` if there were none.
    pub mean: Option<f64>,
    /// Per input row: true when the original value was missing or non-numeric.
    pub imputed: Vec<bool>,
}

/// Mean of the present values, summed in row order.
pub(crate) fn mean_of_present(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Coerce `column` to numeric and fill every missing value with the mean.
///
/// The filled column is `Float64`, except a complete integer column, which
/// is left untouched.
/// The mean is taken over the whole table, before any row filtering. When no
/// value is numeric the column keeps its nulls, which the validator rejects.
pub fn impute_mean(df: &mut DataFrame, column: &str) -> Result<GrossImputation> {
    let source = df.column(column)?;
    let integer_source = is_integer_dtype(source.dtype());
    let original = coerce_to_f64(source.as_materialized_series())?;
    let mean = mean_of_present(&original);
    let imputed: Vec<bool> = original.iter().map(Option::is_none).collect();

    // A complete integer column needs no fill and keeps its dtype.
    if integer_source && !imputed.contains(&true) {
        debug!("Column '{}' is complete and integer; left as is", column);
        return Ok(GrossImputation { mean, imputed });
    }

    let filled: Vec<Option<f64>> = match mean {
        Some(mean) => original.iter().map(|v| Some(v.unwrap_or(mean))).collect(),
        None => {
            warn!("Column '{}' has no numeric values; nothing to impute from", column);
            original
        }
    };

    df.replace(column, Series::new(column.into(), filled))?;

    debug!(
        "Filled {} missing '{}' values with mean {:?}",
        imputed.iter().filter(|flag| **flag).count(),
        column,
        mean
    );

    Ok(GrossImputation { mean, imputed })
}
