//! Rules 2 and 4: blanket zero overrides.
//!
//! Every value is replaced, valid non-zero counts and years included. The
//! originals are handed back only to feed the diagnostics.

use crate::types::{OriginalValueStats, OverriddenValueStats};
use crate::utils::coerce_to_f64;
use anyhow::Result;
use polars::prelude::*;

/// Replace `column` with integer zeros and return its original numeric values.
pub fn zero_out(df: &mut DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let original = coerce_to_f64(df.column(column)?.as_materialized_series())?;
    let zeros = Series::new(column.into(), vec![0i64; df.height()]);
    df.replace(column, zeros)?;
    Ok(original)
}

/// Null, negative and zero counts over original values.
pub fn original_stats(values: &[Option<f64>]) -> OriginalValueStats {
    values.iter().fold(OriginalValueStats::default(), |mut stats, v| {
        match v {
            None => stats.nulls += 1,
            Some(x) if *x < 0.0 => stats.negatives += 1,
            Some(x) if *x == 0.0 => stats.zeros += 1,
            Some(_) => {}
        }
        stats
    })
}

/// Null count, range and zero count of a column after the override.
pub fn overridden_stats(series: &Series) -> Result<OverriddenValueStats> {
    let values = coerce_to_f64(series)?;
    let mut stats = OverriddenValueStats::default();

    for value in values {
        match value {
            None => stats.nulls += 1,
            Some(x) => {
                stats.min = Some(stats.min.map_or(x, |m| m.min(x)));
                stats.max = Some(stats.max.map_or(x, |m| m.max(x)));
                if x == 0.0 {
                    stats.zeros += 1;
                }
            }
        }
    }

    Ok(stats)
}
