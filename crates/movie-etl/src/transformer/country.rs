//! Rule 5: keep USA rows only.

use crate::utils::coerce_to_strings;
use anyhow::Result;
use polars::prelude::*;

/// The only country kept by the filter.
pub const TARGET_COUNTRY: &str = "USA";

/// True when the trimmed value equals `USA`, ignoring case.
pub fn is_target_country(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(TARGET_COUNTRY)
}

/// Trim `column` in place and return the keep-mask for the country filter.
///
/// Null countries are never kept.
pub fn trim_and_mask(df: &mut DataFrame, column: &str) -> Result<Vec<bool>> {
    let values = coerce_to_strings(df.column(column)?.as_materialized_series())?;
    let trimmed: Vec<Option<String>> = values
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect();
    let mask: Vec<bool> = trimmed
        .iter()
        .map(|v| v.as_deref().is_some_and(is_target_country))
        .collect();

    df.replace(column, Series::new(column.into(), trimmed))?;
    Ok(mask)
}

/// Apply a keep-mask to every column.
pub fn filter_rows(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), mask);
    Ok(df.filter(&mask)?)
}
