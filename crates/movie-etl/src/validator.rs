//! Post-transform checks, one per cleaning rule.
//!
//! [`validate`] is pure: it inspects the cleaned table and returns the first
//! violated rule. Deciding to abort is left to the caller.

use crate::error::{Result, ValidationError};
use crate::transformer::{TARGET_COUNTRY, is_valid_title_code};
use crate::types::TITLE_CODE_COLUMN;
use crate::utils::{coerce_to_f64, coerce_to_strings};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

type Check = fn(&DataFrame) -> Result<()>;

/// Checks in rule order.
const CHECKS: [(&str, Check); 5] = [
    ("gross has no missing values", check_gross),
    ("facenumber_in_poster is 0 everywhere", check_face_number),
    ("TittleCode is null or tt + 7-8 digits", check_title_code),
    ("title_year is 0 everywhere", check_title_year),
    ("country is USA only", check_country),
];

/// Run every rule check against the cleaned table, stopping at the first failure.
pub fn validate(df: &DataFrame) -> Result<()> {
    info!("Validating cleaned table ({} rows)...", df.height());
    for (name, check) in CHECKS {
        check(df)?;
        debug!("Check passed: {}", name);
    }
    info!("All cleaning rules hold");
    Ok(())
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| ValidationError::ColumnMissing(name.to_string()))?;
    Ok(coerce_to_f64(column.as_materialized_series())?)
}

fn check_gross(df: &DataFrame) -> Result<()> {
    let values = numeric_column(df, "gross")?;
    let count = values.iter().filter(|v| v.is_none()).count();
    if count > 0 {
        return Err(ValidationError::GrossMissing { count }.into());
    }
    Ok(())
}

fn check_all_zero(
    df: &DataFrame,
    name: &str,
    missing: fn(usize) -> ValidationError,
    not_zero: fn(usize) -> ValidationError,
) -> Result<()> {
    let values = numeric_column(df, name)?;

    let nulls = values.iter().filter(|v| v.is_none()).count();
    if nulls > 0 {
        return Err(missing(nulls).into());
    }

    let non_zero = values.iter().flatten().filter(|v| **v != 0.0).count();
    if non_zero > 0 {
        return Err(not_zero(non_zero).into());
    }
    Ok(())
}

fn check_face_number(df: &DataFrame) -> Result<()> {
    check_all_zero(
        df,
        "facenumber_in_poster",
        |count| ValidationError::FaceNumberMissing { count },
        |count| ValidationError::FaceNumberNotZero { count },
    )
}

fn check_title_year(df: &DataFrame) -> Result<()> {
    check_all_zero(
        df,
        "title_year",
        |count| ValidationError::TitleYearMissing { count },
        |count| ValidationError::TitleYearNotZero { count },
    )
}

fn check_title_code(df: &DataFrame) -> Result<()> {
    let column = df
        .column(TITLE_CODE_COLUMN)
        .map_err(|_| ValidationError::TitleCodeColumnMissing)?;
    let codes = coerce_to_strings(column.as_materialized_series())?;

    let invalid: Vec<&str> = codes
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|code| !is_valid_title_code(code))
        .collect();

    if let Some(example) = invalid.first() {
        return Err(ValidationError::TitleCodeMalformed {
            count: invalid.len(),
            example: example.to_string(),
        }
        .into());
    }
    Ok(())
}

/// The distinct uppercased values must be exactly `{"USA"}`, so an empty
/// table fails this check too.
fn check_country(df: &DataFrame) -> Result<()> {
    let column = df
        .column("country")
        .map_err(|_| ValidationError::ColumnMissing("country".to_string()))?;
    let values = coerce_to_strings(column.as_materialized_series())?;

    let distinct: BTreeSet<String> = values
        .into_iter()
        .map(|v| v.map_or_else(|| "<null>".to_string(), |s| s.to_uppercase()))
        .collect();

    if distinct.len() == 1 && distinct.contains(TARGET_COUNTRY) {
        return Ok(());
    }
    Err(ValidationError::CountryNotUsa {
        found: distinct.into_iter().collect(),
    }
    .into())
}
