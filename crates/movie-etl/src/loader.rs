//! CSV loading and required-column checks.

use crate::error::{EtlError, Result, ResultExt};
use crate::types::REQUIRED_COLUMNS;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Read the whole input CSV into memory and check its schema.
///
/// Type inference scans every row so that a late non-numeric `gross` value
/// turns the column into text instead of failing the parse.
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Reading input CSV: {}", path.display());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    debug!("Loaded input with shape {:?}", df.shape());
    check_required_columns(&df)?;
    Ok(df)
}

/// Fail with [`EtlError::Schema`] listing every required column that is absent.
pub fn check_required_columns(df: &DataFrame) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !present.iter().any(|name| name == *required))
        .map(|required| required.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(EtlError::Schema { missing })
}
