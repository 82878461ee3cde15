//! CSV output and the post-write header check.

use crate::error::{EtlError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::info;

/// Serialize `table` as comma-separated UTF-8 with a header row.
///
/// Nulls become empty unquoted fields, which `COPY ... (FORMAT CSV)` reads
/// back as NULL.
pub fn write_csv_to<W: Write>(table: &DataFrame, writer: W) -> Result<()> {
    let mut table = table.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut table)?;
    Ok(())
}

/// Write `table` to `path`, creating parent directories as needed.
pub fn write_csv(table: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .context(format!("Failed to create directory {}", parent.display()))?;
    }

    let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    write_csv_to(table, file)?;

    info!("Saved {} rows to {}", table.height(), path.display());
    Ok(())
}

/// Re-read the header line of `path` and require `expected` among its fields.
pub fn verify_header(path: &Path, expected: &str) -> Result<()> {
    let file = File::open(path).context(format!("Failed to reopen {}", path.display()))?;
    let mut header = String::new();
    BufReader::new(file).read_line(&mut header)?;

    let found = header
        .trim()
        .split(',')
        .any(|field| field.trim().trim_matches('"') == expected);

    if !found {
        return Err(EtlError::IntegrityCheck {
            path: path.to_path_buf(),
            expected: expected.to_string(),
        });
    }
    info!("Output header: {}", header.trim());
    Ok(())
}
