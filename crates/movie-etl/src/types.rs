use crate::config::OutputPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the derived title-code column, always the last cleaned column.
pub const TITLE_CODE_COLUMN: &str = "TittleCode";

/// Columns that must be present in the input CSV.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "gross",
    "facenumber_in_poster",
    "movie_imdb_link",
    "title_year",
    "country",
];

/// Column layout of the demo extract.
pub const DEMO_COLUMNS: [&str; 6] = [
    "gross",
    "gross_imputed_mean",
    "facenumber_in_poster",
    TITLE_CODE_COLUMN,
    "title_year",
    "country",
];

/// Counts over the original values of an overridden column.
///
/// Only rows that survive the country filter are counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalValueStats {
    pub nulls: usize,
    pub negatives: usize,
    pub zeros: usize,
}

/// Counts over a column after it has been overridden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverriddenValueStats {
    pub nulls: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub zeros: usize,
}

/// Before/after view of a blanket override (rules 2 and 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideDiagnostics {
    pub column: String,
    pub before: OriginalValueStats,
    pub after: OverriddenValueStats,
}

/// Everything the transformer learned while cleaning the table.
///
/// Purely informational; no later stage branches on these numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformReport {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Mean used to fill `gross`; `None` when no value was numeric.
    pub gross_mean: Option<f64>,
    /// Surviving rows whose `gross` was imputed.
    pub gross_imputed: usize,
    /// Surviving rows with a non-null `TittleCode`.
    pub title_codes_found: usize,
    pub face_number: OverrideDiagnostics,
    pub title_year: OverrideDiagnostics,
}

/// Outcome of a successful database load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub schema: String,
    pub table: String,
    pub rows_loaded: u64,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_file: PathBuf,
    /// `None` for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<OutputPaths>,
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_dropped: usize,
    pub transform: TransformReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadReport>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
}
