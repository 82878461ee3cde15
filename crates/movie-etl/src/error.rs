//! Custom error types for the movie ETL pipeline.
//!
//! Every failure in this pipeline is fatal: the binary logs the error and
//! exits non-zero. Errors are serializable so `--json` runs can report them
//! as `{code, message}` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the ETL pipeline.
#[derive(Error, Debug)]
pub enum EtlError {
    /// One or more required input columns are absent.
    #[error("Missing required columns in input CSV: {missing:?}")]
    Schema { missing: Vec<String> },

    /// A written output file does not carry the expected derived column.
    #[error("Output file '{}' does not contain the '{expected}' column in its header", .path.display())]
    IntegrityCheck { path: PathBuf, expected: String },

    /// A cleaning rule could not be applied.
    #[error("Failed to transform table: {0}")]
    TransformFailed(String),

    /// A post-transform rule is violated.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Connection, DDL, copy or index failure during the database load.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EtlError>,
    },
}

/// A violated cleaning rule, reported by the validator.
///
/// Variants are grouped by the rule they belong to; see [`ValidationError::rule`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("column '{0}' is missing from the cleaned table")]
    ColumnMissing(String),

    #[error("gross still has {count} missing values")]
    GrossMissing { count: usize },

    #[error("facenumber_in_poster has {count} missing values")]
    FaceNumberMissing { count: usize },

    #[error("facenumber_in_poster is not 0 for {count} rows")]
    FaceNumberNotZero { count: usize },

    #[error("TittleCode column does not exist")]
    TitleCodeColumnMissing,

    #[error("{count} TittleCode values have an invalid format (expected tt + 7-8 digits), e.g. '{example}'")]
    TitleCodeMalformed { count: usize, example: String },

    #[error("title_year has {count} missing values")]
    TitleYearMissing { count: usize },

    #[error("title_year is not 0 for {count} rows")]
    TitleYearNotZero { count: usize },

    #[error("country contains values other than USA: {found:?}")]
    CountryNotUsa { found: Vec<String> },
}

impl ValidationError {
    /// Number (1-5) of the cleaning rule this violation belongs to.
    ///
    /// `ColumnMissing` is reported against rule 1 since it stops every check.
    pub fn rule(&self) -> u8 {
        match self {
            Self::ColumnMissing(_) | Self::GrossMissing { .. } => 1,
            Self::FaceNumberMissing { .. } | Self::FaceNumberNotZero { .. } => 2,
            Self::TitleCodeColumnMissing | Self::TitleCodeMalformed { .. } => 3,
            Self::TitleYearMissing { .. } | Self::TitleYearNotZero { .. } => 4,
            Self::CountryNotUsa { .. } => 5,
        }
    }
}

impl EtlError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EtlError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::IntegrityCheck { .. } => "INTEGRITY_CHECK_ERROR",
            Self::TransformFailed(_) => "TRANSFORM_FAILED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            Self::WithContext { source, .. } => source.validation(),
            _ => None,
        }
    }
}

impl Serialize for EtlError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EtlError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for ETL operations.
pub type Result<T> = std::result::Result<T, EtlError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EtlError::Io(e).with_context(context))
    }
}
