//! Movie Metadata ETL Library
//!
//! Batch cleaning of a movie metadata CSV, built with Rust and Polars.
//!
//! # Overview
//!
//! One run is a straight line:
//!
//! - **Loader**: reads the CSV into a `DataFrame` and checks required columns
//! - **Transformer**: applies five fixed cleaning rules and builds a demo extract
//! - **Validator**: re-checks the rules; the first violation fails the run
//! - **Sink**: writes both CSVs and, optionally, bulk-loads PostgreSQL
//!
//! # Cleaning rules
//!
//! 1. `gross` is coerced to numeric and missing values are filled with the mean
//! 2. `facenumber_in_poster` is set to 0 on every row
//! 3. `TittleCode` (`tt` + 7-8 digits) is extracted from `movie_imdb_link`
//! 4. `title_year` is set to 0 on every row
//! 5. Only rows whose trimmed `country` equals `USA` (any case) are kept
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use movie_etl::{EtlConfig, EtlPipeline, OutputPaths};
//!
//! let config = EtlConfig::builder()
//!     .input_path("movie_metadata.csv")
//!     .output_paths(OutputPaths::in_dir("out"))
//!     .load_to_database(false)
//!     .build()?;
//!
//! let summary = EtlPipeline::builder().config(config).build()?.run()?;
//! println!("{} of {} rows kept", summary.rows_written, summary.rows_read);
//! ```
//!
//! # Database load
//!
//! With the default `postgres` feature and `load_to_database` enabled, the
//! cleaned table replaces the contents of `<schema>.<table>` through
//! `COPY ... FROM STDIN`. Custom destinations implement [`TableLoader`].

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod sink;
pub mod transformer;
pub mod types;
pub mod utils;
pub mod validator;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, DatabaseConfig, EtlConfig, EtlConfigBuilder, OutputPathResolver,
    OutputPaths, default_output_paths, parse_bool_flag,
};
pub use error::{EtlError, Result as EtlResult, ResultExt, ValidationError};
pub use loader::{check_required_columns, load_table};
pub use pipeline::{EtlPipeline, EtlPipelineBuilder, EtlStage};
#[cfg(feature = "postgres")]
pub use sink::PostgresLoader;
pub use sink::TableLoader;
pub use transformer::{TransformOutput, Transformer, extract_title_code, is_valid_title_code};
pub use types::{
    DEMO_COLUMNS, LoadReport, OverrideDiagnostics, REQUIRED_COLUMNS, RunSummary,
    TITLE_CODE_COLUMN, TransformReport,
};
pub use validator::validate;
