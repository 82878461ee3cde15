//! Output stage: CSV files and the optional database load.
//!
//! The database side sits behind [`TableLoader`] so the pipeline can run
//! against a recording loader in tests. [`PostgresLoader`] is the production
//! implementation (feature `postgres`).

pub mod csv;
#[cfg(feature = "postgres")]
mod postgres;
pub mod sql;

pub use csv::{verify_header, write_csv, write_csv_to};
#[cfg(feature = "postgres")]
pub use postgres::PostgresLoader;

use crate::error::Result;
use crate::types::LoadReport;
use polars::prelude::*;

/// Replaces the contents of a destination table with a cleaned table.
///
/// Implementations create the table if needed, truncate it, bulk-load every
/// row in column order and build the secondary indexes.
pub trait TableLoader: Send + Sync {
    fn load(&self, table: &DataFrame) -> Result<LoadReport>;
}
