//! The ETL driver and its builder.

use crate::config::EtlConfig;
use crate::error::{Result, ResultExt};
use crate::loader::load_table;
use crate::pipeline::EtlStage;
use crate::sink::{self, TableLoader};
use crate::transformer::{TransformOutput, Transformer};
use crate::types::{RunSummary, TITLE_CODE_COLUMN};
use crate::validator::validate;
use std::time::Instant;
use tracing::{error, info};

/// Runs load -> transform -> write -> validate -> (database load).
///
/// # Example
///
/// ```rust,ignore
/// use movie_etl::{EtlConfig, EtlPipeline};
///
/// let config = EtlConfig::builder()
///     .input_path("movie_metadata.csv")
///     .load_to_database(false)
///     .build()?;
///
/// let summary = EtlPipeline::builder().config(config).build()?.run()?;
/// println!("{} rows written", summary.rows_written);
/// ```
pub struct EtlPipeline {
    config: EtlConfig,
    transformer: Transformer,
    table_loader: Option<Box<dyn TableLoader>>,
}

static_assertions::assert_impl_all!(EtlPipeline: Send);

impl EtlPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> EtlPipelineBuilder {
        EtlPipelineBuilder::default()
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Execute the full run.
    ///
    /// Both CSVs are on disk before validation runs; a validation error means
    /// they must not be used. The database is only touched after validation.
    pub fn run(&self) -> Result<RunSummary> {
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        let result = self.run_internal(false);
        Self::finish(result, started_at, start)
    }

    /// Load, transform and validate in memory; write nothing.
    pub fn dry_run(&self) -> Result<RunSummary> {
        let started_at = chrono::Utc::now();
        let start = Instant::now();

        let result = self.run_internal(true);
        Self::finish(result, started_at, start)
    }

    fn finish(
        result: Result<RunSummary>,
        started_at: chrono::DateTime<chrono::Utc>,
        start: Instant,
    ) -> Result<RunSummary> {
        match result {
            Ok(mut summary) => {
                summary.started_at = started_at;
                summary.duration_ms = start.elapsed().as_millis() as u64;
                info!("{}", EtlStage::Complete);
                Ok(summary)
            }
            Err(e) => {
                error!("ETL run failed: {}", e);
                Err(e)
            }
        }
    }

    fn run_internal(&self, dry_run: bool) -> Result<RunSummary> {
        let output = &self.config.output;

        info!("{}", EtlStage::Loading);
        let raw = load_table(&self.config.input_path)?;
        let rows_read = raw.height();

        info!("{}", EtlStage::Transforming);
        let TransformOutput {
            cleaned,
            demo,
            report,
        } = self.transformer.transform(raw)?;

        if !dry_run {
            info!("{}", EtlStage::WritingOutputs);
            sink::write_csv(&cleaned, &output.main).context("Writing cleaned CSV")?;
            sink::verify_header(&output.main, TITLE_CODE_COLUMN)?;
            sink::write_csv(&demo, &output.demo).context("Writing demo CSV")?;
        }

        info!("{}", EtlStage::Validating);
        validate(&cleaned)?;

        let load = match (&self.table_loader, dry_run) {
            (Some(loader), false) => {
                info!("{}", EtlStage::DatabaseLoad);
                Some(loader.load(&cleaned)?)
            }
            _ => None,
        };

        Ok(RunSummary {
            input_file: self.config.input_path.clone(),
            outputs: (!dry_run).then(|| output.clone()),
            rows_read,
            rows_written: cleaned.height(),
            rows_dropped: rows_read - cleaned.height(),
            transform: report,
            load,
            started_at: chrono::Utc::now(),
            duration_ms: 0,
        })
    }
}

/// Builder for [`EtlPipeline`].
#[derive(Default)]
pub struct EtlPipelineBuilder {
    config: Option<EtlConfig>,
    table_loader: Option<Box<dyn TableLoader>>,
}

impl EtlPipelineBuilder {
    /// Set the run configuration. Defaults to [`EtlConfig::default`].
    pub fn config(mut self, config: EtlConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a custom database loader instead of PostgreSQL.
    ///
    /// Only consulted when `load_to_database` is enabled.
    pub fn table_loader(mut self, loader: Box<dyn TableLoader>) -> Self {
        self.table_loader = Some(loader);
        self
    }

    /// Validate the configuration and assemble the pipeline.
    pub fn build(self) -> Result<EtlPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let table_loader = if config.load_to_database {
            Some(match self.table_loader {
                Some(loader) => loader,
                None => default_loader(&config)?,
            })
        } else {
            None
        };

        Ok(EtlPipeline {
            config,
            transformer: Transformer,
            table_loader,
        })
    }
}

#[cfg(feature = "postgres")]
fn default_loader(config: &EtlConfig) -> Result<Box<dyn TableLoader>> {
    Ok(Box::new(sink::PostgresLoader::new(config.database.clone())))
}

#[cfg(not(feature = "postgres"))]
fn default_loader(_config: &EtlConfig) -> Result<Box<dyn TableLoader>> {
    Err(crate::error::EtlError::InvalidConfig(
        "database load requested but built without the `postgres` feature".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputPaths;
    use crate::error::EtlError;
    use crate::types::LoadReport;
    use polars::prelude::DataFrame;

    struct FailingLoader;

    impl TableLoader for FailingLoader {
        fn load(&self, _table: &DataFrame) -> Result<LoadReport> {
            Err(EtlError::Database("connection refused".to_string()))
        }
    }

    fn write_input(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("input.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_build_without_loader_when_disabled() {
        let config = EtlConfig::builder()
            .load_to_database(false)
            .build()
            .unwrap();
        let pipeline = EtlPipeline::builder().config(config).build().unwrap();
        assert!(pipeline.table_loader.is_none());
    }

    #[test]
    fn test_custom_loader_ignored_when_disabled() {
        let config = EtlConfig::builder()
            .load_to_database(false)
            .build()
            .unwrap();
        let pipeline = EtlPipeline::builder()
            .config(config)
            .table_loader(Box::new(FailingLoader))
            .build()
            .unwrap();
        assert!(pipeline.table_loader.is_none());
    }

    #[test]
    fn test_schema_error_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "gross,country\n1,USA\n");
        let outputs = OutputPaths::in_dir(dir.path().join("out"));

        let config = EtlConfig::builder()
            .input_path(input)
            .output_paths(outputs.clone())
            .load_to_database(false)
            .build()
            .unwrap();

        let err = EtlPipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .run()
            .unwrap_err();

        assert_eq!(err.error_code(), "SCHEMA_ERROR");
        assert!(!outputs.main.exists());
        assert!(!outputs.demo.exists());
    }

    #[test]
    fn test_database_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "gross,facenumber_in_poster,movie_imdb_link,title_year,country\n\
             100,1,http://www.imdb.com/title/tt0499549/,2009,USA\n",
        );

        let config = EtlConfig::builder()
            .input_path(input)
            .output_paths(OutputPaths::in_dir(dir.path()))
            .load_to_database(true)
            .build()
            .unwrap();

        let err = EtlPipeline::builder()
            .config(config)
            .table_loader(Box::new(FailingLoader))
            .build()
            .unwrap()
            .run()
            .unwrap_err();

        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "gross,facenumber_in_poster,movie_imdb_link,title_year,country\n\
             100,1,http://www.imdb.com/title/tt0499549/,2009,USA\n",
        );
        let outputs = OutputPaths::in_dir(dir.path().join("out"));

        let config = EtlConfig::builder()
            .input_path(input)
            .output_paths(outputs.clone())
            .load_to_database(true)
            .build()
            .unwrap();

        let summary = EtlPipeline::builder()
            .config(config)
            .table_loader(Box::new(FailingLoader))
            .build()
            .unwrap()
            .dry_run()
            .unwrap();

        assert_eq!(summary.rows_written, 1);
        assert!(summary.outputs.is_none());
        assert!(summary.load.is_none());
        assert!(!outputs.main.exists());
    }
}
