//! Configuration types for the movie ETL pipeline.
//!
//! Configuration is resolved once at the entry point into an [`EtlConfig`]
//! and handed to the pipeline; no stage reads the environment on its own.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the cleaned dataset when no explicit path is configured.
pub const DEFAULT_OUTPUT_FILE: &str = "FilmTV_USAMoviesClean.csv";

/// File name of the demo extract when no explicit path is configured.
pub const DEFAULT_DEMO_FILE: &str = "FilmTV_USAMoviesClean_DEMO.csv";

/// Location of the two output CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    /// Cleaned dataset.
    pub main: PathBuf,
    /// Demo evidence extract.
    pub demo: PathBuf,
}

impl OutputPaths {
    /// Both default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            main: dir.join(DEFAULT_OUTPUT_FILE),
            demo: dir.join(DEFAULT_DEMO_FILE),
        }
    }
}

/// Strategy used to pick output paths when none are configured.
///
/// The binary passes [`default_output_paths`]. Any non-capturing closure
/// coerces to this type.
pub type OutputPathResolver = fn() -> OutputPaths;

/// Probe the usual desktop folders and use the first one that can be created.
///
/// Falls back to the current working directory.
pub fn default_output_paths() -> OutputPaths {
    let home = directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

    if let Some(home) = home {
        let candidates = [
            home.join("OneDrive").join("Escritorio").join("main"),
            home.join("Desktop").join("main"),
            home.join("Escritorio").join("main"),
        ];
        for candidate in candidates {
            match std::fs::create_dir_all(&candidate) {
                Ok(()) => return OutputPaths::in_dir(candidate),
                Err(e) => debug!("Skipping output dir {}: {}", candidate.display(), e),
            }
        }
    }

    OutputPaths::in_dir(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Connection and destination settings for the PostgreSQL load stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    /// Never serialized, so `--json` summaries do not leak it.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    /// Destination schema. Default: "public"
    pub schema: String,
    /// Destination table. Default: "film_tv_usa_movies_clean"
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "etl".to_string(),
            user: "postgres".to_string(),
            password: None,
            schema: "public".to_string(),
            table: "film_tv_usa_movies_clean".to_string(),
        }
    }
}

/// Configuration for one ETL run.
///
/// Use [`EtlConfig::builder()`] to create a configuration with a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use movie_etl::config::{EtlConfig, OutputPaths};
///
/// let config = EtlConfig::builder()
///     .input_path("movie_metadata.csv")
///     .output_paths(OutputPaths::in_dir("out"))
///     .load_to_database(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Input CSV. Default: "movie_metadata.csv"
    pub input_path: PathBuf,

    /// Cleaned and demo CSV destinations.
    pub output: OutputPaths,

    /// Whether the PostgreSQL load stage runs.
    /// Default: true
    pub load_to_database: bool,

    /// Database settings, only used when `load_to_database` is set.
    pub database: DatabaseConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("movie_metadata.csv"),
            output: OutputPaths::in_dir("."),
            load_to_database: true,
            database: DatabaseConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EtlConfigBuilder {
        EtlConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("input_path"));
        }
        if self.output.main.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("output.main"));
        }
        if self.output.demo.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("output.demo"));
        }
        if self.output.main == self.output.demo {
            return Err(ConfigValidationError::SameOutputPath(self.output.main.clone()));
        }

        if self.load_to_database {
            let db = &self.database;
            if db.port == 0 {
                return Err(ConfigValidationError::InvalidPort);
            }
            for (field, value) in [
                ("database.host", &db.host),
                ("database.database", &db.database),
                ("database.user", &db.user),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigValidationError::EmptyValue(field));
                }
            }
            validate_identifier("database.schema", &db.schema)?;
            validate_identifier("database.table", &db.table)?;
        }

        Ok(())
    }
}

/// Identifiers are always quoted in generated SQL, so only emptiness and
/// NUL bytes (which PostgreSQL rejects outright) are checked here.
fn validate_identifier(field: &'static str, value: &str) -> Result<(), ConfigValidationError> {
    if value.is_empty() || value.contains('\0') {
        return Err(ConfigValidationError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Parse a boolean-like flag such as `LOAD_TO_PG`.
///
/// Accepts `1/true/yes/on` and `0/false/no/off`, case-insensitive.
pub fn parse_bool_flag(value: &str) -> Result<bool, ConfigValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigValidationError::InvalidFlag(value.to_string())),
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must not be empty")]
    EmptyPath(&'static str),

    #[error("cleaned and demo outputs point to the same file: {}", .0.display())]
    SameOutputPath(PathBuf),

    #[error("'{0}' must not be empty")]
    EmptyValue(&'static str),

    #[error("database port must be non-zero")]
    InvalidPort,

    #[error("invalid SQL identifier for '{field}': {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("invalid boolean flag {0:?} (expected 1/0, true/false, yes/no, on/off)")]
    InvalidFlag(String),
}

impl From<ConfigValidationError> for crate::error::EtlError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::EtlError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`EtlConfig`].
#[derive(Debug, Default)]
pub struct EtlConfigBuilder {
    config: EtlConfig,
}

impl EtlConfigBuilder {
    /// Set the input CSV path.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input_path = path.into();
        self
    }

    /// Set both output paths.
    pub fn output_paths(mut self, paths: OutputPaths) -> Self {
        self.config.output = paths;
        self
    }

    /// Set the cleaned dataset path.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output.main = path.into();
        self
    }

    /// Set the demo extract path.
    pub fn demo_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output.demo = path.into();
        self
    }

    /// Enable or disable the database load stage.
    pub fn load_to_database(mut self, enabled: bool) -> Self {
        self.config.load_to_database = enabled;
        self
    }

    /// Replace all database settings.
    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = database;
        self
    }

    /// Build the configuration, validating all settings.
    pub fn build(self) -> Result<EtlConfig, ConfigValidationError> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the configuration without validation.
    pub fn build_unchecked(self) -> EtlConfig {
        self.config
    }
}
