//! CLI entry point for the movie metadata ETL.

use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser};
use dotenv::dotenv;
use movie_etl::{
    DatabaseConfig, EtlConfig, EtlPipeline, OutputPathResolver, OutputPaths, OverrideDiagnostics,
    RunSummary, default_output_paths, parse_bool_flag,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Movie ETL Team",
    version,
    about = "Clean a movie metadata CSV and load it into PostgreSQL",
    long_about = "Applies five fixed cleaning rules to a movie metadata CSV, writes the cleaned \
                  dataset plus a demo evidence extract, validates the result and optionally \
                  bulk-loads it into PostgreSQL.\n\n\
                  Every option can also be set through the environment variable shown in its \
                  help; a .env file in the working directory is read first.\n\n\
                  EXAMPLES:\n  \
                  # Clean only, no database\n  \
                  movie-etl -i movie_metadata.csv --no-db\n\n  \
                  # Explicit outputs and destination table\n  \
                  movie-etl -i movie_metadata.csv -o out/clean.csv --demo-output out/demo.csv --pg-table movies\n\n  \
                  # Check the rules without writing anything\n  \
                  movie-etl -i movie_metadata.csv --dry-run"
)]
struct Args {
    /// Path to the input CSV
    #[arg(short, long, env = "INPUT_CSV", default_value = "movie_metadata.csv")]
    input: PathBuf,

    /// Path of the cleaned CSV
    ///
    /// Defaults to FilmTV_USAMoviesClean.csv in the first usable desktop
    /// folder, or in the current directory.
    #[arg(short, long, env = "OUTPUT_CSV")]
    output: Option<PathBuf>,

    /// Path of the demo evidence CSV
    #[arg(long, env = "OUTPUT_CSV_DEMO")]
    demo_output: Option<PathBuf>,

    /// Whether to load the cleaned table into PostgreSQL (1/0, true/false, yes/no, on/off)
    #[arg(
        long,
        env = "LOAD_TO_PG",
        default_value = "1",
        action = ArgAction::Set,
        value_parser = parse_bool_flag
    )]
    load_to_pg: bool,

    /// Skip the database load regardless of LOAD_TO_PG
    #[arg(long)]
    no_db: bool,

    #[arg(long, env = "PGHOST", default_value = "localhost")]
    pg_host: String,

    #[arg(long, env = "PGPORT", default_value = "5432")]
    pg_port: u16,

    #[arg(long, env = "PGDATABASE", default_value = "etl")]
    pg_database: String,

    #[arg(long, env = "PGUSER", default_value = "postgres")]
    pg_user: String,

    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pg_password: Option<String>,

    /// Destination schema
    #[arg(long, env = "PGSCHEMA", default_value = "public")]
    pg_schema: String,

    /// Destination table
    #[arg(long, env = "PGTABLE", default_value = "film_tv_usa_movies_clean")]
    pg_table: String,

    /// Load, clean and validate in memory without writing files or touching the database
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final summary)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run summary (or the error) as JSON on stdout; disables logging
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // .env must be read before clap resolves env-backed options
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args, default_output_paths)?;
    let pipeline = EtlPipeline::builder().config(config).build()?;

    let result = if args.dry_run {
        info!("Dry run: nothing will be written");
        pipeline.dry_run()
    } else {
        pipeline.run()
    };

    match result {
        Ok(summary) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_human_readable_summary(&summary, args.dry_run);
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            Err(anyhow!("ETL failed [{}]: {}", e.error_code(), e))
        }
    }
}

/// Resolve the run configuration once from CLI/env values.
///
/// `resolve_outputs` is only called when an output path was not given, and
/// never on a dry run since it may create folders.
fn build_config(args: &Args, resolve_outputs: OutputPathResolver) -> Result<EtlConfig> {
    let output = match (&args.output, &args.demo_output) {
        (Some(main), Some(demo)) => OutputPaths {
            main: main.clone(),
            demo: demo.clone(),
        },
        (main, demo) => {
            let defaults = if args.dry_run {
                OutputPaths::in_dir(".")
            } else {
                resolve_outputs()
            };
            OutputPaths {
                main: main.clone().unwrap_or(defaults.main),
                demo: demo.clone().unwrap_or(defaults.demo),
            }
        }
    };

    let database = DatabaseConfig {
        host: args.pg_host.clone(),
        port: args.pg_port,
        database: args.pg_database.clone(),
        user: args.pg_user.clone(),
        password: args.pg_password.clone(),
        schema: args.pg_schema.clone(),
        table: args.pg_table.clone(),
    };

    let config = EtlConfig::builder()
        .input_path(&args.input)
        .output_paths(output)
        .load_to_database(args.load_to_pg && !args.no_db && !args.dry_run)
        .database(database)
        .build()?;

    Ok(config)
}

/// Format a number with two decimals and comma thousands separators.
fn format_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

fn print_override(diag: &OverrideDiagnostics) {
    println!(
        "  {:<22} before: nulls={} negatives={} zeros={} | after: nulls={} min={} max={} zeros={}",
        diag.column,
        diag.before.nulls,
        diag.before.negatives,
        diag.before.zeros,
        diag.after.nulls,
        diag.after.min.map_or("-".to_string(), |v| v.to_string()),
        diag.after.max.map_or("-".to_string(), |v| v.to_string()),
        diag.after.zeros
    );
}

/// Print a human-readable summary of the run.
///
/// Uses `println!` rather than tracing so it shows regardless of log level.
fn print_human_readable_summary(summary: &RunSummary, dry_run: bool) {
    let report = &summary.transform;

    println!();
    println!("{}", "=".repeat(80));
    println!("{}", if dry_run { "DRY RUN COMPLETE" } else { "ETL COMPLETE" });
    println!("{}", "=".repeat(80));
    println!();

    println!("Input:   {}", summary.input_file.display());
    if let Some(ref outputs) = summary.outputs {
        println!("Cleaned: {}", outputs.main.display());
        println!("Demo:    {}", outputs.demo.display());
    }
    println!();

    println!(
        "Rows: {} read -> {} written ({} dropped by country filter)",
        summary.rows_read, summary.rows_written, summary.rows_dropped
    );
    match report.gross_mean {
        Some(mean) => println!(
            "Gross mean used for imputation: {} ({} rows imputed)",
            format_thousands(mean),
            report.gross_imputed
        ),
        None => println!("Gross mean used for imputation: n/a"),
    }
    println!(
        "TittleCode extracted for {} of {} rows",
        report.title_codes_found, summary.rows_written
    );
    println!();

    println!("Forced-to-zero columns:");
    print_override(&report.face_number);
    print_override(&report.title_year);
    println!();

    if let Some(ref load) = summary.load {
        println!(
            "Database: {} rows loaded into {}.{}",
            load.rows_loaded, load.schema, load.table
        );
    } else {
        println!("Database: load skipped");
    }
    println!("Duration: {}ms", summary.duration_ms);
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse with every env-backed option pinned on the command line, so
    /// INPUT_CSV, PGPORT and friends in the environment cannot leak in.
    fn parse(extra: &[&str]) -> Args {
        let pinned = [
            ("--input", "movie_metadata.csv"),
            ("--load-to-pg", "1"),
            ("--pg-host", "localhost"),
            ("--pg-port", "5432"),
            ("--pg-database", "etl"),
            ("--pg-user", "postgres"),
            ("--pg-schema", "public"),
            ("--pg-table", "film_tv_usa_movies_clean"),
        ];

        let mut argv = vec!["movie-etl"];
        for (flag, value) in pinned {
            if !extra.contains(&flag) {
                argv.extend([flag, value]);
            }
        }
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    /// Arguments as parsed from an empty command line and environment.
    fn base_args() -> Args {
        Args {
            input: PathBuf::from("movie_metadata.csv"),
            output: None,
            demo_output: None,
            load_to_pg: true,
            no_db: false,
            pg_host: "localhost".to_string(),
            pg_port: 5432,
            pg_database: "etl".to_string(),
            pg_user: "postgres".to_string(),
            pg_password: None,
            pg_schema: "public".to_string(),
            pg_table: "film_tv_usa_movies_clean".to_string(),
            dry_run: false,
            log_level: "info".to_string(),
            quiet: false,
            json: false,
        }
    }

    fn fixed_outputs() -> OutputPaths {
        OutputPaths::in_dir("/tmp/probed")
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(410929023.8), "410,929,023.80");
        assert_eq!(format_thousands(150.0), "150.00");
        assert_eq!(format_thousands(1000.0), "1,000.00");
        assert_eq!(format_thousands(-1234.5), "-1,234.50");
        assert_eq!(format_thousands(0.0), "0.00");
    }

    #[test]
    fn test_explicit_outputs_skip_resolver() {
        let args = Args {
            output: Some(PathBuf::from("a.csv")),
            demo_output: Some(PathBuf::from("b.csv")),
            no_db: true,
            ..base_args()
        };
        let config = build_config(&args, || panic!("resolver must not run")).unwrap();
        assert_eq!(config.output.main, PathBuf::from("a.csv"));
        assert_eq!(config.output.demo, PathBuf::from("b.csv"));
        assert!(!config.load_to_database);
    }

    #[test]
    fn test_missing_output_uses_resolver() {
        let args = Args {
            output: Some(PathBuf::from("a.csv")),
            no_db: true,
            ..base_args()
        };
        let config = build_config(&args, fixed_outputs).unwrap();
        assert_eq!(config.output.main, PathBuf::from("a.csv"));
        assert_eq!(config.output.demo, fixed_outputs().demo);
    }

    #[test]
    fn test_dry_run_never_resolves_outputs() {
        let args = Args {
            dry_run: true,
            ..base_args()
        };
        let config = build_config(&args, || panic!("resolver must not run")).unwrap();
        assert_eq!(config.output, OutputPaths::in_dir("."));
    }

    #[test]
    fn test_load_flag_values() {
        assert!(!parse(&["--load-to-pg", "0"]).load_to_pg);
        assert!(parse(&["--load-to-pg", "yes"]).load_to_pg);
        assert!(!parse(&["--load-to-pg", "OFF"]).load_to_pg);
        assert!(Args::try_parse_from(["movie-etl", "--load-to-pg", "maybe"]).is_err());
    }

    #[test]
    fn test_cli_values_override_environment() {
        let args = parse(&["--pg-port", "6543", "--no-db"]);
        assert_eq!(args.pg_port, 6543);
        assert!(args.no_db);
    }

    #[test]
    fn test_dry_run_disables_database() {
        let args = Args {
            dry_run: true,
            ..base_args()
        };
        let config = build_config(&args, fixed_outputs).unwrap();
        assert!(!config.load_to_database);
    }
}
