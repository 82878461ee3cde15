//! The five cleaning rules.
//!
//! Rules run in a fixed order:
//! 1. Mean imputation for `gross`
//! 2. `facenumber_in_poster` set to 0 on every row
//! 3. `TittleCode` extracted from `movie_imdb_link`
//! 4. `title_year` set to 0 on every row
//! 5. Rows outside the USA dropped
//!
//! Afterwards `TittleCode` is moved to the last position.

mod country;
mod imputation;
mod overrides;
mod title_code;

pub use country::{TARGET_COUNTRY, is_target_country};
pub use imputation::GrossImputation;
pub use title_code::{extract_title_code, is_valid_title_code};

use crate::error::{EtlError, Result};
use crate::types::{DEMO_COLUMNS, OverrideDiagnostics, TITLE_CODE_COLUMN, TransformReport};
use crate::utils::retain_by_mask;
use polars::prelude::*;
use tracing::{debug, info};

/// Output of the transformer.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Cleaned table, `TittleCode` last.
    pub cleaned: DataFrame,
    /// Demo evidence extract, one row per cleaned row.
    pub demo: DataFrame,
    pub report: TransformReport,
}

/// Applies the cleaning rules to a loaded table.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transformer;

impl Transformer {
    /// Run all five rules over `df`.
    pub fn transform(&self, df: DataFrame) -> Result<TransformOutput> {
        self.transform_internal(df)
            .map_err(|e| EtlError::TransformFailed(e.to_string()))
    }

    fn transform_internal(&self, df: DataFrame) -> anyhow::Result<TransformOutput> {
        let mut df = df;
        let rows_before = df.height();

        info!("Applying cleaning rules to {} rows...", rows_before);

        // 1. gross -> mean imputation
        let gross = imputation::impute_mean(&mut df, "gross")?;

        // 2. facenumber_in_poster -> 0 everywhere
        let faces_original = overrides::zero_out(&mut df, "facenumber_in_poster")?;

        // 3. TittleCode from movie_imdb_link
        title_code::add_title_code_column(&mut df, "movie_imdb_link")?;

        // 4. title_year -> 0 everywhere
        let years_original = overrides::zero_out(&mut df, "title_year")?;

        // 5. USA only
        let mask = country::trim_and_mask(&mut df, "country")?;
        let df = country::filter_rows(&df, &mask)?;
        let rows_after = df.height();
        debug!("Country filter kept {} of {} rows", rows_after, rows_before);

        let cleaned = move_column_last(&df, TITLE_CODE_COLUMN)?;

        let imputed_kept = retain_by_mask(&gross.imputed, &mask);
        let demo = build_demo(&cleaned, &imputed_kept)?;

        let face_number = OverrideDiagnostics {
            column: "facenumber_in_poster".to_string(),
            before: overrides::original_stats(&retain_by_mask(&faces_original, &mask)),
            after: overrides::overridden_stats(
                cleaned.column("facenumber_in_poster")?.as_materialized_series(),
            )?,
        };
        let title_year = OverrideDiagnostics {
            column: "title_year".to_string(),
            before: overrides::original_stats(&retain_by_mask(&years_original, &mask)),
            after: overrides::overridden_stats(
                cleaned.column("title_year")?.as_materialized_series(),
            )?,
        };
        log_override(&face_number);
        log_override(&title_year);

        let report = TransformReport {
            rows_before,
            rows_after,
            gross_mean: gross.mean,
            gross_imputed: imputed_kept.iter().filter(|flag| **flag).count(),
            title_codes_found: rows_after - cleaned.column(TITLE_CODE_COLUMN)?.null_count(),
            face_number,
            title_year,
        };

        Ok(TransformOutput {
            cleaned,
            demo,
            report,
        })
    }
}

/// Move `column` to the end, keeping the relative order of all others.
pub fn move_column_last(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let mut order: Vec<PlSmallStr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != column)
        .cloned()
        .collect();
    order.push(column.into());
    Ok(df.select(order)?)
}

/// Build the demo extract from the cleaned table and the surviving imputation flags.
fn build_demo(cleaned: &DataFrame, imputed: &[bool]) -> anyhow::Result<DataFrame> {
    let flags: Vec<i32> = imputed.iter().map(|flag| i32::from(*flag)).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(DEMO_COLUMNS.len());
    for name in DEMO_COLUMNS {
        if name == "gross_imputed_mean" {
            columns.push(Series::new(name.into(), flags.clone()).into());
        } else {
            columns.push(cleaned.column(name)?.clone());
        }
    }

    Ok(DataFrame::new(columns)?)
}

fn log_override(diag: &OverrideDiagnostics) {
    info!(
        "{} -> forced to 0 | before: nulls={} negatives={} zeros={} | after: nulls={} min={:?} max={:?} zeros={}",
        diag.column,
        diag.before.nulls,
        diag.before.negatives,
        diag.before.zeros,
        diag.after.nulls,
        diag.after.min,
        diag.after.max,
        diag.after.zeros
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df![
            "movie_title" => ["Avatar", "Spider-Man 3", "Amelie", "John Carter"],
            "gross" => [Some(100.0), None, Some(200.0), None],
            "facenumber_in_poster" => [Some(0i64), Some(-2), Some(5), None],
            "movie_imdb_link" => [
                Some("http://www.imdb.com/title/tt0499549/?ref_=fn_tt_tt_1"),
                Some("not a link"),
                Some("http://www.imdb.com/title/tt0211915/"),
                Some("https://example.com/?id=tt04015290"),
            ],
            "title_year" => [Some(2009i64), Some(2007), Some(2001), None],
            "country" => ["USA", "usa ", "France", " Usa"],
            "imdb_score" => [7.9, 6.2, 8.4, 6.6],
        ]
        .unwrap()
    }

    #[test]
    fn test_transform_sample() {
        let output = Transformer.transform(sample()).unwrap();
        let cleaned = &output.cleaned;

        assert_eq!(cleaned.height(), 3);
        let names: Vec<String> = cleaned
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "movie_title",
                "gross",
                "facenumber_in_poster",
                "movie_imdb_link",
                "title_year",
                "country",
                "imdb_score",
                "TittleCode",
            ]
        );

        // mean over every numeric original, France included
        assert_eq!(output.report.gross_mean, Some(150.0));
        let gross = cleaned.column("gross").unwrap();
        assert_eq!(gross.get(1).unwrap().try_extract::<f64>().unwrap(), 150.0);

        let codes = cleaned.column(TITLE_CODE_COLUMN).unwrap();
        assert_eq!(codes.get(0).unwrap(), AnyValue::String("tt0499549"));
        assert!(codes.get(1).unwrap().is_null());
        assert_eq!(codes.get(2).unwrap(), AnyValue::String("tt04015290"));

        let country = cleaned.column("country").unwrap();
        assert_eq!(country.get(1).unwrap(), AnyValue::String("usa"));
        assert_eq!(country.get(2).unwrap(), AnyValue::String("Usa"));
    }

    #[test]
    fn test_demo_extract() {
        let output = Transformer.transform(sample()).unwrap();
        let demo = &output.demo;

        let names: Vec<String> = demo
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, DEMO_COLUMNS.to_vec());
        assert_eq!(demo.height(), 3);

        let flags: Vec<i32> = demo
            .column("gross_imputed_mean")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(flags, vec![0, 1, 1]);
    }

    #[test]
    fn test_report_diagnostics() {
        let report = Transformer.transform(sample()).unwrap().report;

        assert_eq!(report.rows_before, 4);
        assert_eq!(report.rows_after, 3);
        assert_eq!(report.gross_imputed, 2);
        assert_eq!(report.title_codes_found, 2);

        // surviving originals: 0, -2, null
        assert_eq!(report.face_number.before.zeros, 1);
        assert_eq!(report.face_number.before.negatives, 1);
        assert_eq!(report.face_number.before.nulls, 1);
        assert_eq!(report.face_number.after.zeros, 3);
        assert_eq!(report.face_number.after.max, Some(0.0));

        assert_eq!(report.title_year.before.nulls, 1);
        assert_eq!(report.title_year.after.nulls, 0);
        assert_eq!(report.title_year.after.zeros, 3);
    }

    #[test]
    fn test_existing_title_code_column_is_replaced_and_moved() {
        let df = df![
            "TittleCode" => ["stale"],
            "gross" => [Some(1.0)],
            "facenumber_in_poster" => [Some(1i64)],
            "movie_imdb_link" => ["/title/tt1234567/"],
            "title_year" => [Some(1999i64)],
            "country" => ["USA"],
        ]
        .unwrap();

        let cleaned = Transformer.transform(df).unwrap().cleaned;

        let names = cleaned.get_column_names();
        assert_eq!(names.len(), 6);
        assert_eq!(names[5].as_str(), TITLE_CODE_COLUMN);
        assert_eq!(
            cleaned.column(TITLE_CODE_COLUMN).unwrap().get(0).unwrap(),
            AnyValue::String("tt1234567")
        );
    }

    #[test]
    fn test_no_usa_rows() {
        let df = df![
            "gross" => [Some(1.0)],
            "facenumber_in_poster" => [Some(1i64)],
            "movie_imdb_link" => ["/title/tt1234567/"],
            "title_year" => [Some(1999i64)],
            "country" => ["Canada"],
        ]
        .unwrap();

        let output = Transformer.transform(df).unwrap();
        assert_eq!(output.cleaned.height(), 0);
        assert_eq!(output.demo.height(), 0);
        assert_eq!(output.report.face_number.after.min, None);
    }

    #[test]
    fn test_move_column_last() {
        let df = df![
            "a" => [1i64],
            "b" => [2i64],
            "c" => [3i64],
        ]
        .unwrap();
        let moved = move_column_last(&df, "a").unwrap();
        let names: Vec<&str> = moved.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }
}
