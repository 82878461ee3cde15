//! SQL text for the destination table.
//!
//! Identifiers are always double-quoted, so mixed-case names such as
//! `TittleCode` keep their case.

use crate::types::TITLE_CODE_COLUMN;
use crate::utils::{is_float_dtype, is_integer_dtype};
use polars::prelude::*;

/// PostgreSQL column type for a polars dtype.
pub fn postgres_type(dtype: &DataType) -> &'static str {
    if is_integer_dtype(dtype) {
        "BIGINT"
    } else if is_float_dtype(dtype) {
        "DOUBLE PRECISION"
    } else if matches!(dtype, DataType::Boolean) {
        "BOOLEAN"
    } else {
        "TEXT"
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `"schema"."table"`
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Comma-separated quoted column list in table order.
pub fn column_list(table: &DataFrame) -> String {
    table
        .get_column_names()
        .into_iter()
        .map(|name| quote_ident(name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CHECK constraints mirroring rules 2, 3 and 4.
pub fn check_constraints() -> [String; 3] {
    let code = quote_ident(TITLE_CODE_COLUMN);
    [
        format!("CHECK ({} = 0)", quote_ident("facenumber_in_poster")),
        format!("CHECK ({} = 0)", quote_ident("title_year")),
        format!("CHECK ({code} IS NULL OR {code} ~ '^tt[0-9]{{7,8}}$')"),
    ]
}

/// `CREATE TABLE IF NOT EXISTS` with one column per table column plus the checks.
pub fn create_table_sql(schema: &str, table_name: &str, table: &DataFrame) -> String {
    let mut parts: Vec<String> = table
        .get_columns()
        .iter()
        .map(|column| format!("{} {}", quote_ident(column.name()), postgres_type(column.dtype())))
        .collect();
    parts.extend(check_constraints());

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        qualified_name(schema, table_name),
        parts.join(",\n  ")
    )
}

pub fn truncate_sql(schema: &str, table_name: &str) -> String {
    format!("TRUNCATE TABLE {}", qualified_name(schema, table_name))
}

/// `COPY ... FROM STDIN` matching the CSV produced by the sink writer.
pub fn copy_sql(schema: &str, table_name: &str, table: &DataFrame) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT CSV, HEADER TRUE, ENCODING 'UTF8')",
        qualified_name(schema, table_name),
        column_list(table)
    )
}

/// The two secondary indexes, on `TittleCode` and `country`.
pub fn index_sql(schema: &str, table_name: &str) -> [String; 2] {
    let target = qualified_name(schema, table_name);
    [
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&format!("ix_{table_name}_tittlecode")),
            target,
            quote_ident(TITLE_CODE_COLUMN)
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&format!("ix_{table_name}_country")),
            target,
            quote_ident("country")
        ),
    ]
}
