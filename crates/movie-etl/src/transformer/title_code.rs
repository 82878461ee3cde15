//! Rule 3: `TittleCode` extraction from IMDB permalinks.

use crate::types::TITLE_CODE_COLUMN;
use crate::utils::coerce_to_strings;
use anyhow::Result;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

static TITLE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/title/(tt[0-9]{7,8})").expect("Invalid regex: title path"));

static LOOSE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tt[0-9]{7,8}").expect("Invalid regex: loose title code"));

static VALID_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tt[0-9]{7,8}$").expect("Invalid regex: title code"));

/// Extract a title code such as `tt0499549` from a link.
///
/// A `/title/tt...` path segment wins; otherwise the first `tt` + 7-8 digit
/// run anywhere in the string is used.
pub fn extract_title_code(link: &str) -> Option<String> {
    if let Some(caps) = TITLE_PATH.captures(link) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    LOOSE_CODE.find(link).map(|m| m.as_str().to_string())
}

/// True when `code` is exactly `tt` followed by 7 or 8 ASCII digits.
pub fn is_valid_title_code(code: &str) -> bool {
    VALID_CODE.is_match(code)
}

/// Add (or overwrite) the `TittleCode` column derived from `link_column`.
pub fn add_title_code_column(df: &mut DataFrame, link_column: &str) -> Result<usize> {
    let links = coerce_to_strings(df.column(link_column)?.as_materialized_series())?;
    let codes: Vec<Option<String>> = links
        .iter()
        .map(|link| link.as_deref().and_then(extract_title_code))
        .collect();
    let found = codes.iter().filter(|code| code.is_some()).count();

    df.with_column(Series::new(TITLE_CODE_COLUMN.into(), codes))?;
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_title_path() {
        assert_eq!(
            extract_title_code("http://www.imdb.com/title/tt0499549/?ref_=fn_tt_tt_1"),
            Some("tt0499549".to_string())
        );
    }

    #[test]
    fn test_extract_fallback_without_title_segment() {
        assert_eq!(
            extract_title_code("https://example.com/watch?id=tt12345678"),
            Some("tt12345678".to_string())
        );
    }

    #[test]
    fn test_title_segment_preferred_over_earlier_code() {
        assert_eq!(
            extract_title_code("http://x/tt1111111/title/tt2222222/"),
            Some("tt2222222".to_string())
        );
    }

    #[test]
    fn test_no_code() {
        assert_eq!(extract_title_code("http://www.imdb.com/name/nm0000116/"), None);
        assert_eq!(extract_title_code("tt123456"), None);
        assert_eq!(extract_title_code(""), None);
    }

    #[test]
    fn test_long_digit_run_is_truncated_to_eight() {
        assert_eq!(
            extract_title_code("/title/tt123456789"),
            Some("tt12345678".to_string())
        );
    }

    #[test]
    fn test_is_valid_title_code() {
        assert!(is_valid_title_code("tt0499549"));
        assert!(is_valid_title_code("tt12345678"));
        assert!(!is_valid_title_code("tt123456"));
        assert!(!is_valid_title_code("tt123456789"));
        assert!(!is_valid_title_code("xtt1234567"));
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits match `\d` but not the database CHECK
        let link = "http://www.imdb.com/title/tt\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}/";
        assert_eq!(extract_title_code(link), None);
        assert!(!is_valid_title_code(
            "tt\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}"
        ));
    }

    #[test]
    fn test_add_title_code_column() {
        let mut df = df![
            "movie_imdb_link" => [
                Some("http://www.imdb.com/title/tt0499549/?ref_=fn_tt_tt_1"),
                None,
                Some("no code here"),
            ],
        ]
        .unwrap();

        let found = add_title_code_column(&mut df, "movie_imdb_link").unwrap();

        assert_eq!(found, 1);
        let codes = df.column(TITLE_CODE_COLUMN).unwrap();
        assert_eq!(codes.get(0).unwrap(), AnyValue::String("tt0499549"));
        assert!(codes.get(1).unwrap().is_null());
        assert!(codes.get(2).unwrap().is_null());
    }
}
