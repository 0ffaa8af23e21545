//! Delimited-text reader.

use crate::error::{QualityError, Result};
use crate::utils::MISSING_MARKERS;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::io::Cursor;

/// An empty header, or the name the reader gives a repeated empty header.
static BLANK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:|_duplicated_\d+)$").expect("blank header pattern is valid"));

/// Rows sampled for column type inference.
const SCHEMA_INFERENCE_ROWS: usize = 1000;

/// Parse CSV bytes with a header row. Malformed input is a hard failure; no
/// partial recovery is attempted.
pub(crate) fn read_csv(bytes: &[u8]) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(
        MISSING_MARKERS
            .iter()
            .map(|marker| PlSmallStr::from_str(marker))
            .collect(),
    );

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .and_then(name_blank_headers)
        .map_err(|e| QualityError::parse("CSV", e))
}

/// Blank headers become `Unnamed: <position>`, matching the spreadsheet
/// reader.
fn name_blank_headers(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if is_blank_header(name.as_str()) {
                format!("Unnamed: {}", idx)
            } else {
                name.to_string()
            }
        })
        .collect();

    df.set_column_names(names)?;
    Ok(df)
}

fn is_blank_header(name: &str) -> bool {
    BLANK_HEADER.is_match(name)
}
