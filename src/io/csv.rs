//! CSV and JSON table encoding.

use std::io::Cursor;

use anyhow::{Context, Result};
use polars::{
    frame::DataFrame,
    io::{SerReader, SerWriter},
    prelude::{CsvReadOptions, CsvWriter, JsonFormat, JsonWriter},
};

/// Reads CSV bytes into a DataFrame with every column as a string.
/// Typing is left to the normalizers so that "integer-like" cells
/// (`2021`, `2021.0`) and sparse numeric columns are handled explicitly.
pub(crate) fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("[io::csv::read] Failed to read CSV from bytes")
}

/// Write a DataFrame to CSV bytes.
pub(crate) fn write_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    CsvWriter::new(&mut out)
        .finish(&mut df.clone())
        .context("[io::csv::write] Failed to write CSV to bytes")?;
    Ok(out)
}

/// Write a DataFrame to a JSON array of row objects.
pub(crate) fn write_json_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    JsonWriter::new(&mut out)
        .with_json_format(JsonFormat::Json)
        .finish(&mut df.clone())
        .context("[io::json::write] Failed to write JSON to bytes")?;
    Ok(out)
}
