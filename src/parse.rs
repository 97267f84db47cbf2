//! Tabular parser: raw delimited bytes in, rows plus an ordered column list out.
//!
//! The delimiter is chosen by inspecting the first line (a tab character wins
//! over comma), so `.txt` exports parse the same as properly named `.csv` /
//! `.tsv` files. Quoting follows standard CSV rules via the `csv` crate, so
//! quoted fields may contain delimiters and newlines.

use encoding_rs::UTF_8;

use crate::{
    data::{Cell, Row},
    error::CoreError,
};

#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Picks tab when the header line contains one, comma otherwise.
pub fn detect_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

pub fn parse_delimited(bytes: &[u8], source_name: &str) -> Result<ParsedFile, CoreError> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        return Err(CoreError::parse(source_name, "file is not valid UTF-8 text"));
    }

    let delimiter = detect_delimiter(&text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = reader
        .headers()
        .map_err(|err| CoreError::parse(source_name, err.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record
            .map_err(|err| CoreError::parse(source_name, format!("row {}: {err}", idx + 2)))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let mut row = Row::with_capacity(columns.len());
        for (col, field) in columns.iter().zip(record.iter()) {
            row.insert(col.clone(), Cell::from_raw(field));
        }
        rows.push(row);
    }

    Ok(ParsedFile { columns, rows })
}
