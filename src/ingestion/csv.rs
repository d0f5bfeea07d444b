//! Delimited-text ingestion.
//!
//! Rules:
//!
//! - input is UTF-8, with or without a byte-order mark
//! - the delimiter is detected from the first lines (see [`detect_delimiter`])
//! - the first record is the header
//! - records with more fields than the header are skipped; shorter ones are padded with nulls
//! - each column is typed as a whole: integers, then floats, then booleans, otherwise strings

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Table, Value};

use super::unique_headers;

/// Delimiters considered by [`detect_delimiter`], in order of preference on ties.
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Number of non-blank lines inspected when detecting the delimiter.
pub const SNIFF_LINES: usize = 20;

/// Cell spellings read as missing values.
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Ingest a delimited-text file into a raw [`Table`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<Table> {
    let bytes = std::fs::read(path)?;
    ingest_csv_from_bytes(&bytes)
}

/// Ingest delimited text held in memory.
pub fn ingest_csv_from_bytes(bytes: &[u8]) -> IngestionResult<Table> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = String::from_utf8(bytes.to_vec())?;
    let delimiter = detect_delimiter(&text);
    debug!(delimiter = %char::from(delimiter).escape_default(), "detected delimiter");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
///
/// The reader must have headers enabled; it should be `flexible` so that ragged lines reach the
/// skip/pad rules instead of failing the whole parse.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<Table> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
        return Err(IngestionError::Malformed {
            message: "no columns to parse from file".to_string(),
        });
    }
    let columns = unique_headers(headers.iter().map(str::to_string));
    let width = columns.len();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    let mut skipped = 0usize;
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based line numbers for users; +1 again because header is line 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        if record.len() > width {
            warn!(
                row = user_row,
                expected = width,
                found = record.len(),
                "skipping malformed line"
            );
            skipped += 1;
            continue;
        }

        let mut row: Vec<Option<String>> = record.iter().map(na_to_none).collect();
        row.resize(width, None);
        raw_rows.push(row);
    }
    if skipped > 0 {
        debug!(skipped, "malformed lines skipped");
    }

    Ok(type_columns(columns, raw_rows))
}

fn na_to_none(raw: &str) -> Option<String> {
    if NA_VALUES.contains(&raw.trim()) {
        None
    } else {
        Some(raw.to_string())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextColumnType {
    Int64,
    Float64,
    Bool,
    Utf8,
}

fn type_columns(columns: Vec<String>, raw_rows: Vec<Vec<Option<String>>>) -> Table {
    let types: Vec<TextColumnType> = (0..columns.len())
        .map(|idx| infer_text_column(raw_rows.iter().filter_map(|r| r[idx].as_deref())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(types.iter())
                .map(|(cell, ty)| match cell {
                    None => Value::Null,
                    Some(raw) => parse_cell(raw, *ty),
                })
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

fn infer_text_column<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> TextColumnType {
    if cells.clone().all(|c| c.trim().parse::<i64>().is_ok()) {
        TextColumnType::Int64
    } else if cells.clone().all(|c| c.trim().parse::<f64>().is_ok()) {
        TextColumnType::Float64
    } else if cells.clone().all(|c| parse_bool(c).is_some()) {
        TextColumnType::Bool
    } else {
        TextColumnType::Utf8
    }
}

fn parse_cell(raw: String, ty: TextColumnType) -> Value {
    let parsed = match ty {
        TextColumnType::Int64 => raw.trim().parse::<i64>().ok().map(Value::Int64),
        TextColumnType::Float64 => raw.trim().parse::<f64>().ok().map(Value::Float64),
        TextColumnType::Bool => parse_bool(&raw).map(Value::Bool),
        TextColumnType::Utf8 => None,
    };
    parsed.unwrap_or(Value::Utf8(raw))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Pick the delimiter from the first [`SNIFF_LINES`] non-blank lines.
///
/// Counts ignore quoted sections. A candidate that occurs the same, non-zero number of times on
/// every inspected line beats one that does not; among equals the higher per-line count wins.
/// Falls back to `,` when no candidate occurs at all.
pub fn detect_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best: Option<(bool, usize, u8)> = None;
    for &candidate in &CANDIDATE_DELIMITERS {
        let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, candidate)).collect();
        let total: usize = counts.iter().sum();
        if total == 0 {
            continue;
        }
        let consistent = counts.iter().all(|&c| c > 0 && c == counts[0]);
        let score = if consistent { counts[0] } else { total };
        let better = match best {
            None => true,
            Some((best_consistent, best_score, _)) => {
                (consistent, score) > (best_consistent, best_score)
            }
        };
        if better {
            best = Some((consistent, score, candidate));
        }
    }

    best.map(|(_, _, d)| d).unwrap_or(b',')
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for &b in line.as_bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}
