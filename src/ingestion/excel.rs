use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{parse_datetime, Table, Value};

use super::unique_headers;

/// Spreadsheet engine used to open a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetEngine {
    /// Office Open XML workbooks (`.xlsx`, zip container).
    Modern,
    /// BIFF workbooks (`.xls`, compound document).
    Legacy,
}

/// Read the first sheet of a workbook into a raw [`Table`].
///
/// Returns the table together with every sheet name in workbook order; the first name is the
/// sheet that was read.
///
/// Behavior:
/// - Detects the first non-empty row as the header row
/// - Reads remaining rows, padding short rows with nulls
/// - A sheet without any non-empty row yields an empty table
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    engine: SpreadsheetEngine,
) -> IngestionResult<(Table, Vec<String>)> {
    // Opened here so that a missing file surfaces as plain I/O rather than an engine error.
    let file = BufReader::new(File::open(path.as_ref())?);
    let (range, sheet_names) = match engine {
        SpreadsheetEngine::Modern => {
            let mut workbook = Xlsx::new(file).map_err(calamine::Error::from)?;
            let names = workbook.sheet_names();
            let first = names.first().ok_or(IngestionError::NoSheets)?.clone();
            let range = workbook
                .worksheet_range(&first)
                .map_err(calamine::Error::from)?;
            (range, names)
        }
        SpreadsheetEngine::Legacy => {
            let mut workbook = Xls::new(file).map_err(calamine::Error::from)?;
            let names = workbook.sheet_names();
            let first = names.first().ok_or(IngestionError::NoSheets)?.clone();
            let range = workbook
                .worksheet_range(&first)
                .map_err(calamine::Error::from)?;
            (range, names)
        }
    };

    Ok((range_to_table(&range), sheet_names))
}

fn range_to_table(range: &Range<Data>) -> Table {
    let Some(header_row_idx) = range
        .rows()
        .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
    else {
        return Table::new(Vec::new(), Vec::new());
    };

    let mut rows_iter = range.rows().skip(header_row_idx);
    let header_cells: Vec<String> = rows_iter
        .next()
        .map(|row| row.iter().map(cell_to_header_string).collect())
        .unwrap_or_default();
    let columns = unique_headers(header_cells);
    let width = columns.len();

    let rows = rows_iter
        .map(|row| {
            let mut out: Vec<Value> = row.iter().take(width).map(convert_cell).collect();
            out.resize(width, Value::Null);
            out
        })
        .collect();

    Table::new(columns, rows)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Value::DateTime(d).to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => Value::Utf8(s.clone()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Float64(dt.as_f64())),
        Data::DateTimeIso(s) => parse_datetime(s)
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Utf8(s.clone())),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_skips_leading_blank_rows_and_pads() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 2));
        range.set_value((1, 0), Data::String("region".into()));
        range.set_value((1, 1), Data::String("sales".into()));
        range.set_value((1, 2), Data::String("sales".into()));
        range.set_value((2, 0), Data::String("A".into()));
        range.set_value((2, 1), Data::Float(10.0));
        range.set_value((3, 0), Data::String("B".into()));
        range.set_value((3, 2), Data::Bool(true));

        let t = range_to_table(&range);
        assert_eq!(t.columns, vec!["region", "sales", "sales.1"]);
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Utf8("A".into()), Value::Float64(10.0), Value::Null],
                vec![Value::Utf8("B".into()), Value::Null, Value::Bool(true)],
            ]
        );
    }

    #[test]
    fn empty_range_is_empty_table() {
        let range: Range<Data> = Range::new((0, 0), (1, 1));
        let t = range_to_table(&range);
        assert_eq!(t.column_count(), 0);
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn missing_workbook_is_an_io_error() {
        let err = ingest_excel_from_path(
            "tests/fixtures/does_not_exist.xlsx",
            SpreadsheetEngine::Modern,
        )
        .unwrap_err();
        assert!(matches!(err, IngestionError::Io(_)));
        assert!(!err.is_content_error());
    }
}
