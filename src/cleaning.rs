//! Normalize a raw table into its clean form.
//!
//! Steps, in order:
//!
//! 1. drop rows where every cell is null
//! 2. drop columns where every cell is null
//! 3. for every column that is not uniformly numeric, boolean or date/time, replace each cell by
//!    its trimmed string form, blank strings becoming null
//!
//! Step 3 can empty a row or column that only held whitespace, so steps 1 and 2 run once more.
//! A table without rows after cleaning is an error, never an empty success.

use tracing::debug;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataType, Table, Value};

/// Clean `raw`. Deterministic and pure.
pub fn clean_table(raw: Table) -> IngestionResult<Table> {
    let (before_rows, before_cols) = (raw.row_count(), raw.column_count());

    let mut table = drop_empty_columns(drop_empty_rows(raw));
    let touched = normalize_text_columns(&mut table);
    if touched {
        table = drop_empty_columns(drop_empty_rows(table));
    }

    debug!(
        rows_dropped = before_rows - table.row_count(),
        columns_dropped = before_cols - table.column_count(),
        "cleaned table"
    );

    if table.row_count() == 0 || table.column_count() == 0 {
        return Err(IngestionError::EmptyTable);
    }
    Ok(table)
}

fn drop_empty_rows(mut table: Table) -> Table {
    table.rows.retain(|row| row.iter().any(|v| !v.is_null()));
    table
}

fn drop_empty_columns(table: Table) -> Table {
    let keep: Vec<bool> = (0..table.column_count())
        .map(|idx| table.column_values(idx).any(|v| !v.is_null()))
        .collect();
    if keep.iter().all(|k| *k) {
        return table;
    }

    let columns = table
        .columns
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(c, k)| k.then_some(c))
        .collect();
    let rows = table
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(keep.iter())
                .filter_map(|(v, k)| k.then_some(v))
                .collect()
        })
        .collect();
    Table::new(columns, rows)
}

/// Returns `true` when at least one cell became null.
fn normalize_text_columns(table: &mut Table) -> bool {
    let text_columns: Vec<usize> = (0..table.column_count())
        .filter(|&idx| table.column_type(idx) == DataType::Utf8)
        .collect();

    let mut nulled = false;
    for row in &mut table.rows {
        for &idx in &text_columns {
            let cell = &mut row[idx];
            if cell.is_null() {
                continue;
            }
            let s = cell.to_string();
            let trimmed = s.trim();
            *cell = if trimmed.is_empty() {
                nulled = true;
                Value::Null
            } else {
                Value::Utf8(trimmed.to_string())
            };
        }
    }
    nulled
}
