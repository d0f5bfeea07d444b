//! Column type inference and metadata extraction.
//!
//! Everything here is a pure function of a clean [`Table`]; only `processed_at` depends on the
//! clock. Columns are profiled in parallel and reported in table order.

mod infer;
mod stats;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::types::{Table, Value};

pub use infer::{
    infer_column_type, unique_count, InferenceThresholds, InferredType,
    NUMERIC_CATEGORICAL_MAX_RATIO, NUMERIC_CATEGORICAL_MAX_UNIQUE, TEXT_CATEGORICAL_MAX_RATIO,
    TEXT_CATEGORICAL_MAX_UNIQUE,
};
pub use stats::{ColumnStats, ValueCounts, TOP_VALUES};

/// Profile of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub inferred_type: InferredType,
    pub unique_count: usize,
    pub null_count: usize,
    /// Share of null cells, 0..=100.
    pub null_percentage: f64,
    #[serde(flatten)]
    pub stats: ColumnStats,
}

/// Profile of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMetadata {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Sheet that was loaded.
    pub sheet_name: String,
    /// Every sheet in workbook order; the first is `sheet_name`.
    pub available_sheets: Vec<String>,
    pub columns: Vec<ColumnMetadata>,
    pub processed_at: DateTime<Utc>,
}

impl TableMetadata {
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Profile a single column.
pub fn extract_column_metadata(
    name: &str,
    values: &[&Value],
    thresholds: &InferenceThresholds,
) -> ColumnMetadata {
    let inferred_type = infer_column_type(values, thresholds);
    let null_count = values.iter().filter(|v| v.is_null()).count();
    let null_percentage = if values.is_empty() {
        0.0
    } else {
        null_count as f64 / values.len() as f64 * 100.0
    };
    let stats = match inferred_type {
        InferredType::Numeric => stats::numeric_stats(values),
        InferredType::Categorical => stats::categorical_stats(values),
        InferredType::Datetime => stats::datetime_stats(values),
        InferredType::Text => ColumnStats::Text {},
    };

    ColumnMetadata {
        name: name.to_string(),
        inferred_type,
        unique_count: unique_count(values),
        null_count,
        null_percentage,
        stats,
    }
}

/// Profile every column of `table`.
///
/// `sheet_names` must list the workbook's sheets in order with the loaded sheet first; an empty
/// slice leaves `sheet_name` blank.
pub fn profile_table(
    table: &Table,
    sheet_names: &[String],
    thresholds: &InferenceThresholds,
) -> TableMetadata {
    let columns = (0..table.column_count())
        .into_par_iter()
        .map(|idx| {
            let values: Vec<&Value> = table.column_values(idx).collect();
            extract_column_metadata(&table.columns[idx], &values, thresholds)
        })
        .collect();

    TableMetadata {
        total_rows: table.row_count(),
        total_columns: table.column_count(),
        sheet_name: sheet_names.first().cloned().unwrap_or_default(),
        available_sheets: sheet_names.to_vec(),
        columns,
        processed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_table() -> Table {
        let regions = ["North", "South", "North", "East", "South", "North"];
        let rows = regions
            .iter()
            .enumerate()
            .map(|(i, r)| {
                vec![
                    Value::Utf8(r.to_string()),
                    Value::Float64(10.0 * (i + 1) as f64 + 0.5),
                    if i == 2 { Value::Null } else { Value::Utf8(format!("note {i}")) },
                ]
            })
            .collect();
        Table::new(vec!["region".into(), "sales".into(), "note".into()], rows)
    }

    #[test]
    fn profiles_every_column_in_order() {
        let t = sales_table();
        let sheets = ["Sheet1".to_string(), "Other".to_string()];
        let meta = profile_table(&t, &sheets, &InferenceThresholds::default());
        assert_eq!(meta.total_rows, 6);
        assert_eq!(meta.total_columns, 3);
        assert_eq!(meta.sheet_name, "Sheet1");
        assert_eq!(meta.available_sheets, vec!["Sheet1", "Other"]);

        let names: Vec<&str> = meta.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["region", "sales", "note"]);

        let region = meta.column("region").unwrap();
        // 3 distinct over 6 rows is a ratio of 0.5.
        assert_eq!(region.inferred_type, InferredType::Text);
        assert_eq!(region.unique_count, 3);

        let sales = meta.column("sales").unwrap();
        assert_eq!(sales.inferred_type, InferredType::Numeric);
        assert!(matches!(sales.stats, ColumnStats::Numeric { min: Some(m), .. } if m == 10.5));

        let note = meta.column("note").unwrap();
        assert_eq!(note.null_count, 1);
        assert!((note.null_percentage - 100.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn profiling_is_deterministic() {
        let t = sales_table();
        let th = InferenceThresholds::default();
        let a = profile_table(&t, &["csv".into()], &th);
        let b = profile_table(&t, &["csv".into()], &th);
        assert_eq!(a.columns, b.columns);
    }

    #[test]
    fn serializes_flat_column_objects() {
        let vals: Vec<Value> = (0..20)
            .map(|i| Value::Utf8(if i % 2 == 0 { "x" } else { "y" }.into()))
            .collect();
        let refs: Vec<&Value> = vals.iter().collect();
        let meta = extract_column_metadata("flag", &refs, &InferenceThresholds::default());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "categorical");
        assert_eq!(json["unique_count"], 2);
        assert_eq!(json["top_values"]["x"], 10);
        assert_eq!(json["value_counts"], json["top_values"]);
        assert!(json.get("stats").is_none());
    }
}
