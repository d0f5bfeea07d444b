//! Pre-aggregation row filters.
//!
//! A filter set maps column names to conditions; conditions compose by logical AND and conditions
//! on columns the table does not have are skipped.
//!
//! Wire form, one entry per column:
//!
//! ```json
//! {
//!   "sales":  { "type": "range", "min": 10, "max": 100 },
//!   "region": { "type": "equals", "value": "North" },
//!   "year":   { "type": "in", "value": [2023, 2024] }
//! }
//! ```
//!
//! `type` defaults to `equals`. An `equals` without a value and an `in` with an empty list keep
//! every row.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{Table, Value};

/// Column name → condition.
pub type FilterSet = BTreeMap<String, FilterCondition>;

/// A condition on one column's cells. Null cells never match a bound or a value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawCondition")]
pub enum FilterCondition {
    /// Inclusive bounds; a missing bound is unbounded. Without bounds every row passes.
    Range { min: Option<Value>, max: Option<Value> },
    Equals { value: Option<Value> },
    In { values: Vec<Value> },
}

#[derive(Deserialize)]
struct RawCondition {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    min: Option<Value>,
    #[serde(default)]
    max: Option<Value>,
}

impl TryFrom<RawCondition> for FilterCondition {
    type Error = String;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        let scalar = |v: serde_json::Value| Value::deserialize(v).map_err(|e| e.to_string());
        match raw.kind.as_deref().unwrap_or("equals") {
            "range" => Ok(Self::Range {
                min: raw.min.filter(|v| !v.is_null()),
                max: raw.max.filter(|v| !v.is_null()),
            }),
            "equals" => Ok(Self::Equals {
                value: raw.value.map(scalar).transpose()?.filter(|v| !v.is_null()),
            }),
            "in" => {
                let values = match raw.value {
                    None | Some(serde_json::Value::Null) => Vec::new(),
                    Some(serde_json::Value::Array(items)) => {
                        items.into_iter().map(scalar).collect::<Result<_, _>>()?
                    }
                    Some(other) => return Err(format!("`in` filter expects a list, got {other}")),
                };
                Ok(Self::In { values })
            }
            other => Err(format!("unknown filter type `{other}`")),
        }
    }
}

impl FilterCondition {
    /// `true` if `cell` passes.
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Self::Range { min, max } => {
                let above = min.as_ref().is_none_or(|m| {
                    matches!(cell.loose_cmp(m), Some(Ordering::Greater | Ordering::Equal))
                });
                let below = max.as_ref().is_none_or(|m| {
                    matches!(cell.loose_cmp(m), Some(Ordering::Less | Ordering::Equal))
                });
                above && below
            }
            Self::Equals { value: None } => true,
            Self::Equals { value: Some(v) } => cell.loose_eq(v),
            Self::In { values } if values.is_empty() => true,
            Self::In { values } => values.iter().any(|v| cell.loose_eq(v)),
        }
    }
}

/// Keep the rows of `table` that satisfy every condition, in their original order.
pub fn apply_filters(table: &Table, filters: &FilterSet) -> Table {
    let active: Vec<(usize, &FilterCondition)> = filters
        .iter()
        .filter_map(|(column, cond)| match table.index_of(column) {
            Some(idx) => Some((idx, cond)),
            None => {
                tracing::debug!(column = %column, "filter on unknown column skipped");
                None
            }
        })
        .collect();
    if active.is_empty() {
        return table.clone();
    }

    table.filter_rows(|row| active.iter().all(|(idx, cond)| cond.matches(&row[*idx])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let rows = [("A", 10), ("A", 20), ("B", 30), ("C", 40)]
            .iter()
            .map(|(r, s)| vec![Value::Utf8(r.to_string()), Value::Int64(*s)])
            .chain([vec![Value::Null, Value::Null]])
            .collect();
        Table::new(vec!["region".into(), "sales".into()], rows)
    }

    fn parse(json: &str) -> FilterSet {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn range_is_inclusive() {
        let filters = parse(r#"{"sales": {"type": "range", "min": 20, "max": 30.0}}"#);
        let out = apply_filters(&sample(), &filters);
        assert_eq!(
            out.column_values(1).cloned().collect::<Vec<_>>(),
            vec![Value::Int64(20), Value::Int64(30)]
        );
    }

    #[test]
    fn half_open_range() {
        let out = apply_filters(&sample(), &parse(r#"{"sales": {"type": "range", "min": 25}}"#));
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn equals_defaults_and_is_idempotent() {
        let filters = parse(r#"{"region": {"value": "A"}}"#);
        let once = apply_filters(&sample(), &filters);
        let twice = apply_filters(&once, &filters);
        assert_eq!(once.row_count(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn in_membership_and_and_composition() {
        let filters = parse(
            r#"{"region": {"type": "in", "value": ["A", "B"]},
                "sales": {"type": "range", "max": 15}}"#,
        );
        let out = apply_filters(&sample(), &filters);
        assert_eq!(out.rows, vec![vec![Value::Utf8("A".into()), Value::Int64(10)]]);
    }

    #[test]
    fn no_op_conditions_and_unknown_columns() {
        let t = sample();
        let filters = parse(r#"{"region": {"type": "equals", "value": null}}"#);
        assert_eq!(apply_filters(&t, &filters), t);
        assert_eq!(apply_filters(&t, &parse(r#"{"region": {"type": "in", "value": []}}"#)), t);
        assert_eq!(apply_filters(&t, &parse(r#"{"nope": {"type": "equals", "value": 1}}"#)), t);
    }

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        let out = apply_filters(&sample(), &parse(r#"{"sales": {"value": 30.0}}"#));
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn type_mismatch_never_matches() {
        let out = apply_filters(&sample(), &parse(r#"{"sales": {"value": "30"}}"#));
        assert_eq!(out.row_count(), 0);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let unknown = r#"{"a": {"type": "like", "value": "x"}}"#;
        assert!(serde_json::from_str::<FilterSet>(unknown).is_err());
        assert!(serde_json::from_str::<FilterSet>(r#"{"a": {"type": "in", "value": 3}}"#).is_err());
    }
}
