//! Per-type column statistics.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::types::{Value, ValueKey};

/// Number of entries kept in categorical `top_values`.
pub const TOP_VALUES: usize = 10;

/// Statistics attached to a column, shaped by its inferred type.
///
/// Serialized as a bare struct so that the fields sit directly in the column metadata object.
/// Categorical rankings are written under both `top_values` and `value_counts`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStats {
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
        /// Population standard deviation.
        std: Option<f64>,
    },
    Categorical {
        top_values: ValueCounts,
    },
    Datetime {
        min_date: Option<String>,
        max_date: Option<String>,
    },
    Text {},
}

impl Serialize for ColumnStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnStats::Numeric {
                min,
                max,
                mean,
                std,
            } => {
                let mut s = serializer.serialize_struct("NumericStats", 4)?;
                s.serialize_field("min", min)?;
                s.serialize_field("max", max)?;
                s.serialize_field("mean", mean)?;
                s.serialize_field("std", std)?;
                s.end()
            }
            ColumnStats::Categorical { top_values } => {
                let mut s = serializer.serialize_struct("CategoricalStats", 2)?;
                s.serialize_field("top_values", top_values)?;
                s.serialize_field("value_counts", top_values)?;
                s.end()
            }
            ColumnStats::Datetime { min_date, max_date } => {
                let mut s = serializer.serialize_struct("DatetimeStats", 2)?;
                s.serialize_field("min_date", min_date)?;
                s.serialize_field("max_date", max_date)?;
                s.end()
            }
            ColumnStats::Text {} => serializer.serialize_struct("TextStats", 0)?.end(),
        }
    }
}

/// Most frequent values, highest count first; equal counts keep first-seen order.
///
/// Serializes as a JSON object whose key order is the ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueCounts(pub Vec<(String, usize)>);

impl ValueCounts {
    pub fn get(&self, value: &str) -> Option<usize> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ValueCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

pub(crate) fn numeric_stats(values: &[&Value]) -> ColumnStats {
    let nums: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
    if nums.is_empty() {
        return ColumnStats::Numeric {
            min: None,
            max: None,
            mean: None,
            std: None,
        };
    }

    let n = nums.len() as f64;
    let mean = nums.iter().sum::<f64>() / n;
    let variance = nums.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    ColumnStats::Numeric {
        min: nums.iter().copied().reduce(f64::min),
        max: nums.iter().copied().reduce(f64::max),
        mean: Some(mean),
        std: Some(variance.sqrt()),
    }
}

pub(crate) fn categorical_stats(values: &[&Value]) -> ColumnStats {
    let mut slots: HashMap<ValueKey, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in values {
        let Some(key) = v.key() else { continue };
        match slots.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(key, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_VALUES);
    ColumnStats::Categorical {
        top_values: ValueCounts(counts),
    }
}

pub(crate) fn datetime_stats(values: &[&Value]) -> ColumnStats {
    let dates = || {
        values.iter().filter_map(|v| match v {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        })
    };
    ColumnStats::Datetime {
        min_date: dates().min().map(|d| Value::DateTime(d).to_string()),
        max_date: dates().max().map(|d| Value::DateTime(d).to_string()),
    }
}
