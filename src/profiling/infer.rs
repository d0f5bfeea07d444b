//! Column type inference.
//!
//! Classification order, first match wins:
//!
//! 1. date/time storage → [`InferredType::Datetime`]
//! 2. numeric storage → categorical when few distinct values, numeric otherwise
//! 3. boolean storage → [`InferredType::Categorical`]
//! 4. anything else → categorical when few distinct values, text otherwise
//!
//! "Few" is governed by [`InferenceThresholds`]; ratios are distinct non-null values over the
//! column's row count (nulls included), and an empty column has ratio 0.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::{DataType, Value};

/// A numeric column is categorical below this distinct/rows ratio...
pub const NUMERIC_CATEGORICAL_MAX_RATIO: f64 = 0.1;
/// ...and below this many distinct values.
pub const NUMERIC_CATEGORICAL_MAX_UNIQUE: usize = 50;
/// A text column is categorical below this distinct/rows ratio...
pub const TEXT_CATEGORICAL_MAX_RATIO: f64 = 0.3;
/// ...and below this many distinct values.
pub const TEXT_CATEGORICAL_MAX_UNIQUE: usize = 100;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Numeric,
    Categorical,
    Datetime,
    Text,
}

/// Policy constants for the categorical heuristics. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceThresholds {
    pub numeric_max_ratio: f64,
    pub numeric_max_unique: usize,
    pub text_max_ratio: f64,
    pub text_max_unique: usize,
}

impl Default for InferenceThresholds {
    fn default() -> Self {
        Self {
            numeric_max_ratio: NUMERIC_CATEGORICAL_MAX_RATIO,
            numeric_max_unique: NUMERIC_CATEGORICAL_MAX_UNIQUE,
            text_max_ratio: TEXT_CATEGORICAL_MAX_RATIO,
            text_max_unique: TEXT_CATEGORICAL_MAX_UNIQUE,
        }
    }
}

/// Number of distinct non-null values.
pub fn unique_count(values: &[&Value]) -> usize {
    values.iter().filter_map(|v| v.key()).collect::<HashSet<_>>().len()
}

/// Classify a column from its cells.
pub fn infer_column_type(values: &[&Value], thresholds: &InferenceThresholds) -> InferredType {
    let unique = unique_count(values);
    let ratio = if values.is_empty() {
        0.0
    } else {
        unique as f64 / values.len() as f64
    };

    match DataType::of_values(values.iter().copied()) {
        DataType::DateTime => InferredType::Datetime,
        DataType::Int64 | DataType::Float64 => {
            if ratio < thresholds.numeric_max_ratio && unique < thresholds.numeric_max_unique {
                InferredType::Categorical
            } else {
                InferredType::Numeric
            }
        }
        DataType::Bool => InferredType::Categorical,
        DataType::Utf8 => {
            if ratio < thresholds.text_max_ratio && unique < thresholds.text_max_unique {
                InferredType::Categorical
            } else {
                InferredType::Text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_column(distinct: usize, rows: usize) -> Vec<Value> {
        (0..rows).map(|i| Value::Int64((i % distinct) as i64)).collect()
    }

    fn classify(values: &[Value]) -> InferredType {
        let refs: Vec<&Value> = values.iter().collect();
        infer_column_type(&refs, &InferenceThresholds::default())
    }

    #[test]
    fn numeric_boundary_49_of_500_is_categorical() {
        assert_eq!(classify(&numeric_column(49, 500)), InferredType::Categorical);
    }

    #[test]
    fn numeric_boundary_50_of_500_is_numeric() {
        assert_eq!(classify(&numeric_column(50, 500)), InferredType::Numeric);
    }

    #[test]
    fn small_numeric_column_with_high_ratio_is_numeric() {
        let vals = vec![Value::Int64(10), Value::Int64(20), Value::Int64(30)];
        assert_eq!(classify(&vals), InferredType::Numeric);
    }

    #[test]
    fn booleans_are_categorical() {
        let vals: Vec<Value> = (0..100).map(|i| Value::Bool(i % 2 == 0)).collect();
        assert_eq!(classify(&vals), InferredType::Categorical);
    }

    #[test]
    fn datetimes_win_first() {
        let dt = crate::types::parse_datetime("2024-05-01").unwrap();
        assert_eq!(classify(&[Value::DateTime(dt), Value::Null]), InferredType::Datetime);
    }

    #[test]
    fn text_thresholds() {
        // 3 distinct over 10 rows: ratio 0.3 is not below 0.3.
        let vals: Vec<Value> = (0..10).map(|i| Value::Utf8(format!("v{}", i % 3))).collect();
        assert_eq!(classify(&vals), InferredType::Text);

        // 2 distinct over 10 rows.
        let vals: Vec<Value> = (0..10).map(|i| Value::Utf8(format!("v{}", i % 2))).collect();
        assert_eq!(classify(&vals), InferredType::Categorical);
    }

    #[test]
    fn thresholds_can_be_probed() {
        let vals = numeric_column(5, 100);
        let refs: Vec<&Value> = vals.iter().collect();
        let strict = InferenceThresholds {
            numeric_max_unique: 5,
            ..Default::default()
        };
        assert_eq!(infer_column_type(&refs, &strict), InferredType::Numeric);
        assert_eq!(
            infer_column_type(&refs, &InferenceThresholds::default()),
            InferredType::Categorical
        );
    }

    #[test]
    fn empty_column_has_zero_ratio() {
        assert_eq!(classify(&[]), InferredType::Categorical);
        assert_eq!(unique_count(&[]), 0);
    }
}
