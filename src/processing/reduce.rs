//! Aggregation functions applied to grouped cells.

use std::fmt;

use crate::types::{Table, Value};

/// Built-in aggregation over the cells of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationFn {
    /// Sum of numeric cells; 0 for an empty group.
    #[default]
    Sum,
    /// Arithmetic mean of numeric cells.
    Mean,
    /// Number of non-null cells, numeric or not.
    Count,
    /// Smallest numeric cell.
    Min,
    /// Largest numeric cell.
    Max,
    /// Middle numeric cell; mean of the two middle cells for an even count.
    Median,
}

impl AggregationFn {
    /// Resolve an aggregation by name, case-insensitively.
    ///
    /// `average` is an alias for `mean`. Any unrecognized name resolves to [`AggregationFn::Sum`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sum" => Self::Sum,
            "mean" | "average" => Self::Mean,
            "count" => Self::Count,
            "min" => Self::Min,
            "max" => Self::Max,
            "median" => Self::Median,
            other => {
                tracing::debug!(aggregation = other, "unknown aggregation; using sum");
                Self::Sum
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
        }
    }

    /// Aggregate `values`.
    ///
    /// Numbers, booleans and numeric strings take part as `f64`; other cells are ignored except by
    /// [`AggregationFn::Count`]. `Mean`, `Min`, `Max` and `Median` of nothing are NaN.
    pub fn apply<'a>(self, values: impl IntoIterator<Item = &'a Value>) -> f64 {
        if self == Self::Count {
            return values.into_iter().filter(|v| !v.is_null()).count() as f64;
        }

        let mut nums: Vec<f64> = values.into_iter().filter_map(Value::as_f64).collect();
        match self {
            Self::Sum => nums.iter().sum(),
            Self::Mean if nums.is_empty() => f64::NAN,
            Self::Mean => nums.iter().sum::<f64>() / nums.len() as f64,
            Self::Min => nums.iter().copied().reduce(f64::min).unwrap_or(f64::NAN),
            Self::Max => nums.iter().copied().reduce(f64::max).unwrap_or(f64::NAN),
            Self::Median => median(&mut nums),
            Self::Count => unreachable!("count handled above"),
        }
    }
}

impl fmt::Display for AggregationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn median(nums: &mut [f64]) -> f64 {
    if nums.is_empty() {
        return f64::NAN;
    }
    nums.sort_by(f64::total_cmp);
    let mid = nums.len() / 2;
    if nums.len() % 2 == 0 {
        (nums[mid - 1] + nums[mid]) / 2.0
    } else {
        nums[mid]
    }
}

/// Aggregate a whole column. Returns `None` if `column` does not exist.
pub fn reduce(table: &Table, column: &str, agg: AggregationFn) -> Option<f64> {
    let idx = table.index_of(column)?;
    Some(agg.apply(table.column_values(idx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> Table {
        Table::new(
            vec!["id".into(), "score".into()],
            vec![
                vec![Value::Int64(1), Value::Float64(10.0)],
                vec![Value::Int64(2), Value::Null],
                vec![Value::Int64(3), Value::Float64(5.5)],
                vec![Value::Int64(4), Value::Utf8("2".into())],
            ],
        )
    }

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!(AggregationFn::from_name("SUM"), AggregationFn::Sum);
        assert_eq!(AggregationFn::from_name("Average"), AggregationFn::Mean);
        assert_eq!(AggregationFn::from_name("median"), AggregationFn::Median);
    }

    #[test]
    fn unknown_names_fall_back_to_sum() {
        assert_eq!(AggregationFn::from_name("stddev"), AggregationFn::Sum);
        assert_eq!(AggregationFn::from_name(""), AggregationFn::Sum);
    }

    #[test]
    fn reduce_ignores_nulls_and_coerces_numeric_strings() {
        let t = scores();
        assert_eq!(reduce(&t, "score", AggregationFn::Sum), Some(17.5));
        assert_eq!(reduce(&t, "score", AggregationFn::Count), Some(3.0));
        assert_eq!(reduce(&t, "score", AggregationFn::Min), Some(2.0));
        assert_eq!(reduce(&t, "score", AggregationFn::Max), Some(10.0));
        assert_eq!(reduce(&t, "score", AggregationFn::Median), Some(5.5));
        assert_eq!(reduce(&t, "id", AggregationFn::Mean), Some(2.5));
        assert_eq!(reduce(&t, "id", AggregationFn::Median), Some(2.5));
        assert_eq!(reduce(&t, "missing", AggregationFn::Sum), None);
    }

    #[test]
    fn empty_groups() {
        let none: [Value; 0] = [];
        assert_eq!(AggregationFn::Sum.apply(&none), 0.0);
        assert_eq!(AggregationFn::Count.apply(&none), 0.0);
        assert!(AggregationFn::Mean.apply(&none).is_nan());
        assert!(AggregationFn::Max.apply(&[Value::Utf8("x".into())]).is_nan());
        assert_eq!(AggregationFn::Count.apply(&[Value::Utf8("x".into())]), 1.0);
    }
}
