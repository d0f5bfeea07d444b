//! Core data model types.
//!
//! Every cell is a tagged [`Value`]; a [`Table`] is an ordered list of unique column names plus
//! row-major cell storage. Readers produce a raw `Table`, [`crate::cleaning`] turns it into the
//! clean form that gets profiled and cached.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Uniform storage type of a column, judged over its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Every non-null cell is an integer.
    Int64,
    /// Every non-null cell is a number, at least one of them a float.
    Float64,
    /// Every non-null cell is a boolean.
    Bool,
    /// Every non-null cell is a date/time.
    DateTime,
    /// Strings, or a mix of kinds.
    Utf8,
}

impl DataType {
    /// Storage type of a sequence of cells. A column with no non-null cell is [`DataType::Utf8`].
    pub fn of_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut seen: Option<DataType> = None;
        for v in values {
            let kind = match v {
                Value::Null => continue,
                Value::Int64(_) => DataType::Int64,
                Value::Float64(_) => DataType::Float64,
                Value::Bool(_) => DataType::Bool,
                Value::DateTime(_) => DataType::DateTime,
                Value::Utf8(_) => return DataType::Utf8,
            };
            seen = Some(match (seen, kind) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (
                    Some(DataType::Int64 | DataType::Float64),
                    DataType::Int64 | DataType::Float64,
                ) => DataType::Float64,
                _ => return DataType::Utf8,
            });
        }
        seen.unwrap_or(DataType::Utf8)
    }

    /// `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by aggregations and scatter coordinates.
    ///
    /// Booleans count as 1/0 and numeric strings are parsed; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Utf8(s) => s.trim().parse::<f64>().ok(),
            Value::Null | Value::DateTime(_) => None,
        }
    }

    /// Strict numeric view: only integer, float and boolean cells.
    fn numeric(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Hashable identity used for distinct counts and grouping.
    ///
    /// Integers and floats with the same numeric value share a key.
    pub fn key(&self) -> Option<ValueKey> {
        match self {
            Value::Null => None,
            Value::Int64(v) => Some(ValueKey::Number(normalize_bits(*v as f64))),
            Value::Float64(v) => Some(ValueKey::Number(normalize_bits(*v))),
            Value::Bool(b) => Some(ValueKey::Bool(*b)),
            Value::Utf8(s) => Some(ValueKey::Text(s.clone())),
            Value::DateTime(dt) => Some(ValueKey::DateTime(*dt)),
        }
    }

    /// Total order used when categories or groups are sorted.
    ///
    /// Numbers sort numerically, then booleans, date/times, strings, and finally nulls.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Int64(_) | Value::Float64(_) => 0,
                Value::Bool(_) => 1,
                Value::DateTime(_) => 2,
                Value::Utf8(_) => 3,
                Value::Null => 4,
            }
        }
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Utf8(a), Value::Utf8(b)) => a.cmp(b),
            (a, b) => match (rank(a), rank(b)) {
                (0, 0) => {
                    let (x, y) = (a.numeric().unwrap_or(0.0), b.numeric().unwrap_or(0.0));
                    x.total_cmp(&y)
                }
                (ra, rb) => ra.cmp(&rb),
            },
        }
    }

    /// Comparison used by filters. `None` when either side is null or the kinds are not
    /// comparable. A date/time compares against a string that parses as one.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Utf8(a), Value::Utf8(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::Utf8(s)) => parse_datetime(s).map(|b| a.cmp(&b)),
            (Value::Utf8(s), Value::DateTime(b)) => parse_datetime(s).map(|a| a.cmp(b)),
            (a, b) => match (a.numeric(), b.numeric()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Equality used by filters; nulls never match.
    pub fn loose_eq(&self, other: &Value) -> bool {
        self.loose_cmp(other) == Some(Ordering::Equal)
    }
}

fn normalize_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Parse the date/time spellings accepted in cells and filter bounds.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{v:.1}")
            }
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Utf8(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Float64(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Float64(_) => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Utf8(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => {
                serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S%.f"))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar (null, boolean, number or string)")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Value, D::Error> {
                Value::deserialize(d)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Int64(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                Ok(i64::try_from(v).map(Value::Int64).unwrap_or(Value::Float64(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::Utf8(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::Utf8(v))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Hashable projection of a non-null [`Value`]. See [`Value::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Number(u64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

/// In-memory table: ordered, unique column names and row-major cells.
///
/// Every row holds exactly one cell per column; [`Table::new`] enforces it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names in order.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from column names and rows.
    ///
    /// Short rows are padded with nulls and cells past the last column are dropped.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, Value::Null);
        }
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }

    /// Storage type of one column.
    pub fn column_type(&self, idx: usize) -> DataType {
        DataType::of_values(self.column_values(idx))
    }

    /// Create a new table containing only rows that match `predicate`, in their original order.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// The first `n` rows as name/value records.
    pub fn head(&self, n: usize) -> Vec<Record> {
        self.rows
            .iter()
            .take(n)
            .map(|row| Record {
                fields: self.columns.iter().cloned().zip(row.iter().cloned()).collect(),
            })
            .collect()
    }
}

/// One row as an ordered column-name → value mapping; serializes as a JSON object in column
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_promotes_int_and_float() {
        let vals = [Value::Int64(1), Value::Null, Value::Float64(2.5)];
        assert_eq!(DataType::of_values(&vals), DataType::Float64);
    }

    #[test]
    fn data_type_mixed_is_utf8() {
        let vals = [Value::Int64(1), Value::Bool(true)];
        assert_eq!(DataType::of_values(&vals), DataType::Utf8);
        assert_eq!(DataType::of_values(&[Value::Null]), DataType::Utf8);
    }

    #[test]
    fn new_table_squares_ragged_rows() {
        let t = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![Value::Int64(1)], vec![Value::Int64(2), Value::Int64(3), Value::Int64(4)]],
        );
        assert_eq!(
            t.rows,
            vec![
                vec![Value::Int64(1), Value::Null],
                vec![Value::Int64(2), Value::Int64(3)],
            ]
        );
    }

    #[test]
    fn int_and_float_share_a_key() {
        assert_eq!(Value::Int64(3).key(), Value::Float64(3.0).key());
        assert_ne!(Value::Int64(3).key(), Value::Utf8("3".into()).key());
        assert_eq!(Value::Null.key(), None);
    }

    #[test]
    fn display_matches_category_labels() {
        assert_eq!(Value::Float64(2.0).to_string(), "2.0");
        assert_eq!(Value::Float64(2.5).to_string(), "2.5");
        assert_eq!(Value::Int64(7).to_string(), "7");
        let dt = parse_datetime("2024-03-01").unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn loose_cmp_handles_mixed_numeric_and_dates() {
        assert!(Value::Int64(1).loose_eq(&Value::Float64(1.0)));
        assert!(!Value::Utf8("1".into()).loose_eq(&Value::Int64(1)));
        assert!(!Value::Null.loose_eq(&Value::Null));
        let dt = Value::DateTime(parse_datetime("2024-01-02 10:00:00").unwrap());
        assert_eq!(dt.loose_cmp(&Value::Utf8("2024-01-01".into())), Some(Ordering::Greater));
    }

    #[test]
    fn sort_cmp_orders_numbers_before_strings() {
        let mut vals = vec![
            Value::Utf8("b".into()),
            Value::Float64(2.5),
            Value::Utf8("a".into()),
            Value::Int64(1),
        ];
        vals.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(
            vals,
            vec![
                Value::Int64(1),
                Value::Float64(2.5),
                Value::Utf8("a".into()),
                Value::Utf8("b".into()),
            ]
        );
    }

    #[test]
    fn record_serializes_in_column_order() {
        let t = Table::new(
            vec!["z".into(), "a".into()],
            vec![vec![Value::Int64(1), Value::Float64(f64::NAN)]],
        );
        let json = serde_json::to_string(&t.head(5)).unwrap();
        assert_eq!(json, r#"[{"z":1,"a":null}]"#);
    }

    #[test]
    fn value_deserializes_from_json_scalars() {
        let vals: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            vals,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int64(3),
                Value::Float64(2.5),
                Value::Utf8("x".into()),
            ]
        );
    }
}
