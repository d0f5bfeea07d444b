//! In-memory table transformations used by chart rendering.
//!
//! - [`apply_filters`]: narrow rows by per-column conditions
//! - [`AggregationFn`]: reduce a group of cells to one number
//! - [`group_rows`] / [`aggregate_by`]: ordered group-by
//!
//! ## Example: filter → group → aggregate
//!
//! ```rust
//! use sheet_dashboard::processing::{aggregate_by, apply_filters, AggregationFn, FilterSet};
//! use sheet_dashboard::types::{Table, Value};
//!
//! let table = Table::new(
//!     vec!["region".into(), "sales".into()],
//!     vec![
//!         vec![Value::Utf8("A".into()), Value::Int64(10)],
//!         vec![Value::Utf8("A".into()), Value::Int64(20)],
//!         vec![Value::Utf8("B".into()), Value::Int64(30)],
//!     ],
//! );
//!
//! let filters: FilterSet =
//!     serde_json::from_str(r#"{"sales": {"type": "range", "min": 15}}"#).unwrap();
//! let filtered = apply_filters(&table, &filters);
//!
//! let totals = aggregate_by(&filtered, 0, 1, AggregationFn::from_name("sum"));
//! assert_eq!(totals.len(), 2);
//! assert_eq!(totals[0].1, 20.0);
//! ```

pub mod filter;
pub mod group;
pub mod reduce;

pub use filter::{apply_filters, FilterCondition, FilterSet};
pub use group::{aggregate_by, aggregate_by_pair, group_rows, sorted_distinct, Group};
pub use reduce::{reduce, AggregationFn};
