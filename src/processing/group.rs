//! Ordered group-by over a [`Table`].
//!
//! Groups appear in order of first occurrence. Rows whose key is null belong to no group.

use std::collections::HashMap;

use crate::types::{Table, Value, ValueKey};

use super::reduce::AggregationFn;

/// One group: its key cell and the indices of its member rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub key: &'a Value,
    pub rows: Vec<usize>,
}

/// Group the rows of `table` by the cells of column `key_idx`.
pub fn group_rows(table: &Table, key_idx: usize) -> Vec<Group<'_>> {
    let mut slots: HashMap<ValueKey, usize> = HashMap::new();
    let mut groups: Vec<Group<'_>> = Vec::new();
    for (row_idx, key) in table.column_values(key_idx).enumerate() {
        let Some(hash_key) = key.key() else { continue };
        match slots.get(&hash_key) {
            Some(&slot) => groups[slot].rows.push(row_idx),
            None => {
                slots.insert(hash_key, groups.len());
                groups.push(Group {
                    key,
                    rows: vec![row_idx],
                });
            }
        }
    }
    groups
}

/// Aggregate column `value_idx` within each group of column `key_idx`.
pub fn aggregate_by<'a>(
    table: &'a Table,
    key_idx: usize,
    value_idx: usize,
    agg: AggregationFn,
) -> Vec<(&'a Value, f64)> {
    group_rows(table, key_idx)
        .into_iter()
        .map(|g| {
            let cells = g.rows.iter().map(|&r| &table.rows[r][value_idx]);
            (g.key, agg.apply(cells))
        })
        .collect()
}

/// Aggregate column `value_idx` for every observed (`outer`, `inner`) key pair.
///
/// Pairs with a null on either side are absent.
pub fn aggregate_by_pair(
    table: &Table,
    outer_idx: usize,
    inner_idx: usize,
    value_idx: usize,
    agg: AggregationFn,
) -> HashMap<(ValueKey, ValueKey), f64> {
    let mut members: HashMap<(ValueKey, ValueKey), Vec<&Value>> = HashMap::new();
    for row in &table.rows {
        if let (Some(outer), Some(inner)) = (row[outer_idx].key(), row[inner_idx].key()) {
            members.entry((outer, inner)).or_default().push(&row[value_idx]);
        }
    }
    members
        .into_iter()
        .map(|(pair, cells)| (pair, agg.apply(cells)))
        .collect()
}

/// Distinct non-null cells of column `idx`, sorted by [`Value::sort_cmp`].
pub fn sorted_distinct(table: &Table, idx: usize) -> Vec<&Value> {
    let mut distinct: Vec<&Value> = group_rows(table, idx).into_iter().map(|g| g.key).collect();
    distinct.sort_by(|a, b| a.sort_cmp(b));
    distinct
}
