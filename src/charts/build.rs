use crate::error::{DashboardError, DashboardResult};
use crate::processing::{aggregate_by, aggregate_by_pair, sorted_distinct, AggregationFn};
use crate::types::{Table, Value};

use super::{
    CategoryChart, ChartPlan, ChartType, PieChart, PieSlice, ScatterChart, ScatterSeries, Series,
    SCATTER_DEFAULT_SERIES,
};

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

pub(super) fn category_chart(
    table: &Table,
    x: usize,
    y: usize,
    group: Option<usize>,
    plan: &ChartPlan,
    kind: ChartType,
) -> CategoryChart {
    let Some(group) = group else {
        let (categories, data): (Vec<String>, Vec<f64>) =
            aggregate_by(table, x, y, plan.aggregation)
                .into_iter()
                .map(|(key, v)| (key.to_string(), finite_or_zero(v)))
                .unzip();
        return CategoryChart {
            categories,
            series: vec![Series {
                name: plan.y.clone(),
                data,
                kind,
            }],
        };
    };

    let categories = sorted_distinct(table, x);
    let groups = sorted_distinct(table, group);
    let cells = aggregate_by_pair(table, x, group, y, plan.aggregation);

    let series = groups
        .iter()
        .map(|g| Series {
            name: g.to_string(),
            data: categories
                .iter()
                .map(|c| match (c.key(), g.key()) {
                    (Some(ck), Some(gk)) => {
                        cells.get(&(ck, gk)).copied().map_or(0.0, finite_or_zero)
                    }
                    _ => 0.0,
                })
                .collect(),
            kind,
        })
        .collect();

    CategoryChart {
        categories: categories.iter().map(|c| c.to_string()).collect(),
        series,
    }
}

pub(super) fn pie_chart(
    table: &Table,
    category: usize,
    value: usize,
    agg: AggregationFn,
) -> PieChart {
    PieChart {
        data: aggregate_by(table, category, value, agg)
            .into_iter()
            .map(|(key, v)| PieSlice {
                name: key.to_string(),
                value: finite_or_zero(v),
            })
            .collect(),
    }
}

pub(super) fn scatter_chart(
    table: &Table,
    x: usize,
    y: usize,
    group: Option<usize>,
) -> DashboardResult<ScatterChart> {
    let series = match group {
        None => vec![ScatterSeries {
            name: SCATTER_DEFAULT_SERIES.to_string(),
            data: points(table, x, y, |_| true)?,
            kind: ChartType::Scatter,
        }],
        Some(g) => sorted_distinct(table, g)
            .into_iter()
            .map(|key| -> DashboardResult<ScatterSeries> {
                Ok(ScatterSeries {
                    name: key.to_string(),
                    data: points(table, x, y, |row| row[g].key() == key.key())?,
                    kind: ChartType::Scatter,
                })
            })
            .collect::<DashboardResult<Vec<_>>>()?,
    };
    Ok(ScatterChart { series })
}

fn points<F>(table: &Table, x: usize, y: usize, mut keep: F) -> DashboardResult<Vec<[f64; 2]>>
where
    F: FnMut(&[Value]) -> bool,
{
    table
        .rows
        .iter()
        .filter(|row| keep(row.as_slice()))
        .map(|row| Ok([coordinate(table, x, &row[x])?, coordinate(table, y, &row[y])?]))
        .collect()
}

/// Null plots at 0; a cell that is not a number is an error.
fn coordinate(table: &Table, idx: usize, cell: &Value) -> DashboardResult<f64> {
    match cell {
        Value::Null => Ok(0.0),
        other => other.as_f64().map(finite_or_zero).ok_or_else(|| {
            DashboardError::validation(format!(
                "column '{}' has non-numeric value '{other}' and cannot be plotted",
                table.columns[idx]
            ))
        }),
    }
}
