//! Chart rendering: a [`ChartPlan`] applied to a clean [`Table`].
//!
//! Filters always run first. Bar and line charts group by the x axis and aggregate the y axis;
//! pie charts do the same with the category and value columns; scatter charts plot every
//! surviving row. Non-finite results are emitted as 0.

mod build;
mod output;
mod request;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::{DashboardError, DashboardResult};
use crate::processing::apply_filters;
use crate::types::Table;

pub use output::{
    CategoryChart, ChartOutput, PieChart, PieSlice, ScatterChart, ScatterSeries, Series,
};
pub use request::{ChartPlan, ChartRequest};

/// Series name used by a scatter chart without `group_by`.
pub const SCATTER_DEFAULT_SERIES: &str = "Data";

/// Supported chart families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = DashboardError;

    /// Case-insensitive. Anything but the four supported names is a validation error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            "scatter" => Ok(ChartType::Scatter),
            _ => Err(DashboardError::validation(format!("unsupported chart type: {s}"))),
        }
    }
}

/// Render `plan` against `table`.
///
/// Every column the plan names must exist in the table.
pub fn render(table: &Table, plan: &ChartPlan) -> DashboardResult<ChartOutput> {
    let x = column_index(table, &plan.x)?;
    let y = column_index(table, &plan.y)?;
    let group = match (plan.chart_type, plan.group_by.as_deref()) {
        (ChartType::Pie, _) | (_, None) => None,
        (_, Some(name)) => Some(column_index(table, name)?),
    };

    let filtered = apply_filters(table, &plan.filters);
    debug!(
        chart_type = %plan.chart_type,
        aggregation = %plan.aggregation,
        rows = table.row_count(),
        kept = filtered.row_count(),
        "rendering chart"
    );

    Ok(match plan.chart_type {
        ChartType::Bar => ChartOutput::Bar(build::category_chart(
            &filtered,
            x,
            y,
            group,
            plan,
            ChartType::Bar,
        )),
        ChartType::Line => ChartOutput::Line(build::category_chart(
            &filtered,
            x,
            y,
            group,
            plan,
            ChartType::Line,
        )),
        ChartType::Pie => ChartOutput::Pie(build::pie_chart(&filtered, x, y, plan.aggregation)),
        ChartType::Scatter => ChartOutput::Scatter(build::scatter_chart(&filtered, x, y, group)?),
    })
}

fn column_index(table: &Table, name: &str) -> DashboardResult<usize> {
    table
        .index_of(name)
        .ok_or_else(|| DashboardError::validation(format!("column '{name}' not found")))
}
