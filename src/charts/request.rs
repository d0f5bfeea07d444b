use serde::Deserialize;

use crate::error::{DashboardError, DashboardResult};
use crate::processing::{AggregationFn, FilterCondition, FilterSet};

use super::ChartType;

fn default_aggregation() -> String {
    AggregationFn::Sum.as_str().to_string()
}

/// A chart request as sent by a caller.
///
/// Bar, line and scatter charts need `x_axis` and `y_axis`; pie charts need `category_column` and
/// `value_column`. Use [`ChartRequest::plan`] to check a request before rendering it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartRequest {
    /// Identifier returned by ingestion.
    #[serde(alias = "file_id")]
    pub table_id: String,
    pub chart_type: String,
    #[serde(default)]
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Option<String>,
    #[serde(default)]
    pub category_column: Option<String>,
    #[serde(default)]
    pub value_column: Option<String>,
    /// Aggregation name; unrecognized names aggregate with `sum`.
    #[serde(default = "default_aggregation")]
    pub aggregation: String,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub filters: Option<FilterSet>,
}

impl ChartRequest {
    pub fn new(table_id: impl Into<String>, chart_type: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            chart_type: chart_type.into(),
            x_axis: None,
            y_axis: None,
            category_column: None,
            value_column: None,
            aggregation: default_aggregation(),
            group_by: None,
            filters: None,
        }
    }

    pub fn with_axes(mut self, x_axis: impl Into<String>, y_axis: impl Into<String>) -> Self {
        self.x_axis = Some(x_axis.into());
        self.y_axis = Some(y_axis.into());
        self
    }

    pub fn with_slices(
        mut self,
        category_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> Self {
        self.category_column = Some(category_column.into());
        self.value_column = Some(value_column.into());
        self
    }

    pub fn with_aggregation(mut self, aggregation: impl Into<String>) -> Self {
        self.aggregation = aggregation.into();
        self
    }

    pub fn with_group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    pub fn with_filter(mut self, column: impl Into<String>, condition: FilterCondition) -> Self {
        self.filters
            .get_or_insert_with(FilterSet::new)
            .insert(column.into(), condition);
        self
    }

    /// Check the request shape and resolve names into a [`ChartPlan`].
    ///
    /// Does not look at any table; unknown columns are reported when the plan is rendered.
    pub fn plan(&self) -> DashboardResult<ChartPlan> {
        let chart_type: ChartType = self.chart_type.parse()?;
        let (x, y) = match chart_type {
            ChartType::Pie => (
                required(&self.category_column),
                required(&self.value_column),
            ),
            _ => (required(&self.x_axis), required(&self.y_axis)),
        };
        let (Some(x), Some(y)) = (x, y) else {
            return Err(DashboardError::validation(match chart_type {
                ChartType::Pie => "pie chart requires category_column and value_column".to_string(),
                other => format!("{other} chart requires x_axis and y_axis"),
            }));
        };

        Ok(ChartPlan {
            chart_type,
            x: x.to_string(),
            y: y.to_string(),
            group_by: required(&self.group_by).map(str::to_string),
            aggregation: AggregationFn::from_name(&self.aggregation),
            filters: self.filters.clone().unwrap_or_default(),
        })
    }
}

fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// A checked chart request.
///
/// For pie charts `x` is the category column and `y` the value column, and `group_by` is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub chart_type: ChartType,
    pub x: String,
    pub y: String,
    pub group_by: Option<String>,
    pub aggregation: AggregationFn,
    pub filters: FilterSet,
}
