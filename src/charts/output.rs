//! Chart shapes consumed by the charting front end.

use serde::Serialize;

use super::ChartType;

/// Output of a rendered chart, tagged with its `chart_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart_type", rename_all = "lowercase")]
pub enum ChartOutput {
    Bar(CategoryChart),
    Line(CategoryChart),
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl ChartOutput {
    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartOutput::Bar(_) => ChartType::Bar,
            ChartOutput::Line(_) => ChartType::Line,
            ChartOutput::Pie(_) => ChartType::Pie,
            ChartOutput::Scatter(_) => ChartType::Scatter,
        }
    }
}

/// Categories along the x axis, one value per category in every series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryChart {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: ChartType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub data: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub series: Vec<ScatterSeries>,
}

/// Points as `[x, y]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub data: Vec<[f64; 2]>,
    #[serde(rename = "type")]
    pub kind: ChartType,
}
