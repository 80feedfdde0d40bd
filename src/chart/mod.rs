pub mod render;

use std::str::FromStr;

use serde::Serialize;

use crate::config::ConfigError;
use crate::error::VizError;
use crate::parser::dataset::DatasetTuple;
use crate::parser::table::{coerce_number, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    #[serde(rename = "col")]
    Column,
    Line,
    Scatter,
    Area,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Pie,
        ChartKind::Bar,
        ChartKind::Column,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Area,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Column => "col",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
            ChartKind::Area => "area",
        }
    }

    /// Google Visualization class drawing this kind.
    pub fn class_name(self) -> &'static str {
        match self {
            ChartKind::Pie => "PieChart",
            ChartKind::Bar => "BarChart",
            ChartKind::Column => "ColumnChart",
            ChartKind::Line => "LineChart",
            ChartKind::Scatter => "ScatterChart",
            ChartKind::Area => "AreaChart",
        }
    }

    /// Scatter and area plot column 0 on a numeric axis; the rest use it as a label.
    pub fn numeric_first_column(self) -> bool {
        matches!(self, ChartKind::Scatter | ChartKind::Area)
    }
}

impl FromStr for ChartKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidChartType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    #[serde(rename = "type")]
    pub kind: ColumnType,
    pub label: String,
}

impl Column {
    fn new(kind: ColumnType, label: &str) -> Self {
        Column {
            kind,
            label: label.trim().to_string(),
        }
    }
}

/// A normalized cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    String(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisHints {
    pub h_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LegendMode {
    #[serde(rename = "none")]
    Hidden,
}

/// Everything the renderer needs to draw a table chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_hints: Option<AxisHints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendMode>,
}

/// Motion chart over `{{dataset}}` tuples. Columns are fixed: id, date, x, y, group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionChart {
    pub title: String,
    pub x_caption: String,
    pub y_caption: String,
    pub group: String,
    pub datasets: Vec<DatasetTuple>,
}

impl MotionChart {
    pub fn columns(&self) -> Vec<Column> {
        vec![
            Column::new(ColumnType::String, "Project"),
            Column::new(ColumnType::Date, "Date"),
            Column::new(ColumnType::Number, &self.x_caption),
            Column::new(ColumnType::Number, &self.y_caption),
            Column::new(ColumnType::String, &self.group),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ChartOutput {
    Table(ChartDescriptor),
    Motion(MotionChart),
}

/// Build a chart descriptor from an extracted table.
///
/// Rows wider than the header are cut to the header; shorter rows stay short.
pub fn build(table: &Table, kind: ChartKind, title: &str) -> Result<ChartDescriptor, VizError> {
    let header = match &table.header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(VizError::EmptyTable),
    };
    if table.rows.is_empty() {
        return Err(VizError::EmptyTable);
    }

    let numeric_first = kind.numeric_first_column();
    let columns: Vec<Column> = header
        .iter()
        .enumerate()
        .map(|(j, label)| {
            let kind = if j == 0 && !numeric_first {
                ColumnType::String
            } else {
                ColumnType::Number
            };
            Column::new(kind, label)
        })
        .collect();

    let rows: Vec<Vec<Cell>> = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .take(columns.len())
                .enumerate()
                .map(|(j, text)| {
                    if j == 0 && !numeric_first {
                        Cell::String(text.trim().to_string())
                    } else {
                        Cell::Number(coerce_number(text))
                    }
                })
                .collect()
        })
        .collect();

    let (axis_hints, legend) = match kind {
        ChartKind::Scatter => (
            Some(AxisHints {
                h_title: columns[0].label.clone(),
                v_title: columns.get(1).map(|c| c.label.clone()),
            }),
            Some(LegendMode::Hidden),
        ),
        ChartKind::Area => (
            Some(AxisHints {
                h_title: columns[0].label.clone(),
                v_title: None,
            }),
            None,
        ),
        _ => (None, None),
    };

    Ok(ChartDescriptor {
        kind,
        title: title.to_string(),
        columns,
        rows,
        axis_hints,
        legend,
    })
}

/// Reject the first data row whose width differs from the header's.
/// A table without a header is `EmptyTable`, as in `build`.
pub fn check_row_widths(table: &Table) -> Result<(), VizError> {
    let expected = table.column_count();
    if expected == 0 {
        return Err(VizError::EmptyTable);
    }
    match table.rows.iter().position(|r| r.len() != expected) {
        Some(i) => Err(VizError::MalformedRow {
            row: i + 1,
            expected,
            found: table.rows[i].len(),
        }),
        None => Ok(()),
    }
}
