pub mod cleaner;
pub mod dataset;
pub mod table;
pub mod template;

use tracing::info;

use crate::chart::{self, ChartOutput, MotionChart};
use crate::config::{ChartRequest, Mode};
use crate::error::VizError;
use table::Table;

/// Template → clean → split rows → header and cells.
pub fn extract_table(source: &str, template: &str) -> Result<Table, VizError> {
    let body = template::locate(source, template)?;
    let cleaned = cleaner::clean(body);
    let lines = table::split_rows(&cleaned);
    let table = table::extract_rows(&lines);
    info!(
        rows = table.rows.len(),
        columns = table.column_count(),
        "table extracted"
    );
    Ok(table)
}

/// Run the pipeline the request's mode selects, from page source to chart.
pub fn extract_chart(source: &str, request: &ChartRequest) -> Result<ChartOutput, VizError> {
    match &request.mode {
        Mode::Table { template, kind } => {
            let table = extract_table(source, template)?;
            if request.strict_rows {
                chart::check_row_widths(&table)?;
            }
            let descriptor = chart::build(&table, *kind, &request.title)?;
            Ok(ChartOutput::Table(descriptor))
        }
        Mode::Motion {
            x_caption,
            y_caption,
            group,
        } => {
            let datasets =
                dataset::extract_datasets(source).ok_or(VizError::DatasetPatternNotMatched)?;
            info!(datasets = datasets.len(), "datasets extracted");
            Ok(ChartOutput::Motion(MotionChart {
                title: request.title.clone(),
                x_caption: x_caption.clone(),
                y_caption: y_caption.clone(),
                group: group.clone(),
                datasets,
            }))
        }
    }
}

// ── Tests ──
