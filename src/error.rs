use thiserror::Error;

/// Everything that can go wrong between page source and chart descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VizError {
    #[error("page does not contain the string {{{{{template}")]
    TemplateNotFound { template: String },
    #[error("template ending code \"}}}}\" not found after {{{{{template}")]
    TemplateUnterminated { template: String },
    #[error("table after {{{{{template}}}}} does not contain the line |}}")]
    TableCloseNotFound { template: String },
    #[error("table has no header or no data rows")]
    EmptyTable,
    #[error("row {row} has {found} cells, header has {expected}")]
    MalformedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("page is not using {{{{dataset}}}} and {{{{visualize}}}} correctly")]
    DatasetPatternNotMatched,
}
