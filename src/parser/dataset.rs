use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

static VISUALIZE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\{\{\s*visualize\s*\|").unwrap());
static DATASET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\{\{\s*dataset\s*\|\s*([^|]*?)\s*\|\s*([^|]*?)\s*\|\s*([^|]*?)\s*\|\s*([^|]*?)\s*\|\s*([^|]*?)\s*\}\}",
    )
    .unwrap()
});
static LEADING_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+").unwrap());

/// `year/month/day` as written on the page. Months count from 0, as the
/// chart library's `Date` constructor expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetDate {
    pub year: i32,
    pub month: i32,
    pub day: i32,
}

/// One `{{dataset| id | date | x | y | label }}` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetTuple {
    pub id: String,
    pub date: DatasetDate,
    pub x: i64,
    pub y: i64,
    pub label: String,
}

/// Collect every `{{dataset}}` that follows the first `{{visualize|`.
/// Returns `None` when there is no `{{visualize|` or it holds no datasets.
pub fn extract_datasets(source: &str) -> Option<Vec<DatasetTuple>> {
    let open = VISUALIZE_OPEN_RE.find(source)?;
    let tuples: Vec<DatasetTuple> = DATASET_RE
        .captures_iter(&source[open.end()..])
        .map(|caps| DatasetTuple {
            id: caps[1].trim().to_string(),
            date: parse_date(caps[2].trim()),
            x: parse_int(&caps[3]),
            y: parse_int(&caps[4]),
            label: caps[5].trim().to_string(),
        })
        .collect();

    debug!(count = tuples.len(), "datasets matched");
    if tuples.is_empty() {
        None
    } else {
        Some(tuples)
    }
}

/// Read `y/m/d` left to right; the first component that is not an integer
/// stops the scan and it and the remaining components are 0.
fn parse_date(text: &str) -> DatasetDate {
    let mut parts = [0i32; 3];
    for (slot, component) in parts.iter_mut().zip(text.split('/')) {
        match LEADING_INT_RE.find(component.trim_start()) {
            Some(m) => *slot = m.as_str().parse().unwrap_or(0),
            None => break,
        }
    }
    DatasetDate {
        year: parts[0],
        month: parts[1],
        day: parts[2],
    }
}

/// Leading integer of the text, truncating any fraction; otherwise 0.
fn parse_int(text: &str) -> i64 {
    LEADING_INT_RE
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
