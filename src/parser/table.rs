use std::sync::LazyLock;

use regex::Regex;

const ROW_SEPARATOR: &str = "|-";
const HEADER_SEPARATOR: &str = "!!";
const HEADER_LINE_SEPARATOR: &str = "\n!";
const DATA_SEPARATOR: &str = "||";
const DATA_LINE_SEPARATOR: &str = "\n|";

static NUMERIC_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap());
static SEPARATED_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[\d.,]+").unwrap());
static THOUSANDS_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[1-9]\d{0,2}(?:,\d{3})+$").unwrap());

/// Header labels plus raw data cells, as written in the wikitable.
///
/// Rows are not forced to the header's width; a row can be shorter or longer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.header.as_ref().map_or(0, Vec::len)
    }
}

/// Split a cleaned table body into raw row strings on `|-`, dropping blank rows.
pub fn split_rows(body: &str) -> Vec<&str> {
    body.split(ROW_SEPARATOR)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// Turn raw rows into a header and data cells. The first row is the header.
pub fn extract_rows(lines: &[&str]) -> Table {
    let mut table = Table::default();

    for (index, line) in lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .enumerate()
    {
        let line = strip_cell_marker(line);

        if index == 0 {
            let mut fields = split_fields(line, HEADER_SEPARATOR);
            if fields.len() < 2 {
                fields = split_fields(line, HEADER_LINE_SEPARATOR);
            }
            if fields.len() >= 2 {
                table.header = Some(fields);
            }
        } else {
            let mut fields = split_fields(line, DATA_SEPARATOR);
            if fields.len() < 2 {
                fields = split_fields(line, DATA_LINE_SEPARATOR);
            }
            table.rows.push(fields);
        }
    }

    table
}

/// Drop the single leading `|` or `!` of a row.
fn strip_cell_marker(line: &str) -> &str {
    let mut chars = line.chars();
    chars.next();
    chars.as_str()
}

fn split_fields(line: &str, separator: &str) -> Vec<String> {
    line.split(separator).map(|f| f.trim().to_string()).collect()
}

/// Coerce cell text to a number; text that does not start with a number is 0.0.
///
/// Spaces are thousands separators. A lone comma is a decimal mark unless it
/// groups digits in threes (`1,234`); with both `,` and `.` present, the last
/// one is the decimal mark. Only the leading digit run is read for separators,
/// so a unit suffix (`1,234 km`) does not change how its commas are read.
pub fn coerce_number(text: &str) -> f64 {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = match SEPARATED_DIGITS_RE.find(&compact) {
        Some(run) => normalize_separators(run.as_str()) + &compact[run.end()..],
        None => return 0.0,
    };
    NUMERIC_PREFIX_RE
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn normalize_separators(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) if THOUSANDS_COMMA_RE.is_match(s) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_blank_rows() {
        let rows = split_rows("\n! a !! b\n|-\n|-\n| x || 1\n|-  \n");
        assert_eq!(rows, vec!["\n! a !! b\n", "\n| x || 1\n"]);
    }

    #[test]
    fn inline_header_and_rows() {
        let body = "\n! en !! 2003 !! East\n|-\n| France || 68465 || 26843\n|-\n| Italy || 3000 || 7000";
        let table = extract_rows(&split_rows(body));
        assert_eq!(
            table.header,
            Some(vec!["en".to_string(), "2003".into(), "East".into()])
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["France", "68465", "26843"]);
        assert_eq!(table.rows[1], vec!["Italy", "3000", "7000"]);
    }

    #[test]
    fn one_cell_per_line() {
        let body = "\n! Year\n! Sales\n|-\n| 2001\n| 12\n|-\n| 2002\n| 15";
        let table = extract_rows(&split_rows(body));
        assert_eq!(table.header, Some(vec!["Year".to_string(), "Sales".into()]));
        assert_eq!(table.rows, vec![vec!["2001", "12"], vec!["2002", "15"]]);
    }

    #[test]
    fn single_field_header_is_skipped() {
        let body = "\n! lonely\n|-\n| a || 1";
        let table = extract_rows(&split_rows(body));
        assert_eq!(table.header, None);
        assert_eq!(table.rows, vec![vec!["a", "1"]]);
    }

    #[test]
    fn short_and_long_rows_are_kept() {
        let body = "\n! a !! b !! c\n|-\n| x || 1\n|-\n| y || 2 || 3 || 4";
        let table = extract_rows(&split_rows(body));
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn regular_table_has_uniform_width() {
        let body = "\n! c !! d !! e !! f\n|-\n| a || 1 || 2 || 3\n|-\n| b || 4 || 5 || 6\n|-\n| c || 7 || 8 || 9";
        let table = extract_rows(&split_rows(body));
        let width = table.column_count();
        assert!(table.rows.iter().all(|r| r.len() == width));
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(coerce_number("1,234"), 1234.0);
        assert_eq!(coerce_number("12 345,6"), 12345.6);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number(""), 0.0);
    }

    #[test]
    fn numeric_coercion_separators() {
        assert_eq!(coerce_number("3,5"), 3.5);
        assert_eq!(coerce_number("0,125"), 0.125);
        assert_eq!(coerce_number("1,234,567"), 1234567.0);
        assert_eq!(coerce_number("1.234,5"), 1234.5);
        assert_eq!(coerce_number("1,234.5"), 1234.5);
        assert_eq!(coerce_number(" 68465 "), 68465.0);
        assert_eq!(coerce_number("-4.25"), -4.25);
    }

    #[test]
    fn numeric_prefix_like_floatval() {
        assert_eq!(coerce_number("12%"), 12.0);
        assert_eq!(coerce_number("7 km"), 7.0);
        assert_eq!(coerce_number("1e3"), 1000.0);
        assert_eq!(coerce_number("1,234 km"), 1234.0);
        assert_eq!(coerce_number("1,234%"), 1234.0);
        assert_eq!(coerce_number("3,5 %"), 3.5);
        assert_eq!(coerce_number("n/a"), 0.0);
    }
}
