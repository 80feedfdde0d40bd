use tracing::debug;

use crate::error::VizError;

const TEMPLATE_CLOSE: &str = "}}";
const TABLE_CLOSE: &str = "\n|}";

/// Find `{{Template` (first letter upper-cased, then lower-cased) and return the
/// raw table body between the template and the first `\n|}` after it.
///
/// The template is normally closed before the table starts (`{{Visualizer}}`).
/// When its opening line is just `{{Visualizer|` and the table's `|}` comes
/// before any `}}`, the template wraps the table itself and the body starts on
/// the next line.
pub fn locate<'a>(source: &'a str, template: &str) -> Result<&'a str, VizError> {
    let (start, marker_len) =
        find_marker(source, template).ok_or_else(|| VizError::TemplateNotFound {
            template: ucfirst(template),
        })?;
    debug!(template, offset = start, "template located");

    let from_template = &source[start..];
    let body = match wrapping_body(&from_template[marker_len..]) {
        Some(body) if wraps_table(body) => body,
        _ => match from_template.find(TEMPLATE_CLOSE) {
            Some(end) => &from_template[end + TEMPLATE_CLOSE.len()..],
            None => {
                return Err(VizError::TemplateUnterminated {
                    template: ucfirst(template),
                })
            }
        },
    };

    let end = body.find(TABLE_CLOSE).ok_or_else(|| VizError::TableCloseNotFound {
        template: ucfirst(template),
    })?;
    Ok(&body[..end])
}

/// Byte offset and length of the first matching `{{Name` marker.
fn find_marker(source: &str, template: &str) -> Option<(usize, usize)> {
    [ucfirst(template), lcfirst(template)]
        .into_iter()
        .map(|name| format!("{{{{{}", name))
        .find_map(|marker| source.find(&marker).map(|start| (start, marker.len())))
}

/// The table closes before any `}}`, so a later template on the page cannot
/// claim the opening.
fn wraps_table(body: &str) -> bool {
    match (body.find(TABLE_CLOSE), body.find(TEMPLATE_CLOSE)) {
        (_, None) => true,
        (Some(table), Some(close)) => table < close,
        (None, Some(_)) => false,
    }
}

/// Body of a `{{Name|` opening line, starting right after that line.
fn wrapping_body(after_name: &str) -> Option<&str> {
    let line_end = after_name.find('\n').unwrap_or(after_name.len());
    let opening_rest = after_name[..line_end].trim();
    if opening_rest == "|" {
        Some(&after_name[line_end..])
    } else {
        None
    }
}

pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lcfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSED: &str = "intro\n{|\n|+ {{Visualizer}}\n! en !! 2003\n|-\n| France || 1\n|}\nafter";

    #[test]
    fn locates_closed_template() {
        let body = locate(CLOSED, "visualizer").unwrap();
        assert_eq!(body, "\n! en !! 2003\n|-\n| France || 1");
    }

    #[test]
    fn first_letter_is_case_insensitive() {
        let upper = "{{Visualizer}}\n! a !! b\n|-\n| x || 1\n|}";
        let lower = "{{visualizer}}\n! a !! b\n|-\n| x || 1\n|}";
        assert!(locate(upper, "visualizer").is_ok());
        assert!(locate(lower, "visualizer").is_ok());
        assert!(locate(lower, "Visualizer").is_ok());
    }

    #[test]
    fn only_first_letter_is_folded() {
        let shouting = "{{VISUALIZER}}\n! a !! b\n|-\n| x || 1\n|}";
        assert!(matches!(
            locate(shouting, "visualizer"),
            Err(VizError::TemplateNotFound { template }) if template == "Visualizer"
        ));
    }

    #[test]
    fn wrapping_template_without_close() {
        let src = "{{Visualizer|\n! en !! 2003 !! East\n|-\n| France || 68465 || 26843\n|}\ntrailing";
        let body = locate(src, "visualizer").unwrap();
        assert_eq!(body, "\n! en !! 2003 !! East\n|-\n| France || 68465 || 26843");
    }

    #[test]
    fn wrapping_template_ignores_later_templates() {
        let src = "{{Visualizer|\n! en !! 2003 !! East\n|-\n| France || 68465 || 26843\n|}\n{{Reflist}}";
        let body = locate(src, "visualizer").unwrap();
        assert_eq!(body, "\n! en !! 2003 !! East\n|-\n| France || 68465 || 26843");
    }

    #[test]
    fn opening_pipe_closed_before_table() {
        let src = "{{Visualizer|\n title=x }}\n! a !! b\n|-\n| x || 1\n|}";
        assert_eq!(locate(src, "visualizer").unwrap(), "\n! a !! b\n|-\n| x || 1");
    }

    #[test]
    fn unterminated_template() {
        let src = "{{Visualizer title=x\n! a !! b\n|}";
        assert!(matches!(
            locate(src, "visualizer"),
            Err(VizError::TemplateUnterminated { .. })
        ));
    }

    #[test]
    fn missing_table_close() {
        let src = "{{Visualizer}}\n! a !! b\n|-\n| x || 1\n";
        assert!(matches!(
            locate(src, "visualizer"),
            Err(VizError::TableCloseNotFound { .. })
        ));
        let wrapping = "{{Visualizer|\n! a !! b\n|-\n| x || 1";
        assert!(matches!(
            locate(wrapping, "visualizer"),
            Err(VizError::TableCloseNotFound { .. })
        ));
    }

    #[test]
    fn first_occurrence_wins() {
        let src = "{{Visualizer}}\n! a !! b\n|-\n| x || 1\n|}\n{{Visualizer}}\n! c !! d\n|}";
        assert_eq!(locate(src, "visualizer").unwrap(), "\n! a !! b\n|-\n| x || 1");
    }

    #[test]
    fn case_helpers() {
        assert_eq!(ucfirst("visualizer"), "Visualizer");
        assert_eq!(lcfirst("Visualizer"), "visualizer");
        assert_eq!(ucfirst("élan"), "Élan");
        assert_eq!(ucfirst(""), "");
    }
}
