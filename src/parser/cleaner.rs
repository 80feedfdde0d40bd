use std::sync::LazyLock;

use regex::Regex;

// Page source arrives entity-escaped from the API, so tags look like `&lt;ref&gt;`.
// An opening tag has no `/`, so a self-closing ref never starts a pair.
static REF_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)&lt;ref([^/]*?)&gt;(.*?)&lt;/ref&gt;").unwrap());
static REF_SELF_CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)&lt;ref(.*?)/&gt;").unwrap());
static ALIGN_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)align=&quot;(.*?)\|").unwrap());

/// Literal wiki tokens dropped from table text. `'''` must go before `''`.
const FORMATTING_TOKENS: &[&str] = &["[[", "]]", "'''", "''"];

/// Strip references, links, bold/italic and alignment attributes, then escape
/// single quotes. Running it twice gives the same text as running it once.
pub fn clean(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = strip_noise(&current);
        if next == current {
            break;
        }
        current = next;
    }
    escape_quotes(&current)
}

fn strip_noise(text: &str) -> String {
    let text = remove_matches(&REF_PAIR_RE, text);
    let text = remove_matches(&REF_SELF_CLOSING_RE, &text);

    let mut removals: Vec<String> = FORMATTING_TOKENS.iter().map(|t| t.to_string()).collect();
    for m in ALIGN_ATTR_RE.find_iter(&text) {
        let prefix = m.as_str().to_string();
        if !removals.contains(&prefix) {
            removals.push(prefix);
        }
    }

    removals
        .iter()
        .fold(text, |acc, token| acc.replace(token.as_str(), ""))
}

/// Every distinct match is removed wherever it occurs, not only at the matched span.
fn remove_matches(re: &Regex, text: &str) -> String {
    let mut matched: Vec<&str> = Vec::new();
    for m in re.find_iter(text) {
        if !matched.contains(&m.as_str()) {
            matched.push(m.as_str());
        }
    }
    matched
        .into_iter()
        .fold(text.to_string(), |acc, m| acc.replace(m, ""))
}

/// Prefix `'` with a backslash unless it is already escaped.
fn escape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev = None;
    for ch in text.chars() {
        if ch == '\'' && prev != Some('\\') {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}
