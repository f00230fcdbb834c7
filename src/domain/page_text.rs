use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style\s*>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Reduces an html document to a single line of readable text.
///
/// Script and style bodies go first: removing tags before them would leave
/// their contents behind as text.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, " ");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, " ");
    let without_tags = TAG.replace_all(&without_styles, " ");
    let unescaped = html_escape::decode_html_entities(&without_tags);

    WHITESPACE.replace_all(&unescaped, " ").trim().to_string()
}

/// First `max_chars` characters of `text`, with `...` appended when something was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// Single-line excerpt for log lines.
pub fn safe_preview(text: &str, limit: usize) -> String {
    let flat = text.replace('\n', " ");
    truncate_with_ellipsis(&flat, limit)
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
