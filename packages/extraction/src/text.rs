//! Text cleanup helpers shared by the extractors.
//!
//! Everything here is a pure function over strings: strip markup, decode
//! entities, normalize whitespace, truncate on character boundaries.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_STYLE_REGEX: Regex =
        Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(?:script|style|noscript)\s*>").unwrap();

    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();

    // Tags that end a visual line
    static ref LINE_BREAK_REGEX: Regex = Regex::new(
        r"(?i)<br\s*/?>|</(?:p|div|li|tr|h[1-6]|ul|ol|table|section|article|blockquote)\s*>"
    ).unwrap();

    static ref TAG_REGEX: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();

    static ref INLINE_SPACE_REGEX: Regex = Regex::new(r"[ \t\u{00A0}\u{200B}]+").unwrap();
}

/// Remove script/style blocks, comments and every remaining tag.
///
/// Tags are replaced by a space so adjacent words don't fuse.
pub fn strip_tags(html: &str) -> String {
    let text = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let text = COMMENT_REGEX.replace_all(&text, " ");
    TAG_REGEX.replace_all(&text, " ").into_owned()
}

/// Decode named and numeric HTML entities.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Collapse all whitespace runs to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turn an HTML fragment into a single clean line of text.
pub fn clean_fragment(html: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(html)))
}

/// Turn an HTML document into clean multi-line text.
///
/// Block-level closers and `<br>` become line breaks, lines are trimmed
/// and blank lines are dropped.
pub fn clean_multiline(html: &str) -> String {
    let text = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let text = COMMENT_REGEX.replace_all(&text, " ");
    let text = LINE_BREAK_REGEX.replace_all(&text, "\n");
    let text = TAG_REGEX.replace_all(&text, " ");
    let text = decode_entities(&text).replace("\r\n", "\n").replace('\r', "\n");

    text.lines()
        .map(|line| INLINE_SPACE_REGEX.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Number of characters (not bytes) in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` to at most `max_chars` characters.
///
/// Returns the kept prefix and whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
