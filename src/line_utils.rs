//! Whitespace classification, continuation detection, comment recognition,
//! and JSON string-list decoding (spec §4.1).

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// True iff `line` ends in a single instance of `escape` not preceded by
/// another `escape` — so `x\\` does not continue, `x\` does.
pub fn has_continuation(line: &str, escape: char) -> bool {
    let mut chars = line.chars().rev();
    match chars.next() {
        Some(last) if last == escape => chars.next() != Some(escape),
        _ => false,
    }
}

/// Removes exactly one trailing escape character. Caller must have already
/// confirmed `has_continuation(line, escape)`.
pub fn strip_continuation(line: &str, escape: char) -> &str {
    let mut end = line.len();
    end -= escape.len_utf8();
    debug_assert!(line[end..].chars().next() == Some(escape));
    &line[..end]
}

/// Normalizes a raw text blob into the line sequence the parser expects:
/// any newline convention, trailing `\r` trimmed. Not part of the closed
/// pipeline (`parse`/`resolve`/`render`) — a convenience for callers who
/// would otherwise hand-roll this exact rule (spec §6's line-source
/// contract).
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Decodes `s` as a JSON array of strings. Any other JSON shape, or invalid
/// JSON, is treated as "not a list" rather than an error — callers fall back
/// to shell-form splitting.
pub fn parse_json_string_list(s: &str) -> Option<Vec<String>> {
    serde_json::from_str::<Vec<String>>(s.trim()).ok()
}
