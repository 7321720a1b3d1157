// Output formatting: terminal display of articles and recommendations.

pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces, for
/// one-line previews.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One-line preview of an article body, at most `max_chars` characters
/// plus the ellipsis.
pub fn body_preview(text: &str, max_chars: usize) -> String {
    truncate_chars(&single_line(text), max_chars)
}
