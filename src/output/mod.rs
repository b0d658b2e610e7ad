// Output formatting: terminal display and markdown reports.

pub mod markdown;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Counts characters, not bytes, so accented letters and symbols in
/// extracted exam text never split mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
///
/// Question bodies can span several lines; previews read better flat.
pub fn flatten_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a similarity score as a percentage, e.g. 0.7766 -> "77.66%".
pub fn format_percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}
