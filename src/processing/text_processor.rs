//! Text normalization

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Normalize extracted text into a single line.
///
/// NUL bytes become spaces, other control characters are dropped, and every
/// whitespace run collapses to one space with the ends trimmed. Applying it
/// twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter_map(|c| match c {
            '\0' => Some(' '),
            c if c.is_control() && !c.is_whitespace() => None,
            c => Some(c),
        })
        .collect();

    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Absent text normalizes to an empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
