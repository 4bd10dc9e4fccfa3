//! Canonical text normalization applied before any length measurement.
//!
//! Every adapter and synthesizer measures lengths in `char`s over the output
//! of [`normalize`], so visually identical inputs compare consistently.

use unicode_normalization::UnicodeNormalization;

/// Canonicalize raw input text.
///
/// - NFKC unicode normalization
/// - strips control characters except `\n` and `\t`
/// - collapses whitespace runs within each line to a single space
/// - drops empty lines and trims the whole text
///
/// Idempotent; empty input returns an empty string.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let canonical: String = text
        .nfkc()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let lines: Vec<String> = canonical
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();

    lines.join("\n").trim().to_string()
}

/// Length in characters, the unit all platform caps are expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Truncate to at most `max` characters, never splitting a char.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
