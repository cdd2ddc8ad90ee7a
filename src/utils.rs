//! Utility functions for string manipulation and prompt-size control.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging long LLM responses
//! - Sentence splitting and lead/tail compression to bound prompt size

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", &s[..max], s.len() - max)
    }
}

/// Split text into trimmed, non-empty sentences on `.`, `!`, and `?`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Compress text to its first `lead` sentences plus the last sentence.
///
/// Article bodies can run to dozens of paragraphs; the opening sentences
/// carry the story and the closing sentence often carries the outcome, so
/// the middle is dropped before the text is embedded in a prompt. Text
/// with `lead + 1` sentences or fewer is returned as-is.
pub fn lead_and_tail(text: &str, lead: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= lead + 1 {
        return text.trim().to_string();
    }

    let mut kept: Vec<&str> = sentences[..lead].to_vec();
    if let Some(last) = sentences.last() {
        kept.push(last);
    }
    let mut out = kept.join(". ");
    out.push('.');
    out
}
