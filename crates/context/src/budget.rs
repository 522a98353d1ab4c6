//! Character budgets and boundary-safe truncation.
//!
//! Budgets count Unicode scalar values (`char`), not bytes, so truncation
//! can never split a code point. No word or sentence boundary logic is
//! applied: the prefix is raw, and the total bound is the load-bearing
//! contract the rest of the system depends on.

use serde::{Deserialize, Serialize};

/// Budgets for one context assembly, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    /// Total budget `B` for the entire assembled context.
    pub total_chars: usize,

    /// Per-source prefix limit `P`, applied before concatenation.
    pub per_source_chars: usize,
}

impl ContextBudget {
    pub fn new(total_chars: usize, per_source_chars: usize) -> Self {
        Self {
            total_chars,
            per_source_chars,
        }
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            total_chars: 12_000,
            per_source_chars: 4_000,
        }
    }
}

/// Take at most the first `limit` characters of `text`.
///
/// Returns the full slice when it already fits; counts `char`s so the cut
/// never lands inside a multi-byte code point.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    if limit == 0 {
        return "";
    }
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncate a `String` in place to at most `limit` characters.
pub fn truncate_chars_owned(text: &mut String, limit: usize) {
    if limit == 0 {
        text.clear();
        return;
    }
    if let Some((byte_idx, _)) = text.char_indices().nth(limit) {
        text.truncate(byte_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_untouched() {
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn exact_limit_untouched() {
        assert_eq!(truncate_chars("abcde", 5), "abcde");
    }

    #[test]
    fn long_text_cut_to_limit() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }

    #[test]
    fn zero_limit_is_empty() {
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn multibyte_never_split() {
        // Each char is 3 bytes in UTF-8
        let text = "日本語のテキスト";
        let cut = truncate_chars(text, 3);
        assert_eq!(cut, "日本語");
        assert_eq!(cut.chars().count(), 3);
    }

    #[test]
    fn owned_truncation_matches_borrowed() {
        let mut owned = String::from("abcdef");
        truncate_chars_owned(&mut owned, 4);
        assert_eq!(owned, truncate_chars("abcdef", 4));
    }

    #[test]
    fn owned_zero_limit_clears() {
        let mut owned = String::from("abc");
        truncate_chars_owned(&mut owned, 0);
        assert!(owned.is_empty());
    }
}
