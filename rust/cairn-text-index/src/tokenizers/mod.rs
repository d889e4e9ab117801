//! Tokenizers for extracting terms from text values.
//!
//! The same tokenizer runs in two scenarios: extracting index terms from a
//! record's text when it is saved, and extracting the lookup term from a
//! query string, so term extraction stays consistent between indexing and
//! searching. Tokenizers return iterators of string slices to avoid
//! allocations during tokenization.

pub mod trivial;
pub mod unicode_word;

pub use trivial::TrivialTokenizer;
pub use unicode_word::UnicodeWordTokenizer;

/// Default maximum length of a single term in bytes before truncation.
pub const DEFAULT_MAX_TERM_LENGTH: usize = 128;

/// Default minimum length of a single term in bytes.
pub const DEFAULT_MIN_TERM_LENGTH: usize = 1;

/// A tokenizer extracts terms (tokens) from raw string values for indexing.
///
/// Terms longer than the maximum length are truncated at UTF-8 character
/// boundaries. Terms shorter than the minimum length are excluded entirely.
pub trait Tokenizer: Send + Sync {
    /// The iterator type returned by tokenize.
    type TokenIter<'a>: Iterator<Item = &'a str>
    where
        Self: 'a;

    /// Extract terms from the input string as an iterator of string slices.
    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a>;

    /// Maximum length of a single term in bytes before truncation.
    fn max_term_length(&self) -> usize;

    /// Minimum length of a single term in bytes before exclusion.
    fn min_term_length(&self) -> usize;
}

/// Truncate a string slice to the maximum allowed length at a codepoint
/// boundary. Returns a subslice of the input that is always valid UTF-8.
pub(crate) fn truncate_str(input: &str, max_term_length: usize) -> &str {
    if input.len() <= max_term_length {
        return input;
    }

    let mut boundary = max_term_length;
    while boundary > 0 && !input.is_char_boundary(boundary) {
        boundary -= 1;
    }

    &input[..boundary]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_truncation() {
        let long_term = "a".repeat(150);
        let truncated = truncate_str(&long_term, DEFAULT_MAX_TERM_LENGTH);
        assert_eq!(truncated.len(), DEFAULT_MAX_TERM_LENGTH);

        let unicode_term = "café".repeat(50);
        let truncated = truncate_str(&unicode_term, DEFAULT_MAX_TERM_LENGTH);
        assert!(truncated.len() <= DEFAULT_MAX_TERM_LENGTH);
        assert!(truncated.is_char_boundary(truncated.len()));
    }

    #[test]
    fn test_truncation_respects_character_boundaries() {
        let chinese = "你好世界测试";
        let truncated = truncate_str(chinese, 10);
        assert!(truncated.len() <= 10);
        assert!(chinese.is_char_boundary(truncated.len()));

        let german = "Schöne Grüße";
        let truncated = truncate_str(german, 7);
        assert!(truncated.len() <= 7);
        assert!(german.is_char_boundary(truncated.len()));
    }
}
