//! Trivial tokenizer - returns the input unchanged.

use std::iter;

use super::{DEFAULT_MAX_TERM_LENGTH, DEFAULT_MIN_TERM_LENGTH, Tokenizer, truncate_str};

/// A tokenizer that doesn't extract any terms; it simply returns the raw
/// value of the field, truncated at UTF-8 character boundaries if it exceeds
/// the maximum length. Well suited for exact-match fields such as opaque
/// identifiers.
pub struct TrivialTokenizer {
    max_term_length: usize,
    min_term_length: usize,
}

impl TrivialTokenizer {
    /// Create a new TrivialTokenizer with default settings.
    pub fn new() -> Self {
        Self {
            max_term_length: DEFAULT_MAX_TERM_LENGTH,
            min_term_length: DEFAULT_MIN_TERM_LENGTH,
        }
    }

    /// Create a new TrivialTokenizer with custom max and min term lengths.
    pub fn with_lengths(max_term_length: usize, min_term_length: usize) -> Self {
        Self {
            max_term_length,
            min_term_length,
        }
    }
}

impl Default for TrivialTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for TrivialTokenizer {
    type TokenIter<'a> = iter::Take<iter::Once<&'a str>>;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a> {
        if input.is_empty() || input.len() < self.min_term_length {
            iter::once("").take(0)
        } else {
            iter::once(truncate_str(input, self.max_term_length)).take(1)
        }
    }

    fn max_term_length(&self) -> usize {
        self.max_term_length
    }

    fn min_term_length(&self) -> usize {
        self.min_term_length
    }
}
