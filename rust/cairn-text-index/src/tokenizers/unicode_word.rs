//! Unicode word tokenizer - extracts words at Unicode word boundaries.

use unicode_segmentation::{UnicodeSegmentation, UnicodeWords};

use super::{DEFAULT_MAX_TERM_LENGTH, DEFAULT_MIN_TERM_LENGTH, Tokenizer, truncate_str};

/// Extracts words according to the Unicode text segmentation rules
/// (UAX #29), which handles scripts without explicit word separators as
/// well as Latin text. Terms longer than the maximum length are truncated
/// at UTF-8 character boundaries; terms shorter than the minimum length are
/// excluded entirely.
pub struct UnicodeWordTokenizer {
    max_term_length: usize,
    min_term_length: usize,
}

impl UnicodeWordTokenizer {
    /// Create a new UnicodeWordTokenizer with default settings.
    pub fn new() -> Self {
        Self {
            max_term_length: DEFAULT_MAX_TERM_LENGTH,
            min_term_length: DEFAULT_MIN_TERM_LENGTH,
        }
    }

    /// Create a new UnicodeWordTokenizer with custom max and min term
    /// lengths.
    pub fn with_lengths(max_term_length: usize, min_term_length: usize) -> Self {
        Self {
            max_term_length,
            min_term_length,
        }
    }
}

impl Default for UnicodeWordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that yields word tokens from a string input.
pub struct WordTokenIterator<'a> {
    words: UnicodeWords<'a>,
    max_term_length: usize,
    min_term_length: usize,
}

impl<'a> Iterator for WordTokenIterator<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        for word in self.words.by_ref() {
            if word.len() >= self.min_term_length {
                return Some(truncate_str(word, self.max_term_length));
            }
        }
        None
    }
}

impl Tokenizer for UnicodeWordTokenizer {
    type TokenIter<'a> = WordTokenIterator<'a>;

    fn tokenize<'a>(&'a self, input: &'a str) -> Self::TokenIter<'a> {
        WordTokenIterator {
            words: input.unicode_words(),
            max_term_length: self.max_term_length,
            min_term_length: self.min_term_length,
        }
    }

    fn max_term_length(&self) -> usize {
        self.max_term_length
    }

    fn min_term_length(&self) -> usize {
        self.min_term_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_word_tokenizer() {
        let tokenizer = UnicodeWordTokenizer::new();

        let terms: Vec<&str> = tokenizer.tokenize("Typically 3-4 levels deep,").collect();
        assert_eq!(terms, vec!["Typically", "3", "4", "levels", "deep"]);

        let terms: Vec<&str> = tokenizer.tokenize("").collect();
        assert_eq!(terms, Vec::<&str>::new());

        let terms: Vec<&str> = tokenizer.tokenize("word").collect();
        assert_eq!(terms, vec!["word"]);

        let terms: Vec<&str> = tokenizer.tokenize("!@#$%^&*()").collect();
        assert_eq!(terms, Vec::<&str>::new());

        let terms: Vec<&str> = tokenizer.tokenize("café naïve résumé").collect();
        assert_eq!(terms, vec!["café", "naïve", "résumé"]);
    }

    #[test]
    fn test_word_length_filtering() {
        let tokenizer = UnicodeWordTokenizer::with_lengths(3, 1);

        // Words longer than 3 bytes are truncated, not omitted.
        let terms: Vec<&str> = tokenizer.tokenize("cat dog elephant mouse").collect();
        assert_eq!(terms, vec!["cat", "dog", "ele", "mou"]);

        let tokenizer = UnicodeWordTokenizer::with_lengths(128, 3);

        // Words shorter than 3 bytes are excluded.
        let terms: Vec<&str> = tokenizer.tokenize("a bb cat dog elephant").collect();
        assert_eq!(terms, vec!["cat", "dog", "elephant"]);
    }

    #[test]
    fn test_apostrophes_stay_within_words() {
        let tokenizer = UnicodeWordTokenizer::new();
        let terms: Vec<&str> = tokenizer.tokenize("it's a dog's life").collect();
        assert_eq!(terms, vec!["it's", "a", "dog's", "life"]);
    }
}
