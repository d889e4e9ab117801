//! Full-text secondary index over content records.
//!
//! The index maps normalized terms to local ids through `(term, id)` keys in
//! the shared store. It is maintained inside the same transaction as the
//! record save, so a committed record and its term entries are always
//! consistent: edits diff the previous term set against the new one and
//! never leave entries for terms no longer present.

pub mod index;
pub mod tokenizers;

pub use index::TextIndex;
pub use tokenizers::{Tokenizer, TrivialTokenizer, UnicodeWordTokenizer};
