//! The term index: `(term, local id)` entries maintained on save/delete.

use std::collections::BTreeSet;

use cairn_common::Result;
use cairn_content::{Content, ContentIndexer, LocalId, keys};
use cairn_store::{ReadView, Transaction};

use crate::tokenizers::{Tokenizer, UnicodeWordTokenizer};

/// A full-text index over one free-text field of a content type.
///
/// Register it on the content table; every save then diffs the previous
/// term set against the new one inside the save's transaction, removing
/// stale `(term, id)` entries and adding new ones, so the index never holds
/// entries for terms no longer present in the edited text.
///
/// The same tokenizer extracts terms on save and on search. Word-based
/// matching uses the default [`UnicodeWordTokenizer`]; exact-match fields
/// pick a different tokenizer through
/// [`with_tokenizer`](TextIndex::with_tokenizer).
pub struct TextIndex<T: Content, K: Tokenizer = UnicodeWordTokenizer> {
    tokenizer: K,
    extract: fn(&T) -> &str,
}

impl<T: Content> TextIndex<T> {
    /// Creates a word index over the text field selected by `extract`.
    pub fn new(extract: fn(&T) -> &str) -> TextIndex<T> {
        TextIndex::with_tokenizer(extract, UnicodeWordTokenizer::new())
    }
}

impl<T: Content, K: Tokenizer> TextIndex<T, K> {
    /// Creates an index with a custom tokenizer.
    pub fn with_tokenizer(extract: fn(&T) -> &str, tokenizer: K) -> TextIndex<T, K> {
        TextIndex { tokenizer, extract }
    }

    /// Every local id whose current token set contains `query`. Order is
    /// unspecified; callers that need ordering sort the result themselves.
    ///
    /// The scan runs against any read view, so searches through an open
    /// transaction observe its pending index mutations.
    pub fn search<V: ReadView>(&self, view: &V, query: &str) -> Vec<LocalId> {
        let Some(term) = self.tokenizer.tokenize(query).next() else {
            return Vec::new();
        };
        let prefix = keys::index_term_prefix(T::PREFIX, &normalize(term));
        let mut ids = Vec::new();
        let mut it = view.iter();
        let mut ok = it.seek(&prefix);
        while ok {
            let key = it.key().unwrap();
            if !key.starts_with(&prefix) {
                break;
            }
            if let Some(id) = keys::parse_index_entry_id(key) {
                ids.push(id);
            }
            ok = it.next();
        }
        ids
    }

    /// The normalized term set of `text`.
    fn term_set(&self, text: &str) -> BTreeSet<String> {
        self.tokenizer.tokenize(text).map(normalize).collect()
    }
}

/// Terms are normalized to their lowercase form, for both indexing and
/// querying.
fn normalize(term: &str) -> String {
    term.to_lowercase()
}

impl<T: Content, K: Tokenizer> ContentIndexer<T> for TextIndex<T, K> {
    fn content_saved(
        &self,
        txn: &mut Transaction,
        local_id: LocalId,
        previous: Option<&T>,
        current: &T,
    ) -> Result<()> {
        let old_terms = previous
            .map(|p| self.term_set((self.extract)(p)))
            .unwrap_or_default();
        let new_terms = self.term_set((self.extract)(current));

        for stale in old_terms.difference(&new_terms) {
            txn.delete(&keys::index_key(T::PREFIX, stale, local_id));
        }
        for added in new_terms.difference(&old_terms) {
            txn.put(&keys::index_key(T::PREFIX, added, local_id), b"");
        }
        Ok(())
    }

    fn content_deleted(
        &self,
        txn: &mut Transaction,
        local_id: LocalId,
        previous: Option<&T>,
    ) -> Result<()> {
        let Some(previous) = previous else {
            return Ok(());
        };
        for term in self.term_set((self.extract)(previous)) {
            txn.delete(&keys::index_key(T::PREFIX, &term, local_id));
        }
        Ok(())
    }
}
