//! Transactions: ordered in-memory overlays of pending mutations.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::iterator::StoreIterator;
use crate::read::ReadView;
use crate::store::StoreCore;
use crate::value;

/// A pending mutation buffered inside a transaction. A `Delete` acts as a
/// tombstone: it hides the base entry (if any) until the transaction is
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Put(Vec<u8>),
    Delete,
}

/// An ordered overlay of pending key mutations layered on the base store.
///
/// Reads through the transaction see its own pending mutations merged over
/// the live base state; nothing outside the transaction sees them until
/// [`commit`](Transaction::commit). Both `commit` and
/// [`abandon`](Transaction::abandon) consume the transaction, so operating
/// on a resolved transaction is a compile error rather than a latent bug.
/// Dropping an unresolved transaction abandons it.
pub struct Transaction {
    core: Arc<StoreCore>,
    pending: BTreeMap<Vec<u8>, Mutation>,
}

impl Transaction {
    pub(crate) fn new(core: Arc<StoreCore>) -> Transaction {
        Transaction {
            core,
            pending: BTreeMap::new(),
        }
    }

    /// Buffers a write of `value` under `key`.
    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.pending
            .insert(key.to_vec(), Mutation::Put(value.to_vec()));
    }

    /// Buffers a deletion of `key`.
    pub fn delete(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), Mutation::Delete);
    }

    pub fn put_i64(&mut self, key: &[u8], v: i64) {
        self.put(key, &value::encode_i64(v));
    }

    pub fn put_u64(&mut self, key: &[u8], v: u64) {
        self.put(key, &value::encode_u64(v));
    }

    pub fn put_f64(&mut self, key: &[u8], v: f64) {
        self.put(key, &value::encode_f64(v));
    }

    pub fn put_str(&mut self, key: &[u8], v: &str) {
        self.put(key, &value::encode_str(v));
    }

    /// Number of buffered mutations.
    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    /// Atomically applies the buffered mutations to the base store in key
    /// order. Afterwards they are visible through the store and through any
    /// newly created transaction or snapshot.
    pub fn commit(self) {
        debug!("committing transaction, {} mutations", self.pending.len());
        self.core.apply(&self.pending);
    }

    /// Discards the buffered mutations. The base store is left byte-for-byte
    /// unchanged.
    pub fn abandon(self) {
        debug!("abandoning transaction, {} mutations", self.pending.len());
    }
}

impl ReadView for Transaction {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.pending.get(key) {
            Some(Mutation::Put(value)) => Some(value.clone()),
            Some(Mutation::Delete) => None,
            None => self.core.current().get(key).cloned(),
        }
    }

    fn iter(&self) -> StoreIterator {
        // The cursor captures the overlay at creation time, like a snapshot.
        StoreIterator::new(self.core.current(), Some(self.pending.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Store, StoreOptions};

    fn open() -> Store {
        Store::open(StoreOptions { cache_size: 16 }).unwrap()
    }

    #[test]
    fn test_pending_mutations_are_private_until_commit() {
        let store = open();
        let mut txn = store.new_transaction();
        txn.put(b"k", b"v");
        assert_eq!(txn.get(b"k"), Some(b"v".to_vec()));
        assert_eq!(store.get(b"k"), None);

        let other = store.new_transaction();
        assert_eq!(other.get(b"k"), None);

        txn.commit();
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
        assert_eq!(other.get(b"k"), Some(b"v".to_vec()));
    }

    #[test]
    fn test_tombstone_hides_base_entry() {
        let store = open();
        store.put(b"k", b"v");
        let mut txn = store.new_transaction();
        txn.delete(b"k");
        assert_eq!(txn.get(b"k"), None);
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
        txn.commit();
        assert_eq!(store.get(b"k"), None);
    }

    #[test]
    fn test_abandon_leaves_base_unchanged() {
        let store = open();
        store.put(b"a", b"1");
        let mut txn = store.new_transaction();
        txn.put(b"a", b"2");
        txn.put(b"b", b"3");
        txn.delete(b"a");
        txn.abandon();
        assert_eq!(store.get(b"a"), Some(b"1".to_vec()));
        assert_eq!(store.get(b"b"), None);
    }

    #[test]
    fn test_last_mutation_per_key_wins() {
        let store = open();
        let mut txn = store.new_transaction();
        txn.put(b"k", b"1");
        txn.delete(b"k");
        txn.put(b"k", b"2");
        assert_eq!(txn.get(b"k"), Some(b"2".to_vec()));
        assert_eq!(txn.pending_mutations(), 1);
        txn.commit();
        assert_eq!(store.get(b"k"), Some(b"2".to_vec()));
    }

    #[test]
    fn test_typed_accessors_through_transaction() {
        let store = open();
        let mut txn = store.new_transaction();
        txn.put_u64(b"count", 5);
        assert_eq!(txn.get_u64(b"count", 0), 5);
        assert_eq!(store.get_u64(b"count", 0), 0);
        txn.commit();
        assert_eq!(store.get_u64(b"count", 0), 5);
    }
}
