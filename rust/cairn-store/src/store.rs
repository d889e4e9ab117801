//! The base store: a shared, internally synchronized ordered map.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use cairn_common::{Result, verify_arg};
use log::debug;

use crate::iterator::StoreIterator;
use crate::read::ReadView;
use crate::snapshot::Snapshot;
use crate::transaction::{Mutation, Transaction};
use crate::value;

/// Configuration for opening a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Budget (in resident handles) for the in-memory content caches built
    /// on top of this store. Must be nonzero.
    pub cache_size: usize,
}

/// Shared core of one store instance.
///
/// The base state is an immutable ordered map behind an `Arc`; every
/// committed batch builds the successor map and swaps the `Arc` under the
/// write lock. Snapshots and iterators clone the `Arc`, which makes them
/// O(1) and immune to later writes by construction. Commits are serialized
/// through the write lock, so no two batches ever interleave.
pub(crate) struct StoreCore {
    base: RwLock<Arc<BTreeMap<Vec<u8>, Vec<u8>>>>,
    cache_size: usize,
}

impl StoreCore {
    pub(crate) fn current(&self) -> Arc<BTreeMap<Vec<u8>, Vec<u8>>> {
        self.base.read().unwrap().clone()
    }

    /// Applies a batch of mutations in key order, atomically with respect to
    /// other commits and to readers.
    pub(crate) fn apply(&self, mutations: &BTreeMap<Vec<u8>, Mutation>) {
        if mutations.is_empty() {
            return;
        }
        let mut guard = self.base.write().unwrap();
        let mut next = BTreeMap::clone(&guard);
        for (key, mutation) in mutations {
            match mutation {
                Mutation::Put(value) => {
                    next.insert(key.clone(), value.clone());
                }
                Mutation::Delete => {
                    next.remove(key);
                }
            }
        }
        *guard = Arc::new(next);
    }
}

/// Handle to an open store. Cheap to clone; all clones share one core.
#[derive(Clone)]
pub struct Store {
    core: Arc<StoreCore>,
}

impl Store {
    /// Opens a new, empty store with the given options. An explicit cache
    /// budget is required; there is no default.
    pub fn open(options: StoreOptions) -> Result<Store> {
        verify_arg!(cache_size, options.cache_size > 0);
        debug!("opening store, cache_size={}", options.cache_size);
        Ok(Store {
            core: Arc::new(StoreCore {
                base: RwLock::new(Arc::new(BTreeMap::new())),
                cache_size: options.cache_size,
            }),
        })
    }

    /// The cache budget this store was opened with.
    pub fn cache_size(&self) -> usize {
        self.core.cache_size
    }

    /// Writes `value` under `key`, immediately visible to new reads.
    pub fn put(&self, key: &[u8], value: &[u8]) {
        let mut batch = BTreeMap::new();
        batch.insert(key.to_vec(), Mutation::Put(value.to_vec()));
        self.core.apply(&batch);
    }

    /// Removes `key` if present.
    pub fn delete(&self, key: &[u8]) {
        let mut batch = BTreeMap::new();
        batch.insert(key.to_vec(), Mutation::Delete);
        self.core.apply(&batch);
    }

    pub fn put_i64(&self, key: &[u8], v: i64) {
        self.put(key, &value::encode_i64(v));
    }

    pub fn put_u64(&self, key: &[u8], v: u64) {
        self.put(key, &value::encode_u64(v));
    }

    pub fn put_f64(&self, key: &[u8], v: f64) {
        self.put(key, &value::encode_f64(v));
    }

    pub fn put_str(&self, key: &[u8], v: &str) {
        self.put(key, &value::encode_str(v));
    }

    /// Starts a new transaction layered over this store.
    pub fn new_transaction(&self) -> Transaction {
        Transaction::new(self.core.clone())
    }

    /// Freezes the current base state.
    pub fn new_snapshot(&self) -> Snapshot {
        Snapshot::new(self.core.current())
    }
}

impl ReadView for Store {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.core.current().get(key).cloned()
    }

    fn iter(&self) -> StoreIterator {
        StoreIterator::new(self.core.current(), None)
    }
}
