//! Snapshots: immutable views frozen at creation time.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::iterator::StoreIterator;
use crate::read::ReadView;

/// An immutable view of the base store at the moment the snapshot was taken.
///
/// A snapshot never observes a write that happens after its creation,
/// committed or not: it holds the `Arc` of the base map that was current at
/// creation, and committed batches swap in successor maps without touching
/// earlier ones.
pub struct Snapshot {
    base: Arc<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl Snapshot {
    pub(crate) fn new(base: Arc<BTreeMap<Vec<u8>, Vec<u8>>>) -> Snapshot {
        Snapshot { base }
    }
}

impl ReadView for Snapshot {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.base.get(key).cloned()
    }

    fn iter(&self) -> StoreIterator {
        StoreIterator::new(self.base.clone(), None)
    }
}
