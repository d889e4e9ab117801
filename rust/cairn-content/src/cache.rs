//! Weak-reference cache of resident content handles.

use std::sync::{Arc, Mutex, Weak};

use ahash::AHashMap;

use crate::content::{Content, ContentHandle, LocalId};

/// Cache of in-memory handles keyed by local id.
///
/// The cache holds weak references: a handle stays resident exactly as long
/// as at least one strong reference is outstanding. Eviction of dead entries
/// is a policy concern, done opportunistically once the map outgrows its
/// budget; correctness only relies on upgrade failures reading as absence.
pub(crate) struct ContentCache<T: Content> {
    slots: Mutex<AHashMap<LocalId, Weak<ContentHandle<T>>>>,
    budget: usize,
}

impl<T: Content> ContentCache<T> {
    pub(crate) fn new(budget: usize) -> ContentCache<T> {
        ContentCache {
            slots: Mutex::new(AHashMap::new()),
            budget,
        }
    }

    /// Returns the resident handle for `local_id`, if one is still alive.
    pub(crate) fn get(&self, local_id: LocalId) -> Option<Arc<ContentHandle<T>>> {
        let slots = self.slots.lock().unwrap();
        slots.get(&local_id).and_then(Weak::upgrade)
    }

    /// Registers `handle` under its local id.
    pub(crate) fn insert(&self, handle: &Arc<ContentHandle<T>>) {
        let mut slots = self.slots.lock().unwrap();
        if slots.len() >= self.budget {
            slots.retain(|_, weak| weak.strong_count() > 0);
        }
        slots.insert(handle.local_id(), Arc::downgrade(handle));
    }

    /// Drops the slot for `local_id`, if any.
    pub(crate) fn remove(&self, local_id: LocalId) {
        self.slots.lock().unwrap().remove(&local_id);
    }

    /// Number of cached handles currently held by at least one outstanding
    /// strong reference.
    pub(crate) fn referenced_count(&self) -> usize {
        let slots = self.slots.lock().unwrap();
        slots.values().filter(|weak| weak.strong_count() > 0).count()
    }
}
