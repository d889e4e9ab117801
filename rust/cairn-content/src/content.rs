//! Content records, handles, and the lock-for-mutation discipline.

use std::sync::{Arc, Mutex};

/// Process-assigned, permanent integer identity of a content record.
pub type LocalId = u64;

/// A persistent content type: a serializable record with a unique key
/// prefix and an optional, mutable server-assigned string identity.
pub trait Content:
    bincode::Encode + bincode::Decode<()> + Default + Clone + Send + Sync + 'static
{
    /// Key prefix unique to this content type, e.g. `"cmt"`.
    const PREFIX: &'static str;

    /// The record's current server id, if one has been assigned.
    fn server_id(&self) -> Option<&str>;
}

pub(crate) struct HandleState<T> {
    pub(crate) record: T,
    pub(crate) locked: bool,
    /// True once the record has been written through `save_and_unlock`.
    pub(crate) saved: bool,
    /// The server id whose mapping entry is currently installed in the
    /// store, i.e. the value at the time of the last save.
    pub(crate) saved_server_id: Option<String>,
}

/// An in-memory, reference-counted wrapper around one content record.
///
/// Handles are shared as `Arc<ContentHandle<T>>`; the owning table caches a
/// weak reference keyed by local id, so two loads of the same id return the
/// identical instance while any strong reference is outstanding. A handle
/// that was never saved and loses its last strong reference is permanently
/// lost once evicted; content is ephemeral until explicitly saved.
pub struct ContentHandle<T: Content> {
    local_id: LocalId,
    pub(crate) state: Mutex<HandleState<T>>,
}

impl<T: Content> ContentHandle<T> {
    pub(crate) fn new(local_id: LocalId, record: T, saved: bool) -> ContentHandle<T> {
        let saved_server_id = saved.then(|| record.server_id().map(str::to_string)).flatten();
        ContentHandle {
            local_id,
            state: Mutex::new(HandleState {
                record,
                locked: false,
                saved,
                saved_server_id,
            }),
        }
    }

    /// The permanent local id of this record.
    pub fn local_id(&self) -> LocalId {
        self.local_id
    }

    /// The record's current server id, if any. Reads never require the
    /// content lock.
    pub fn server_id(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.record.server_id().map(str::to_string)
    }

    /// Reads the record through `f` without taking the content lock.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state.record)
    }

    /// A clone of the current record.
    pub fn record(&self) -> T {
        self.read(Clone::clone)
    }

    /// True once the record has been persisted at least once.
    pub fn is_saved(&self) -> bool {
        self.state.lock().unwrap().saved
    }

    /// Acquires the content lock, the precondition for any field mutation.
    ///
    /// The lock is a logical single-writer discipline, not a blocking
    /// mutex: locking an already-locked handle is a programming error.
    ///
    /// # Panics
    ///
    /// Panics if the handle is already locked.
    pub fn lock(self: &Arc<Self>) -> ContentLock<T> {
        let mut state = self.state.lock().unwrap();
        if state.locked {
            panic!(
                "content handle {}/{} is already locked",
                T::PREFIX,
                self.local_id
            );
        }
        state.locked = true;
        drop(state);
        ContentLock {
            handle: self.clone(),
            released: false,
        }
    }
}

/// Exclusive mutation access to a locked content handle.
///
/// Obtained from [`ContentHandle::lock`]; released by
/// [`ContentTable::save_and_unlock`](crate::ContentTable::save_and_unlock),
/// [`ContentTable::delete_and_unlock`](crate::ContentTable::delete_and_unlock),
/// or by dropping the lock (which unlocks without persisting anything).
pub struct ContentLock<T: Content> {
    handle: Arc<ContentHandle<T>>,
    released: bool,
}

impl<T: Content> ContentLock<T> {
    /// The handle this lock guards.
    pub fn handle(&self) -> &Arc<ContentHandle<T>> {
        &self.handle
    }

    /// Mutates the record through `f`.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        let mut state = self.handle.state.lock().unwrap();
        f(&mut state.record);
    }

    /// Unlocks the handle and consumes the lock without persisting.
    pub(crate) fn release(mut self) -> Arc<ContentHandle<T>> {
        self.released = true;
        let handle = self.handle.clone();
        handle.state.lock().unwrap().locked = false;
        handle
    }
}

impl<T: Content> Drop for ContentLock<T> {
    fn drop(&mut self) {
        if !self.released {
            self.handle.state.lock().unwrap().locked = false;
        }
    }
}
