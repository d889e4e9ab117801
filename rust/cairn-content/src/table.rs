//! Content tables: load, save, and delete content records transactionally.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cairn_common::{Error, Result};
use cairn_store::{ReadView, Store, Transaction, value};
use log::warn;

use crate::cache::ContentCache;
use crate::content::{Content, ContentHandle, ContentLock, LocalId};
use crate::indexer::ContentIndexer;
use crate::keys;

/// A table of content records of one type, backed by a shared store.
///
/// The table owns the in-memory handle cache and the local id allocator for
/// its content type and routes every mutation through caller-supplied
/// transactions, so a single commit atomically covers the record, the
/// server-id mapping, and all registered secondary indexes.
pub struct ContentTable<T: Content> {
    store: Store,
    cache: ContentCache<T>,
    next_id: AtomicU64,
    indexers: Vec<Box<dyn ContentIndexer<T>>>,
}

impl<T: Content> ContentTable<T> {
    /// Creates a table over `store`, seeding the id allocator from the
    /// persisted high-water mark.
    pub fn new(store: &Store) -> ContentTable<T> {
        let next_id = store.get_u64(&keys::next_id_key(T::PREFIX), 1);
        ContentTable {
            store: store.clone(),
            cache: ContentCache::new(store.cache_size()),
            next_id: AtomicU64::new(next_id),
            indexers: Vec::new(),
        }
    }

    /// Registers a secondary index, maintained inside every save/delete
    /// transaction from now on.
    pub fn with_indexer(mut self, indexer: Box<dyn ContentIndexer<T>>) -> ContentTable<T> {
        self.indexers.push(indexer);
        self
    }

    /// Allocates the next local id and returns a fresh, unsaved, cached
    /// handle. The bumped allocator is persisted through `txn`; an abandoned
    /// transaction leaves a gap in the id sequence, never a reuse.
    pub fn new_content(&self, txn: &mut Transaction) -> Arc<ContentHandle<T>> {
        let local_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        txn.put_u64(&keys::next_id_key(T::PREFIX), local_id + 1);
        let handle = Arc::new(ContentHandle::new(local_id, T::default(), false));
        self.cache.insert(&handle);
        handle
    }

    /// Returns the handle for `local_id`: the cached instance while one is
    /// resident, otherwise the record deserialized from the base store.
    /// Returns `None` if the record is neither cached nor persisted.
    pub fn load(&self, local_id: LocalId) -> Option<Arc<ContentHandle<T>>> {
        if let Some(handle) = self.cache.get(local_id) {
            return Some(handle);
        }
        let record = self.read_or_absent(&self.store, local_id)?;
        let handle = Arc::new(ContentHandle::new(local_id, record, true));
        self.cache.insert(&handle);
        Some(handle)
    }

    /// Resolves `server_id` through the mapping range, then loads by local
    /// id.
    pub fn load_by_server_id(&self, server_id: &str) -> Option<Arc<ContentHandle<T>>> {
        let key = keys::mapping_key(T::PREFIX, server_id);
        let bytes = self.store.get(&key)?;
        let Some(local_id) = value::decode_u64(&bytes) else {
            warn!(
                "corrupt server id mapping for {}/{server_id}, treating as absent",
                T::PREFIX
            );
            return None;
        };
        self.load(local_id)
    }

    /// Serializes the record, updates the server-id mapping if the server id
    /// changed since the last save, runs every registered indexer, marks the
    /// handle saved, and unlocks. All writes go through `txn`, so record,
    /// mapping, and index entries commit or abandon together.
    ///
    /// The handle's bookkeeping is updated before `txn` commits; a caller
    /// that abandons the transaction afterwards must drop the handle rather
    /// than keep using it.
    pub fn save_and_unlock(&self, lock: ContentLock<T>, txn: &mut Transaction) -> Result<()> {
        let handle = lock.handle().clone();
        let local_id = handle.local_id();
        let previous = self.read_or_absent(txn, local_id);

        let (record, old_server_id) = {
            let state = handle.state.lock().unwrap();
            (state.record.clone(), state.saved_server_id.clone())
        };
        let bytes = encode_record(&record, local_id)?;
        txn.put(&keys::content_key(T::PREFIX, local_id), &bytes);

        let new_server_id = record.server_id().map(str::to_string);
        if old_server_id != new_server_id {
            if let Some(old) = &old_server_id {
                txn.delete(&keys::mapping_key(T::PREFIX, old));
            }
            if let Some(new) = &new_server_id {
                txn.put(
                    &keys::mapping_key(T::PREFIX, new),
                    &value::encode_u64(local_id),
                );
            }
        }

        for indexer in &self.indexers {
            indexer.content_saved(txn, local_id, previous.as_ref(), &record)?;
        }

        {
            let mut state = handle.state.lock().unwrap();
            state.saved = true;
            state.saved_server_id = new_server_id;
        }
        lock.release();
        Ok(())
    }

    /// Removes the record, its mapping entry (if any), and its secondary
    /// index entries within `txn`, evicts the handle from the cache, and
    /// unlocks.
    pub fn delete_and_unlock(&self, lock: ContentLock<T>, txn: &mut Transaction) -> Result<()> {
        let handle = lock.handle().clone();
        let local_id = handle.local_id();
        let previous = self.read_or_absent(txn, local_id);

        txn.delete(&keys::content_key(T::PREFIX, local_id));
        let old_server_id = {
            let state = handle.state.lock().unwrap();
            state.saved_server_id.clone()
        };
        if let Some(old) = &old_server_id {
            txn.delete(&keys::mapping_key(T::PREFIX, old));
        }

        for indexer in &self.indexers {
            indexer.content_deleted(txn, local_id, previous.as_ref())?;
        }

        {
            let mut state = handle.state.lock().unwrap();
            state.saved = false;
            state.saved_server_id = None;
        }
        self.cache.remove(local_id);
        lock.release();
        Ok(())
    }

    /// Number of cached handles currently held by at least one outstanding
    /// reference.
    pub fn referenced_contents(&self) -> usize {
        self.cache.referenced_count()
    }

    /// The store this table operates on.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Reads and decodes the persisted record for `local_id` through `view`,
    /// distinguishing corruption from absence: a missing record is
    /// `Ok(None)`, a record that fails to decode is a `CorruptRecord` error.
    pub fn read_record<V: ReadView>(&self, view: &V, local_id: LocalId) -> Result<Option<T>> {
        let Some(bytes) = view.get(&keys::content_key(T::PREFIX, local_id)) else {
            return Ok(None);
        };
        match bincode::decode_from_slice(&bytes, binc_config()) {
            Ok((record, _)) => Ok(Some(record)),
            Err(e) => Err(Error::corrupt_record(
                format!("{}/{local_id}", T::PREFIX),
                e.to_string(),
            )),
        }
    }

    /// Like [`read_record`](Self::read_record), but treating corruption the
    /// way loads do: logged and read as absent.
    fn read_or_absent<V: ReadView>(&self, view: &V, local_id: LocalId) -> Option<T> {
        match self.read_record(view, local_id) {
            Ok(record) => record,
            Err(e) => {
                warn!("{e}, treating as absent");
                None
            }
        }
    }
}

fn encode_record<T: Content>(record: &T, local_id: LocalId) -> Result<Vec<u8>> {
    bincode::encode_to_vec(record, binc_config())
        .map_err(|e| Error::invalid_operation(format!("encode {}/{local_id}: {e}", T::PREFIX)))
}

fn binc_config() -> impl bincode::config::Config {
    bincode::config::standard().with_fixed_int_encoding()
}
