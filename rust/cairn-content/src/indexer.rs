//! Secondary-index seam for content tables.

use cairn_common::Result;
use cairn_store::Transaction;

use crate::content::{Content, LocalId};

/// A secondary index maintained alongside content records.
///
/// Registered indexers run inside the same transaction as the record write,
/// so index entries and records commit or abandon together. Index entries
/// are derivable, rebuildable projections of the record data, never the
/// source of truth.
pub trait ContentIndexer<T: Content>: Send + Sync {
    /// Called when a record is saved. `previous` is the last persisted
    /// version as visible through `txn`, or `None` on first save.
    fn content_saved(
        &self,
        txn: &mut Transaction,
        local_id: LocalId,
        previous: Option<&T>,
        current: &T,
    ) -> Result<()>;

    /// Called when a record is deleted. `previous` is the last persisted
    /// version, or `None` if the record was never saved.
    fn content_deleted(
        &self,
        txn: &mut Transaction,
        local_id: LocalId,
        previous: Option<&T>,
    ) -> Result<()>;
}
