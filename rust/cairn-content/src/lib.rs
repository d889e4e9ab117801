//! Content tables: cached, reference-counted, dual-keyed persistent records
//! over the key-value transaction layer.
//!
//! A content table turns raw key-value records of one content type into
//! in-memory handles with a permanent process-assigned local id and an
//! optional, mutable server id. Handles are mutated under an explicit lock
//! and persisted with `save_and_unlock`, which writes the record, the
//! server-id mapping, and every dependent secondary index inside the same
//! transaction.

mod cache;
pub mod content;
pub mod indexer;
pub mod keys;
pub mod table;

pub use content::{Content, ContentHandle, ContentLock, LocalId};
pub use indexer::ContentIndexer;
pub use table::ContentTable;
