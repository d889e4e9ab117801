//! Key-value transaction layer: an ordered byte-string store with
//! transactions, snapshots, and bidirectional merge iteration.
//!
//! The base store is a single ordered key space. Writers stage mutations in
//! a [`Transaction`] overlay and apply them atomically with
//! [`Transaction::commit`]; readers take O(1) immutable [`Snapshot`]s or
//! iterate the merged view of overlay and base through a [`StoreIterator`].
//! Keys are structured strings (`prefix/id`, `prefix/paddedNumber/id`) so
//! prefix scans and order-dependent scans are meaningful.

pub mod iterator;
pub mod read;
pub mod snapshot;
pub mod store;
pub mod transaction;
pub mod value;

pub use iterator::StoreIterator;
pub use read::ReadView;
pub use snapshot::Snapshot;
pub use store::{Store, StoreOptions};
pub use transaction::{Mutation, Transaction};
