//! # Cairn: Embedded Transactional Object Store
//!
//! Cairn is a process-local object store for applications that keep their
//! domain records in an ordered key-value space: a key-value transaction
//! layer with snapshots and bidirectional merge iteration, a generic
//! content-table pattern that turns raw records into cached,
//! reference-counted, dual-keyed domain objects, and secondary indexes
//! built on the same transactions so records and index entries always
//! commit together.
//!
//! ## Module Organization
//!
//! * [`common`] - Error taxonomy and shared result types
//! * [`store`] - The key-value transaction layer: store, transactions,
//!   snapshots, merge iterators
//! * [`content`] - Content tables: handles, lock discipline, id mapping,
//!   the indexer seam
//! * [`text_index`] - Full-text term index over content records
//! * [`geo_index`] - Geospatial histogram of observed placemark locations
//!
//! ## Example
//!
//! ```
//! use cairn::content::{Content, ContentTable};
//! use cairn::store::{ReadView, Store, StoreOptions};
//!
//! #[derive(Clone, Default, bincode::Encode, bincode::Decode)]
//! struct Comment {
//!     server_id: Option<String>,
//!     message: String,
//! }
//!
//! impl Content for Comment {
//!     const PREFIX: &'static str = "cmt";
//!
//!     fn server_id(&self) -> Option<&str> {
//!         self.server_id.as_deref()
//!     }
//! }
//!
//! # fn main() -> cairn::common::Result<()> {
//! let store = Store::open(StoreOptions { cache_size: 1024 })?;
//! let comments = ContentTable::<Comment>::new(&store);
//!
//! let mut txn = store.new_transaction();
//! let comment = comments.new_content(&mut txn);
//! let mut lock = comment.lock();
//! lock.update(|c| c.message = "hello".to_string());
//! comments.save_and_unlock(lock, &mut txn)?;
//! txn.commit();
//!
//! assert_eq!(comments.load(comment.local_id()).unwrap().local_id(), comment.local_id());
//! # Ok(())
//! # }
//! ```

pub use cairn_common as common;
pub use cairn_content as content;
pub use cairn_geo_index as geo_index;
pub use cairn_store as store;
pub use cairn_text_index as text_index;
