//! Structured key construction for content records and their id mapping.
//!
//! All keys of one content type share its `PREFIX`:
//!
//! ```text
//! {prefix}/{local_id:020}      primary record
//! {prefix}m/{server_id}        server id -> local id mapping
//! {prefix}#next                id allocator high-water mark
//! {prefix}s/{term}/{id:020}    secondary index entries (term or bucket)
//! ```
//!
//! Local ids are zero-padded to 20 digits so that lexicographic order
//! equals numeric order for every `u64`.

use crate::content::LocalId;

/// Zero-padding width for local ids embedded in keys.
pub const LOCAL_ID_WIDTH: usize = 20;

/// Key of the primary record for `local_id`.
pub fn content_key(prefix: &str, local_id: LocalId) -> Vec<u8> {
    format!("{prefix}/{local_id:020}").into_bytes()
}

/// Key of the server-id mapping entry for `server_id`.
pub fn mapping_key(prefix: &str, server_id: &str) -> Vec<u8> {
    format!("{prefix}m/{server_id}").into_bytes()
}

/// Key of the persisted id allocator high-water mark.
pub fn next_id_key(prefix: &str) -> Vec<u8> {
    format!("{prefix}#next").into_bytes()
}

/// Key of a secondary index entry binding `term` to `local_id`.
pub fn index_key(prefix: &str, term: &str, local_id: LocalId) -> Vec<u8> {
    format!("{prefix}s/{term}/{local_id:020}").into_bytes()
}

/// Prefix of every index entry for `term`, for prefix scans.
pub fn index_term_prefix(prefix: &str, term: &str) -> Vec<u8> {
    format!("{prefix}s/{term}/").into_bytes()
}

/// Recovers the local id from the tail of an index entry key.
pub fn parse_index_entry_id(key: &[u8]) -> Option<LocalId> {
    if key.len() < LOCAL_ID_WIDTH {
        return None;
    }
    let digits = std::str::from_utf8(&key[key.len() - LOCAL_ID_WIDTH..]).ok()?;
    digits.parse().ok()
}
