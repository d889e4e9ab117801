//! Uniform read access over the store, snapshots, and open transactions.

use crate::iterator::StoreIterator;
use crate::value;

/// Read access to an ordered key-value view.
///
/// Implemented by [`Store`](crate::Store) (live base state),
/// [`Snapshot`](crate::Snapshot) (frozen base state), and
/// [`Transaction`](crate::Transaction) (pending overlay merged over the base
/// state). Absence is an explicit outcome: `get` returns `None` for a
/// missing key, never a default-valued entry.
pub trait ReadView {
    /// Returns the value stored under `key`, or `None` when the key is
    /// absent from this view.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Returns a bidirectional cursor over this view.
    fn iter(&self) -> StoreIterator;

    /// Reads a signed integer, falling back to `default` when the key is
    /// absent or the stored value is not a valid encoding.
    fn get_i64(&self, key: &[u8], default: i64) -> i64 {
        self.get(key)
            .and_then(|v| value::decode_i64(&v))
            .unwrap_or(default)
    }

    /// Reads an unsigned integer, falling back to `default`.
    fn get_u64(&self, key: &[u8], default: u64) -> u64 {
        self.get(key)
            .and_then(|v| value::decode_u64(&v))
            .unwrap_or(default)
    }

    /// Reads a floating-point value, falling back to `default`.
    fn get_f64(&self, key: &[u8], default: f64) -> f64 {
        self.get(key)
            .and_then(|v| value::decode_f64(&v))
            .unwrap_or(default)
    }

    /// Reads a UTF-8 string, falling back to `default`.
    fn get_str(&self, key: &[u8], default: &str) -> String {
        self.get(key)
            .and_then(|v| value::decode_str(&v))
            .unwrap_or_else(|| default.to_string())
    }
}
