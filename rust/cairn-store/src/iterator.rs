//! Bidirectional merge cursor over an optional transaction overlay and the
//! base store.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use crate::transaction::Mutation;

/// Cursor position. Exhausted states remember the direction of travel so
/// that reversing from either end lands on the last/first merged key.
enum Position {
    Unpositioned,
    At { key: Vec<u8>, value: Vec<u8> },
    ExhaustedForward,
    ExhaustedBackward,
}

/// A bidirectional cursor presenting the union of a pending overlay and the
/// base state as one key-ordered sequence.
///
/// Overlay entries shadow base entries with the same key; tombstoned keys
/// are hidden entirely and skipped transparently in both directions. The
/// merge is symmetric: `prev` immediately after `next` (and vice versa)
/// from any valid position returns to the original key, including where the
/// overlay and base sequences interleave and where a tombstone removes what
/// would otherwise be the first or last key of the merged range.
///
/// Both underlying maps are captured at cursor creation, so the cursor is a
/// point-in-time view.
pub struct StoreIterator {
    base: Arc<BTreeMap<Vec<u8>, Vec<u8>>>,
    overlay: Option<BTreeMap<Vec<u8>, Mutation>>,
    position: Position,
}

impl StoreIterator {
    pub(crate) fn new(
        base: Arc<BTreeMap<Vec<u8>, Vec<u8>>>,
        overlay: Option<BTreeMap<Vec<u8>, Mutation>>,
    ) -> StoreIterator {
        StoreIterator {
            base,
            overlay,
            position: Position::Unpositioned,
        }
    }

    /// True when the cursor rests on a key-value entry.
    pub fn valid(&self) -> bool {
        matches!(self.position, Position::At { .. })
    }

    /// The key under the cursor, if valid.
    pub fn key(&self) -> Option<&[u8]> {
        match &self.position {
            Position::At { key, .. } => Some(key),
            _ => None,
        }
    }

    /// The value under the cursor, if valid.
    pub fn value(&self) -> Option<&[u8]> {
        match &self.position {
            Position::At { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Positions the cursor at the first merged key that is `>= key`.
    /// Returns validity.
    pub fn seek(&mut self, key: &[u8]) -> bool {
        let found = self.merged_first(Bound::Included(key.to_vec()));
        self.set_forward(found)
    }

    /// Positions the cursor at the first merged key. Returns validity.
    pub fn seek_to_first(&mut self) -> bool {
        let found = self.merged_first(Bound::Unbounded);
        self.set_forward(found)
    }

    /// Positions the cursor at the last merged key. Returns validity.
    pub fn seek_to_last(&mut self) -> bool {
        let found = self.merged_last(Bound::Unbounded);
        self.set_backward(found)
    }

    /// Advances to the next merged key. From an unpositioned cursor this is
    /// `seek_to_first`; from a backward-exhausted cursor it repositions at
    /// the first key. Returns validity.
    pub fn next(&mut self) -> bool {
        match &self.position {
            Position::Unpositioned | Position::ExhaustedBackward => self.seek_to_first(),
            Position::At { key, .. } => {
                let found = self.merged_first(Bound::Excluded(key.clone()));
                self.set_forward(found)
            }
            Position::ExhaustedForward => false,
        }
    }

    /// Steps back to the previous merged key. From an unpositioned cursor
    /// this is `seek_to_last`; from a forward-exhausted cursor it
    /// repositions at the last key. Returns validity.
    pub fn prev(&mut self) -> bool {
        match &self.position {
            Position::Unpositioned | Position::ExhaustedForward => self.seek_to_last(),
            Position::At { key, .. } => {
                let found = self.merged_last(Bound::Excluded(key.clone()));
                self.set_backward(found)
            }
            Position::ExhaustedBackward => false,
        }
    }

    fn set_forward(&mut self, found: Option<(Vec<u8>, Vec<u8>)>) -> bool {
        self.position = match found {
            Some((key, value)) => Position::At { key, value },
            None => Position::ExhaustedForward,
        };
        self.valid()
    }

    fn set_backward(&mut self, found: Option<(Vec<u8>, Vec<u8>)>) -> bool {
        self.position = match found {
            Some((key, value)) => Position::At { key, value },
            None => Position::ExhaustedBackward,
        };
        self.valid()
    }

    /// First visible entry at or after `lower`. Maintains one cursor per
    /// side and always yields the lexicographically smaller candidate; on
    /// equal keys the overlay shadows the base, and tombstones advance both
    /// sides past the hidden key.
    fn merged_first(&self, lower: Bound<Vec<u8>>) -> Option<(Vec<u8>, Vec<u8>)> {
        let mut lower = lower;
        loop {
            let range = (as_deref_bound(&lower), Bound::<&[u8]>::Unbounded);
            let base = self.base.range::<[u8], _>(range).next();
            let overlay = self
                .overlay
                .as_ref()
                .and_then(|o| o.range::<[u8], _>(range).next());
            match Self::pick(base, overlay, true) {
                None => return None,
                Some((key, Some(value))) => return Some((key.clone(), value)),
                Some((key, None)) => lower = Bound::Excluded(key.clone()),
            }
        }
    }

    /// Last visible entry at or before `upper`; mirror of `merged_first`.
    fn merged_last(&self, upper: Bound<Vec<u8>>) -> Option<(Vec<u8>, Vec<u8>)> {
        let mut upper = upper;
        loop {
            let range = (Bound::<&[u8]>::Unbounded, as_deref_bound(&upper));
            let base = self.base.range::<[u8], _>(range).next_back();
            let overlay = self
                .overlay
                .as_ref()
                .and_then(|o| o.range::<[u8], _>(range).next_back());
            match Self::pick(base, overlay, false) {
                None => return None,
                Some((key, Some(value))) => return Some((key.clone(), value)),
                Some((key, None)) => upper = Bound::Excluded(key.clone()),
            }
        }
    }

    /// Chooses between the two candidates. Returns the winning key together
    /// with its visible value, or `None` in place of the value when the key
    /// is tombstoned and must be skipped.
    fn pick<'a>(
        base: Option<(&'a Vec<u8>, &'a Vec<u8>)>,
        overlay: Option<(&'a Vec<u8>, &'a Mutation)>,
        forward: bool,
    ) -> Option<(&'a Vec<u8>, Option<Vec<u8>>)> {
        let overlay_wins = match (&base, &overlay) {
            (None, None) => return None,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some((bk, _)), Some((ok, _))) => {
                if forward {
                    ok <= bk
                } else {
                    ok >= bk
                }
            }
        };
        if overlay_wins {
            let (key, mutation) = overlay.unwrap();
            match mutation {
                Mutation::Put(value) => Some((key, Some(value.clone()))),
                Mutation::Delete => Some((key, None)),
            }
        } else {
            let (key, value) = base.unwrap();
            Some((key, Some(value.clone())))
        }
    }
}

fn as_deref_bound(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}
