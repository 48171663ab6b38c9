/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Bookkeeping for "which original key positions remain" in a sub-trie.
//!
//! A [`PositionCalculus`] is a canonical (flyweight) token identifying a
//! subset of the positions `0..original_depth` of some root hypertrie's key.
//! It is used as the key of the `finished_subtries` map during insertion
//! (see [`crate::raw`]) to enforce structural sharing: two sub-tries reached
//! via the same remaining-position subset during one insert must be the same
//! object.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Index of a position within a key, `0..depth`.
pub type Pos = u8;

/// A canonical token identifying a subset of `0..original_depth` original
/// key positions still present in a sub-trie.
///
/// Tokens are flyweights: two [`PositionCalculus`] values constructed with
/// the same `(original_depth, bitmap)` are always the same `Arc`, so equality
/// and hashing are pointer-cheap (`Arc::ptr_eq`) and every token for a given
/// bitmap is canonical, one instance per process.
#[derive(Debug, Clone)]
pub struct PositionCalculus(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    original_depth: u8,
    /// Bit `p` set iff original position `p` is still present.
    bitmap: u64,
    /// Original positions still present, in ascending order.
    subkey_to_key: Vec<Pos>,
}

type FlyweightKey = (u8, u64);

static FLYWEIGHTS: Lazy<Mutex<HashMap<FlyweightKey, Arc<Inner>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

impl PositionCalculus {
    /// Returns the canonical token for `original_depth` with every position
    /// present (the root's subset, used to start an insert/lookup/slice).
    pub fn full(original_depth: u8) -> PositionCalculus {
        let bitmap = if original_depth >= 64 {
            u64::MAX
        } else {
            (1u64 << original_depth) - 1
        };
        PositionCalculus::canonicalize(original_depth, bitmap)
    }

    fn canonicalize(original_depth: u8, bitmap: u64) -> PositionCalculus {
        let key = (original_depth, bitmap);
        let mut table = FLYWEIGHTS.lock();
        let inner = table
            .entry(key)
            .or_insert_with(|| {
                let subkey_to_key = (0..original_depth).filter(|p| bitmap & (1 << p) != 0).collect();
                Arc::new(Inner { original_depth, bitmap, subkey_to_key })
            })
            .clone();
        PositionCalculus(inner)
    }

    /// Number of positions still present (`popcount` of the bitmap).
    pub fn subkey_length(&self) -> usize {
        self.0.subkey_to_key.len()
    }

    /// The original positions still present, in ascending order. The i-th
    /// entry is [`PositionCalculus::subkey_to_key_pos`]`(i)`.
    pub fn subkey_to_key(&self) -> &[Pos] {
        &self.0.subkey_to_key
    }

    /// Translate an original key position `p` (which MUST still be present)
    /// into its index within this sub-trie's own position ordering.
    pub fn key_to_subkey_pos(&self, p: Pos) -> usize {
        self.0
            .subkey_to_key
            .iter()
            .position(|&q| q == p)
            .expect("position p must still be present in this subset")
    }

    /// Translate a sub-trie-local position index into the original key
    /// position it corresponds to.
    pub fn subkey_to_key_pos(&self, i: usize) -> Pos {
        self.0.subkey_to_key[i]
    }

    /// Returns the subset token obtained by consuming (removing) original
    /// position `p`. `p` MUST currently be present.
    pub fn use_pos(&self, p: Pos) -> PositionCalculus {
        debug_assert!(self.0.bitmap & (1 << p) != 0, "position {p} is not present in this subset");
        PositionCalculus::canonicalize(self.0.original_depth, self.0.bitmap & !(1 << p))
    }

    /// Raw bitmap, exposed for diagnostics and for keying scratch maps that
    /// want a `Copy` handle instead of cloning the `Arc`.
    pub fn bitmap(&self) -> u64 {
        self.0.bitmap
    }
}

impl PartialEq for PositionCalculus {
    fn eq(&self, other: &PositionCalculus) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for PositionCalculus {}

impl std::hash::Hash for PositionCalculus {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_has_every_position() {
        let pc = PositionCalculus::full(3);
        assert_eq!(pc.subkey_length(), 3);
        assert_eq!(pc.subkey_to_key(), &[0, 1, 2]);
    }

    #[test]
    fn use_pos_removes_exactly_one_position() {
        let pc = PositionCalculus::full(3);
        let next = pc.use_pos(1);
        assert_eq!(next.subkey_length(), 2);
        assert_eq!(next.subkey_to_key(), &[0, 2]);
    }

    #[test]
    fn tokens_are_flyweight() {
        let a = PositionCalculus::full(4).use_pos(0).use_pos(2);
        let b = PositionCalculus::full(4).use_pos(2).use_pos(0);
        assert_eq!(a, b);
        assert_eq!(a.subkey_to_key(), b.subkey_to_key());
    }

    #[test]
    fn distinct_subsets_are_distinct_tokens() {
        let a = PositionCalculus::full(3).use_pos(0);
        let b = PositionCalculus::full(3).use_pos(1);
        assert_ne!(a, b);
    }

    #[test]
    fn key_and_subkey_pos_roundtrip() {
        let pc = PositionCalculus::full(4).use_pos(1);
        // remaining positions are [0, 2, 3]
        for (i, &p) in pc.subkey_to_key().iter().enumerate() {
            assert_eq!(pc.key_to_subkey_pos(p), i);
            assert_eq!(pc.subkey_to_key_pos(i), p);
        }
    }
}
