/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The recursive hypertrie proper: insert, lookup, slice, remove, size.
//!
//! Depth is a runtime property of the structure rather than a const generic
//! parameter, since recursing into a `const D: usize` sub-trie would need
//! unstable const-generic arithmetic. A [`RawHypertrie`] is either a `Leaf`
//! (depth 1: just the set of key parts present) or a `Branch` (depth > 1:
//! one [`OrderedMap`] per remaining position, all indexing the same
//! underlying set of children, grouped differently).

use std::collections::HashMap;

use archery::{SharedPointer, SharedPointerKind};

use crate::container::{OrderedMap, OrderedSet};
use crate::pos_calc::{Pos, PositionCalculus};
use crate::KeyPart;

pub(crate) type ChildRef<P> = SharedPointer<RawHypertrie<P>, P>;

/// The recursive hypertrie node. See module docs for the depth-1/depth>1
/// split.
#[derive(Debug)]
pub(crate) enum RawHypertrie<P: SharedPointerKind> {
    Leaf(OrderedSet<KeyPart>),
    Branch { edges: Vec<OrderedMap<KeyPart, ChildRef<P>>>, size: u64 },
}

impl<P: SharedPointerKind> Clone for RawHypertrie<P> {
    fn clone(&self) -> Self {
        match self {
            RawHypertrie::Leaf(set) => RawHypertrie::Leaf(set.clone()),
            RawHypertrie::Branch { edges, size } => {
                RawHypertrie::Branch { edges: edges.clone(), size: *size }
            }
        }
    }
}

impl<P: SharedPointerKind> RawHypertrie<P> {
    /// A fresh, empty node at the given depth.
    pub(crate) fn empty(depth: u8) -> RawHypertrie<P> {
        if depth == 1 {
            RawHypertrie::Leaf(OrderedSet::new())
        } else {
            RawHypertrie::Branch { edges: vec![OrderedMap::new(); depth as usize], size: 0 }
        }
    }

    /// Number of distinct keys present.
    pub(crate) fn size(&self) -> u64 {
        match self {
            RawHypertrie::Leaf(set) => set.len() as u64,
            RawHypertrie::Branch { size, .. } => *size,
        }
    }

    /// True iff no keys are present.
    pub(crate) fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Depth: 1 for a leaf, `edges.len()` for a branch.
    pub(crate) fn depth(&self) -> u8 {
        match self {
            RawHypertrie::Leaf(_) => 1,
            RawHypertrie::Branch { edges, .. } => edges.len() as u8,
        }
    }

    /// Number of distinct key parts occurring at local position `p`.
    pub(crate) fn edge_len(&self, p: usize) -> usize {
        match self {
            RawHypertrie::Leaf(set) => {
                debug_assert_eq!(p, 0);
                set.len()
            }
            RawHypertrie::Branch { edges, .. } => edges[p].len(),
        }
    }

    /// Edge map at local position `p` (panics off a leaf; callers only ask
    /// for edges on branches).
    pub(crate) fn edges_at(&self, p: usize) -> &OrderedMap<KeyPart, ChildRef<P>> {
        match self {
            RawHypertrie::Leaf(_) => panic!("leaf hypertrie has no edges"),
            RawHypertrie::Branch { edges, .. } => &edges[p],
        }
    }

    /// Full-key membership test. Walks local position 0 of successive
    /// sub-tries, consuming one original position per level — this only
    /// needs the original key slice, not a [`PositionCalculus`], because a
    /// full-key lookup always keeps the remaining original positions in
    /// their natural ascending order.
    pub(crate) fn get(&self, key: &[KeyPart]) -> bool {
        match self {
            RawHypertrie::Leaf(set) => set.contains(key[0]),
            RawHypertrie::Branch { edges, .. } => match edges[0].get(key[0]) {
                Some(child) => child.get(&key[1..]),
                None => false,
            },
        }
    }

    /// Inserts `key`, maintaining the structural-sharing invariant. Returns
    /// `true` if the key was newly inserted.
    pub(crate) fn insert(this: &mut ChildRef<P>, key: &[KeyPart]) -> bool
    where
        RawHypertrie<P>: Clone,
    {
        if this.get(key) {
            return false;
        }
        let depth = this.depth();
        let token = PositionCalculus::full(depth);
        let mut finished: HashMap<PositionCalculus, ChildRef<P>> = HashMap::new();
        insert_rec(SharedPointer::make_mut(this), key, &token, &mut finished);
        true
    }

    /// Removes `key`. Returns `true` if it was previously present.
    pub(crate) fn remove(this: &mut ChildRef<P>, key: &[KeyPart]) -> bool
    where
        RawHypertrie<P>: Clone,
    {
        if !this.get(key) {
            return false;
        }
        let depth = this.depth();
        let token = PositionCalculus::full(depth);
        let mut finished: HashMap<PositionCalculus, ChildRef<P>> = HashMap::new();
        remove_rec(SharedPointer::make_mut(this), key, &token, &mut finished);
        true
    }

    /// Slices at the positions named in `assignment`, recursively, diving
    /// at the cardinality-minimizing position first.
    pub(crate) fn slice(
        this: &ChildRef<P>,
        assignment: &[(Pos, KeyPart)],
        token: &PositionCalculus,
    ) -> SliceOutcome<P> {
        if assignment.is_empty() {
            return SliceOutcome::SubTrie(SharedPointer::clone(this));
        }
        match &**this {
            RawHypertrie::Leaf(set) => {
                debug_assert_eq!(assignment.len(), 1, "leaf has exactly one remaining position");
                let (p, kp) = assignment[0];
                debug_assert_eq!(token.subkey_to_key_pos(0), p);
                SliceOutcome::Boolean(set.contains(kp))
            }
            RawHypertrie::Branch { edges, .. } => {
                let (chosen_idx, &(p, kp)) = assignment
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, &(p, _))| {
                        let local = token.key_to_subkey_pos(p);
                        (edges[local].len(), p)
                    })
                    .expect("assignment is non-empty");

                let local = token.key_to_subkey_pos(p);
                match edges[local].get(kp) {
                    None => SliceOutcome::Empty,
                    Some(child) => {
                        let next_token = token.use_pos(p);
                        let remaining: Vec<(Pos, KeyPart)> = assignment
                            .iter()
                            .enumerate()
                            .filter(|&(i, _)| i != chosen_idx)
                            .map(|(_, &pair)| pair)
                            .collect();
                        if remaining.is_empty() {
                            SliceOutcome::SubTrie(SharedPointer::clone(child))
                        } else {
                            RawHypertrie::slice(child, &remaining, &next_token)
                        }
                    }
                }
            }
        }
    }
}

/// Result of [`RawHypertrie::slice`]: either no path exists, a boolean (the
/// slice consumed every remaining position), or a lower-depth sub-trie.
pub(crate) enum SliceOutcome<P: SharedPointerKind> {
    Empty,
    Boolean(bool),
    SubTrie(ChildRef<P>),
}

fn insert_rec<P: SharedPointerKind>(
    node: &mut RawHypertrie<P>,
    key: &[KeyPart],
    token: &PositionCalculus,
    finished: &mut HashMap<PositionCalculus, ChildRef<P>>,
) where
    RawHypertrie<P>: Clone,
{
    match node {
        RawHypertrie::Leaf(set) => {
            let p = token.subkey_to_key_pos(0);
            set.insert(key[p as usize]);
        }
        RawHypertrie::Branch { edges, size } => {
            *size += 1;
            for &p in token.subkey_to_key() {
                let kp = key[p as usize];
                let local = token.key_to_subkey_pos(p);
                let next_token = token.use_pos(p);

                if let Some(shared) = finished.get(&next_token) {
                    // Another position already finished processing this
                    // exact remaining-position subset during this insert;
                    // share its (already up to date) result instead of
                    // `make_mut`-cloning whatever this edge happened to
                    // point to before, which would diverge into a second,
                    // content-equal-but-not-reference-equal allocation.
                    edges[local].insert(kp, SharedPointer::clone(shared));
                } else if edges[local].contains_key(kp) {
                    let child = edges[local].get_mut(kp).expect("just checked contains_key");
                    let child_mut = SharedPointer::make_mut(child);
                    insert_rec(child_mut, key, &next_token, finished);
                    finished.insert(next_token, SharedPointer::clone(child));
                } else {
                    let mut fresh = RawHypertrie::empty(next_token.subkey_length() as u8);
                    insert_rec(&mut fresh, key, &next_token, finished);
                    let handle = SharedPointer::new(fresh);
                    finished.insert(next_token, SharedPointer::clone(&handle));
                    edges[local].insert(kp, handle);
                }
            }
        }
    }
}

fn remove_rec<P: SharedPointerKind>(
    node: &mut RawHypertrie<P>,
    key: &[KeyPart],
    token: &PositionCalculus,
    finished: &mut HashMap<PositionCalculus, ChildRef<P>>,
) where
    RawHypertrie<P>: Clone,
{
    match node {
        RawHypertrie::Leaf(set) => {
            let p = token.subkey_to_key_pos(0);
            set.remove(key[p as usize]);
        }
        RawHypertrie::Branch { edges, size } => {
            *size -= 1;
            for &p in token.subkey_to_key() {
                let kp = key[p as usize];
                let local = token.key_to_subkey_pos(p);
                let next_token = token.use_pos(p);

                if let Some(shared) = finished.get(&next_token) {
                    // Another position already finished processing this
                    // exact remaining-position subset during this removal;
                    // mirror its result instead of independently
                    // `make_mut`-cloning and mutating this edge's own copy,
                    // which would leave two content-equal but distinct
                    // allocations behind.
                    if shared.is_empty() {
                        edges[local].remove(kp);
                    } else {
                        edges[local].insert(kp, SharedPointer::clone(shared));
                    }
                    continue;
                }

                if let Some(child) = edges[local].get_mut(kp) {
                    let child_mut = SharedPointer::make_mut(child);
                    remove_rec(child_mut, key, &next_token, finished);
                    let now_empty = child_mut.is_empty();
                    finished.insert(next_token, SharedPointer::clone(child));
                    if now_empty {
                        edges[local].remove(kp);
                    }
                }
            }
        }
    }
}
