/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The depth-erased façade: [`Hypertrie`] and its `Arc`-backed twin
//! [`HypertrieSync`]. Dispatches to [`crate::raw::RawHypertrie`] for
//! everything and is otherwise just bookkeeping (depth, error mapping,
//! precondition checks).

use std::fmt;

use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

use crate::diagonal::DiagonalView;
use crate::error::HypertrieError;
use crate::pos_calc::{Pos, PositionCalculus};
use crate::raw::{ChildRef, RawHypertrie, SliceOutcome};
use crate::KeyPart;

/// Largest depth (arity) this crate supports. There is no algorithmic limit;
/// this just guards against accidental misuse (e.g. passing a byte count
/// instead of an arity). Five comfortably covers RDF triples and quads.
pub const MAX_DEPTH: u8 = 5;

/// A sparse boolean hypertrie: a persistent set of fixed-arity keys with
/// `Rc`-based structural sharing.
///
/// Cloning a [`Hypertrie`] is O(1); mutating a clone copy-on-writes only the
/// path actually touched, leaving every other clone's view unchanged.
#[derive(Clone)]
pub struct Hypertrie<P: SharedPointerKind = RcK> {
    root: ChildRef<P>,
    depth: u8,
}

/// [`Hypertrie`] parameterized for cross-thread sharing (`Arc`-backed
/// instead of `Rc`-backed).
pub type HypertrieSync = Hypertrie<ArcK>;

impl<P: SharedPointerKind> Hypertrie<P> {
    /// An empty hypertrie of the given depth (arity). Every key later
    /// inserted must have exactly this many key parts.
    pub fn new(depth: u8) -> Result<Self, HypertrieError> {
        if depth == 0 || depth > MAX_DEPTH {
            return Err(HypertrieError::UnsupportedDepth { requested: depth });
        }
        Ok(Hypertrie { root: SharedPointer::new(RawHypertrie::empty(depth)), depth })
    }

    /// The number of positions every key has.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Number of distinct keys present.
    pub fn size(&self) -> u64 {
        self.root.size()
    }

    /// True iff no keys are present.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Full-key membership test.
    ///
    /// `key.len()` must equal [`Hypertrie::depth`] and every key part must be
    /// nonzero (`0` is reserved); violating either is a precondition bug and
    /// panics in debug builds.
    pub fn contains(&self, key: &[KeyPart]) -> bool {
        self.check_key(key);
        self.root.get(key)
    }

    /// Inserts `key`. Returns `true` if it was newly inserted, `false` if it
    /// was already present.
    pub fn set(&mut self, key: &[KeyPart]) -> bool {
        self.check_key(key);
        RawHypertrie::insert(&mut self.root, key)
    }

    /// Removes `key`. Returns `true` if it was previously present.
    pub fn remove(&mut self, key: &[KeyPart]) -> bool {
        self.check_key(key);
        RawHypertrie::remove(&mut self.root, key)
    }

    /// Slices at the given sparse `(position, key_part)` assignment.
    ///
    /// - If `assignment` names every position, the result collapses to
    ///   [`Slice::Bool`] (plain membership).
    /// - If any position in `assignment` has no key part matching the given
    ///   value, the result is [`Slice::Empty`].
    /// - Otherwise the result is the lower-depth sub-trie over the remaining
    ///   positions, as [`Slice::Trie`].
    ///
    /// Positions must be distinct and less than [`Hypertrie::depth`]; this is
    /// a precondition violation otherwise (panics in debug builds).
    pub fn slice(&self, assignment: &[(Pos, KeyPart)]) -> Slice<P> {
        debug_assert!(!assignment.is_empty(), "slice assignment must not be empty");
        debug_assert!(assignment.iter().all(|&(p, _)| p < self.depth), "slice position out of range");
        debug_assert!(distinct_positions(assignment), "slice positions must be distinct");

        let token = PositionCalculus::full(self.depth);
        match RawHypertrie::slice(&self.root, assignment, &token) {
            SliceOutcome::Empty => Slice::Empty,
            SliceOutcome::Boolean(b) => Slice::Bool(b),
            SliceOutcome::SubTrie(sub) => {
                let depth = sub.depth();
                Slice::Trie(Hypertrie { root: sub, depth })
            }
        }
    }

    /// A diagonal view over `positions`: the key parts occurring
    /// simultaneously at every named position, each paired with its residual
    /// sub-trie (or boolean, when `positions` spans the full depth).
    ///
    /// Fails with [`HypertrieError::UnsupportedDiagonalArity`] if `positions`
    /// is empty or longer than [`Hypertrie::depth`].
    pub fn diagonal(&self, positions: &[Pos]) -> Result<DiagonalView<P>, HypertrieError> {
        if positions.is_empty() || positions.len() > self.depth as usize {
            return Err(HypertrieError::UnsupportedDiagonalArity {
                arity: positions.len(),
                depth: self.depth,
            });
        }
        Ok(DiagonalView::new(SharedPointer::clone(&self.root), self.depth, positions))
    }

    /// True iff `self` and `other` share the very same underlying sub-trie
    /// allocation (reference equality, not content equality — see
    /// [`PartialEq`] for the latter). Lets callers confirm two handles
    /// reached via different paths were not needlessly duplicated.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        SharedPointer::ptr_eq(&self.root, &other.root)
    }

    fn check_key(&self, key: &[KeyPart]) {
        debug_assert_eq!(key.len(), self.depth as usize, "key arity must match hypertrie depth");
        debug_assert!(key.iter().all(|&k| k != 0), "key part 0 is reserved");
    }

    pub(crate) fn raw(&self) -> &ChildRef<P> {
        &self.root
    }

    /// Wraps an already-built raw node as a façade value. Used by
    /// [`crate::diagonal`] and [`crate::raw::RawHypertrie::slice`] outcomes,
    /// which already know the resulting depth.
    pub(crate) fn from_raw(root: ChildRef<P>, depth: u8) -> Self {
        Hypertrie { root, depth }
    }
}

fn distinct_positions(assignment: &[(Pos, KeyPart)]) -> bool {
    let mut seen: Vec<Pos> = assignment.iter().map(|&(p, _)| p).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len() == assignment.len()
}

/// Outcome of [`Hypertrie::slice`].
pub enum Slice<P: SharedPointerKind> {
    /// No key matches the assignment.
    Empty,
    /// The assignment named every position; this is the membership result.
    Bool(bool),
    /// The assignment named a strict subset of positions; this is the
    /// remaining sub-trie.
    Trie(Hypertrie<P>),
}

impl<P: SharedPointerKind> fmt::Debug for Hypertrie<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hypertrie").field("depth", &self.depth).field("size", &self.size()).finish()
    }
}

impl<P: SharedPointerKind> PartialEq for Hypertrie<P> {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth && raw_content_eq(&self.root, &other.root)
    }
}
impl<P: SharedPointerKind> Eq for Hypertrie<P> {}

fn raw_content_eq<P: SharedPointerKind>(a: &ChildRef<P>, b: &ChildRef<P>) -> bool {
    if SharedPointer::ptr_eq(a, b) {
        return true;
    }
    match (&**a, &**b) {
        (RawHypertrie::Leaf(sa), RawHypertrie::Leaf(sb)) => {
            sa.len() == sb.len() && sa.iter().zip(sb.iter()).all(|(x, y)| x == y)
        }
        (RawHypertrie::Branch { edges: ea, .. }, RawHypertrie::Branch { edges: eb, .. }) => {
            ea.len() == eb.len()
                && ea.iter().zip(eb.iter()).all(|(ma, mb)| {
                    ma.len() == mb.len()
                        && ma
                            .iter()
                            .zip(mb.iter())
                            .all(|((ka, va), (kb, vb))| ka == kb && raw_content_eq(va, vb))
                })
        }
        _ => false,
    }
}
