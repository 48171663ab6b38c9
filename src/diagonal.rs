/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Enumerating the key parts that occur simultaneously at a chosen set of
//! positions of one hypertrie, together with the residual sub-trie (or
//! boolean) at each one. [`crate::join::Join`] drives several of these in
//! lockstep to do a leapfrog intersection.

use archery::{SharedPointer, SharedPointerKind};

use crate::hypertrie::Hypertrie;
use crate::pos_calc::{Pos, PositionCalculus};
use crate::raw::{ChildRef, RawHypertrie, SliceOutcome};
use crate::KeyPart;

/// The residual left behind at the current key part of a [`DiagonalView`].
pub enum DiagonalValue<P: SharedPointerKind> {
    /// The diagonal spans every position; this is the membership result.
    Bool(bool),
    /// The diagonal spans a strict subset of positions; the remaining
    /// sub-trie.
    Trie(Hypertrie<P>),
}

/// A diagonal over positions `D` of one hypertrie: the ascending sequence of
/// key parts `x` such that every position in `D` can simultaneously take the
/// value `x`, each paired with the sub-trie (or boolean) left over.
///
/// Scans the position in `D` with the smallest fan-out at construction time,
/// validating each candidate key part against the others via
/// [`RawHypertrie::slice`].
pub struct DiagonalView<P: SharedPointerKind> {
    root: ChildRef<P>,
    token: PositionCalculus,
    positions: Vec<Pos>,
    scan_pos: Pos,
    lo: KeyPart,
    hi: KeyPart,
    current: Option<KeyPart>,
    current_outcome: Option<SliceOutcome<P>>,
}

impl<P: SharedPointerKind> DiagonalView<P> {
    pub(crate) fn new(root: ChildRef<P>, depth: u8, positions: &[Pos]) -> Self {
        debug_assert!(!positions.is_empty(), "diagonal positions must not be empty");
        debug_assert!(positions.iter().all(|&p| p < depth), "diagonal position out of range");

        let mut positions = positions.to_vec();
        positions.sort_unstable();
        positions.dedup();

        let scan_pos = *positions
            .iter()
            .min_by_key(|&&p| (root.edge_len(p as usize), p))
            .expect("positions is non-empty");

        let mut view = DiagonalView {
            root,
            token: PositionCalculus::full(depth),
            positions,
            scan_pos,
            lo: 1,
            hi: KeyPart::MAX,
            current: None,
            current_outcome: None,
        };
        view.seek_from(view.lo);
        view
    }

    /// Key part the view currently sits on, if not exhausted.
    pub fn current_key_part(&self) -> Option<KeyPart> {
        self.current
    }

    /// Residual at the current key part.
    pub fn current_value(&self) -> Option<DiagonalValue<P>> {
        self.current_outcome.as_ref().map(|o| to_diagonal_value(o))
    }

    /// Residual at an arbitrary key part `x`, whether or not it is current.
    pub fn value_of(&self, x: KeyPart) -> Option<DiagonalValue<P>> {
        let outcome = self.outcome_for(x);
        if is_valid(&outcome) {
            Some(to_diagonal_value(&outcome))
        } else {
            None
        }
    }

    /// True iff `x` is a valid diagonal key part.
    pub fn contains(&self, x: KeyPart) -> bool {
        is_valid(&self.outcome_for(x))
    }

    /// True iff the view has no (more) valid key parts.
    pub fn empty(&self) -> bool {
        self.current.is_none()
    }

    /// Upper bound on the number of remaining valid key parts: the count of
    /// scan-position candidates within the current range. May over-count,
    /// since some scan candidates can fail validation at the other
    /// positions.
    pub fn size(&self) -> usize {
        self.scan_candidates_in_range().count()
    }

    /// Smallest candidate in the (possibly range-restricted) scan position,
    /// ignoring cross-position validity. Used by [`crate::join`] to compute
    /// the global intersection range before scanning.
    pub fn min(&self) -> Option<KeyPart> {
        self.scan_candidates_in_range().next()
    }

    /// Largest candidate in the (possibly range-restricted) scan position.
    pub fn max(&self) -> Option<KeyPart> {
        self.scan_candidates_in_range().last()
    }

    /// Advances past the current key part to the next valid one. Returns
    /// `true` if one was found.
    pub fn advance(&mut self) -> bool {
        match self.current {
            None => false,
            Some(x) => {
                self.seek_from(x.saturating_add(1));
                self.current.is_some()
            }
        }
    }

    /// If `x` is valid, positions the view there and returns `true`.
    /// Otherwise advances the view to the smallest valid key part `>= x`
    /// (or exhausts it) and returns `false`. This is the leapfrog-join
    /// primitive: a follower either confirms the leader's candidate or
    /// reports its own next candidate.
    pub fn contains_and_update_min(&mut self, x: KeyPart) -> bool {
        if self.contains(x) {
            self.current = Some(x);
            self.current_outcome = Some(self.outcome_for(x));
            true
        } else {
            self.seek_from(x);
            false
        }
    }

    /// Advances the view to the smallest valid key part `>= x` and returns
    /// it.
    pub fn set_min_geq(&mut self, x: KeyPart) -> Option<KeyPart> {
        self.seek_from(x);
        self.current
    }

    /// Restricts the scan range to `[lo, hi]` inclusive and re-seeks if the
    /// current position fell outside it. Used by [`crate::join::minimize_range`]
    /// to shrink every operand's scan window to the overlap before leapfrog
    /// begins.
    pub(crate) fn restrict_range(&mut self, lo: KeyPart, hi: KeyPart) {
        self.lo = lo;
        self.hi = hi;
        let start = self.current.map_or(lo, |c| c.max(lo));
        self.seek_from(start);
    }

    fn seek_from(&mut self, mut x: KeyPart) {
        loop {
            if x > self.hi {
                self.current = None;
                self.current_outcome = None;
                return;
            }
            let candidate = match self.scan_min_geq(x) {
                Some(c) if c <= self.hi => c,
                _ => {
                    self.current = None;
                    self.current_outcome = None;
                    return;
                }
            };
            let outcome = self.outcome_for(candidate);
            if is_valid(&outcome) {
                self.current = Some(candidate);
                self.current_outcome = Some(outcome);
                return;
            }
            x = candidate.saturating_add(1);
        }
    }

    fn outcome_for(&self, x: KeyPart) -> SliceOutcome<P> {
        let assignment: Vec<(Pos, KeyPart)> = self.positions.iter().map(|&p| (p, x)).collect();
        RawHypertrie::slice(&self.root, &assignment, &self.token)
    }

    fn scan_min_geq(&self, x: KeyPart) -> Option<KeyPart> {
        match &*self.root {
            RawHypertrie::Leaf(set) => set.min_geq(x),
            RawHypertrie::Branch { edges, .. } => edges[self.scan_pos as usize].min_geq(x),
        }
    }

    fn scan_candidates_in_range(&self) -> impl Iterator<Item = KeyPart> + '_ {
        let (lo, hi) = (self.lo, self.hi);
        let iter: Box<dyn Iterator<Item = KeyPart>> = match &*self.root {
            RawHypertrie::Leaf(set) => Box::new(set.iter()),
            RawHypertrie::Branch { edges, .. } => Box::new(edges[self.scan_pos as usize].keys()),
        };
        iter.filter(move |&k| k >= lo && k <= hi)
    }
}

fn is_valid<P: SharedPointerKind>(outcome: &SliceOutcome<P>) -> bool {
    match outcome {
        SliceOutcome::Empty => false,
        SliceOutcome::Boolean(b) => *b,
        SliceOutcome::SubTrie(_) => true,
    }
}

fn to_diagonal_value<P: SharedPointerKind>(outcome: &SliceOutcome<P>) -> DiagonalValue<P> {
    match outcome {
        SliceOutcome::Boolean(b) => DiagonalValue::Bool(*b),
        SliceOutcome::SubTrie(sub) => {
            let depth = sub.depth();
            DiagonalValue::Trie(Hypertrie::from_raw(SharedPointer::clone(sub), depth))
        }
        SliceOutcome::Empty => unreachable!("is_valid filters out Empty before this is called"),
    }
}
