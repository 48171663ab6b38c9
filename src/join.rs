/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Worst-case-optimal multi-way join over several hypertrie operands sharing
//! one join variable, via leapfrog intersection of their
//! [`crate::diagonal::DiagonalView`]s.
//!
//! [`Join`] handles exactly one join variable at a time; a query planner
//! chaining several variables across the resulting residual operands is out
//! of scope here.

use archery::SharedPointerKind;

use crate::diagonal::DiagonalView;
use crate::error::HypertrieError;
use crate::hypertrie::Hypertrie;
use crate::pos_calc::Pos;
use crate::KeyPart;

/// One operand of a join: either a hypertrie (some dimensions of which may
/// be bound to the join variable) or a plain boolean that carries through
/// every result row unchanged.
#[derive(Clone)]
pub enum Operand<P: SharedPointerKind> {
    /// A hypertrie operand.
    Trie(Hypertrie<P>),
    /// A scalar operand with no dimensions of its own.
    Scalar(bool),
}

enum Slot<P: SharedPointerKind> {
    /// Participates in the leapfrog intersection; indexes into `participating`.
    Diagonal(usize),
    /// Does not mention the join variable; carried through unchanged.
    Passthrough(Operand<P>),
}

/// Iterator over a leapfrog intersection of several hypertrie operands on
/// one shared join variable. Each item is `(key_part, residual_operands)`
/// with residuals in the same order the operands were given.
pub struct Join<P: SharedPointerKind> {
    participating: Vec<DiagonalView<P>>,
    slots: Vec<Slot<P>>,
    leader_idx: usize,
    exhausted: bool,
}

impl<P: SharedPointerKind> Join<P> {
    /// Builds a join over `operands`, where each operand is paired with the
    /// list of its own positions bound to the shared join variable (empty
    /// for an operand the variable doesn't touch).
    pub fn new(operands: Vec<(Operand<P>, Vec<Pos>)>) -> Result<Join<P>, HypertrieError> {
        let (mut participating, slots) = partition_operands(operands)?;

        if participating.is_empty() {
            return Ok(Join { participating, slots, leader_idx: 0, exhausted: true });
        }

        let exhausted = !minimize_range(&mut participating);
        let leader_idx = (0..participating.len())
            .min_by_key(|&i| participating[i].size())
            .expect("participating is non-empty");
        let exhausted = exhausted || participating[leader_idx].current_key_part().is_none();

        Ok(Join { participating, slots, leader_idx, exhausted })
    }

    fn build_row(&self, current: KeyPart) -> Vec<Operand<P>> {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Diagonal(i) => residual_of(&self.participating[*i])
                    .unwrap_or_else(|| panic!("diagonal at index {i} has no value for {current}")),
                Slot::Passthrough(op) => op.clone(),
            })
            .collect()
    }
}

fn residual_of<P: SharedPointerKind>(view: &DiagonalView<P>) -> Option<Operand<P>> {
    use crate::diagonal::DiagonalValue;
    view.current_value().map(|v| match v {
        DiagonalValue::Bool(b) => Operand::Scalar(b),
        DiagonalValue::Trie(t) => Operand::Trie(t),
    })
}

impl<P: SharedPointerKind> Iterator for Join<P> {
    type Item = (KeyPart, Vec<Operand<P>>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.participating.is_empty() {
            return None;
        }

        loop {
            let current = self.participating[self.leader_idx].current_key_part()?;

            let mut i = 0;
            let mut all_matched = true;
            while i < self.participating.len() {
                if i == self.leader_idx {
                    i += 1;
                    continue;
                }
                if self.participating[i].contains_and_update_min(current) {
                    i += 1;
                    continue;
                }
                // Follower moved past `current`; restart the sweep at its
                // new position (or stop if it's exhausted).
                let next_x = self.participating[i].current_key_part();
                match next_x {
                    None => {
                        self.exhausted = true;
                        return None;
                    }
                    Some(x) => {
                        if self.participating[self.leader_idx].set_min_geq(x).is_none() {
                            self.exhausted = true;
                            return None;
                        }
                    }
                }
                all_matched = false;
                break;
            }

            if all_matched {
                let row = self.build_row(current);
                self.participating[self.leader_idx].advance();
                return Some((current, row));
            }
        }
    }
}

/// Separates `operands` into the [`DiagonalView`]s that participate in the
/// leapfrog intersection (hypertrie operands with at least one position
/// bound to the join variable) and the slots that pass straight through
/// (scalars, and trie operands the variable doesn't touch at all).
fn partition_operands<P: SharedPointerKind>(
    operands: Vec<(Operand<P>, Vec<Pos>)>,
) -> Result<(Vec<DiagonalView<P>>, Vec<Slot<P>>), HypertrieError> {
    let mut participating = Vec::new();
    let mut slots = Vec::with_capacity(operands.len());
    for (operand, positions) in operands {
        if let Operand::Trie(ref t) = operand {
            if !positions.is_empty() {
                let view = t.diagonal(&positions)?;
                slots.push(Slot::Diagonal(participating.len()));
                participating.push(view);
                continue;
            }
        }
        slots.push(Slot::Passthrough(operand));
    }
    Ok((participating, slots))
}

/// Shrinks every view's scan range to the overlap `[max(mins), min(maxs)]`
/// before the leapfrog sweep begins. Returns `false` if the intersection is
/// provably empty (some view has no candidates, or the ranges don't
/// overlap).
fn minimize_range<P: SharedPointerKind>(views: &mut [DiagonalView<P>]) -> bool {
    let mut lo = KeyPart::MIN;
    for view in views.iter() {
        match view.min() {
            Some(m) => lo = lo.max(m),
            None => return false,
        }
    }
    let mut hi = KeyPart::MAX;
    for view in views.iter() {
        match view.max() {
            Some(m) => hi = hi.min(m),
            None => return false,
        }
    }
    if lo > hi {
        return false;
    }
    for view in views.iter_mut() {
        view.restrict_range(lo, hi);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use archery::RcK;

    fn trie(keys: &[[u64; 2]]) -> Hypertrie<RcK> {
        let mut t = Hypertrie::new(2).unwrap();
        for k in keys {
            t.set(k);
        }
        t
    }

    #[test]
    fn two_operand_join_intersects_on_shared_variable() {
        // a(x,y): (1,10) (2,20) (3,30)
        // b(y,z): (10,100) (20,200) (40,400)
        // join on y: shared values {10, 20}
        let a = trie(&[[1, 10], [2, 20], [3, 30]]);
        let b = trie(&[[10, 100], [20, 200], [40, 400]]);

        let join = Join::new(vec![
            (Operand::Trie(a), vec![1]),
            (Operand::Trie(b), vec![0]),
        ])
        .unwrap();

        let mut ys: Vec<KeyPart> = join.map(|(y, _)| y).collect();
        ys.sort_unstable();
        assert_eq!(ys, vec![10, 20]);
    }

    #[test]
    fn disjoint_operands_yield_empty_join() {
        let a = trie(&[[1, 10]]);
        let b = trie(&[[99, 100]]);
        let join = Join::new(vec![(Operand::Trie(a), vec![1]), (Operand::Trie(b), vec![0])]).unwrap();
        assert_eq!(join.count(), 0);
    }

    #[test]
    fn passthrough_operand_is_unaffected() {
        let a = trie(&[[1, 10], [2, 20]]);
        let b = trie(&[[10, 100]]);
        let join = Join::new(vec![
            (Operand::Trie(a), vec![1]),
            (Operand::Trie(b), vec![0]),
            (Operand::Scalar(true), vec![]),
        ])
        .unwrap();
        let rows: Vec<_> = join.collect();
        assert_eq!(rows.len(), 1);
        let (y, residuals) = &rows[0];
        assert_eq!(*y, 10);
        match &residuals[2] {
            Operand::Scalar(true) => {}
            _ => panic!("scalar operand must pass through unchanged"),
        }
    }
}
