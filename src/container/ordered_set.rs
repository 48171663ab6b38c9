/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use smallvec::SmallVec;

const INLINE: usize = 4;

/// A sorted set of key parts: the depth-1 leaf representation of a
/// hypertrie, where the "value" dimension degenerates away and only
/// membership matters.
#[derive(Debug, Clone, Default)]
pub struct OrderedSet<K> {
    items: SmallVec<[K; INLINE]>,
}

impl<K: Ord + Copy> OrderedSet<K> {
    /// An empty set.
    pub fn new() -> Self {
        OrderedSet { items: SmallVec::new() }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True iff the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn search(&self, key: K) -> Result<usize, usize> {
        self.items.binary_search(&key)
    }

    /// Membership test. A miss is a normal outcome.
    pub fn contains(&self, key: K) -> bool {
        self.search(key).is_ok()
    }

    /// Inserts `key`. Returns `true` if it was newly inserted.
    pub fn insert(&mut self, key: K) -> bool {
        match self.search(key) {
            Ok(_) => false,
            Err(i) => {
                self.items.insert(i, key);
                true
            }
        }
    }

    /// Removes `key`. Returns `true` if it was present.
    pub fn remove(&mut self, key: K) -> bool {
        match self.search(key) {
            Ok(i) => {
                self.items.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Smallest element, if any. O(1).
    pub fn min(&self) -> Option<K> {
        self.items.first().copied()
    }

    /// Largest element, if any. O(1).
    pub fn max(&self) -> Option<K> {
        self.items.last().copied()
    }

    /// Smallest element `>= key`, if any.
    pub fn min_geq(&self, key: K) -> Option<K> {
        match self.search(key) {
            Ok(i) => self.items.get(i).copied(),
            Err(i) => self.items.get(i).copied(),
        }
    }

    /// Ordered iteration.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.items.iter().copied()
    }
}
