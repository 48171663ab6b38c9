/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use smallvec::SmallVec;

/// Most hypertrie edge maps stay small (sparse tensors); inline a handful of
/// entries before spilling to the heap.
const INLINE: usize = 4;

/// A map from key parts to values, backed by two parallel sorted vectors
/// (keys, values) with binary search. Well suited to the small fanouts
/// typical of sparse hypertrie edges, and gives O(1) `min`/`max` for the
/// diagonal view's scan-range pruning.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    keys: SmallVec<[K; INLINE]>,
    values: SmallVec<[V; INLINE]>,
}

impl<K: Ord + Copy, V> OrderedMap<K, V> {
    /// An empty map.
    pub fn new() -> Self {
        OrderedMap { keys: SmallVec::new(), values: SmallVec::new() }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True iff there are no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn search(&self, key: K) -> Result<usize, usize> {
        self.keys.binary_search(&key)
    }

    /// Looks up `key`. A miss is a normal "not present" outcome, not an
    /// error.
    pub fn get(&self, key: K) -> Option<&V> {
        self.search(key).ok().map(|i| &self.values[i])
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.search(key).ok().map(move |i| &mut self.values[i])
    }

    /// True iff `key` has an entry.
    pub fn contains_key(&self, key: K) -> bool {
        self.search(key).is_ok()
    }

    /// Inserts `value` at `key`, replacing any existing value. Returns the
    /// previous value, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(key) {
            Ok(i) => Some(std::mem::replace(&mut self.values[i], value)),
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, value);
                None
            }
        }
    }

    /// Removes the entry for `key`, if any, returning its value.
    pub fn remove(&mut self, key: K) -> Option<V> {
        match self.search(key) {
            Ok(i) => {
                self.keys.remove(i);
                Some(self.values.remove(i))
            }
            Err(_) => None,
        }
    }

    /// The smallest key, if any. O(1).
    pub fn min(&self) -> Option<K> {
        self.keys.first().copied()
    }

    /// The largest key, if any. O(1).
    pub fn max(&self) -> Option<K> {
        self.keys.last().copied()
    }

    /// Index of the first key `>= key` (a `lower_bound`/`partition_point`).
    pub fn lower_bound(&self, key: K) -> usize {
        match self.search(key) {
            Ok(i) => i,
            Err(i) => i,
        }
    }

    /// The smallest key `>= key`, if any.
    pub fn min_geq(&self, key: K) -> Option<K> {
        let i = self.lower_bound(key);
        self.keys.get(i).copied()
    }

    /// Key by internal sorted index. Out-of-range is a precondition
    /// violation and panics; callers are expected to stay within `len()`.
    pub fn key_at(&self, index: usize) -> K {
        self.keys[index]
    }

    /// Value by internal sorted index.
    pub fn value_at(&self, index: usize) -> &V {
        &self.values[index]
    }

    /// Ordered iteration over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.keys.iter().copied().zip(self.values.iter())
    }

    /// Ordered iteration over keys only.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.keys.iter().copied()
    }

    /// Ordered iteration restricted to `[lo, hi]` inclusive, used by the
    /// diagonal/join machinery to scan only the overlapping key-part range
    /// across operands.
    pub fn range(&self, lo: K, hi: K) -> impl Iterator<Item = (K, &V)> {
        let start = self.lower_bound(lo);
        let end = if hi >= lo { self.lower_bound_after(hi) } else { start };
        self.keys[start..end].iter().copied().zip(self.values[start..end].iter())
    }

    fn lower_bound_after(&self, key: K) -> usize {
        match self.search(key) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

impl<K: Ord + Copy, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_sorted_order() {
        let mut m = OrderedMap::new();
        m.insert(5, "five");
        m.insert(1, "one");
        m.insert(3, "three");
        assert_eq!(m.keys().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(m.min(), Some(1));
        assert_eq!(m.max(), Some(5));
    }

    #[test]
    fn insert_replaces_existing() {
        let mut m = OrderedMap::new();
        m.insert(1, "one");
        let prev = m.insert(1, "uno");
        assert_eq!(prev, Some("one"));
        assert_eq!(m.get(1), Some(&"uno"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn remove_absent_is_normal_miss() {
        let mut m: OrderedMap<u64, u64> = OrderedMap::new();
        assert_eq!(m.remove(42), None);
    }

    #[test]
    fn min_geq_finds_next_key() {
        let mut m = OrderedMap::new();
        for k in [2u64, 5, 9] {
            m.insert(k, ());
        }
        assert_eq!(m.min_geq(0), Some(2));
        assert_eq!(m.min_geq(3), Some(5));
        assert_eq!(m.min_geq(9), Some(9));
        assert_eq!(m.min_geq(10), None);
    }

    #[test]
    fn range_is_inclusive_both_ends() {
        let mut m = OrderedMap::new();
        for k in [1u64, 3, 5, 7, 9] {
            m.insert(k, k * 10);
        }
        let got: Vec<_> = m.range(3, 7).map(|(k, v)| (k, *v)).collect();
        assert_eq!(got, vec![(3, 30), (5, 50), (7, 70)]);
    }
}
