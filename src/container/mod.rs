/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Ordered map/set primitives used as the per-position edge maps and leaf
//! sets of a hypertrie. Sorted-vector representations: cache-friendly for
//! the small fanouts typical of sparse tensors, with O(1) `min`/`max` and
//! O(log n) lookup/`lower_bound`.

mod ordered_map;
mod ordered_set;

pub use ordered_map::OrderedMap;
pub use ordered_set::OrderedSet;
