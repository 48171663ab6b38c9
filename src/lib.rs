/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! A sparse boolean hypertrie: a recursive, depth-parameterized associative
//! container that stores a set of fixed-arity integer keys and supports
//! worst-case-optimal multi-way joins over sparse tensors (equivalently,
//! conjunctive queries over RDF triples).
//!
//! The two operations that matter are **slicing** (fixing a subset of key
//! positions to obtain a lower-depth hypertrie or a boolean) and **diagonal
//! iteration** (enumerating the key parts that appear simultaneously at a
//! chosen set of positions, optionally across several hypertrie operands via
//! [`join`]).
//!
//! # Example
//!
//! ```
//! use hypertrie::Hypertrie;
//!
//! let mut t = Hypertrie::new(3).unwrap();
//! t.set(&[1, 2, 3]);
//! t.set(&[1, 2, 4]);
//! assert!(t.contains(&[1, 2, 3]));
//! assert_eq!(t.size(), 2);
//! ```

#![warn(missing_docs)]
#![cfg_attr(feature = "fatal-warnings", deny(warnings))]

pub mod container;
pub mod diagonal;
mod error;
pub mod hypertrie;
pub mod join;
pub mod pos_calc;
mod raw;
pub mod triple_store;

pub use crate::diagonal::{DiagonalValue, DiagonalView};
pub use crate::error::HypertrieError;
pub use crate::hypertrie::{Hypertrie, HypertrieSync, Slice, MAX_DEPTH};
pub use crate::join::{Join, Operand};
pub use crate::pos_calc::{Pos, PositionCalculus};

/// A key part: one coordinate of a key. Must be nonzero; `0` is reserved as
/// the absent/sentinel value.
pub type KeyPart = u64;
