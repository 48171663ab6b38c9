/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Typed errors returned by the depth-erased façade for shapes it cannot
//! support. Everything else (precondition violations such as a zero key
//! part, out-of-range slice positions, or access on a done iterator) is a
//! programmer bug and panics instead.

use thiserror::Error;

use crate::hypertrie::MAX_DEPTH;

/// Errors the [`crate::Hypertrie`] façade returns for unsupported shapes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HypertrieError {
    /// Requested depth is outside `1..=MAX_DEPTH`.
    #[error("depth {requested} is unsupported: must be in 1..={MAX_DEPTH}")]
    UnsupportedDepth {
        /// The depth that was requested.
        requested: u8,
    },

    /// A diagonal's position count exceeds the hypertrie's depth, or is zero.
    #[error("diagonal arity {arity} is unsupported for depth {depth}: must be in 1..={depth}")]
    UnsupportedDiagonalArity {
        /// Number of positions requested for the diagonal.
        arity: usize,
        /// Depth of the hypertrie the diagonal was requested on.
        depth: u8,
    },
}
