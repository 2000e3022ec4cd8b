// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by fallible scene operations.

use thiserror::Error;

use crate::node::NodeId;

/// Misuse of an index, range, or membership operation.
///
/// Stale handles are not reported here; they panic (see
/// [`Scene`](crate::Scene)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A child index was outside the parent's child list.
    #[error("child index {index} is out of bounds (child count {len})")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The number of children at the time of the call.
        len: usize,
    },
    /// A removal range did not fit the child list.
    #[error("range {begin}..{end} does not fit the child list (child count {len})")]
    InvalidRange {
        /// Inclusive start.
        begin: usize,
        /// Exclusive end.
        end: usize,
        /// The number of children at the time of the call.
        len: usize,
    },
    /// The node is not a direct child of the given parent.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// The queried parent.
        parent: NodeId,
        /// The node that was expected among its children.
        child: NodeId,
    },
    /// The insertion would make a node its own ancestor.
    #[error("adding {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// The would-be parent.
        parent: NodeId,
        /// The node being inserted.
        child: NodeId,
    },
    /// A render-layer operation was given a node without layer state.
    #[error("{0:?} is not a render layer")]
    NotARenderLayer(NodeId),
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let e = SceneError::IndexOutOfBounds { index: 4, len: 2 };
        assert_eq!(
            e.to_string(),
            "child index 4 is out of bounds (child count 2)"
        );
        let e = SceneError::InvalidRange {
            begin: 1,
            end: 9,
            len: 3,
        };
        assert!(e.to_string().contains("1..9"));
    }
}
