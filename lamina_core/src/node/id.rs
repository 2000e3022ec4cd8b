// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity types.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`Scene`](super::Scene).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is destroyed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    /// Slot index into the scene's arrays.
    pub(crate) idx: u32,
    /// Generation counter, must match the scene's generation for this slot.
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

static NEXT_UID: AtomicU32 = AtomicU32::new(1);

/// Returns a process-unique node uid.
///
/// Uids are never reused, unlike slot indices, so they are safe keys for
/// change-detection buffers that outlive a node.
pub(crate) fn next_uid() -> u32 {
    NEXT_UID.fetch_add(1, Ordering::Relaxed)
}

/// Identifies an effect registered on a node with
/// [`Scene::add_effect`](super::Scene::add_effect).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub(crate) u32);

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({})", self.0)
    }
}

/// Identifies an event listener registered with [`Scene::on`](super::Scene::on).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u32);

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}
