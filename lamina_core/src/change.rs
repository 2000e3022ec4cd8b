// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subtree change detection.
//!
//! Every node carries two counters: the structure tick (transform, visual
//! properties, child order) and the view tick (content, effects, measurable
//! state, child additions and removals). Their low 16 bits pack into a
//! *change id*. A [`ChangeSnapshot`] records the `(uid, change_id)` pair of
//! every node of a subtree in depth-first order; comparing a subtree against
//! its snapshot tells whether anything in it changed since the snapshot was
//! taken, without any per-node dirty bookkeeping.
//!
//! Cached local bounds use this to decide when to re-measure.

use alloc::vec::Vec;

use crate::node::{NodeId, Scene};

/// Packs the low 16 bits of both ticks into one value.
#[inline]
#[must_use]
pub const fn change_id(structure_tick: u32, view_tick: u32) -> u32 {
    ((view_tick & 0xFFFF) << 16) | (structure_tick & 0xFFFF)
}

/// Flattened `(uid, change_id)` pairs of a subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSnapshot {
    data: Vec<u32>,
}

impl ChangeSnapshot {
    /// Creates an empty snapshot; the first comparison always reports a
    /// change.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Forgets the recorded subtree.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the number of nodes recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / 2
    }

    /// Returns whether nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn record(&mut self, cursor: &mut usize, uid: u32, id: u32) -> bool {
        let at = *cursor;
        *cursor += 2;
        if at + 1 < self.data.len() {
            let changed = self.data[at] != uid || self.data[at + 1] != id;
            self.data[at] = uid;
            self.data[at + 1] = id;
            changed
        } else {
            self.data.truncate(at);
            self.data.push(uid);
            self.data.push(id);
            true
        }
    }
}

impl Scene {
    /// Returns the node's current change id.
    #[must_use]
    pub fn change_id(&self, id: NodeId) -> u32 {
        self.validate(id);
        let ch = &self.change[id.idx as usize];
        change_id(ch.structure_tick, ch.view_tick)
    }

    /// Compares `id`'s subtree against `snapshot` and overwrites it with the
    /// current state. Returns whether any node was added, removed,
    /// reordered, or changed since the snapshot was taken.
    pub fn subtree_changed(&self, id: NodeId, snapshot: &mut ChangeSnapshot) -> bool {
        self.validate(id);
        self.subtree_changed_at(id.idx, snapshot)
    }

    pub(crate) fn subtree_changed_at(&self, idx: u32, snapshot: &mut ChangeSnapshot) -> bool {
        let mut cursor = 0;
        let mut changed = self.record_subtree(idx, snapshot, &mut cursor);
        if cursor != snapshot.data.len() {
            snapshot.data.truncate(cursor);
            changed = true;
        }
        changed
    }

    fn record_subtree(&self, idx: u32, snapshot: &mut ChangeSnapshot, cursor: &mut usize) -> bool {
        let ch = &self.change[idx as usize];
        let id = change_id(ch.structure_tick, ch.view_tick);
        let mut changed = snapshot.record(cursor, ch.uid, id);
        for &c in &self.children[idx as usize] {
            changed |= self.record_subtree(c, snapshot, cursor);
        }
        changed
    }
}
