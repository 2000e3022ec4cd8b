// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::NodeId;
use super::store::Scene;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`Scene::children`].
#[derive(Debug)]
pub struct Children<'a> {
    scene: &'a Scene,
    inner: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(scene: &'a Scene, slots: &'a [u32]) -> Self {
        Self {
            scene,
            inner: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = *self.inner.next()?;
        Some(self.scene.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        let idx = *self.inner.next_back()?;
        Some(self.scene.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// A depth-first, pre-order iterator over a subtree (the start node first).
///
/// Created by [`Scene::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: Vec<u32>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        // Push in reverse so the first child is visited next.
        self.stack
            .extend(self.scene.children[idx as usize].iter().rev().copied());
        Some(self.scene.id_at(idx))
    }
}

impl Scene {
    /// Returns a pre-order iterator over `id` and all of its descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        self.validate(id);
        Descendants {
            scene: self,
            stack: alloc::vec![id.idx],
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn children_is_double_ended() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        for n in [a, b, c] {
            scene.add_child(p, n).unwrap();
        }
        let rev: Vec<_> = scene.children(p).rev().collect();
        assert_eq!(rev, vec![c, b, a]);
        assert_eq!(scene.children(p).len(), 3);
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let a1 = scene.create_node();
        let b = scene.create_node();
        scene.add_child(p, a).unwrap();
        scene.add_child(a, a1).unwrap();
        scene.add_child(p, b).unwrap();
        let order: Vec<_> = scene.descendants(p).collect();
        assert_eq!(order, vec![p, a, a1, b]);
    }
}
