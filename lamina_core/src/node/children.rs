// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child list mutation and index queries.

use alloc::vec::Vec;
use core::ops::{Bound, RangeBounds};

use super::events::NodeEvent;
use super::flags::UpdateFlags;
use super::id::{INVALID, NodeId};
use super::store::Scene;
use crate::dirty;
use crate::error::SceneError;

impl Scene {
    /// Appends `child` to `parent`'s child list and returns `child`.
    ///
    /// A child that already has a parent is removed from it first, with the
    /// usual removal events. Re-adding a child to its current parent moves it
    /// to the end without events.
    ///
    /// # Errors
    ///
    /// [`SceneError::WouldCycle`] if `child` is `parent` or one of its
    /// ancestors.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, SceneError> {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.idx, child.idx);
        self.check_acyclic(parent, child)?;

        if self.parent[c as usize] == p {
            let list = &mut self.children[p as usize];
            if let Some(pos) = list.iter().position(|&x| x == c) {
                if pos + 1 != list.len() {
                    list.remove(pos);
                    list.push(c);
                    self.child_order_changed(p);
                }
            }
            return Ok(child);
        }

        let index = self.children[p as usize].len();
        self.insert_child(p, c, index);
        Ok(child)
    }

    /// Inserts `child` at `index` in `parent`'s child list.
    ///
    /// `index` may equal the child count to append. When `child` already
    /// belongs to `parent` it is moved; moving to its current index is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`SceneError::IndexOutOfBounds`] if `index` exceeds the child count,
    /// [`SceneError::WouldCycle`] as for [`add_child`](Self::add_child).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_child_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<NodeId, SceneError> {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.idx, child.idx);
        let len = self.children[p as usize].len();
        if index > len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }
        self.check_acyclic(parent, child)?;

        if self.parent[c as usize] == p {
            let list = &mut self.children[p as usize];
            let Some(current) = list.iter().position(|&x| x == c) else {
                return Ok(child);
            };
            if current == index {
                return Ok(child);
            }
            list.remove(current);
            let index = index.min(list.len());
            list.insert(index, c);
            self.child_order_changed(p);
            return Ok(child);
        }

        self.insert_child(p, c, index);
        Ok(child)
    }

    /// Removes `child` from `parent`. Returns `false` if it was not a child.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        let Some(pos) = self.position_of(parent.idx, child.idx) else {
            return false;
        };
        self.remove_child_slot(parent.idx, pos);
        true
    }

    /// Removes and returns the child at `index`.
    ///
    /// # Errors
    ///
    /// [`SceneError::IndexOutOfBounds`] if there is no child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn remove_child_at(&mut self, parent: NodeId, index: usize) -> Result<NodeId, SceneError> {
        self.validate(parent);
        let len = self.children[parent.idx as usize].len();
        if index >= len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }
        let c = self.remove_child_slot(parent.idx, index);
        Ok(self.id_at(c))
    }

    /// Removes the children in `range` and returns them in list order.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidRange`] if the range is inverted or extends past
    /// the end of the child list.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn remove_children(
        &mut self,
        parent: NodeId,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<NodeId>, SceneError> {
        self.validate(parent);
        let p = parent.idx;
        let len = self.children[p as usize].len();
        let begin = match range.start_bound() {
            Bound::Included(&b) => b,
            Bound::Excluded(&b) => b.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if begin > end || end > len {
            return Err(SceneError::InvalidRange { begin, end, len });
        }

        let mut removed = Vec::with_capacity(end - begin);
        for index in (begin..end).rev() {
            let c = self.remove_child_slot(p, index);
            removed.push(self.id_at(c));
        }
        removed.reverse();
        Ok(removed)
    }

    /// Detaches `id` from its parent. Returns `false` if it had none.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn remove_from_parent(&mut self, id: NodeId) -> bool {
        self.validate(id);
        self.remove_from_parent_slot(id.idx)
    }

    /// Returns the child at `index`.
    ///
    /// # Errors
    ///
    /// [`SceneError::IndexOutOfBounds`] if there is no child at `index`.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Result<NodeId, SceneError> {
        self.validate(parent);
        let list = &self.children[parent.idx as usize];
        list.get(index)
            .map(|&c| self.id_at(c))
            .ok_or(SceneError::IndexOutOfBounds {
                index,
                len: list.len(),
            })
    }

    /// Returns the position of `child` in `parent`'s child list.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotAChild`] if `child` is not a direct child of `parent`.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, SceneError> {
        self.validate(parent);
        self.validate(child);
        self.position_of(parent.idx, child.idx)
            .ok_or(SceneError::NotAChild { parent, child })
    }

    /// Moves an existing child to `index`.
    ///
    /// # Errors
    ///
    /// [`SceneError::IndexOutOfBounds`] if `index` is not a valid child
    /// position, [`SceneError::NotAChild`] if `child` is not a child of
    /// `parent`.
    pub fn set_child_index(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), SceneError> {
        self.validate(parent);
        let len = self.children[parent.idx as usize].len();
        if index >= len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }
        self.child_index(parent, child)?;
        self.add_child_at(parent, child, index)?;
        Ok(())
    }

    /// Swaps the positions of two children.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotAChild`] if either node is not a child of `parent`.
    pub fn swap_children(
        &mut self,
        parent: NodeId,
        a: NodeId,
        b: NodeId,
    ) -> Result<(), SceneError> {
        if a == b {
            self.validate(parent);
            self.validate(a);
            return Ok(());
        }
        let ia = self.child_index(parent, a)?;
        let ib = self.child_index(parent, b)?;
        self.children[parent.idx as usize].swap(ia, ib);
        self.child_order_changed(parent.idx);
        Ok(())
    }

    /// Moves `child` under `parent`, keeping its world transform.
    ///
    /// The child's local parameters are recomputed from
    /// `inverse(parent_world) * child_world`. Skew and rotation are ambiguous
    /// for a general matrix; see [`TransformParams::from_affine`].
    ///
    /// # Errors
    ///
    /// As for [`add_child`](Self::add_child).
    pub fn reparent_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, SceneError> {
        self.validate(parent);
        self.validate(child);
        let index = self.children[parent.idx as usize].len();
        let index = if self.parent[child.idx as usize] == parent.idx {
            index.saturating_sub(1)
        } else {
            index
        };
        self.reparent_child_at(parent, child, index)
    }

    /// Like [`reparent_child`](Self::reparent_child), inserting at `index`.
    ///
    /// # Errors
    ///
    /// As for [`add_child_at`](Self::add_child_at).
    pub fn reparent_child_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<NodeId, SceneError> {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] == parent.idx {
            self.set_child_index(parent, child, index)?;
            return Ok(child);
        }
        let len = self.children[parent.idx as usize].len();
        if index > len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }
        self.check_acyclic(parent, child)?;

        let child_world = self.global_transform(child, false);
        self.remove_from_parent_slot(child.idx);
        self.add_child_at(parent, child, index)?;
        let parent_world = self.global_transform(parent, false);
        self.set_from_matrix(child, parent_world.inverse() * child_world);
        Ok(child)
    }

    // -- Internal helpers --

    fn check_acyclic(&self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if self.is_ancestor_or_self_at(child.idx, parent.idx) {
            return Err(SceneError::WouldCycle { parent, child });
        }
        Ok(())
    }

    pub(crate) fn position_of(&self, p: u32, c: u32) -> Option<usize> {
        if self.parent[c as usize] != p {
            return None;
        }
        self.children[p as usize].iter().position(|&x| x == c)
    }

    /// Bookkeeping for a reorder within one child list.
    fn child_order_changed(&mut self, p: u32) {
        let ch = &mut self.change[p as usize];
        ch.structure_tick = ch.structure_tick.wrapping_add(1);
        self.mark_children_group_structure(p);
        self.mark_cache_dirty(p);
    }

    fn insert_child(&mut self, p: u32, c: u32, index: usize) {
        self.remove_from_parent_slot(c);

        self.children[p as usize].insert(index, c);
        if self.order[p as usize].sortable_children {
            self.order[p as usize].sort_dirty = true;
        }
        self.parent[c as usize] = p;

        let ch = &mut self.change[c as usize];
        ch.update_flags = UpdateFlags::ALL;
        ch.did_change = true;

        let g = self.enclosing_group_for_children(p);
        if g != INVALID {
            self.group_add_child(g, c);
        }

        let _ = self.dirty.add_dependency(p, c, dirty::CACHE);
        self.bump_view_tick(p);
        self.mark_cache_dirty(p);

        let (parent, child) = (self.id_at(p), self.id_at(c));
        self.emit(p, NodeEvent::ChildAdded { child, index });
        self.emit(c, NodeEvent::Added { parent });

        if self.order[c as usize].z_index != 0 {
            self.depth_of_child_modified(c);
        }
    }

    pub(crate) fn remove_from_parent_slot(&mut self, c: u32) -> bool {
        let p = self.parent[c as usize];
        if p == INVALID {
            return false;
        }
        match self.position_of(p, c) {
            Some(pos) => {
                self.remove_child_slot(p, pos);
                true
            }
            None => false,
        }
    }

    /// Removes the child at `pos` from `p` and returns its slot.
    pub(crate) fn remove_child_slot(&mut self, p: u32, pos: usize) -> u32 {
        self.bump_view_tick(p);
        let c = self.children[p as usize].remove(pos);

        let g = self.enclosing_group_for_children(p);
        if g != INVALID {
            self.group_remove_child(g, c);
        }
        let layer = self.parent_layer[c as usize];
        if layer != INVALID {
            self.layer_detach_slot(layer, c);
        }

        self.dirty.remove_dependency(p, c, dirty::CACHE);
        self.mark_cache_dirty(p);
        self.parent[c as usize] = INVALID;

        let (parent, child) = (self.id_at(p), self.id_at(c));
        self.emit(p, NodeEvent::ChildRemoved { child, index: pos });
        self.emit(c, NodeEvent::Removed { parent });
        c
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Point;

    use super::*;
    use crate::test_util::assert_affine_near;
    use crate::transform::TransformParams;

    fn kids(scene: &Scene, p: NodeId) -> Vec<NodeId> {
        scene.children(p).collect()
    }

    #[test]
    fn add_then_remove_restores_child_list() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(p, a).unwrap();
        let before = kids(&scene, p);
        let tick = scene.view_tick(p);

        scene.add_child(p, b).unwrap();
        assert!(scene.remove_child(p, b));

        assert_eq!(kids(&scene, p), before);
        assert_eq!(scene.parent(b), None);
        assert!(scene.view_tick(p) > tick);
    }

    #[test]
    fn add_child_moves_between_parents() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        scene.add_child(a, c).unwrap();
        scene.add_child(b, c).unwrap();
        assert!(kids(&scene, a).is_empty());
        assert_eq!(kids(&scene, b), vec![c]);
        assert_eq!(scene.parent(c), Some(b));
    }

    #[test]
    fn re_adding_moves_to_end() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();
        scene.add_child(p, a).unwrap();
        assert_eq!(kids(&scene, p), vec![b, a]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(a, b).unwrap();
        assert_eq!(
            scene.add_child(b, a),
            Err(SceneError::WouldCycle {
                parent: b,
                child: a
            })
        );
        assert_eq!(
            scene.add_child(a, a),
            Err(SceneError::WouldCycle {
                parent: a,
                child: a
            })
        );
        assert_eq!(scene.parent(a), None);
    }

    #[test]
    fn add_child_at_inserts_and_checks_bounds() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();
        scene.add_child_at(p, c, 1).unwrap();
        assert_eq!(kids(&scene, p), vec![a, c, b]);

        let d = scene.create_node();
        assert_eq!(
            scene.add_child_at(p, d, 5),
            Err(SceneError::IndexOutOfBounds { index: 5, len: 3 })
        );
        assert_eq!(scene.parent(d), None);
    }

    #[test]
    fn same_index_is_a_no_op() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        scene.add_child(p, a).unwrap();
        let tick = scene.structure_tick(p);
        scene.add_child_at(p, a, 0).unwrap();
        assert_eq!(scene.structure_tick(p), tick);
    }

    #[test]
    fn removing_a_non_child_is_a_no_op() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let stranger = scene.create_node();
        let tick = scene.view_tick(p);
        assert!(!scene.remove_child(p, stranger));
        assert_eq!(scene.view_tick(p), tick);
    }

    #[test]
    fn remove_children_range() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let nodes: Vec<_> = (0..5).map(|_| scene.create_node()).collect();
        for &n in &nodes {
            scene.add_child(p, n).unwrap();
        }
        let removed = scene.remove_children(p, 1..3).unwrap();
        assert_eq!(removed, vec![nodes[1], nodes[2]]);
        assert_eq!(kids(&scene, p), vec![nodes[0], nodes[3], nodes[4]]);

        assert_eq!(
            scene.remove_children(p, 2..9),
            Err(SceneError::InvalidRange {
                begin: 2,
                end: 9,
                len: 3
            })
        );
        let rest = scene.remove_children(p, ..).unwrap();
        assert_eq!(rest.len(), 3);
        assert!(scene.remove_children(p, ..).unwrap().is_empty());
    }

    #[test]
    fn index_queries() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        for n in [a, b, c] {
            scene.add_child(p, n).unwrap();
        }
        assert_eq!(scene.child_at(p, 1), Ok(b));
        assert!(scene.child_at(p, 3).is_err());
        assert_eq!(scene.child_index(p, c), Ok(2));

        let stranger = scene.create_node();
        assert_eq!(
            scene.child_index(p, stranger),
            Err(SceneError::NotAChild {
                parent: p,
                child: stranger
            })
        );

        scene.set_child_index(p, a, 2).unwrap();
        assert_eq!(kids(&scene, p), vec![b, c, a]);
        scene.swap_children(p, b, a).unwrap();
        assert_eq!(kids(&scene, p), vec![a, c, b]);
        assert_eq!(scene.remove_child_at(p, 1), Ok(c));
        assert_eq!(kids(&scene, p), vec![a, b]);
    }

    #[test]
    fn swap_bumps_structure_tick() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();
        let tick = scene.structure_tick(p);
        scene.swap_children(p, a, b).unwrap();
        assert_eq!(scene.structure_tick(p), tick + 1);
    }

    #[test]
    fn reparent_keeps_world_transform() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        scene.add_child(a, c).unwrap();
        scene.set_position(a, (100.0, 0.0));
        scene.set_rotation(b, 0.5);
        scene.set_position(b, (0.0, 40.0));
        scene.set_scale(b, (2.0, 2.0));
        scene.set_position(c, (10.0, 20.0));

        let before = scene.global_transform(c, false);
        scene.reparent_child(b, c).unwrap();
        assert_eq!(scene.parent(c), Some(b));
        let after = scene.global_transform(c, false);
        assert_affine_near(before, after, 1e-9);

        let p = scene.to_global(c, Point::new(1.0, 1.0), false);
        assert!((p - before * Point::new(1.0, 1.0)).hypot() < 1e-9);
    }

    #[test]
    fn removal_detaches_from_render_layer() {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene.create_render_layer();
        let n = scene.create_node();
        scene.add_child(root, layer).unwrap();
        scene.add_child(root, n).unwrap();
        scene.attach(layer, &[n]).unwrap();
        assert_eq!(scene.render_layer_of(n), Some(layer));

        scene.remove_child(root, n);
        assert_eq!(scene.render_layer_of(n), None);
        assert!(scene.render_layer_children(layer).unwrap().is_empty());
    }

    #[test]
    fn transform_params_survive_identity_reparent() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        scene.add_child(a, c).unwrap();
        scene.set_position(c, (5.0, 6.0));
        scene.reparent_child(b, c).unwrap();
        let params = scene.transform_params(c);
        assert_eq!(params.position, Point::new(5.0, 6.0));
        assert_eq!(params.scale, TransformParams::IDENTITY.scale);
    }
}
