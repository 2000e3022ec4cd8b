// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-index ordering of child lists.

use super::id::{INVALID, NodeId};
use super::store::Scene;

impl Scene {
    /// Sets the z-index used to order the node among its siblings.
    ///
    /// Marks the parent's child list sortable and dirty. The list is
    /// reordered by [`sort_children`](Self::sort_children) or, when
    /// [`SceneConfig::sort_on_collect`](crate::SceneConfig::sort_on_collect)
    /// is set, during instruction collection.
    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) {
        self.validate(id);
        if self.order[id.idx as usize].z_index == z_index {
            return;
        }
        self.order[id.idx as usize].z_index = z_index;
        self.depth_of_child_modified(id.idx);
    }

    /// Returns the z-index.
    #[must_use]
    pub fn z_index(&self, id: NodeId) -> i32 {
        self.validate(id);
        self.order[id.idx as usize].z_index
    }

    /// Enables or disables z-index sorting of the node's children.
    pub fn set_sortable_children(&mut self, id: NodeId, sortable: bool) {
        self.validate(id);
        let order = &mut self.order[id.idx as usize];
        if order.sortable_children == sortable {
            return;
        }
        order.sortable_children = sortable;
        if sortable {
            order.sort_dirty = true;
            self.mark_children_group_structure(id.idx);
        }
    }

    /// Returns whether the node's children are sorted by z-index.
    #[must_use]
    pub fn sortable_children(&self, id: NodeId) -> bool {
        self.validate(id);
        self.order[id.idx as usize].sortable_children
    }

    /// Returns whether the child list needs sorting.
    #[must_use]
    pub fn is_sort_dirty(&self, id: NodeId) -> bool {
        self.validate(id);
        self.order[id.idx as usize].sort_dirty
    }

    /// Stably sorts the children by ascending z-index if the list is dirty.
    ///
    /// Returns whether a sort happened.
    pub fn sort_children(&mut self, id: NodeId) -> bool {
        self.validate(id);
        self.sort_children_at(id.idx)
    }

    pub(crate) fn sort_children_at(&mut self, idx: u32) -> bool {
        if !self.order[idx as usize].sort_dirty {
            return false;
        }
        self.order[idx as usize].sort_dirty = false;
        let mut list = core::mem::take(&mut self.children[idx as usize]);
        list.sort_by_key(|&c| self.order[c as usize].z_index);
        self.children[idx as usize] = list;
        self.mark_children_group_structure(idx);
        true
    }

    pub(crate) fn depth_of_child_modified(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p != INVALID {
            let order = &mut self.order[p as usize];
            order.sortable_children = true;
            order.sort_dirty = true;
        }
        self.mark_parent_group_structure(idx);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn negative_z_sorts_first() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        for n in [a, b, c] {
            scene.add_child(p, n).unwrap();
        }
        scene.set_z_index(c, -1);
        assert!(scene.sortable_children(p));
        assert!(scene.is_sort_dirty(p));

        assert!(scene.sort_children(p));
        let order: Vec<_> = scene.children(p).collect();
        assert_eq!(order, vec![c, a, b]);
        assert!(!scene.is_sort_dirty(p));
        assert!(!scene.sort_children(p));
    }

    #[test]
    fn child_added_with_negative_z_sorts_before_its_siblings() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let siblings: Vec<_> = (0..3).map(|_| scene.create_node()).collect();
        scene.add_child(p, siblings[0]).unwrap();
        scene.add_child(p, siblings[1]).unwrap();
        let under = scene.create_node();
        scene.set_z_index(under, -1);
        scene.add_child(p, under).unwrap();
        scene.add_child(p, siblings[2]).unwrap();
        assert!(scene.is_sort_dirty(p));

        assert!(scene.sort_children(p));
        assert_eq!(scene.child_index(p, under), Ok(0));
        let order: Vec<_> = scene.children(p).collect();
        assert_eq!(order, vec![under, siblings[0], siblings[1], siblings[2]]);
    }

    #[test]
    fn sort_is_stable() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let nodes: Vec<_> = (0..4).map(|_| scene.create_node()).collect();
        for &n in &nodes {
            scene.add_child(p, n).unwrap();
        }
        scene.set_z_index(nodes[0], 1);
        scene.set_z_index(nodes[2], 1);
        scene.sort_children(p);
        let order: Vec<_> = scene.children(p).collect();
        assert_eq!(order, vec![nodes[1], nodes[3], nodes[0], nodes[2]]);
    }

    #[test]
    fn adding_a_z_indexed_child_dirties_the_parent() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        scene.set_z_index(a, 5);
        assert!(!scene.is_sort_dirty(p));
        scene.add_child(p, a).unwrap();
        assert!(scene.is_sort_dirty(p));
    }

    #[test]
    fn sorting_flags_the_group_structure() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        scene.prepare_frame(&mut crate::DefaultPipes, &mut crate::Tracer::none());
        assert!(!scene.render_group(root).unwrap().structure_did_change());

        scene.set_z_index(a, 2);
        assert!(scene.render_group(root).unwrap().structure_did_change());
    }
}
