// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render layers: paint-order control decoupled from ownership.
//!
//! A render layer is a node that carries a list of *attached* nodes. During
//! instruction collection an attached node is skipped where it sits in the
//! ownership tree and emitted at the layer's position instead, while its
//! transform, alpha, and visibility still come from its owning parent. This
//! lets, say, a character's name tag draw above every other character
//! without moving it out of the character's subtree.
//!
//! A node is attached to at most one layer; attaching it elsewhere detaches
//! it first. Ownership is never modified by layer operations.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::error::SceneError;
use crate::node::{INVALID, NodeId, Scene};

/// Comparator used to order a layer's attached nodes.
pub type LayerSortFn = fn(&Scene, NodeId, NodeId) -> Ordering;

/// Orders by ascending z-index.
#[must_use]
pub fn sort_by_z_index(scene: &Scene, a: NodeId, b: NodeId) -> Ordering {
    scene.z_index(a).cmp(&scene.z_index(b))
}

/// Layer state owned by a layer node.
#[derive(Debug)]
pub(crate) struct RenderLayer {
    pub(crate) attached: Vec<u32>,
    pub(crate) sortable_children: bool,
    pub(crate) sort_fn: LayerSortFn,
}

impl RenderLayer {
    fn new() -> Self {
        Self {
            attached: Vec::new(),
            sortable_children: false,
            sort_fn: sort_by_z_index,
        }
    }
}

impl Scene {
    /// Creates a detached node with render layer state.
    pub fn create_render_layer(&mut self) -> NodeId {
        let id = self.create_node();
        self.render_layer[id.idx as usize] = Some(Box::new(RenderLayer::new()));
        id
    }

    /// Returns whether the node is a render layer.
    #[must_use]
    pub fn is_render_layer(&self, id: NodeId) -> bool {
        self.validate(id);
        self.render_layer[id.idx as usize].is_some()
    }

    /// Attaches nodes to the layer, appending them in order.
    ///
    /// A node attached to another layer is detached from it first.
    /// Re-attaching a member keeps its position.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    ///
    /// # Panics
    ///
    /// Panics if any handle is stale.
    pub fn attach(&mut self, layer: NodeId, nodes: &[NodeId]) -> Result<(), SceneError> {
        self.check_layer(layer)?;
        let l = layer.idx;
        for &node in nodes {
            self.validate(node);
            let c = node.idx;
            let previous = self.parent_layer[c as usize];
            if previous == l {
                continue;
            }
            if previous != INVALID {
                self.layer_detach_slot(previous, c);
            }
            if let Some(state) = self.render_layer[l as usize].as_deref_mut() {
                state.attached.push(c);
            }
            self.parent_layer[c as usize] = l;
            self.layer_membership_changed(l, c);
        }
        Ok(())
    }

    /// Detaches nodes from the layer. Nodes attached elsewhere are ignored.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    pub fn detach(&mut self, layer: NodeId, nodes: &[NodeId]) -> Result<(), SceneError> {
        self.check_layer(layer)?;
        for &node in nodes {
            self.validate(node);
            if self.parent_layer[node.idx as usize] == layer.idx {
                self.layer_detach_slot(layer.idx, node.idx);
            }
        }
        Ok(())
    }

    /// Detaches every node from the layer.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    pub fn detach_all(&mut self, layer: NodeId) -> Result<(), SceneError> {
        self.check_layer(layer)?;
        self.release_attached(layer.idx);
        Ok(())
    }

    /// Returns the attached nodes in paint order.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    pub fn render_layer_children(&self, layer: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.check_layer(layer)?;
        Ok(self.render_layer[layer.idx as usize]
            .as_deref()
            .map(|state| state.attached.iter().map(|&c| self.id_at(c)).collect())
            .unwrap_or_default())
    }

    /// Returns the layer the node is attached to.
    #[must_use]
    pub fn render_layer_of(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let l = self.parent_layer[id.idx as usize];
        (l != INVALID).then(|| self.id_at(l))
    }

    /// Enables or disables sorting of attached nodes before each collection.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    pub fn set_render_layer_sortable(
        &mut self,
        layer: NodeId,
        sortable: bool,
    ) -> Result<(), SceneError> {
        self.check_layer(layer)?;
        if let Some(state) = self.render_layer[layer.idx as usize].as_deref_mut() {
            state.sortable_children = sortable;
        }
        self.mark_children_group_structure(layer.idx);
        Ok(())
    }

    /// Replaces the comparator used to sort attached nodes.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    pub fn set_render_layer_sort(
        &mut self,
        layer: NodeId,
        sort_fn: LayerSortFn,
    ) -> Result<(), SceneError> {
        self.check_layer(layer)?;
        if let Some(state) = self.render_layer[layer.idx as usize].as_deref_mut() {
            state.sort_fn = sort_fn;
        }
        Ok(())
    }

    /// Stably sorts the attached nodes with the layer's comparator.
    ///
    /// # Errors
    ///
    /// [`SceneError::NotARenderLayer`] if `layer` has no layer state.
    pub fn sort_render_layer_children(&mut self, layer: NodeId) -> Result<(), SceneError> {
        self.check_layer(layer)?;
        self.sort_render_layer_at(layer.idx);
        Ok(())
    }

    // -- Internal helpers --

    fn check_layer(&self, layer: NodeId) -> Result<(), SceneError> {
        self.validate(layer);
        if self.render_layer[layer.idx as usize].is_none() {
            return Err(SceneError::NotARenderLayer(layer));
        }
        Ok(())
    }

    pub(crate) fn sort_render_layer_at(&mut self, l: u32) {
        let Some(state) = self.render_layer[l as usize].as_deref_mut() else {
            return;
        };
        let sort_fn = state.sort_fn;
        let mut attached = core::mem::take(&mut state.attached);
        attached.sort_by(|&a, &b| sort_fn(self, self.id_at(a), self.id_at(b)));
        if let Some(state) = self.render_layer[l as usize].as_deref_mut() {
            state.attached = attached;
        }
        self.mark_children_group_structure(l);
    }

    pub(crate) fn layer_detach_slot(&mut self, l: u32, c: u32) {
        if let Some(state) = self.render_layer[l as usize].as_deref_mut() {
            state.attached.retain(|&x| x != c);
        }
        self.parent_layer[c as usize] = INVALID;
        self.layer_membership_changed(l, c);
    }

    /// Detaches every member of layer `l`, keeping the layer state.
    fn release_attached(&mut self, l: u32) {
        let attached = match self.render_layer[l as usize].as_deref_mut() {
            Some(state) => core::mem::take(&mut state.attached),
            None => return,
        };
        for c in attached {
            self.parent_layer[c as usize] = INVALID;
            self.layer_membership_changed(l, c);
        }
    }

    /// Drops the layer state owned by `l` after detaching its members.
    pub(crate) fn release_render_layer(&mut self, l: u32) {
        self.release_attached(l);
        self.render_layer[l as usize] = None;
    }

    /// Both the layer's group and the member's group draw differently now.
    fn layer_membership_changed(&mut self, l: u32, c: u32) {
        self.mark_children_group_structure(l);
        self.mark_parent_group_structure(c);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn scene_with_layer() -> (Scene, NodeId, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.root();
        let layer = scene.create_render_layer();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        scene.add_child(root, layer).unwrap();
        (scene, layer, a, b)
    }

    #[test]
    fn attach_keeps_ownership() {
        let (mut scene, layer, a, b) = scene_with_layer();
        let root = scene.root();
        scene.attach(layer, &[b, a]).unwrap();
        assert_eq!(scene.render_layer_children(layer).unwrap(), vec![b, a]);
        assert_eq!(scene.parent(a), Some(root));
        assert_eq!(scene.render_layer_of(a), Some(layer));
    }

    #[test]
    fn attaching_elsewhere_detaches_first() {
        let (mut scene, layer, a, _) = scene_with_layer();
        let other = scene.create_render_layer();
        scene.attach(layer, &[a]).unwrap();
        scene.attach(other, &[a]).unwrap();
        assert!(scene.render_layer_children(layer).unwrap().is_empty());
        assert_eq!(scene.render_layer_children(other).unwrap(), vec![a]);
    }

    #[test]
    fn detach_and_detach_all() {
        let (mut scene, layer, a, b) = scene_with_layer();
        scene.attach(layer, &[a, b]).unwrap();
        scene.detach(layer, &[a]).unwrap();
        assert_eq!(scene.render_layer_children(layer).unwrap(), vec![b]);
        scene.detach_all(layer).unwrap();
        assert!(scene.render_layer_children(layer).unwrap().is_empty());
        assert_eq!(scene.render_layer_of(b), None);
    }

    #[test]
    fn non_layers_are_rejected() {
        let (mut scene, _, a, b) = scene_with_layer();
        assert_eq!(scene.attach(a, &[b]), Err(SceneError::NotARenderLayer(a)));
        assert!(!scene.is_render_layer(a));
    }

    #[test]
    fn sorting_uses_z_index_by_default() {
        let (mut scene, layer, a, b) = scene_with_layer();
        scene.attach(layer, &[a, b]).unwrap();
        scene.set_z_index(a, 3);
        scene.sort_render_layer_children(layer).unwrap();
        assert_eq!(scene.render_layer_children(layer).unwrap(), vec![b, a]);

        fn reverse(scene: &Scene, x: NodeId, y: NodeId) -> Ordering {
            sort_by_z_index(scene, y, x)
        }
        scene.set_render_layer_sort(layer, reverse).unwrap();
        scene.sort_render_layer_children(layer).unwrap();
        assert_eq!(scene.render_layer_children(layer).unwrap(), vec![a, b]);
    }

    #[test]
    fn attach_flags_group_structure() {
        let (mut scene, layer, a, _) = scene_with_layer();
        let root = scene.root();
        scene.prepare_frame(&mut crate::DefaultPipes, &mut crate::Tracer::none());
        scene.attach(layer, &[a]).unwrap();
        assert!(scene.render_group(root).unwrap().structure_did_change());
    }
}
