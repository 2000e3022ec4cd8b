// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render groups: subtree boundaries with their own world transform.
//!
//! A render group is owned by one boundary node. Every node below the
//! boundary (down to the next nested boundary) stores its transform, color,
//! and visibility *relative to the boundary*; the group stores the boundary's
//! world transform, color, and alpha. Moving the boundary therefore only
//! updates the group, not the nodes inside it, and a backend can keep the
//! group's instruction set and upload only the new world transform.
//!
//! Mutations below a boundary queue the changed node in the group's
//! per-depth worklist (see [`Scene::update_transforms`]). Structural changes
//! (children added or removed, visibility, ordering, layer membership) set
//! [`RenderGroup::structure_did_change`], which makes
//! [`Scene::prepare_frame`] rebuild the group's [`InstructionSet`].
//!
//! The scene root is always a render group.

mod update;

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Affine;

use crate::color::{WHITE_BGR, pack_color_alpha};
use crate::instructions::InstructionSet;
use crate::node::{INVALID, NodeId, Scene};
use crate::node::store::NEVER_UPDATED;

/// State owned by a render group boundary node.
#[derive(Debug)]
pub struct RenderGroup {
    /// Slot of the enclosing group's boundary, `INVALID` at the top.
    pub(crate) parent: u32,
    pub(crate) child_groups: Vec<u32>,
    pub(crate) world_transform: Affine,
    /// Packed BGR.
    pub(crate) world_color: u32,
    pub(crate) world_alpha: f32,
    pub(crate) structure_did_change: bool,
    /// Nodes queued for recompute, indexed by relative depth.
    pub(crate) children_to_update: Vec<Vec<u32>>,
    pub(crate) update_tick: u32,
    pub(crate) instructions: InstructionSet,
    pub(crate) cache_as_texture: bool,
    pub(crate) texture_needs_update: bool,
}

impl RenderGroup {
    fn new() -> Self {
        Self {
            parent: INVALID,
            child_groups: Vec::new(),
            world_transform: Affine::IDENTITY,
            world_color: WHITE_BGR,
            world_alpha: 1.0,
            structure_did_change: true,
            children_to_update: Vec::new(),
            update_tick: 0,
            instructions: InstructionSet::new(),
            cache_as_texture: false,
            texture_needs_update: false,
        }
    }

    /// Returns the boundary's world transform as of the last update pass.
    #[must_use]
    pub fn world_transform(&self) -> Affine {
        self.world_transform
    }

    /// Returns the boundary's world alpha as of the last update pass.
    #[must_use]
    pub fn world_alpha(&self) -> f32 {
        self.world_alpha
    }

    /// Returns the world tint and alpha packed as `0xAABBGGRR`.
    #[must_use]
    pub fn world_color_alpha(&self) -> u32 {
        pack_color_alpha(self.world_color, self.world_alpha)
    }

    /// Returns whether the instruction set must be rebuilt.
    #[must_use]
    pub fn structure_did_change(&self) -> bool {
        self.structure_did_change
    }

    /// Returns the instruction set from the last rebuild.
    #[must_use]
    pub fn instructions(&self) -> &InstructionSet {
        &self.instructions
    }

    /// Returns whether the group is rendered to an offscreen texture.
    #[must_use]
    pub fn is_cached_as_texture(&self) -> bool {
        self.cache_as_texture
    }

    /// Returns whether the cached texture is stale.
    #[must_use]
    pub fn texture_needs_update(&self) -> bool {
        self.texture_needs_update
    }

    /// Returns the number of queued node updates, duplicates included.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.children_to_update.iter().map(Vec::len).sum()
    }

    pub(crate) fn on_child_update(&mut self, idx: u32, depth: u32) {
        let depth = depth as usize;
        if self.children_to_update.len() <= depth {
            self.children_to_update.resize_with(depth + 1, Vec::new);
        }
        self.children_to_update[depth].push(idx);
    }

    fn add_child_group(&mut self, idx: u32) {
        if !self.child_groups.contains(&idx) {
            self.child_groups.push(idx);
        }
        self.structure_did_change = true;
    }

    fn remove_child_group(&mut self, idx: u32) {
        self.child_groups.retain(|&g| g != idx);
        self.structure_did_change = true;
    }
}

impl Scene {
    /// Turns the node into a render group boundary. No-op if it already is.
    ///
    /// The world transform of every node is unchanged; the subtree's
    /// transforms become relative to the node.
    pub fn enable_render_group(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        if self.render_group[idx as usize].is_some() {
            return;
        }
        let enclosing = self.group_link[idx as usize].parent_group;
        if enclosing != INVALID {
            self.group_remove_child(enclosing, idx);
        }

        self.render_group[idx as usize] = Some(Box::new(RenderGroup::new()));
        self.change[idx as usize].did_change = true;
        for k in 0..self.children[idx as usize].len() {
            let c = self.children[idx as usize][k];
            self.group_add_child(idx, c);
        }

        if enclosing != INVALID {
            self.group_add_child(enclosing, idx);
        }
        log::debug!("enabled render group on {id:?}");
    }

    /// Removes the node's render group. No-op if it has none.
    ///
    /// Its subtree is merged into the enclosing group. Cache-as-texture is
    /// turned off with it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the scene root.
    pub fn disable_render_group(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != self.root, "the scene root is always a render group");
        if self.render_group[idx as usize].is_none() {
            return;
        }
        let enclosing = self.group_link[idx as usize].parent_group;
        if enclosing != INVALID {
            self.group_remove_child(enclosing, idx);
        }
        self.release_render_group(idx);
        if enclosing != INVALID {
            self.group_add_child(enclosing, idx);
        }
        log::debug!("disabled render group on {id:?}");
    }

    /// Returns whether the node is a render group boundary.
    #[must_use]
    pub fn is_render_group(&self, id: NodeId) -> bool {
        self.validate(id);
        self.render_group[id.idx as usize].is_some()
    }

    /// Returns the node's render group, if it is a boundary.
    #[must_use]
    pub fn render_group(&self, id: NodeId) -> Option<&RenderGroup> {
        self.validate(id);
        self.render_group[id.idx as usize].as_deref()
    }

    /// Returns the boundary of the render group the node belongs to.
    ///
    /// For a boundary node this is the enclosing group, not its own.
    #[must_use]
    pub fn parent_render_group(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let g = self.group_link[id.idx as usize].parent_group;
        (g != INVALID).then(|| self.id_at(g))
    }

    /// Returns the boundaries of the groups nested directly in `id`'s group.
    #[must_use]
    pub fn child_render_groups(&self, id: NodeId) -> Vec<NodeId> {
        self.validate(id);
        self.group_at(id.idx)
            .map(|g| g.child_groups.iter().map(|&c| self.id_at(c)).collect())
            .unwrap_or_default()
    }

    /// Renders the node's subtree to an offscreen texture that is reused
    /// until something inside changes. Enabling turns the node into a render
    /// group if it is not one already.
    pub fn set_cache_as_texture(&mut self, id: NodeId, enabled: bool) {
        self.validate(id);
        let idx = id.idx;
        let current = self
            .group_at(idx)
            .is_some_and(|g| g.cache_as_texture);
        if current == enabled {
            return;
        }
        if enabled {
            self.enable_render_group(id);
            self.cached_groups += 1;
        } else {
            self.cached_groups -= 1;
        }
        if let Some(group) = self.render_group[idx as usize].as_deref_mut() {
            group.cache_as_texture = enabled;
            group.texture_needs_update = enabled;
        }
        self.mark_parent_group_structure(idx);
    }

    /// Returns whether the node's subtree is cached as a texture.
    #[must_use]
    pub fn is_cached_as_texture(&self, id: NodeId) -> bool {
        self.validate(id);
        self.group_at(id.idx).is_some_and(|g| g.cache_as_texture)
    }

    /// Forces the cached texture to be re-rendered on the next frame.
    pub fn update_cache_texture(&mut self, id: NodeId) {
        self.validate(id);
        if let Some(group) = self.render_group[id.idx as usize].as_deref_mut() {
            if group.cache_as_texture {
                group.texture_needs_update = true;
            }
        }
    }

    // -- Internal bookkeeping --

    pub(crate) fn group_at(&self, idx: u32) -> Option<&RenderGroup> {
        self.render_group.get(idx as usize)?.as_deref()
    }

    /// Registers `c` and its subtree with group `g`, stopping at nested
    /// boundaries which are registered as child groups instead.
    pub(crate) fn group_add_child(&mut self, g: u32, c: u32) {
        let p = self.parent[c as usize];
        let depth = if p == g || p == INVALID {
            1
        } else {
            self.group_link[p as usize].relative_depth + 1
        };
        let link = &mut self.group_link[c as usize];
        link.parent_group = g;
        link.relative_depth = depth;
        let ch = &mut self.change[c as usize];
        ch.did_change = true;
        ch.update_tick = NEVER_UPDATED;

        let Some(group) = self.render_group[g as usize].as_deref_mut() else {
            return;
        };
        group.structure_did_change = true;
        group.on_child_update(c, depth);

        if let Some(child_group) = self.render_group[c as usize].as_deref_mut() {
            let old = core::mem::replace(&mut child_group.parent, g);
            if old != INVALID && old != g {
                if let Some(old_group) = self.render_group[old as usize].as_deref_mut() {
                    old_group.remove_child_group(c);
                }
            }
            if let Some(group) = self.render_group[g as usize].as_deref_mut() {
                group.add_child_group(c);
            }
            return;
        }

        for k in 0..self.children[c as usize].len() {
            let gc = self.children[c as usize][k];
            self.group_add_child(g, gc);
        }
    }

    /// Unregisters `c` and its subtree from group `g`.
    pub(crate) fn group_remove_child(&mut self, g: u32, c: u32) {
        self.mark_group_structure(g);
        self.group_link[c as usize].parent_group = INVALID;

        if let Some(child_group) = self.render_group[c as usize].as_deref_mut() {
            if child_group.parent == g {
                child_group.parent = INVALID;
            }
            if let Some(group) = self.render_group[g as usize].as_deref_mut() {
                group.remove_child_group(c);
            }
            return;
        }

        for k in 0..self.children[c as usize].len() {
            let gc = self.children[c as usize][k];
            self.group_remove_child(g, gc);
        }
    }

    /// Drops the group owned by `idx` and clears back references to it.
    ///
    /// The caller re-registers the subtree with another group if needed.
    pub(crate) fn release_render_group(&mut self, idx: u32) {
        let Some(group) = self.render_group[idx as usize].take() else {
            return;
        };
        if group.cache_as_texture {
            self.cached_groups -= 1;
        }
        for &c in &group.child_groups {
            if let Some(child_group) = self.render_group[c as usize].as_deref_mut() {
                if child_group.parent == idx {
                    child_group.parent = INVALID;
                }
            }
        }
        self.clear_group_links(idx, idx);
    }

    fn clear_group_links(&mut self, node: u32, g: u32) {
        for k in 0..self.children[node as usize].len() {
            let c = self.children[node as usize][k];
            let link = &mut self.group_link[c as usize];
            if link.parent_group == g {
                link.parent_group = INVALID;
            }
            if self.render_group[c as usize].is_none() {
                self.clear_group_links(c, g);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Vec2;

    use super::*;
    use crate::test_util::assert_affine_near;

    #[test]
    fn enabling_a_group_registers_the_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.create_node();
        let a = scene.create_node();
        let a1 = scene.create_node();
        scene.add_child(root, g).unwrap();
        scene.add_child(g, a).unwrap();
        scene.add_child(a, a1).unwrap();

        scene.enable_render_group(g);
        assert!(scene.is_render_group(g));
        assert_eq!(scene.parent_render_group(g), Some(root));
        assert_eq!(scene.parent_render_group(a), Some(g));
        assert_eq!(scene.parent_render_group(a1), Some(g));
        assert_eq!(scene.group_link[a1.idx as usize].relative_depth, 2);
        assert_eq!(scene.child_render_groups(root), vec![g]);
    }

    #[test]
    fn toggling_a_group_keeps_world_transforms() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();
        scene.set_position(a, (10.0, 0.0));
        scene.set_rotation(b, 0.4);
        scene.set_scale(c, (2.0, 3.0));
        scene.set_position(c, (-5.0, 7.0));
        scene.update_transforms();
        let before = scene.world_transform(c);

        scene.enable_render_group(b);
        scene.update_transforms();
        assert_affine_near(scene.world_transform(c), before, 1e-9);
        assert_affine_near(
            scene.group_transform(c),
            scene.local_transform(c),
            1e-12,
        );

        scene.disable_render_group(b);
        scene.update_transforms();
        assert!(!scene.is_render_group(b));
        assert_eq!(scene.parent_render_group(c), Some(root));
        assert_affine_near(scene.world_transform(c), before, 1e-9);
    }

    #[test]
    fn moving_a_boundary_only_updates_the_group() {
        let mut scene = Scene::new();
        let root = scene.root();
        let g = scene.create_node();
        let a = scene.create_node();
        scene.add_child(root, g).unwrap();
        scene.add_child(g, a).unwrap();
        scene.set_x(a, 5.0);
        scene.enable_render_group(g);
        scene.update_transforms();

        scene.set_x(g, 100.0);
        assert_eq!(scene.render_group(g).unwrap().pending_updates(), 0);
        scene.update_transforms();
        assert_eq!(scene.relative_group_transform(a).translation(), Vec2::new(5.0, 0.0));
        assert_eq!(scene.world_transform(a).translation(), Vec2::new(105.0, 0.0));
    }

    #[test]
    fn nested_groups_follow_reparenting() {
        let mut scene = Scene::new();
        let root = scene.root();
        let outer = scene.create_node();
        let inner = scene.create_node();
        scene.add_child(root, outer).unwrap();
        scene.enable_render_group(outer);
        scene.enable_render_group(inner);
        scene.add_child(outer, inner).unwrap();
        assert_eq!(scene.child_render_groups(outer), vec![inner]);

        scene.add_child(root, inner).unwrap();
        assert!(scene.child_render_groups(outer).is_empty());
        assert_eq!(scene.child_render_groups(root), vec![outer, inner]);
    }

    #[test]
    fn disabling_merges_nested_groups_upward() {
        let mut scene = Scene::new();
        let root = scene.root();
        let outer = scene.create_node();
        let inner = scene.create_node();
        scene.add_child(root, outer).unwrap();
        scene.add_child(outer, inner).unwrap();
        scene.enable_render_group(outer);
        scene.enable_render_group(inner);

        scene.disable_render_group(outer);
        assert_eq!(scene.child_render_groups(root), vec![inner]);
        assert_eq!(scene.parent_render_group(inner), Some(root));
    }

    #[test]
    fn cache_as_texture_implies_a_group() {
        let mut scene = Scene::new();
        let root = scene.root();
        let n = scene.create_node();
        let leaf = scene.create_node();
        scene.add_child(root, n).unwrap();
        scene.add_child(n, leaf).unwrap();

        scene.set_cache_as_texture(n, true);
        assert!(scene.is_render_group(n));
        assert!(scene.is_cached_as_texture(n));
        assert!(scene.render_group(n).unwrap().texture_needs_update());

        scene.set_cache_as_texture(n, false);
        assert!(!scene.is_cached_as_texture(n));
        assert!(scene.is_render_group(n));
        assert_eq!(scene.cached_groups, 0);
    }

    #[test]
    #[should_panic(expected = "always a render group")]
    fn root_group_cannot_be_disabled() {
        let mut scene = Scene::new();
        let root = scene.root();
        scene.disable_render_group(root);
    }
}
