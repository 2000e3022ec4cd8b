// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation and read access.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Affine, Rect};
use understory_dirty::{CycleHandling, DirtyTracker};

use super::effects::EffectEntry;
use super::events::ListenerEntry;
use super::flags::{BlendMode, DisplayStatus, UpdateFlags};
use super::id::{INVALID, NodeId, next_uid};
use super::traverse::Children;
use crate::bounds::LocalBoundsCache;
use crate::color::WHITE_BGR;
use crate::config::SceneConfig;
use crate::group::RenderGroup;
use crate::instructions::Renderable;
use crate::layer::RenderLayer;
use crate::transform::TransformParams;

/// Transform parameters and the matrices derived from them.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TransformState {
    pub(crate) params: TransformParams,
    /// `params` composed; valid while `local_tick` equals the structure tick.
    pub(crate) local: Affine,
    /// Local transform composed up to the enclosing render group boundary.
    pub(crate) relative_group: Affine,
    pub(crate) local_tick: u32,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            params: TransformParams::IDENTITY,
            local: Affine::IDENTITY,
            relative_group: Affine::IDENTITY,
            local_tick: 0,
        }
    }
}

/// Local visual properties and their group-resolved values.
#[derive(Clone, Copy, Debug)]
pub(crate) struct VisualState {
    pub(crate) local_alpha: f32,
    pub(crate) group_alpha: f32,
    /// Packed BGR.
    pub(crate) local_color: u32,
    /// Packed BGR.
    pub(crate) group_color: u32,
    pub(crate) local_blend: BlendMode,
    pub(crate) group_blend: BlendMode,
    pub(crate) local_status: DisplayStatus,
    pub(crate) global_status: DisplayStatus,
    pub(crate) include_in_build: bool,
    pub(crate) measurable: bool,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            local_alpha: 1.0,
            group_alpha: 1.0,
            local_color: WHITE_BGR,
            group_color: WHITE_BGR,
            local_blend: BlendMode::Inherit,
            group_blend: BlendMode::Normal,
            local_status: DisplayStatus::ALL,
            global_status: DisplayStatus::ALL,
            include_in_build: true,
            measurable: true,
        }
    }
}

/// Change counters and update-pass bookkeeping.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChangeState {
    pub(crate) uid: u32,
    pub(crate) structure_tick: u32,
    pub(crate) view_tick: u32,
    /// Set once the node is queued with its render group; cleared by the
    /// update pass.
    pub(crate) did_change: bool,
    pub(crate) update_flags: UpdateFlags,
    /// The group update tick this node was last recomputed in.
    pub(crate) update_tick: u32,
}

impl ChangeState {
    pub(crate) fn new() -> Self {
        Self {
            uid: next_uid(),
            structure_tick: 0,
            view_tick: 0,
            did_change: true,
            update_flags: UpdateFlags::ALL,
            update_tick: NEVER_UPDATED,
        }
    }
}

/// Update tick value meaning "not recomputed in any pass yet".
pub(crate) const NEVER_UPDATED: u32 = u32::MAX;

/// Link to the enclosing render group.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GroupLink {
    /// Slot of the enclosing group's boundary node.
    pub(crate) parent_group: u32,
    /// Depth below the boundary (direct children of the boundary are 1).
    pub(crate) relative_depth: u32,
}

impl Default for GroupLink {
    fn default() -> Self {
        Self {
            parent_group: INVALID,
            relative_depth: 0,
        }
    }
}

/// Z-ordering state of a node and its children.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ChildOrder {
    pub(crate) z_index: i32,
    pub(crate) sortable_children: bool,
    pub(crate) sort_dirty: bool,
}

/// Explicit bounds area and the cached local bounds.
#[derive(Clone, Debug, Default)]
pub(crate) struct BoundsState {
    pub(crate) area: Option<Rect>,
    pub(crate) cache: Option<Box<LocalBoundsCache>>,
}

/// Culling configuration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CullState {
    pub(crate) cullable: bool,
    pub(crate) cullable_children: bool,
    pub(crate) cull_area: Option<Rect>,
}

impl Default for CullState {
    fn default() -> Self {
        Self {
            cullable: false,
            cullable_children: true,
            cull_area: None,
        }
    }
}

/// Struct-of-arrays storage for a scene graph.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// Every scene owns a root node that is always a render group; nodes created
/// with [`create_node`](Self::create_node) start detached and take part in
/// transform updates and instruction collection once added below the root.
pub struct Scene {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Local properties --
    pub(crate) transform: Vec<TransformState>,
    pub(crate) visual: Vec<VisualState>,
    pub(crate) order: Vec<ChildOrder>,
    pub(crate) label: Vec<Option<String>>,
    pub(crate) content: Vec<Option<Box<dyn Renderable>>>,
    pub(crate) effects: Vec<Vec<EffectEntry>>,
    pub(crate) bounds: Vec<BoundsState>,
    pub(crate) cull: Vec<CullState>,

    // -- Change tracking --
    pub(crate) change: Vec<ChangeState>,

    // -- Grouping and layering --
    pub(crate) group_link: Vec<GroupLink>,
    pub(crate) render_group: Vec<Option<Box<RenderGroup>>>,
    pub(crate) parent_layer: Vec<u32>,
    pub(crate) render_layer: Vec<Option<Box<RenderLayer>>>,

    // -- Events --
    pub(crate) listeners: Vec<Vec<ListenerEntry>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) next_effect: u32,
    pub(crate) next_listener: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    /// Number of live cache-as-texture groups.
    pub(crate) cached_groups: u32,

    // -- Scene --
    pub(crate) root: u32,
    pub(crate) config: SceneConfig,
    pub(crate) frame_index: u64,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("root", &self.root)
            .field("frame_index", &self.frame_index)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates a scene with the default [`SceneConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SceneConfig::new())
    }

    /// Creates a scene with the given configuration.
    #[must_use]
    pub fn with_config(config: SceneConfig) -> Self {
        let cap = config.initial_capacity;
        let mut scene = Self {
            parent: Vec::with_capacity(cap),
            children: Vec::with_capacity(cap),
            transform: Vec::with_capacity(cap),
            visual: Vec::with_capacity(cap),
            order: Vec::with_capacity(cap),
            label: Vec::with_capacity(cap),
            content: Vec::with_capacity(cap),
            effects: Vec::with_capacity(cap),
            bounds: Vec::with_capacity(cap),
            cull: Vec::with_capacity(cap),
            change: Vec::with_capacity(cap),
            group_link: Vec::with_capacity(cap),
            render_group: Vec::with_capacity(cap),
            parent_layer: Vec::with_capacity(cap),
            render_layer: Vec::with_capacity(cap),
            listeners: Vec::with_capacity(cap),
            generation: Vec::with_capacity(cap),
            alive: Vec::with_capacity(cap),
            free_list: Vec::new(),
            len: 0,
            next_effect: 0,
            next_listener: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            cached_groups: 0,
            root: INVALID,
            config,
            frame_index: 0,
        };
        let root = scene.create_node();
        scene.enable_render_group(root);
        scene.root = root.idx;
        scene
    }

    /// Returns the configuration this scene was created with.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts with identity transform parameters, full opacity,
    /// white tint, inherited blend mode, every display bit set, no content,
    /// and no parent.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; `free_slot` already reset its properties.
            self.alive[idx as usize] = true;
            self.change[idx as usize] = ChangeState::new();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.transform.push(TransformState::default());
            self.visual.push(VisualState::default());
            self.order.push(ChildOrder::default());
            self.label.push(None);
            self.content.push(None);
            self.effects.push(Vec::new());
            self.bounds.push(BoundsState::default());
            self.cull.push(CullState::default());
            self.change.push(ChangeState::new());
            self.group_link.push(GroupLink::default());
            self.render_group.push(None);
            self.parent_layer.push(INVALID);
            self.render_layer.push(None);
            self.listeners.push(Vec::new());
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        log::trace!("created node {idx}");
        self.id_at(idx)
    }

    /// Creates a detached node holding `content`.
    pub fn create_node_with(&mut self, content: Box<dyn Renderable>) -> NodeId {
        let id = self.create_node();
        self.content[id.idx as usize] = Some(content);
        id
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.alive[id.idx as usize]
            && self.generation[id.idx as usize] == id.generation
    }

    /// Returns the number of live nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns the scene root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.id_at(self.root)
    }

    // -- Topology queries --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node in paint order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.children[id.idx as usize].len()
    }

    /// Returns the process-unique uid assigned when the node was created.
    #[must_use]
    pub fn uid(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.change[id.idx as usize].uid
    }

    /// Returns whether `ancestor` is `id` itself or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.validate(ancestor);
        self.validate(id);
        self.is_ancestor_or_self_at(ancestor.idx, id.idx)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds a handle for a live slot.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn is_ancestor_or_self_at(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Releases a slot whose topology has already been dismantled.
    ///
    /// Drops content, effects, listeners and caches, and bumps the generation
    /// so old handles immediately fail validation.
    pub(crate) fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        debug_assert!(self.children[i].is_empty(), "freeing a slot with children");
        debug_assert!(self.parent[i] == INVALID, "freeing an attached slot");

        self.dirty.remove_key(idx);

        self.transform[i] = TransformState::default();
        self.visual[i] = VisualState::default();
        self.order[i] = ChildOrder::default();
        self.label[i] = None;
        self.content[i] = None;
        self.effects[i].clear();
        self.bounds[i] = BoundsState::default();
        self.cull[i] = CullState::default();
        self.group_link[i] = GroupLink::default();
        self.render_group[i] = None;
        self.parent_layer[i] = INVALID;
        self.render_layer[i] = None;
        self.listeners[i].clear();

        self.generation[i] = self.generation[i].wrapping_add(1);
        self.alive[i] = false;
        self.free_list.push(idx);
        log::trace!("freed node {idx}");
    }

    /// The render group that owns `idx`'s children: `idx` itself when it is
    /// a boundary, otherwise `idx`'s enclosing group.
    #[inline]
    pub(crate) fn enclosing_group_for_children(&self, idx: u32) -> u32 {
        if self.render_group[idx as usize].is_some() {
            idx
        } else {
            self.group_link[idx as usize].parent_group
        }
    }

    /// Flags the structure of the group `idx` is registered with.
    pub(crate) fn mark_parent_group_structure(&mut self, idx: u32) {
        let g = self.group_link[idx as usize].parent_group;
        self.mark_group_structure(g);
    }

    /// Flags the structure of the group that owns `idx`'s children.
    pub(crate) fn mark_children_group_structure(&mut self, idx: u32) {
        let g = self.enclosing_group_for_children(idx);
        self.mark_group_structure(g);
    }

    pub(crate) fn mark_group_structure(&mut self, g: u32) {
        if g == INVALID {
            return;
        }
        if let Some(group) = self.render_group[g as usize].as_deref_mut() {
            group.structure_did_change = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        assert!(scene.is_alive(id));
        scene.destroy(id, crate::DestroyOptions::default());
        assert!(!scene.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut scene = Scene::new();
        let id1 = scene.create_node();
        scene.destroy(id1, crate::DestroyOptions::default());
        let id2 = scene.create_node();
        // id2 reuses the same slot but has a different generation.
        assert!(!scene.is_alive(id1));
        assert!(scene.is_alive(id2));
        assert_eq!(id1.idx, id2.idx);
        assert_ne!(id1.generation, id2.generation);
    }

    #[test]
    fn reused_slot_gets_a_fresh_uid_and_defaults() {
        let mut scene = Scene::new();
        let id1 = scene.create_node();
        scene.set_alpha(id1, 0.25);
        let uid1 = scene.uid(id1);
        scene.destroy(id1, crate::DestroyOptions::default());
        let id2 = scene.create_node();
        assert_ne!(scene.uid(id2), uid1);
        assert!((scene.alpha(id2) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn root_is_a_render_group() {
        let scene = Scene::new();
        let root = scene.root();
        assert!(scene.is_render_group(root));
        assert_eq!(scene.parent(root), None);
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn children_iterates_in_order() {
        let mut scene = Scene::new();
        let parent = scene.create_node();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(parent, a).unwrap();
        scene.add_child(parent, b).unwrap();

        let kids: Vec<_> = scene.children(parent).collect();
        assert_eq!(kids, vec![a, b]);
        assert_eq!(scene.child_count(parent), 2);
        assert_eq!(scene.parent(a), Some(parent));
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.destroy(id, crate::DestroyOptions::default());
        let _ = scene.parent(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_set_position() {
        let mut scene = Scene::new();
        let id = scene.create_node();
        scene.destroy(id, crate::DestroyOptions::default());
        scene.set_position(id, (1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_add_child() {
        let mut scene = Scene::new();
        let root = scene.root();
        let id = scene.create_node();
        scene.destroy(id, crate::DestroyOptions::default());
        let _ = scene.add_child(root, id);
    }
}
