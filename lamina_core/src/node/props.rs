// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local property setters and getters.
//!
//! Every setter is a no-op when the value does not change. Transform and
//! visual setters bump the node's structure tick and queue the node with its
//! render group once per update pass; content setters bump the view tick.

use alloc::boxed::Box;
use alloc::string::String;

use kurbo::{Affine, Point, Rect, Vec2};
use understory_dirty::EagerPolicy;

use super::flags::{BlendMode, DisplayStatus, UpdateFlags};
use super::id::NodeId;
use super::store::Scene;
use crate::color::{bgr_to_rgb, pack_color_alpha, rgb_to_bgr};
use crate::dirty;
use crate::instructions::Renderable;
use crate::transform::TransformParams;

impl Scene {
    // -- Transform parameters --

    /// Sets the position.
    pub fn set_position(&mut self, id: NodeId, position: impl Into<Point>) {
        let position = position.into();
        self.update_params(id, |t| t.position = position);
    }

    /// Sets the x coordinate of the position.
    pub fn set_x(&mut self, id: NodeId, x: f64) {
        self.update_params(id, |t| t.position.x = x);
    }

    /// Sets the y coordinate of the position.
    pub fn set_y(&mut self, id: NodeId, y: f64) {
        self.update_params(id, |t| t.position.y = y);
    }

    /// Sets the per-axis scale.
    pub fn set_scale(&mut self, id: NodeId, scale: impl Into<Vec2>) {
        let scale = scale.into();
        self.update_params(id, |t| t.scale = scale);
    }

    /// Sets the rotation in radians.
    pub fn set_rotation(&mut self, id: NodeId, radians: f64) {
        self.update_params(id, |t| t.rotation = radians);
    }

    /// Sets the rotation in degrees.
    pub fn set_angle(&mut self, id: NodeId, degrees: f64) {
        self.set_rotation(id, degrees.to_radians());
    }

    /// Sets the skew in radians.
    pub fn set_skew(&mut self, id: NodeId, skew: impl Into<Vec2>) {
        let skew = skew.into();
        self.update_params(id, |t| t.skew = skew);
    }

    /// Sets the pivot, the local point that lands on the position.
    pub fn set_pivot(&mut self, id: NodeId, pivot: impl Into<Point>) {
        let pivot = pivot.into();
        self.update_params(id, |t| t.pivot = pivot);
    }

    /// Replaces all transform parameters at once.
    pub fn update_transform(&mut self, id: NodeId, params: TransformParams) {
        self.update_params(id, |t| *t = params);
    }

    /// Sets the transform parameters by decomposing `matrix`, keeping the
    /// current pivot.
    pub fn set_from_matrix(&mut self, id: NodeId, matrix: Affine) {
        self.validate(id);
        let pivot = self.transform[id.idx as usize].params.pivot;
        self.update_transform(id, TransformParams::from_affine(matrix, pivot));
    }

    /// Returns all transform parameters.
    #[must_use]
    pub fn transform_params(&self, id: NodeId) -> TransformParams {
        self.validate(id);
        self.transform[id.idx as usize].params
    }

    /// Returns the position.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.transform_params(id).position
    }

    /// Returns the per-axis scale.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> Vec2 {
        self.transform_params(id).scale
    }

    /// Returns the rotation in radians.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> f64 {
        self.transform_params(id).rotation
    }

    /// Returns the rotation in degrees.
    #[must_use]
    pub fn angle(&self, id: NodeId) -> f64 {
        self.rotation(id).to_degrees()
    }

    /// Returns the skew in radians.
    #[must_use]
    pub fn skew(&self, id: NodeId) -> Vec2 {
        self.transform_params(id).skew
    }

    /// Returns the pivot.
    #[must_use]
    pub fn pivot(&self, id: NodeId) -> Point {
        self.transform_params(id).pivot
    }

    /// Recomputes the local transform if its parameters changed since it was
    /// last composed, and returns it.
    pub fn update_local_transform(&mut self, id: NodeId) -> Affine {
        self.validate(id);
        self.update_local_transform_at(id.idx);
        self.transform[id.idx as usize].local
    }

    /// Returns the local transform, composing it first if stale.
    pub fn local_transform(&mut self, id: NodeId) -> Affine {
        self.update_local_transform(id)
    }

    // -- Visual properties --

    /// Sets the local alpha. Values are clamped when composed, not here.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        self.validate(id);
        let v = &mut self.visual[id.idx as usize];
        if v.local_alpha == alpha {
            return;
        }
        v.local_alpha = alpha;
        self.change[id.idx as usize].update_flags |= UpdateFlags::COLOR;
        self.on_update(id.idx);
    }

    /// Returns the local alpha.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.visual[id.idx as usize].local_alpha
    }

    /// Sets the tint from a `0xRRGGBB` value.
    pub fn set_tint(&mut self, id: NodeId, rgb: u32) {
        self.validate(id);
        let bgr = rgb_to_bgr(rgb & 0x00FF_FFFF);
        let v = &mut self.visual[id.idx as usize];
        if v.local_color == bgr {
            return;
        }
        v.local_color = bgr;
        self.change[id.idx as usize].update_flags |= UpdateFlags::COLOR;
        self.on_update(id.idx);
    }

    /// Returns the tint as `0xRRGGBB`.
    #[must_use]
    pub fn tint(&self, id: NodeId) -> u32 {
        self.validate(id);
        bgr_to_rgb(self.visual[id.idx as usize].local_color)
    }

    /// Sets the blend mode.
    pub fn set_blend_mode(&mut self, id: NodeId, mode: BlendMode) {
        self.validate(id);
        let v = &mut self.visual[id.idx as usize];
        if v.local_blend == mode {
            return;
        }
        v.local_blend = mode;
        self.change[id.idx as usize].update_flags |= UpdateFlags::BLEND;
        self.on_update(id.idx);
    }

    /// Returns the local blend mode.
    #[must_use]
    pub fn blend_mode(&self, id: NodeId) -> BlendMode {
        self.validate(id);
        self.visual[id.idx as usize].local_blend
    }

    /// Shows or hides the node and its subtree.
    ///
    /// Hidden subtrees are skipped by the update pass and by instruction
    /// collection.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.set_status_bit(id, DisplayStatus::VISIBLE, visible);
    }

    /// Returns whether the node itself is visible.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.display_status(id).contains(DisplayStatus::VISIBLE)
    }

    /// Enables or disables drawing of the node and its subtree, while still
    /// updating their transforms.
    pub fn set_renderable(&mut self, id: NodeId, renderable: bool) {
        self.set_status_bit(id, DisplayStatus::RENDERABLE, renderable);
    }

    /// Returns whether the node itself is renderable.
    #[must_use]
    pub fn renderable(&self, id: NodeId) -> bool {
        self.display_status(id).contains(DisplayStatus::RENDERABLE)
    }

    /// Marks the node as culled (not drawn) or not.
    pub fn set_culled(&mut self, id: NodeId, culled: bool) {
        self.set_status_bit(id, DisplayStatus::NOT_CULLED, !culled);
    }

    /// Returns whether the node itself is culled.
    #[must_use]
    pub fn culled(&self, id: NodeId) -> bool {
        !self.display_status(id).contains(DisplayStatus::NOT_CULLED)
    }

    /// Returns the node's own display bits.
    #[must_use]
    pub fn display_status(&self, id: NodeId) -> DisplayStatus {
        self.validate(id);
        self.visual[id.idx as usize].local_status
    }

    /// Returns the display bits combined with every ancestor up to the
    /// enclosing render group boundary, as of the last update pass.
    #[must_use]
    pub fn global_display_status(&self, id: NodeId) -> DisplayStatus {
        self.validate(id);
        self.visual[id.idx as usize].global_status
    }

    /// Includes or excludes the node and its subtree from instruction
    /// collection.
    pub fn set_include_in_build(&mut self, id: NodeId, include: bool) {
        self.validate(id);
        let v = &mut self.visual[id.idx as usize];
        if v.include_in_build == include {
            return;
        }
        v.include_in_build = include;
        self.mark_parent_group_structure(id.idx);
    }

    /// Returns whether the node takes part in instruction collection.
    #[must_use]
    pub fn include_in_build(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visual[id.idx as usize].include_in_build
    }

    /// Includes or excludes the node and its subtree from bounds
    /// measurement.
    pub fn set_measurable(&mut self, id: NodeId, measurable: bool) {
        self.validate(id);
        let v = &mut self.visual[id.idx as usize];
        if v.measurable == measurable {
            return;
        }
        v.measurable = measurable;
        self.bump_view_tick(id.idx);
    }

    /// Returns whether the node contributes to bounds.
    #[must_use]
    pub fn measurable(&self, id: NodeId) -> bool {
        self.validate(id);
        self.visual[id.idx as usize].measurable
    }

    /// Returns the alpha composed up to the render group boundary.
    #[must_use]
    pub fn group_alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.visual[id.idx as usize].group_alpha
    }

    /// Returns the group-composed tint and alpha packed as `0xAABBGGRR`.
    #[must_use]
    pub fn group_color_alpha(&self, id: NodeId) -> u32 {
        self.validate(id);
        let v = &self.visual[id.idx as usize];
        pack_color_alpha(v.group_color, v.group_alpha)
    }

    /// Returns the blend mode resolved up to the render group boundary.
    #[must_use]
    pub fn group_blend_mode(&self, id: NodeId) -> BlendMode {
        self.validate(id);
        self.visual[id.idx as usize].group_blend
    }

    // -- Content --

    /// Replaces the node's renderable content.
    pub fn set_content(&mut self, id: NodeId, content: Option<Box<dyn Renderable>>) {
        self.validate(id);
        let had = self.content[id.idx as usize].is_some();
        self.content[id.idx as usize] = content;
        if had || self.content[id.idx as usize].is_some() {
            self.mark_children_group_structure(id.idx);
            self.on_view_update(id.idx);
        }
    }

    /// Returns the node's renderable content.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<&dyn Renderable> {
        self.validate(id);
        self.content[id.idx as usize].as_deref()
    }

    /// Mutates the node's content in place and records a view change.
    ///
    /// Returns `None` without calling `f` if the node has no content.
    pub fn update_content<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Renderable) -> R,
    ) -> Option<R> {
        self.validate(id);
        let content = self.content[id.idx as usize].as_deref_mut()?;
        let result = f(content);
        self.on_view_update(id.idx);
        Some(result)
    }

    /// Records that the node's content changed outside the scene.
    pub fn mark_view_updated(&mut self, id: NodeId) {
        self.validate(id);
        self.on_view_update(id.idx);
    }

    /// Sets a fixed local-space rectangle that replaces measured bounds for
    /// the node's whole subtree.
    pub fn set_bounds_area(&mut self, id: NodeId, area: Option<Rect>) {
        self.validate(id);
        let b = &mut self.bounds[id.idx as usize];
        if b.area == area {
            return;
        }
        b.area = area;
        self.bump_view_tick(id.idx);
    }

    /// Returns the explicit bounds area.
    #[must_use]
    pub fn bounds_area(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.bounds[id.idx as usize].area
    }

    // -- Label --

    /// Sets the label used by the find-by-label queries.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) {
        self.validate(id);
        self.label[id.idx as usize] = Some(label.into());
    }

    /// Clears the label.
    pub fn clear_label(&mut self, id: NodeId) {
        self.validate(id);
        self.label[id.idx as usize] = None;
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.label[id.idx as usize].as_deref()
    }

    // -- Change counters --

    /// Returns the structure tick, bumped by transform and visual changes.
    #[must_use]
    pub fn structure_tick(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.change[id.idx as usize].structure_tick
    }

    /// Returns the view tick, bumped by content and child list changes.
    #[must_use]
    pub fn view_tick(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.change[id.idx as usize].view_tick
    }

    // -- Internal helpers --

    fn update_params(&mut self, id: NodeId, f: impl FnOnce(&mut TransformParams)) {
        self.validate(id);
        let params = &mut self.transform[id.idx as usize].params;
        let before = *params;
        f(params);
        if *params != before {
            self.on_update(id.idx);
        }
    }

    fn set_status_bit(&mut self, id: NodeId, bit: DisplayStatus, on: bool) {
        self.validate(id);
        let i = id.idx as usize;
        let status = self.visual[i].local_status;
        if status.contains(bit) == on {
            return;
        }
        self.visual[i].local_status = status.with(bit, on);
        self.change[i].update_flags |= UpdateFlags::VISIBLE;
        self.mark_parent_group_structure(id.idx);
        self.on_update(id.idx);
    }

    pub(crate) fn update_local_transform_at(&mut self, idx: u32) {
        let tick = self.change[idx as usize].structure_tick;
        let t = &mut self.transform[idx as usize];
        if t.local_tick == tick {
            return;
        }
        t.local_tick = tick;
        t.local = t.params.to_affine();
    }

    /// A transform or visual property of `idx` changed.
    pub(crate) fn on_update(&mut self, idx: u32) {
        let ch = &mut self.change[idx as usize];
        ch.structure_tick = ch.structure_tick.wrapping_add(1);
        let queued = core::mem::replace(&mut ch.did_change, true);
        self.mark_cache_dirty(idx);
        if queued {
            return;
        }
        let link = self.group_link[idx as usize];
        if let Some(group) = self
            .render_group
            .get_mut(link.parent_group as usize)
            .and_then(|g| g.as_deref_mut())
        {
            group.on_child_update(idx, link.relative_depth);
        }
    }

    /// The content of `idx` changed.
    pub(crate) fn on_view_update(&mut self, idx: u32) {
        self.bump_view_tick(idx);
        self.dirty.mark(idx, dirty::VIEW);
    }

    pub(crate) fn bump_view_tick(&mut self, idx: u32) {
        let ch = &mut self.change[idx as usize];
        ch.view_tick = ch.view_tick.wrapping_add(1);
        self.mark_cache_dirty(idx);
    }

    pub(crate) fn mark_cache_dirty(&mut self, idx: u32) {
        if self.cached_groups > 0 {
            self.dirty.mark_with(idx, dirty::CACHE, &EagerPolicy);
        }
    }
}
