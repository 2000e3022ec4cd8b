// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The transform update pass.
//!
//! For each render group, top-down from the scene root:
//!
//! 1. Recompute the group's world transform, color, and alpha from the
//!    boundary's relative values and the enclosing group's world values.
//! 2. Walk the per-depth worklists shallowest first. Each queued node whose
//!    group link still matches recomputes its relative transform and any
//!    flagged color, blend, and visibility values from its parent, then does
//!    the same for its descendants. A node reached twice in one pass (queued
//!    itself and below a queued ancestor) is recomputed once.
//! 3. Recurse into nested groups.
//!
//! Hidden nodes stop the walk: their descendants are recomputed when they
//! become visible again.

use crate::color::{WHITE_BGR, clamp_alpha, multiply_colors};
use crate::node::flags::{BlendMode, DisplayStatus, UpdateFlags};
use crate::node::{INVALID, Scene};
use crate::trace::{FrameSummaryBuilder, GroupUpdateEvent, Tracer};

impl Scene {
    /// Recomputes group-relative transforms, colors, and visibility for every
    /// node queued since the last pass, and the world values of every render
    /// group. Returns the number of nodes recomputed.
    pub fn update_transforms(&mut self) -> u32 {
        let mut summary = FrameSummaryBuilder::new(self.frame_index);
        self.update_transforms_traced(&mut Tracer::none(), &mut summary);
        summary.finish().nodes_updated
    }

    pub(crate) fn update_transforms_traced(
        &mut self,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) {
        self.update_group_transforms(self.root, tracer, summary);
    }

    fn update_group_transforms(
        &mut self,
        g: u32,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
    ) {
        self.update_group_world(g);

        let Some(group) = self.render_group[g as usize].as_deref_mut() else {
            return;
        };
        let tick = group.update_tick;
        group.update_tick = group.update_tick.wrapping_add(1);
        let mut lists = core::mem::take(&mut group.children_to_update);

        let mut count = 0;
        for (depth, list) in lists.iter_mut().enumerate() {
            for &c in list.iter() {
                let link = self.group_link[c as usize];
                if self.alive[c as usize]
                    && link.parent_group == g
                    && link.relative_depth as usize == depth
                {
                    count += self.update_transform_and_children(c, tick, UpdateFlags::NONE);
                }
            }
            list.clear();
        }

        let child_groups = match self.render_group[g as usize].as_deref_mut() {
            Some(group) => {
                // Keep the allocations; nothing is queued during the pass.
                group.children_to_update = lists;
                group.child_groups.clone()
            }
            None => return,
        };

        summary.group_updated(count);
        tracer.group_update(&GroupUpdateEvent {
            frame_index: self.frame_index,
            group_index: g,
            nodes_updated: count,
        });

        for cg in child_groups {
            self.update_group_transforms(cg, tracer, summary);
        }
    }

    fn update_group_world(&mut self, g: u32) {
        self.update_local_transform_at(g);
        let i = g as usize;
        let parent = self.render_group[i].as_deref().map_or(INVALID, |grp| grp.parent);

        let (world, color, alpha) = match self.group_at(parent) {
            Some(pg) => (
                pg.world_transform * self.transform[i].relative_group,
                multiply_colors(self.visual[i].group_color, pg.world_color),
                clamp_alpha(self.visual[i].group_alpha * pg.world_alpha),
            ),
            None => (
                self.transform[i].local,
                self.visual[i].local_color,
                clamp_alpha(self.visual[i].local_alpha),
            ),
        };

        if let Some(group) = self.render_group[i].as_deref_mut() {
            group.world_transform = world;
            group.world_color = color;
            group.world_alpha = alpha;
        }
    }

    fn update_transform_and_children(&mut self, c: u32, tick: u32, flags: UpdateFlags) -> u32 {
        let i = c as usize;
        if self.change[i].update_tick == tick {
            return 0;
        }
        self.change[i].update_tick = tick;
        self.change[i].did_change = false;
        self.update_local_transform_at(c);

        let p = self.parent[i];
        let local = self.transform[i].local;
        let mut flags = flags;
        if p != INVALID && self.render_group[p as usize].is_none() {
            flags |= self.change[i].update_flags;
            self.transform[i].relative_group = self.transform[p as usize].relative_group * local;
            if !flags.is_empty() {
                self.update_color_blend_visibility(c, Some(p), flags);
            }
        } else {
            flags = self.change[i].update_flags;
            self.transform[i].relative_group = local;
            if !flags.is_empty() {
                self.update_color_blend_visibility(c, None, flags);
            }
        }

        let mut count = 1;
        if self.render_group[i].is_none()
            && self.visual[i].local_status.contains(DisplayStatus::VISIBLE)
        {
            for k in 0..self.children[i].len() {
                let child = self.children[i][k];
                count += self.update_transform_and_children(child, tick, flags);
            }
        }
        count
    }

    /// Resolves the flagged visual values of `c` against its parent, or
    /// against neutral values when the parent is a boundary.
    fn update_color_blend_visibility(&mut self, c: u32, parent: Option<u32>, flags: UpdateFlags) {
        let (p_color, p_alpha, p_blend, p_status) = match parent {
            Some(p) => {
                let pv = &self.visual[p as usize];
                (pv.group_color, pv.group_alpha, pv.group_blend, pv.global_status)
            }
            None => (WHITE_BGR, 1.0, BlendMode::Normal, DisplayStatus::ALL),
        };

        let v = &mut self.visual[c as usize];
        if flags.contains(UpdateFlags::COLOR) {
            v.group_color = multiply_colors(v.local_color, p_color);
            v.group_alpha = clamp_alpha(v.local_alpha * p_alpha);
        }
        if flags.contains(UpdateFlags::BLEND) {
            v.group_blend = v.local_blend.resolve(p_blend);
        }
        if flags.contains(UpdateFlags::VISIBLE) {
            v.global_status = v.local_status & p_status;
        }
        self.change[c as usize].update_flags = UpdateFlags::NONE;
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use crate::node::flags::{BlendMode, DisplayStatus};
    use crate::node::Scene;

    #[test]
    fn only_queued_nodes_are_recomputed() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        assert_eq!(scene.update_transforms(), 2);
        assert_eq!(scene.update_transforms(), 0);

        scene.set_x(b, 4.0);
        assert_eq!(scene.update_transforms(), 1);
        assert_eq!(scene.world_transform(b).translation(), Vec2::new(4.0, 0.0));
    }

    #[test]
    fn queued_ancestor_covers_queued_descendant() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.update_transforms();

        scene.set_x(b, 1.0);
        scene.set_x(a, 1.0);
        // `b` is queued at depth 2 and reached again from `a`; counted once.
        assert_eq!(scene.update_transforms(), 2);
        assert_eq!(scene.world_transform(b).translation(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn color_and_alpha_compose_within_the_group() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.set_alpha(a, 0.5);
        scene.set_alpha(b, 4.0);
        scene.set_tint(a, 0xFF_00_00);
        scene.update_transforms();

        let eps = 1e-6;
        assert!((scene.group_alpha(a) - 0.5).abs() < eps);
        // Clamped when composed.
        assert!((scene.group_alpha(b) - 1.0).abs() < eps);
        assert_eq!(scene.group_color_alpha(b) & 0x00FF_FFFF, 0x00_00_FF);
    }

    #[test]
    fn blend_mode_inherits_until_overridden() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.update_transforms();
        assert_eq!(scene.group_blend_mode(b), BlendMode::Normal);

        scene.set_blend_mode(a, BlendMode::Add);
        scene.update_transforms();
        assert_eq!(scene.group_blend_mode(b), BlendMode::Add);

        scene.set_blend_mode(b, BlendMode::Screen);
        scene.update_transforms();
        assert_eq!(scene.group_blend_mode(b), BlendMode::Screen);
    }

    #[test]
    fn hidden_subtree_catches_up_when_shown() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.update_transforms();

        scene.set_visible(a, false);
        scene.set_x(a, 10.0);
        scene.update_transforms();
        assert!(!scene.global_display_status(a).contains(DisplayStatus::VISIBLE));
        // Propagation stopped at the hidden node.
        assert_eq!(scene.world_transform(b).translation(), Vec2::ZERO);

        scene.set_visible(a, true);
        scene.update_transforms();
        assert_eq!(scene.world_transform(b).translation(), Vec2::new(10.0, 0.0));
        assert_eq!(scene.global_display_status(b), DisplayStatus::ALL);
    }

    #[test]
    fn renderable_off_still_updates_descendants() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.set_renderable(a, false);
        scene.set_x(a, 3.0);
        scene.update_transforms();
        assert_eq!(scene.world_transform(b).translation(), Vec2::new(3.0, 0.0));
        assert!(!scene.global_display_status(b).contains(DisplayStatus::RENDERABLE));
    }

    #[test]
    fn group_world_alpha_multiplies_nested_groups() {
        let mut scene = Scene::new();
        let root = scene.root();
        let outer = scene.create_node();
        let inner = scene.create_node();
        scene.add_child(root, outer).unwrap();
        scene.add_child(outer, inner).unwrap();
        scene.enable_render_group(outer);
        scene.enable_render_group(inner);
        scene.set_alpha(outer, 0.5);
        scene.set_alpha(inner, 0.5);
        scene.update_transforms();
        let eps = 1e-6;
        assert!((scene.render_group(outer).unwrap().world_alpha() - 0.5).abs() < eps);
        assert!((scene.render_group(inner).unwrap().world_alpha() - 0.25).abs() < eps);
    }
}
