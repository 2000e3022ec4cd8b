// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-space transform, position, alpha, and tint queries.
//!
//! Each query comes in two flavors selected by `skip_update`:
//!
//! - `false` composes live through the parent chain, refreshing local
//!   transforms on the way. Always current, costs one walk to the root.
//! - `true` reads values cached by the last
//!   [`update_transforms`](Scene::update_transforms) pass. Mutations since
//!   that pass are not reflected.

use kurbo::{Affine, Point};

use super::id::{INVALID, NodeId};
use super::store::Scene;
use crate::color::{bgr_to_rgb, clamp_alpha, multiply_colors};

impl Scene {
    /// Returns the node's transform to world space.
    pub fn global_transform(&mut self, id: NodeId, skip_update: bool) -> Affine {
        self.validate(id);
        if skip_update {
            self.world_transform_at(id.idx)
        } else {
            self.live_global_transform_at(id.idx)
        }
    }

    /// Returns the cached world transform: the enclosing render group's world
    /// transform composed with the node's group transform.
    ///
    /// Nodes outside any render group (detached subtrees) compose their
    /// parameters up the parent chain instead.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_transform_at(id.idx)
    }

    /// Returns the local transform composed up to the enclosing render group
    /// boundary, as of the last update pass.
    #[must_use]
    pub fn relative_group_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.transform[id.idx as usize].relative_group
    }

    /// Returns the transform used to draw the node inside its render group:
    /// identity for a boundary node, otherwise the relative group transform.
    #[must_use]
    pub fn group_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.group_transform_at(id.idx)
    }

    /// Maps a point in the node's local space to world space.
    pub fn to_global(&mut self, id: NodeId, point: Point, skip_update: bool) -> Point {
        self.global_transform(id, skip_update) * point
    }

    /// Maps a world-space point into the node's local space.
    pub fn to_local(&mut self, id: NodeId, point: Point, skip_update: bool) -> Point {
        self.global_transform(id, skip_update).inverse() * point
    }

    /// Maps a point in `from`'s local space into `id`'s local space.
    pub fn to_local_from(
        &mut self,
        id: NodeId,
        from: NodeId,
        point: Point,
        skip_update: bool,
    ) -> Point {
        let world = self.to_global(from, point, skip_update);
        self.to_local(id, world, skip_update)
    }

    /// Returns the node's position in world space.
    pub fn global_position(&mut self, id: NodeId, skip_update: bool) -> Point {
        self.validate(id);
        let position = self.transform[id.idx as usize].params.position;
        match self.parent[id.idx as usize] {
            INVALID => position,
            p => self.global_transform(self.id_at(p), skip_update) * position,
        }
    }

    /// Returns the node's alpha multiplied by its ancestors'.
    ///
    /// With `skip_update`, a boundary node returns its group's world alpha and
    /// any other node its enclosing group's world alpha times its own local
    /// alpha; ancestors between the node and the boundary are not included.
    #[must_use]
    pub fn global_alpha(&self, id: NodeId, skip_update: bool) -> f32 {
        self.validate(id);
        let i = id.idx as usize;
        if skip_update {
            if let Some(group) = self.render_group[i].as_deref() {
                return group.world_alpha;
            }
            let local = self.visual[i].local_alpha;
            return match self.group_at(self.group_link[i].parent_group) {
                Some(group) => group.world_alpha * local,
                None => local,
            };
        }
        let mut alpha = self.visual[i].local_alpha;
        let mut cur = self.parent[i];
        while cur != INVALID {
            alpha *= self.visual[cur as usize].local_alpha;
            cur = self.parent[cur as usize];
        }
        clamp_alpha(alpha)
    }

    /// Returns the node's tint multiplied by its ancestors', as `0xRRGGBB`.
    ///
    /// `skip_update` has the same shortcut semantics as for
    /// [`global_alpha`](Self::global_alpha).
    #[must_use]
    pub fn global_tint(&self, id: NodeId, skip_update: bool) -> u32 {
        self.validate(id);
        let i = id.idx as usize;
        let bgr = if skip_update {
            if let Some(group) = self.render_group[i].as_deref() {
                group.world_color
            } else {
                let local = self.visual[i].local_color;
                match self.group_at(self.group_link[i].parent_group) {
                    Some(group) => multiply_colors(local, group.world_color),
                    None => local,
                }
            }
        } else {
            let mut color = self.visual[i].local_color;
            let mut cur = self.parent[i];
            while cur != INVALID {
                color = multiply_colors(color, self.visual[cur as usize].local_color);
                cur = self.parent[cur as usize];
            }
            color
        };
        bgr_to_rgb(bgr)
    }

    // -- Internal helpers --

    pub(crate) fn group_transform_at(&self, idx: u32) -> Affine {
        if self.render_group[idx as usize].is_some() {
            Affine::IDENTITY
        } else {
            self.transform[idx as usize].relative_group
        }
    }

    pub(crate) fn world_transform_at(&self, idx: u32) -> Affine {
        let i = idx as usize;
        if let Some(group) = self.render_group[i].as_deref() {
            return group.world_transform;
        }
        match self.group_at(self.group_link[i].parent_group) {
            Some(group) => group.world_transform * self.transform[i].relative_group,
            None => self.composed_params_at(idx),
        }
    }

    /// Composes transform parameters up the parent chain without touching
    /// any cache.
    fn composed_params_at(&self, mut idx: u32) -> Affine {
        let mut m = Affine::IDENTITY;
        while idx != INVALID {
            m = self.transform[idx as usize].params.to_affine() * m;
            idx = self.parent[idx as usize];
        }
        m
    }

    pub(crate) fn live_global_transform_at(&mut self, mut idx: u32) -> Affine {
        let mut m = Affine::IDENTITY;
        while idx != INVALID {
            self.update_local_transform_at(idx);
            m = self.transform[idx as usize].local * m;
            idx = self.parent[idx as usize];
        }
        m
    }
}
