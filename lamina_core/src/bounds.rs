// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounds of subtrees.
//!
//! Bounds are measured by walking a subtree and adding the transformed
//! content rectangle of every node. A node with a
//! [`bounds_area`](Scene::bounds_area) contributes that rectangle instead
//! and its subtree is not visited. Children that are hidden or not
//! [`measurable`](Scene::measurable) are skipped. A node with effects
//! measures its subtree separately and lets each [`Effect`] adjust the
//! result before it is merged, so a mask can clip what it covers.
//!
//! [`local_bounds`](Scene::local_bounds) results are cached per node and
//! re-measured only when the subtree's [`ChangeSnapshot`] reports a change.
//!
//! [`Effect`]: crate::instructions::Effect

use kurbo::{Affine, Point, Rect};

use crate::change::ChangeSnapshot;
use crate::node::flags::DisplayStatus;
use crate::node::{NodeId, Scene};

/// A min/max box, empty when inverted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// Bounds containing nothing; the identity for unions.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Creates bounds covering `rect`.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            min_x: rect.x0,
            min_y: rect.y0,
            max_x: rect.x1,
            max_y: rect.y1,
        }
    }

    /// Returns whether the bounds contain nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grows the bounds to cover `rect` mapped through `transform`.
    pub fn add_rect(&mut self, rect: Rect, transform: Affine) {
        let r = if transform == Affine::IDENTITY {
            rect.abs()
        } else {
            transform.transform_rect_bbox(rect)
        };
        self.min_x = self.min_x.min(r.x0);
        self.min_y = self.min_y.min(r.y0);
        self.max_x = self.max_x.max(r.x1);
        self.max_y = self.max_y.max(r.y1);
    }

    /// Grows the bounds to cover `other` mapped through `transform`.
    pub fn add_bounds(&mut self, other: &Self, transform: Affine) {
        if !other.is_empty() {
            self.add_rect(other.rect(), transform);
        }
    }

    /// Returns the smallest bounds covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Shrinks the bounds to their overlap with `rect`.
    pub fn intersect_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.min_x = self.min_x.max(rect.x0);
        self.min_y = self.min_y.max(rect.y0);
        self.max_x = self.max_x.min(rect.x1);
        self.max_y = self.max_y.min(rect.y1);
    }

    /// Returns whether the bounds overlap `rect`. Touching edges count.
    #[must_use]
    pub fn intersects(&self, rect: Rect) -> bool {
        let rect = rect.abs();
        !self.is_empty()
            && self.min_x <= rect.x1
            && self.max_x >= rect.x0
            && self.min_y <= rect.y1
            && self.max_y >= rect.y0
    }

    /// Returns the bounds as a rectangle, [`Rect::ZERO`] when empty.
    #[must_use]
    pub fn rect(&self) -> Rect {
        if self.is_empty() {
            Rect::ZERO
        } else {
            Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
        }
    }

    /// Returns the width, zero when empty.
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_x - self.min_x }
    }

    /// Returns the height, zero when empty.
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_y - self.min_y }
    }

    /// Returns whether `point` lies inside, edges included.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Cached result of [`Scene::local_bounds`].
#[derive(Clone, Debug, Default)]
pub(crate) struct LocalBoundsCache {
    snapshot: ChangeSnapshot,
    bounds: Bounds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Measure {
    /// Compose refreshed local transforms below the measured node.
    Composed,
    /// Read cached world transforms.
    Cached,
}

impl Scene {
    /// Returns the bounds of the node's subtree in its own local space.
    ///
    /// The node's own transform is not applied. The result is cached and
    /// re-measured only when something in the subtree changed.
    pub fn local_bounds(&mut self, id: NodeId) -> Bounds {
        self.validate(id);
        let i = id.idx as usize;
        let mut cache = self.bounds[i].cache.take().unwrap_or_default();
        if self.subtree_changed_at(id.idx, &mut cache.snapshot) {
            let mut bounds = Bounds::EMPTY;
            self.accumulate_bounds(id.idx, &mut bounds, Affine::IDENTITY, Measure::Composed);
            cache.bounds = bounds;
        }
        let bounds = cache.bounds;
        self.bounds[i].cache = Some(cache);
        bounds
    }

    /// Returns the bounds of the node's subtree in world space.
    ///
    /// With `skip_update`, world transforms cached by the last
    /// [`update_transforms`](Self::update_transforms) pass are used;
    /// otherwise transforms are composed live. A hidden or unmeasurable node
    /// has empty bounds.
    pub fn bounds(&mut self, id: NodeId, skip_update: bool) -> Bounds {
        self.validate(id);
        let idx = id.idx;
        let mut bounds = Bounds::EMPTY;
        if !self.is_measured(idx) {
            return bounds;
        }
        if skip_update {
            let world = self.world_transform_at(idx);
            self.accumulate_bounds(idx, &mut bounds, world, Measure::Cached);
        } else {
            let world = self.live_global_transform_at(idx);
            self.accumulate_bounds(idx, &mut bounds, world, Measure::Composed);
        }
        bounds
    }

    fn is_measured(&self, idx: u32) -> bool {
        let v = &self.visual[idx as usize];
        v.measurable && v.local_status.contains(DisplayStatus::VISIBLE)
    }

    /// Adds `idx`'s subtree to `out`; `transform` maps `idx`'s local space
    /// into the space of `out`.
    fn accumulate_bounds(&mut self, idx: u32, out: &mut Bounds, transform: Affine, mode: Measure) {
        let i = idx as usize;
        let has_effects = !self.effects[i].is_empty();
        let mut own = Bounds::EMPTY;
        let target = if has_effects { &mut own } else { &mut *out };

        if let Some(area) = self.bounds[i].area {
            target.add_rect(area, transform);
        } else {
            if let Some(rect) = self.content[i].as_deref().and_then(|c| c.content_bounds()) {
                target.add_rect(rect, transform);
            }
            for k in 0..self.children[i].len() {
                let c = self.children[i][k];
                if !self.is_measured(c) {
                    continue;
                }
                let child_transform = match mode {
                    Measure::Composed => {
                        self.update_local_transform_at(c);
                        transform * self.transform[c as usize].local
                    }
                    Measure::Cached => self.world_transform_at(c),
                };
                self.accumulate_bounds(c, target, child_transform, mode);
            }
        }

        if has_effects {
            for entry in &self.effects[i] {
                entry.effect.add_bounds(&mut own, transform);
            }
            out.add_bounds(&own, Affine::IDENTITY);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;
    use crate::instructions::{Effect, PipeId, Renderable};

    struct Square(f64);

    impl Renderable for Square {
        fn render_pipe(&self) -> PipeId {
            PipeId(1)
        }
        fn content_bounds(&self) -> Option<Rect> {
            Some(Rect::new(0.0, 0.0, self.0, self.0))
        }
    }

    /// Clips to a local-space rectangle.
    struct Clip(Rect);

    impl Effect for Clip {
        fn pipe(&self) -> PipeId {
            PipeId(2)
        }
        fn add_bounds(&self, bounds: &mut Bounds, transform: Affine) {
            bounds.intersect_rect(transform.transform_rect_bbox(self.0));
        }
    }

    fn squares() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.create_node_with(Box::new(Square(10.0)));
        let b = scene.create_node_with(Box::new(Square(10.0)));
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.set_x(b, 20.0);
        (scene, a, b)
    }

    #[test]
    fn empty_bounds() {
        let b = Bounds::EMPTY;
        assert!(b.is_empty());
        assert_eq!(b.rect(), Rect::ZERO);
        assert_eq!(b.width(), 0.0);
        assert!(!b.contains(Point::ZERO));
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(b.union(&Bounds::from_rect(r)).rect(), r);
    }

    #[test]
    fn rotated_rect_uses_its_bounding_box() {
        let mut b = Bounds::EMPTY;
        b.add_rect(
            Rect::new(-1.0, -1.0, 1.0, 1.0),
            Affine::rotate(core::f64::consts::FRAC_PI_4),
        );
        let half = core::f64::consts::SQRT_2;
        assert!((b.width() - 2.0 * half).abs() < 1e-9);
        assert!((b.height() - 2.0 * half).abs() < 1e-9);
    }

    #[test]
    fn local_bounds_ignore_the_node_transform() {
        let (mut scene, a, _) = squares();
        scene.set_position(a, (100.0, 100.0));
        assert_eq!(scene.local_bounds(a).rect(), Rect::new(0.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn local_bounds_are_recomputed_after_changes() {
        let (mut scene, a, b) = squares();
        assert_eq!(scene.local_bounds(a).width(), 30.0);
        assert_eq!(scene.local_bounds(a).width(), 30.0);
        scene.set_x(b, 40.0);
        assert_eq!(scene.local_bounds(a).width(), 50.0);
        scene.set_measurable(b, false);
        assert_eq!(scene.local_bounds(a).width(), 10.0);
    }

    #[test]
    fn cached_world_bounds_are_stale_until_updated() {
        let (mut scene, a, _) = squares();
        scene.update_transforms();
        assert_eq!(scene.bounds(a, true).rect(), Rect::new(0.0, 0.0, 30.0, 10.0));

        scene.set_x(a, 5.0);
        assert_eq!(scene.bounds(a, true).rect(), Rect::new(0.0, 0.0, 30.0, 10.0));
        assert_eq!(scene.bounds(a, false).rect(), Rect::new(5.0, 0.0, 35.0, 10.0));
        scene.update_transforms();
        assert_eq!(scene.bounds(a, true).rect(), Rect::new(5.0, 0.0, 35.0, 10.0));
    }

    #[test]
    fn bounds_area_replaces_the_subtree() {
        let (mut scene, a, _) = squares();
        scene.set_bounds_area(a, Some(Rect::new(-5.0, -5.0, 5.0, 5.0)));
        assert_eq!(scene.local_bounds(a).rect(), Rect::new(-5.0, -5.0, 5.0, 5.0));
        assert_eq!(scene.bounds(a, false).rect(), Rect::new(-5.0, -5.0, 5.0, 5.0));
    }

    #[test]
    fn hidden_nodes_do_not_count() {
        let (mut scene, a, b) = squares();
        scene.set_visible(b, false);
        assert_eq!(scene.local_bounds(a).width(), 10.0);
        scene.set_visible(a, false);
        assert!(scene.bounds(a, false).is_empty());
    }

    #[test]
    fn effects_adjust_subtree_bounds() {
        let (mut scene, a, _) = squares();
        scene.set_x(a, 100.0);
        scene.add_effect(a, Box::new(Clip(Rect::new(0.0, 0.0, 15.0, 15.0))));
        assert_eq!(scene.local_bounds(a).rect(), Rect::new(0.0, 0.0, 15.0, 10.0));
        assert_eq!(scene.bounds(a, false).rect(), Rect::new(100.0, 0.0, 115.0, 10.0));
    }
}
