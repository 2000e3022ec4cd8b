// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View culling.

use kurbo::Rect;

use crate::bounds::Bounds;
use crate::node::flags::DisplayStatus;
use crate::node::{NodeId, Scene};

impl Scene {
    /// Opts the node into culling by [`cull`](Self::cull).
    pub fn set_cullable(&mut self, id: NodeId, cullable: bool) {
        self.validate(id);
        self.cull[id.idx as usize].cullable = cullable;
    }

    /// Returns whether the node is tested against the view when culling.
    #[must_use]
    pub fn cullable(&self, id: NodeId) -> bool {
        self.validate(id);
        self.cull[id.idx as usize].cullable
    }

    /// Controls whether culling descends into the node's children.
    /// Defaults to `true`.
    pub fn set_cullable_children(&mut self, id: NodeId, cullable_children: bool) {
        self.validate(id);
        self.cull[id.idx as usize].cullable_children = cullable_children;
    }

    /// Returns whether culling descends into the node's children.
    #[must_use]
    pub fn cullable_children(&self, id: NodeId) -> bool {
        self.validate(id);
        self.cull[id.idx as usize].cullable_children
    }

    /// Sets a local-space rectangle tested instead of the measured bounds.
    pub fn set_cull_area(&mut self, id: NodeId, area: Option<Rect>) {
        self.validate(id);
        self.cull[id.idx as usize].cull_area = area;
    }

    /// Returns the explicit cull area.
    #[must_use]
    pub fn cull_area(&self, id: NodeId) -> Option<Rect> {
        self.validate(id);
        self.cull[id.idx as usize].cull_area
    }

    /// Updates the culled flag of every cullable node in `id`'s subtree.
    ///
    /// A cullable node is culled when its world bounds (or its cull area
    /// mapped to world space) lie entirely outside `view`; touching an edge
    /// counts as outside. Non-cullable nodes are unculled. The walk does
    /// not enter culled, non-renderable, unmeasurable, or excluded nodes, nor
    /// nodes with [`cullable_children`](Self::cullable_children) off.
    pub fn cull(&mut self, id: NodeId, view: Rect, skip_update: bool) {
        self.validate(id);
        self.cull_at(id.idx, view.abs(), skip_update);
    }

    fn cull_at(&mut self, idx: u32, view: Rect, skip_update: bool) {
        let i = idx as usize;
        let state = self.cull[i];
        let v = self.visual[i];
        let id = self.id_at(idx);

        let culled = if state.cullable && v.measurable && v.include_in_build {
            let bounds = match state.cull_area {
                Some(area) => {
                    let mut b = Bounds::EMPTY;
                    b.add_rect(area, self.global_transform(id, skip_update));
                    b
                }
                None => self.bounds(id, skip_update),
            };
            bounds.min_x >= view.x1
                || bounds.min_y >= view.y1
                || bounds.max_x <= view.x0
                || bounds.max_y <= view.y0
        } else {
            false
        };
        self.set_culled(id, culled);

        if !state.cullable_children
            || culled
            || !v.local_status.contains(DisplayStatus::RENDERABLE)
            || !v.measurable
            || !v.include_in_build
        {
            return;
        }
        for k in 0..self.children[i].len() {
            let c = self.children[i][k];
            self.cull_at(c, view, skip_update);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;
    use crate::instructions::{PipeId, Renderable};

    struct Square;

    impl Renderable for Square {
        fn render_pipe(&self) -> PipeId {
            PipeId(1)
        }
        fn content_bounds(&self) -> Option<Rect> {
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        }
    }

    fn row(scene: &mut Scene, xs: &[f64]) -> alloc::vec::Vec<NodeId> {
        let root = scene.root();
        xs.iter()
            .map(|&x| {
                let n = scene.create_node_with(Box::new(Square));
                scene.add_child(root, n).unwrap();
                scene.set_x(n, x);
                scene.set_cullable(n, true);
                n
            })
            .collect()
    }

    #[test]
    fn nodes_outside_the_view_are_culled() {
        let mut scene = Scene::new();
        let nodes = row(&mut scene, &[0.0, 95.0, 100.0, 300.0]);
        let root = scene.root();
        scene.cull(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        assert!(!scene.culled(nodes[0]));
        assert!(!scene.culled(nodes[1]));
        // Touching the right edge is outside.
        assert!(scene.culled(nodes[2]));
        assert!(scene.culled(nodes[3]));

        scene.set_x(nodes[3], 50.0);
        scene.cull(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        assert!(!scene.culled(nodes[3]));
    }

    #[test]
    fn cull_area_replaces_bounds() {
        let mut scene = Scene::new();
        let nodes = row(&mut scene, &[200.0]);
        scene.set_cull_area(nodes[0], Some(Rect::new(-150.0, 0.0, -140.0, 10.0)));
        let root = scene.root();
        scene.cull(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        assert!(!scene.culled(nodes[0]));
    }

    #[test]
    fn culled_parents_are_not_entered() {
        let mut scene = Scene::new();
        let nodes = row(&mut scene, &[500.0]);
        let child = scene.create_node_with(Box::new(Square));
        scene.add_child(nodes[0], child).unwrap();
        scene.set_cullable(child, true);
        let root = scene.root();
        scene.cull(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        assert!(scene.culled(nodes[0]));
        assert!(!scene.culled(child));

        scene.set_cullable(nodes[0], false);
        scene.cull(root, Rect::new(0.0, 0.0, 100.0, 100.0), false);
        assert!(!scene.culled(nodes[0]));
        assert!(scene.culled(child));
    }
}
