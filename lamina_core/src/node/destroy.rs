// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node destruction.

use super::events::NodeEvent;
use super::id::{INVALID, NodeId};
use super::store::Scene;

/// Options for [`Scene::destroy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Also destroy every descendant. When `false`, children are detached
    /// and left alive as roots of their own subtrees.
    pub children: bool,
}

impl DestroyOptions {
    /// Destroys the whole subtree.
    pub const SUBTREE: Self = Self { children: true };
}

impl Scene {
    /// Destroys a node.
    ///
    /// Detaches its children (destroying them too with
    /// [`DestroyOptions::children`]), removes it from its parent and from any
    /// render layer, releases owned render group and render layer state,
    /// emits [`NodeEvent::Destroyed`], and drops its listeners. Every existing
    /// handle to the node becomes stale.
    ///
    /// Destroying an already destroyed node is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the scene root.
    pub fn destroy(&mut self, id: NodeId, options: DestroyOptions) {
        if !self.is_alive(id) {
            return;
        }
        let idx = id.idx;
        assert!(idx != self.root, "the scene root cannot be destroyed");

        let len = self.children[idx as usize].len();
        let mut detached = alloc::vec::Vec::with_capacity(len);
        for pos in (0..len).rev() {
            detached.push(self.remove_child_slot(idx, pos));
        }
        detached.reverse();

        self.remove_from_parent_slot(idx);
        let layer = self.parent_layer[idx as usize];
        if layer != INVALID {
            self.layer_detach_slot(layer, idx);
        }
        if self.render_layer[idx as usize].is_some() {
            self.release_render_layer(idx);
        }
        if self.render_group[idx as usize].is_some() {
            self.release_render_group(idx);
        }

        self.emit(idx, NodeEvent::Destroyed);
        log::debug!("destroyed {id:?} ({} children detached)", detached.len());
        self.free_slot(idx);

        if options.children {
            for c in detached {
                let child = self.id_at(c);
                self.destroy(child, options);
            }
        }
    }
}
