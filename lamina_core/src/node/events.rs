// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronous per-node lifecycle events.

use alloc::boxed::Box;

use super::id::{ListenerId, NodeId};
use super::store::Scene;

/// A lifecycle notification delivered to a node's listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    /// The node was added under `parent`.
    Added {
        /// The new parent.
        parent: NodeId,
    },
    /// The node was removed from `parent`.
    Removed {
        /// The former parent.
        parent: NodeId,
    },
    /// `child` was inserted at `index` in this node's child list.
    ChildAdded {
        /// The inserted child.
        child: NodeId,
        /// Its position after insertion.
        index: usize,
    },
    /// `child` was removed from `index` in this node's child list.
    ChildRemoved {
        /// The removed child.
        child: NodeId,
        /// Its position before removal.
        index: usize,
    },
    /// The node is being destroyed; its handle is stale once this returns.
    Destroyed,
}

/// Callback invoked with the node an event was emitted on.
pub type Listener = Box<dyn FnMut(NodeId, &NodeEvent)>;

pub(crate) struct ListenerEntry {
    pub(crate) id: ListenerId,
    pub(crate) callback: Listener,
}

impl core::fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Registers a listener for events emitted on `id`.
    ///
    /// Listeners run synchronously inside the mutating call, in registration
    /// order. They are dropped when the node is destroyed.
    pub fn on(
        &mut self,
        id: NodeId,
        listener: impl FnMut(NodeId, &NodeEvent) + 'static,
    ) -> ListenerId {
        self.validate(id);
        let lid = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.listeners[id.idx as usize].push(ListenerEntry {
            id: lid,
            callback: Box::new(listener),
        });
        lid
    }

    /// Unregisters a listener. Returns `false` if it was not registered on
    /// `id`.
    pub fn off(&mut self, id: NodeId, listener: ListenerId) -> bool {
        self.validate(id);
        let list = &mut self.listeners[id.idx as usize];
        match list.iter().position(|e| e.id == listener) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn emit(&mut self, idx: u32, event: NodeEvent) {
        if self.listeners[idx as usize].is_empty() {
            return;
        }
        let node = self.id_at(idx);
        let mut list = core::mem::take(&mut self.listeners[idx as usize]);
        for entry in &mut list {
            (entry.callback)(node, &event);
        }
        self.listeners[idx as usize] = list;
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::DestroyOptions;

    fn record(scene: &mut Scene, id: NodeId) -> Rc<RefCell<Vec<NodeEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        scene.on(id, move |_, e| sink.borrow_mut().push(*e));
        log
    }

    #[test]
    fn add_and_remove_emit_on_both_sides() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let c = scene.create_node();
        let p_log = record(&mut scene, p);
        let c_log = record(&mut scene, c);

        scene.add_child(p, c).unwrap();
        scene.remove_child(p, c);

        assert_eq!(
            *p_log.borrow(),
            vec![
                NodeEvent::ChildAdded { child: c, index: 0 },
                NodeEvent::ChildRemoved { child: c, index: 0 },
            ]
        );
        assert_eq!(
            *c_log.borrow(),
            vec![NodeEvent::Added { parent: p }, NodeEvent::Removed { parent: p }]
        );
    }

    #[test]
    fn reparenting_emits_removal_first() {
        let mut scene = Scene::new();
        let a = scene.create_node();
        let b = scene.create_node();
        let c = scene.create_node();
        scene.add_child(a, c).unwrap();
        let c_log = record(&mut scene, c);

        scene.add_child(b, c).unwrap();
        assert_eq!(
            *c_log.borrow(),
            vec![NodeEvent::Removed { parent: a }, NodeEvent::Added { parent: b }]
        );
    }

    #[test]
    fn off_stops_delivery() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let c = scene.create_node();
        let count = Rc::new(RefCell::new(0_u32));
        let sink = Rc::clone(&count);
        let lid = scene.on(p, move |_, _| *sink.borrow_mut() += 1);

        scene.add_child(p, c).unwrap();
        assert!(scene.off(p, lid));
        assert!(!scene.off(p, lid));
        scene.remove_child(p, c);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn destroyed_is_delivered_once() {
        let mut scene = Scene::new();
        let n = scene.create_node();
        let log = record(&mut scene, n);
        scene.destroy(n, DestroyOptions::default());
        scene.destroy(n, DestroyOptions::default());
        assert_eq!(*log.borrow(), vec![NodeEvent::Destroyed]);
    }
}
