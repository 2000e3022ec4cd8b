// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node effect lists.

use alloc::boxed::Box;

use super::id::{EffectId, NodeId};
use super::store::Scene;
use crate::instructions::Effect;

pub(crate) struct EffectEntry {
    pub(crate) id: EffectId,
    pub(crate) effect: Box<dyn Effect>,
}

impl core::fmt::Debug for EffectEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectEntry")
            .field("id", &self.id)
            .field("priority", &self.effect.priority())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Adds an effect that wraps the node's subtree when drawn.
    ///
    /// Effects are kept in ascending [`Effect::priority`] order; equal
    /// priorities keep insertion order.
    pub fn add_effect(&mut self, id: NodeId, effect: Box<dyn Effect>) -> EffectId {
        self.validate(id);
        let eid = EffectId(self.next_effect);
        self.next_effect = self.next_effect.wrapping_add(1);
        let list = &mut self.effects[id.idx as usize];
        list.push(EffectEntry { id: eid, effect });
        list.sort_by_key(|e| e.effect.priority());
        self.effects_changed(id.idx);
        eid
    }

    /// Removes an effect, returning it if it was present.
    pub fn remove_effect(&mut self, id: NodeId, effect: EffectId) -> Option<Box<dyn Effect>> {
        self.validate(id);
        let list = &mut self.effects[id.idx as usize];
        let pos = list.iter().position(|e| e.id == effect)?;
        let entry = list.remove(pos);
        self.effects_changed(id.idx);
        Some(entry.effect)
    }

    /// Returns the node's effects in application order.
    pub fn effects(&self, id: NodeId) -> impl Iterator<Item = (EffectId, &dyn Effect)> {
        self.validate(id);
        self.effects[id.idx as usize]
            .iter()
            .map(|e| (e.id, e.effect.as_ref()))
    }

    fn effects_changed(&mut self, idx: u32) {
        self.mark_children_group_structure(idx);
        self.bump_view_tick(idx);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::instructions::PipeId;

    struct Tagged(i32);

    impl Effect for Tagged {
        fn pipe(&self) -> PipeId {
            PipeId(7)
        }
        fn priority(&self) -> i32 {
            self.0
        }
    }

    #[test]
    fn effects_are_ordered_by_priority() {
        let mut scene = Scene::new();
        let n = scene.create_node();
        let late = scene.add_effect(n, Box::new(Tagged(10)));
        let early = scene.add_effect(n, Box::new(Tagged(-1)));
        let mid = scene.add_effect(n, Box::new(Tagged(10)));
        let ids: Vec<_> = scene.effects(n).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![early, late, mid]);
    }

    #[test]
    fn remove_returns_the_effect() {
        let mut scene = Scene::new();
        let n = scene.create_node();
        let id = scene.add_effect(n, Box::new(Tagged(3)));
        let tick = scene.view_tick(n);
        let removed = scene.remove_effect(n, id).unwrap();
        assert_eq!(removed.priority(), 3);
        assert!(scene.remove_effect(n, id).is_none());
        assert_eq!(scene.effects(n).count(), 0);
        assert_eq!(scene.view_tick(n), tick + 1);
    }
}
