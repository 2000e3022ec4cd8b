// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Find-by-label queries.

use alloc::vec::Vec;

use super::id::NodeId;
use super::store::Scene;

impl Scene {
    /// Returns the first child labelled `label`.
    ///
    /// Direct children are checked before any grandchild. With `deep`, each
    /// child's subtree is then searched in order.
    #[must_use]
    pub fn child_by_label(&self, id: NodeId, label: &str, deep: bool) -> Option<NodeId> {
        self.validate(id);
        self.child_by_label_at(id.idx, label, deep)
            .map(|idx| self.id_at(idx))
    }

    /// Returns every child labelled `label`, in pre-order when `deep`.
    #[must_use]
    pub fn children_by_label(&self, id: NodeId, label: &str, deep: bool) -> Vec<NodeId> {
        self.validate(id);
        let mut out = Vec::new();
        self.children_by_label_at(id.idx, label, deep, &mut out);
        out
    }

    fn child_by_label_at(&self, idx: u32, label: &str, deep: bool) -> Option<u32> {
        let children = &self.children[idx as usize];
        if let Some(&c) = children
            .iter()
            .find(|&&c| self.label[c as usize].as_deref() == Some(label))
        {
            return Some(c);
        }
        if deep {
            for &c in children {
                if let Some(found) = self.child_by_label_at(c, label, true) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn children_by_label_at(&self, idx: u32, label: &str, deep: bool, out: &mut Vec<NodeId>) {
        for &c in &self.children[idx as usize] {
            if self.label[c as usize].as_deref() == Some(label) {
                out.push(self.id_at(c));
            }
            if deep {
                self.children_by_label_at(c, label, true, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn shallow_matches_win_over_deep_ones() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let a1 = scene.create_node();
        let b = scene.create_node();
        scene.add_child(p, a).unwrap();
        scene.add_child(a, a1).unwrap();
        scene.add_child(p, b).unwrap();
        scene.set_label(a1, "item");
        scene.set_label(b, "item");

        assert_eq!(scene.child_by_label(p, "item", false), Some(b));
        assert_eq!(scene.child_by_label(p, "item", true), Some(b));
        assert_eq!(scene.child_by_label(a, "item", false), Some(a1));
        assert_eq!(scene.child_by_label(p, "missing", true), None);
    }

    #[test]
    fn collects_all_matches_in_pre_order() {
        let mut scene = Scene::new();
        let p = scene.create_node();
        let a = scene.create_node();
        let a1 = scene.create_node();
        let b = scene.create_node();
        scene.add_child(p, a).unwrap();
        scene.add_child(a, a1).unwrap();
        scene.add_child(p, b).unwrap();
        for n in [a, a1, b] {
            scene.set_label(n, "item");
        }
        assert_eq!(scene.children_by_label(p, "item", true), vec![a, a1, b]);
        assert_eq!(scene.children_by_label(p, "item", false), vec![a, b]);
    }
}
