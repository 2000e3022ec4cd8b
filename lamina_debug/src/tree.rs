// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented scene tree dumps.
//!
//! [`write_tree`] prints one line per node:
//!
//! ```text
//! #0 "stage"  [group]
//!   #1 "hud"  [group cached]  pos=(0, 0)
//!     #2 "score"  pos=(12, 8) alpha=0.5  @layer #3
//!   #3  [layer: 1 attached]  pos=(0, 0)
//! ```
//!
//! Markers show render group boundaries (and whether they are cached as a
//! texture), render layers with their attached count, layer membership,
//! hidden nodes, and nodes excluded from instruction building. Position is
//! omitted for the start node and alpha when it is fully opaque.

use std::io::{self, Write};

use lamina_core::{NodeId, Scene};

/// Writes the subtree rooted at `id` as an indented tree.
pub fn write_tree(scene: &Scene, id: NodeId, writer: &mut dyn Write) -> io::Result<()> {
    write_node(scene, id, 0, writer)
}

/// Returns the subtree rooted at `id` as an indented tree.
#[must_use]
pub fn tree_string(scene: &Scene, id: NodeId) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_tree(scene, id, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

fn write_node(scene: &Scene, id: NodeId, depth: usize, w: &mut dyn Write) -> io::Result<()> {
    write!(w, "{:indent$}#{}", "", id.index(), indent = depth * 2)?;
    if let Some(label) = scene.label(id) {
        write!(w, " {label:?}")?;
    }

    let mut markers = Vec::new();
    if scene.is_render_group(id) {
        markers.push(if scene.is_cached_as_texture(id) {
            "group cached".to_owned()
        } else {
            "group".to_owned()
        });
    }
    if let Ok(attached) = scene.render_layer_children(id) {
        markers.push(format!("layer: {} attached", attached.len()));
    }
    if !scene.visible(id) {
        markers.push("hidden".to_owned());
    }
    if !scene.include_in_build(id) {
        markers.push("excluded".to_owned());
    }
    if !markers.is_empty() {
        write!(w, "  [{}]", markers.join(" "))?;
    }

    if depth > 0 {
        let pos = scene.position(id);
        write!(w, "  pos=({}, {})", pos.x, pos.y)?;
    }
    let alpha = scene.alpha(id);
    if alpha < 1.0 {
        write!(w, " alpha={alpha}")?;
    }
    if let Some(layer) = scene.render_layer_of(id) {
        write!(w, "  @layer #{}", layer.index())?;
    }
    writeln!(w)?;

    for child in scene.children(id) {
        write_node(scene, child, depth + 1, w)?;
    }
    Ok(())
}
