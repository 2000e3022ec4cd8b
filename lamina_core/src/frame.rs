// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame preparation.
//!
//! [`Scene::prepare_frame`] is the single call a render loop makes before
//! drawing:
//!
//! 1. Run the transform update pass over every render group.
//! 2. Drain the [`CACHE`](crate::dirty::CACHE) channel and flag the cached
//!    textures of affected groups as stale.
//! 3. Rebuild, top-down, the instruction set of every group whose structure
//!    changed.
//! 4. Drain the [`VIEW`](crate::dirty::VIEW) channel and hand renderables
//!    whose content changed to [`RenderPipes::update_renderable`], unless
//!    their group was just rebuilt.
//! 5. Report which cached textures must be re-rendered and clear the flags.

use alloc::vec::Vec;

use crate::dirty;
use crate::instructions::{InstructionSet, RenderPipes};
use crate::node::{NodeId, Scene};
use crate::trace::{
    FrameSummary, FrameSummaryBuilder, GroupRebuildEvent, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, Tracer,
};

/// Work done by one [`Scene::prepare_frame`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Index of the prepared frame.
    pub frame_index: u64,
    /// Aggregate counts, also sent to the tracer.
    pub summary: FrameSummary,
    /// Boundaries of the groups whose instruction set was rebuilt, parents
    /// before children.
    pub groups_rebuilt: Vec<NodeId>,
    /// Nodes refreshed in place through
    /// [`RenderPipes::update_renderable`].
    pub renderables_updated: Vec<NodeId>,
    /// Boundaries of cached groups whose texture must be re-rendered.
    pub textures_invalidated: Vec<NodeId>,
}

impl Scene {
    /// Brings every render group up to date for drawing.
    pub fn prepare_frame(
        &mut self,
        pipes: &mut dyn RenderPipes,
        tracer: &mut Tracer<'_>,
    ) -> FrameReport {
        let frame_index = self.frame_index;
        let mut summary = FrameSummaryBuilder::new(frame_index);
        let mut report = FrameReport {
            frame_index,
            ..FrameReport::default()
        };

        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::UpdateTransforms,
        });
        self.update_transforms_traced(tracer, &mut summary);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::UpdateTransforms,
        });

        let cache_dirty: Vec<u32> = self
            .dirty
            .drain(dirty::CACHE)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in cache_dirty {
            if let Some(group) = self.render_group[idx as usize].as_deref_mut() {
                if group.cache_as_texture {
                    group.texture_needs_update = true;
                }
            }
        }
        let view_dirty: Vec<u32> = self
            .dirty
            .drain(dirty::VIEW)
            .deterministic()
            .run()
            .collect();

        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::BuildInstructions,
        });
        let mut rebuilt = Vec::new();
        self.rebuild_groups(self.root, pipes, tracer, &mut summary, &mut rebuilt);
        report.groups_rebuilt = rebuilt.iter().map(|&g| self.id_at(g)).collect();

        for idx in view_dirty {
            if !self.alive[idx as usize] {
                continue;
            }
            let owner = if self.render_group[idx as usize].is_some() {
                idx
            } else {
                self.group_link[idx as usize].parent_group
            };
            if rebuilt.contains(&owner) {
                continue;
            }
            let node = self.id_at(idx);
            let Some(group) = self.group_at(owner) else {
                continue;
            };
            if !group.instructions.contains_renderable(node) {
                continue;
            }
            if let Some(content) = self.content[idx as usize].as_deref() {
                pipes.update_renderable(node, content);
                summary.renderable_updated();
                report.renderables_updated.push(node);
            }
        }

        self.collect_stale_textures(self.root, &mut summary, &mut report.textures_invalidated);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::BuildInstructions,
        });

        report.summary = summary.finish();
        tracer.frame_summary(&report.summary);
        log::trace!(
            "prepared frame {frame_index}: {} groups rebuilt, {} renderables updated",
            report.groups_rebuilt.len(),
            report.renderables_updated.len(),
        );
        self.frame_index += 1;
        report
    }

    /// Returns the instruction set of the node's render group as of the last
    /// [`prepare_frame`](Self::prepare_frame).
    #[must_use]
    pub fn group_instructions(&self, id: NodeId) -> Option<&InstructionSet> {
        self.validate(id);
        self.group_at(id.idx).map(|g| &g.instructions)
    }

    /// Returns the number of frames prepared so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn rebuild_groups(
        &mut self,
        g: u32,
        pipes: &mut dyn RenderPipes,
        tracer: &mut Tracer<'_>,
        summary: &mut FrameSummaryBuilder,
        rebuilt: &mut Vec<u32>,
    ) {
        let Some(group) = self.group_at(g) else {
            return;
        };
        if group.structure_did_change {
            let count = self.build_group_instructions(g, pipes);
            if let Some(group) = self.render_group[g as usize].as_deref_mut() {
                if group.cache_as_texture {
                    group.texture_needs_update = true;
                }
            }
            summary.group_rebuilt();
            tracer.group_rebuild(&GroupRebuildEvent {
                frame_index: self.frame_index,
                group_index: g,
                instruction_count: u32::try_from(count).unwrap_or(u32::MAX),
            });
            rebuilt.push(g);
        }

        let child_groups = match self.group_at(g) {
            Some(group) => group.child_groups.clone(),
            None => return,
        };
        for cg in child_groups {
            self.rebuild_groups(cg, pipes, tracer, summary, rebuilt);
        }
    }

    fn collect_stale_textures(
        &mut self,
        g: u32,
        summary: &mut FrameSummaryBuilder,
        out: &mut Vec<NodeId>,
    ) {
        let id = self.id_at(g);
        let child_groups = match self.render_group[g as usize].as_deref_mut() {
            Some(group) => {
                if core::mem::take(&mut group.texture_needs_update) {
                    summary.texture_invalidated();
                    out.push(id);
                }
                group.child_groups.clone()
            }
            None => return,
        };
        for cg in child_groups {
            self.collect_stale_textures(cg, summary, out);
        }
    }
}
