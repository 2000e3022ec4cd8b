// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instruction collection and the backend-facing traits.
//!
//! A render backend never walks the scene itself. Instead each render group
//! owns an [`InstructionSet`] that is rebuilt when the group's structure
//! changes (see [`Scene::prepare_frame`](crate::Scene::prepare_frame)). The
//! rebuild walks the group's subtree in paint order and hands every drawable
//! piece to a [`RenderPipes`] implementation, which decides what to append.
//!
//! ```text
//!   node ──► Effect::push ──► Renderable::add_to_instruction_set
//!                                     │
//!            children / layer members ◄┘
//!                     │
//!   nested group ──► RenderPipes::add_render_group
//!                     │
//!            Effect::pop (reverse order)
//! ```
//!
//! [`DefaultPipes`] appends the standard [`Instruction`] values and is
//! enough for tests, headless use, and backends that post-process the set.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};

use crate::bounds::Bounds;
use crate::color::{WHITE_BGR, pack_color_alpha};
use crate::node::flags::{BlendMode, DisplayStatus};
use crate::node::{EffectId, INVALID, NodeId, Scene};

/// Identifies the backend pipe that handles a renderable or effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipeId(pub u32);

/// One entry of an instruction set.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Draw a node's content.
    Draw {
        /// The node whose content is drawn.
        node: NodeId,
        /// The pipe that draws it.
        pipe: PipeId,
        /// Transform relative to the render group boundary.
        transform: Affine,
        /// Tint and alpha relative to the boundary, packed as `0xAABBGGRR`.
        color_alpha: u32,
        /// Resolved blend mode.
        blend_mode: BlendMode,
    },
    /// Draw a nested render group with its own instruction set.
    RenderGroup {
        /// The nested group's boundary node.
        root: NodeId,
    },
    /// Start an effect around the following instructions.
    PushEffect {
        /// The node that owns the effect.
        node: NodeId,
        /// The effect.
        effect: EffectId,
        /// The pipe that implements it.
        pipe: PipeId,
    },
    /// End the most recently pushed effect of `node`.
    PopEffect {
        /// The node that owns the effect.
        node: NodeId,
        /// The effect.
        effect: EffectId,
        /// The pipe that implements it.
        pipe: PipeId,
    },
}

/// The ordered instructions of one render group.
#[derive(Clone, Debug, Default)]
pub struct InstructionSet {
    instructions: Vec<Instruction>,
    renderables: Vec<NodeId>,
}

impl InstructionSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instructions: Vec::new(),
            renderables: Vec::new(),
        }
    }

    /// Clears the set, keeping its allocations.
    pub fn reset(&mut self) {
        self.instructions.clear();
        self.renderables.clear();
    }

    /// Appends an instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Returns the instructions in paint order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Returns the number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns whether the set has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the nodes whose content was collected, in paint order.
    #[must_use]
    pub fn renderables(&self) -> &[NodeId] {
        &self.renderables
    }

    pub(crate) fn contains_renderable(&self, node: NodeId) -> bool {
        self.renderables.contains(&node)
    }
}

/// Per-node values handed to [`Renderable::add_to_instruction_set`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderContext {
    /// The node being drawn.
    pub node: NodeId,
    /// The render layer being collected, if any.
    pub layer: Option<NodeId>,
    /// Transform relative to the render group boundary.
    pub transform: Affine,
    /// Tint and alpha relative to the boundary, packed as `0xAABBGGRR`.
    pub color_alpha: u32,
    /// Resolved blend mode.
    pub blend_mode: BlendMode,
}

/// Drawable content attached to a node.
pub trait Renderable {
    /// The pipe that draws this content.
    fn render_pipe(&self) -> PipeId;

    /// The content's extent in the node's local space.
    fn content_bounds(&self) -> Option<Rect> {
        None
    }

    /// Emits this content into `set`.
    fn add_to_instruction_set(
        &self,
        ctx: &RenderContext,
        pipes: &mut dyn RenderPipes,
        set: &mut InstructionSet,
    ) {
        pipes.add_renderable(ctx, self.render_pipe(), set);
    }
}

/// A filter, mask, or similar wrapper around a node's subtree.
pub trait Effect {
    /// The pipe that implements this effect.
    fn pipe(&self) -> PipeId;

    /// Lower priorities wrap higher ones.
    fn priority(&self) -> i32 {
        0
    }

    /// Emits the instructions that start this effect.
    fn push(
        &self,
        node: NodeId,
        effect: EffectId,
        pipes: &mut dyn RenderPipes,
        set: &mut InstructionSet,
    ) {
        pipes.push_effect(node, effect, self.pipe(), set);
    }

    /// Emits the instructions that end this effect.
    fn pop(
        &self,
        node: NodeId,
        effect: EffectId,
        pipes: &mut dyn RenderPipes,
        set: &mut InstructionSet,
    ) {
        pipes.pop_effect(node, effect, self.pipe(), set);
    }

    /// Adjusts measured subtree bounds. `transform` maps the node's local
    /// space into the space `bounds` is accumulated in.
    fn add_bounds(&self, bounds: &mut Bounds, transform: Affine) {
        let _ = (bounds, transform);
    }
}

/// Backend hooks used while building and refreshing instruction sets.
///
/// Every method has a default that writes the standard [`Instruction`]
/// values or does nothing.
pub trait RenderPipes {
    /// Appends a draw of the node described by `ctx`.
    fn add_renderable(&mut self, ctx: &RenderContext, pipe: PipeId, set: &mut InstructionSet) {
        set.push(Instruction::Draw {
            node: ctx.node,
            pipe,
            transform: ctx.transform,
            color_alpha: ctx.color_alpha,
            blend_mode: ctx.blend_mode,
        });
    }

    /// Appends a reference to a nested render group.
    fn add_render_group(&mut self, root: NodeId, set: &mut InstructionSet) {
        set.push(Instruction::RenderGroup { root });
    }

    /// Appends the start of an effect.
    fn push_effect(
        &mut self,
        node: NodeId,
        effect: EffectId,
        pipe: PipeId,
        set: &mut InstructionSet,
    ) {
        set.push(Instruction::PushEffect { node, effect, pipe });
    }

    /// Appends the end of an effect.
    fn pop_effect(
        &mut self,
        node: NodeId,
        effect: EffectId,
        pipe: PipeId,
        set: &mut InstructionSet,
    ) {
        set.push(Instruction::PopEffect { node, effect, pipe });
    }

    /// Refreshes a renderable whose content changed in a group that was not
    /// rebuilt.
    fn update_renderable(&mut self, node: NodeId, renderable: &dyn Renderable) {
        let _ = (node, renderable);
    }

    /// Called before a group's instruction set is rebuilt.
    fn build_start(&mut self, group: NodeId) {
        let _ = group;
    }

    /// Called after a group's instruction set is rebuilt.
    fn build_end(&mut self, group: NodeId, set: &InstructionSet) {
        let _ = (group, set);
    }
}

/// [`RenderPipes`] with every default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPipes;

impl RenderPipes for DefaultPipes {}

impl Scene {
    /// Appends the instructions for `id`'s subtree to `set`.
    ///
    /// Nothing is appended if the node is attached to a render layer, not
    /// fully displayed, or excluded from build. A render group boundary
    /// appends only a [`Instruction::RenderGroup`] reference. Values come
    /// from the last [`update_transforms`](Self::update_transforms) pass.
    pub fn collect_instructions(
        &mut self,
        id: NodeId,
        pipes: &mut dyn RenderPipes,
        set: &mut InstructionSet,
    ) {
        self.validate(id);
        self.collect_at(id.idx, pipes, set, INVALID, INVALID);
    }

    /// Rebuilds the instruction set of group `g` in place.
    pub(crate) fn build_group_instructions(
        &mut self,
        g: u32,
        pipes: &mut dyn RenderPipes,
    ) -> usize {
        let Some(group) = self.render_group[g as usize].as_deref_mut() else {
            return 0;
        };
        let mut set = core::mem::take(&mut group.instructions);
        set.reset();

        let root = self.id_at(g);
        pipes.build_start(root);
        if self.config.sort_on_collect && self.order[g as usize].sortable_children {
            self.sort_children_at(g);
        }
        self.collect_at(g, pipes, &mut set, INVALID, g);
        pipes.build_end(root, &set);

        let count = set.len();
        if let Some(group) = self.render_group[g as usize].as_deref_mut() {
            group.instructions = set;
            group.structure_did_change = false;
        }
        count
    }

    fn collect_at(
        &mut self,
        idx: u32,
        pipes: &mut dyn RenderPipes,
        set: &mut InstructionSet,
        layer: u32,
        building: u32,
    ) {
        let i = idx as usize;
        if idx != building {
            let own_layer = self.parent_layer[i];
            if own_layer != INVALID && own_layer != layer {
                return;
            }
            let v = &self.visual[i];
            if v.local_status & v.global_status != DisplayStatus::ALL || !v.include_in_build {
                return;
            }
            if self.config.sort_on_collect && self.order[i].sortable_children {
                self.sort_children_at(idx);
            }
            if self.render_group[i].is_some() {
                pipes.add_render_group(self.id_at(idx), set);
                return;
            }
        }

        let node = self.id_at(idx);
        for entry in &self.effects[i] {
            entry.effect.push(node, entry.id, pipes, set);
        }

        if let Some(content) = self.content[i].as_deref() {
            let v = &self.visual[i];
            let ctx = if self.render_group[i].is_some() {
                RenderContext {
                    node,
                    layer: (layer != INVALID).then(|| self.id_at(layer)),
                    transform: Affine::IDENTITY,
                    color_alpha: pack_color_alpha(WHITE_BGR, 1.0),
                    blend_mode: v.local_blend.resolve(BlendMode::Normal),
                }
            } else {
                RenderContext {
                    node,
                    layer: (layer != INVALID).then(|| self.id_at(layer)),
                    transform: self.transform[i].relative_group,
                    color_alpha: pack_color_alpha(v.group_color, v.group_alpha),
                    blend_mode: v.group_blend,
                }
            };
            content.add_to_instruction_set(&ctx, pipes, set);
            set.renderables.push(node);
        }

        if self.render_layer[i].is_some() {
            self.collect_layer_members(idx, pipes, set, building);
        } else {
            for k in 0..self.children[i].len() {
                let c = self.children[i][k];
                self.collect_at(c, pipes, set, layer, building);
            }
        }

        for entry in self.effects[i].iter().rev() {
            entry.effect.pop(node, entry.id, pipes, set);
        }
    }

    fn collect_layer_members(
        &mut self,
        l: u32,
        pipes: &mut dyn RenderPipes,
        set: &mut InstructionSet,
        building: u32,
    ) {
        if self.config.sort_on_collect
            && self.render_layer[l as usize]
                .as_deref()
                .is_some_and(|state| state.sortable_children)
        {
            self.sort_render_layer_at(l);
        }
        let count = self.render_layer[l as usize]
            .as_deref()
            .map_or(0, |state| state.attached.len());
        for k in 0..count {
            let Some(c) = self.render_layer[l as usize]
                .as_deref()
                .and_then(|state| state.attached.get(k).copied())
            else {
                break;
            };
            if self.parent[c as usize] == INVALID {
                if self.config.warn_on_detached_layer_children {
                    log::warn!(
                        "render layer {:?} has attached node {:?} without a parent; skipping it",
                        self.id_at(l),
                        self.id_at(c),
                    );
                }
                continue;
            }
            if self.has_hidden_ancestor(c) {
                continue;
            }
            self.collect_at(c, pipes, set, l, building);
        }
    }

    /// Returns whether any owner of `idx` is hidden.
    ///
    /// The update pass stops at hidden nodes, so the display status cached
    /// on their descendants can be stale.
    fn has_hidden_ancestor(&self, idx: u32) -> bool {
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            if !self.visual[p as usize]
                .local_status
                .contains(DisplayStatus::VISIBLE)
            {
                return true;
            }
            p = self.parent[p as usize];
        }
        false
    }
}
