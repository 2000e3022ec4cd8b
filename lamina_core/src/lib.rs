// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph core for retained-mode 2D rendering.
//!
//! `lamina_core` provides a tree of nodes with local transforms and visual
//! properties, partitioned into *render groups* whose instruction sets are
//! rebuilt only when their structure changes. It is `no_std` compatible
//! (with `alloc`) and uses struct-of-arrays storage with generational index
//! handles.
//!
//! # Architecture
//!
//! A render loop mutates the [`Scene`] and calls
//! [`prepare_frame`](Scene::prepare_frame) once per frame:
//!
//! ```text
//!   setters (position, alpha, add_child, ...)
//!       │  queue node in its render group, mark dirty channels
//!       ▼
//!   Scene::update_transforms() ──► group-relative transforms and colors
//!       │
//!       ▼
//!   rebuild changed groups ──► InstructionSet per group ──► RenderPipes
//!       │
//!       ▼
//!   FrameReport (rebuilt groups, refreshed renderables, stale textures)
//! ```
//!
//! **[`node`]**: the [`Scene`] store and every per-node capability:
//! children, transform and visual properties, z-index sorting, labels,
//! effects, events, destruction, and world-space queries.
//!
//! **[`group`]**: render groups, the update pass, and cache-as-texture.
//!
//! **[`layer`]**: render layers that reorder drawing without changing
//! ownership.
//!
//! **[`instructions`]**: instruction sets and the [`Renderable`],
//! [`Effect`], and [`RenderPipes`] traits a backend implements.
//!
//! **[`change`]** and **[`bounds`]**: subtree change detection and cached
//! bounds measurement. **[`cull`]** uses bounds to skip offscreen nodes.
//!
//! **[`dirty`]**: dirty-tracking channels via `understory_dirty`.
//!
//! **[`trace`]**: the [`TraceSink`](trace::TraceSink) trait and the
//! zero-overhead [`Tracer`] wrapper.
//!
//! # Example
//!
//! ```
//! use lamina_core::{DefaultPipes, Scene, Tracer};
//!
//! let mut scene = Scene::new();
//! let root = scene.root();
//! let ship = scene.create_node();
//! let flag = scene.create_node();
//! scene.add_child(root, ship).unwrap();
//! scene.add_child(ship, flag).unwrap();
//! scene.set_position(ship, (100.0, 50.0));
//! scene.set_x(flag, 10.0);
//!
//! let report = scene.prepare_frame(&mut DefaultPipes, &mut Tracer::none());
//! assert_eq!(report.groups_rebuilt, [root]);
//! assert_eq!(scene.world_transform(flag).translation().x, 110.0);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod bounds;
pub mod change;
pub mod color;
pub mod config;
pub mod cull;
pub mod dirty;
pub mod error;
pub mod frame;
pub mod group;
pub mod instructions;
pub mod layer;
pub mod node;
pub mod trace;
pub mod transform;

pub use bounds::Bounds;
pub use change::ChangeSnapshot;
pub use config::SceneConfig;
pub use error::SceneError;
pub use frame::FrameReport;
pub use group::RenderGroup;
pub use instructions::{
    DefaultPipes, Effect, Instruction, InstructionSet, PipeId, RenderContext, RenderPipes,
    Renderable,
};
pub use layer::LayerSortFn;
pub use node::{
    BlendMode, DestroyOptions, DisplayStatus, EffectId, ListenerId, NodeEvent, NodeId, Scene,
};
pub use trace::Tracer;
pub use transform::TransformParams;
