// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph data model.
//!
//! A *node* is an element of an ordered tree owned by a [`Scene`]. Each node
//! has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed. Using a stale handle panics.
//! - Topology: a parent and an ordered child list, edited with
//!   [`add_child`](Scene::add_child) and friends. Cycles are rejected.
//! - **Local properties** set by the caller: position, scale, rotation,
//!   skew, pivot, alpha, tint, blend mode, visibility, z-index, label,
//!   renderable content, and effects.
//! - **Group-relative properties** produced by
//!   [`update_transforms`](Scene::update_transforms): the transform, color,
//!   blend mode, and display status composed up to the enclosing render
//!   group boundary.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//! Every capability lives in its own module as an `impl Scene` block.
//!
//! # Change ticks
//!
//! Each node counts structure changes (transform, visual properties, child
//! order) and view changes (content, effects, children added or removed).
//! The ticks feed subtree change detection (see [`change`](crate::change))
//! and through it cached local bounds.

mod children;
mod destroy;
pub(crate) mod effects;
pub(crate) mod events;
pub(crate) mod flags;
mod id;
mod label;
mod measure;
mod props;
mod sort;
pub(crate) mod store;
mod traverse;

pub use destroy::DestroyOptions;
pub use events::{Listener, NodeEvent};
pub use flags::{BlendMode, DisplayStatus};
pub use id::{EffectId, INVALID, ListenerId, NodeId};
pub use store::Scene;
pub use traverse::{Children, Descendants};
