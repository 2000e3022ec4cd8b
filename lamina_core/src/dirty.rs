// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Most invalidation in a [`Scene`](crate::Scene) flows through render group
//! worklists and change ticks. Two concerns are better served by
//! multi-channel dirty tracking (via [`understory_dirty`]):
//!
//! - **Local-only**: [`VIEW`] is marked with the default policy when a
//!   node's content changes. Only the explicitly marked node appears in the
//!   drain output; frame preparation refreshes those renderables in groups
//!   that did not rebuild.
//!
//! - **Propagating**: [`CACHE`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges
//!   from parent to child (the parent depends on the child). Marking a node
//!   marks every ancestor, so a cache-as-texture group anywhere above a
//!   change learns that its texture is stale. It is only marked while at
//!   least one cached group exists.
//!
//! # Consumption
//!
//! Callers never need to query dirty state directly. Each
//! [`Scene::prepare_frame`](crate::Scene::prepare_frame) call drains both
//! channels and surfaces the results in its
//! [`FrameReport`](crate::FrameReport).

use understory_dirty::Channel;

/// Renderable content changed; no propagation.
pub const VIEW: Channel = Channel::new(0);

/// Something under a node changed; propagates to ancestors.
pub const CACHE: Channel = Channel::new(1);
