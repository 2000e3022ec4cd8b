// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for frame preparation.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`Scene::prepare_frame`](crate::Scene::prepare_frame) calls at each stage.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! [`FrameSummaryBuilder`] is a convenience helper that counts work while a
//! frame is prepared and produces a [`FrameSummary`] at the end.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of frame preparation is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Render group transform, color and visibility propagation.
    UpdateTransforms,
    /// Instruction set rebuilds and renderable refreshes.
    BuildInstructions,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a frame-preparation phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a frame-preparation phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
}

/// Emitted after a render group's flagged nodes were recomputed.
#[derive(Clone, Copy, Debug)]
pub struct GroupUpdateEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the group's boundary node.
    pub group_index: u32,
    /// Number of nodes whose transforms were recomputed.
    pub nodes_updated: u32,
}

/// Emitted after a render group's instruction set was rebuilt.
#[derive(Clone, Copy, Debug)]
pub struct GroupRebuildEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Slot index of the group's boundary node.
    pub group_index: u32,
    /// Number of instructions in the rebuilt set.
    pub instruction_count: u32,
}

/// Per-frame work summary produced by [`FrameSummaryBuilder`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Nodes whose transforms were recomputed.
    pub nodes_updated: u32,
    /// Render groups visited by the update pass.
    pub groups_updated: u32,
    /// Render groups whose instruction set was rebuilt.
    pub groups_rebuilt: u32,
    /// Renderables refreshed in place without a rebuild.
    pub renderables_updated: u32,
    /// Cache-as-texture groups whose texture must be re-rendered.
    pub textures_invalidated: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from frame preparation.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after each render group's update pass.
    fn on_group_update(&mut self, e: &GroupUpdateEvent) {
        _ = e;
    }

    /// Called after a render group's instruction set was rebuilt.
    fn on_group_rebuild(&mut self, e: &GroupRebuildEvent) {
        _ = e;
    }

    /// Called with a per-frame work summary.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GroupUpdateEvent`].
    #[inline]
    pub fn group_update(&mut self, e: &GroupUpdateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_group_update(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`GroupRebuildEvent`].
    #[inline]
    pub fn group_rebuild(&mut self, e: &GroupRebuildEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_group_rebuild(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// FrameSummaryBuilder
// ---------------------------------------------------------------------------

/// Accumulates work counts during one frame and produces a [`FrameSummary`].
#[derive(Clone, Copy, Debug)]
pub struct FrameSummaryBuilder {
    summary: FrameSummary,
}

impl FrameSummaryBuilder {
    /// Creates a builder for the given frame.
    #[must_use]
    pub fn new(frame_index: u64) -> Self {
        Self {
            summary: FrameSummary {
                frame_index,
                ..FrameSummary::default()
            },
        }
    }

    /// Records one group's update pass.
    pub fn group_updated(&mut self, nodes_updated: u32) {
        self.summary.groups_updated += 1;
        self.summary.nodes_updated += nodes_updated;
    }

    /// Records one instruction set rebuild.
    pub fn group_rebuilt(&mut self) {
        self.summary.groups_rebuilt += 1;
    }

    /// Records one in-place renderable refresh.
    pub fn renderable_updated(&mut self) {
        self.summary.renderables_updated += 1;
    }

    /// Records one invalidated cache texture.
    pub fn texture_invalidated(&mut self) {
        self.summary.textures_invalidated += 1;
    }

    /// Consumes the builder and returns the finished summary.
    #[must_use]
    pub fn finish(self) -> FrameSummary {
        self.summary
    }
}
