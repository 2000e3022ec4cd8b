// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use lamina_core::trace::{
    FrameSummary, GroupRebuildEvent, GroupUpdateEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Skip group updates that touched no nodes.
    quiet: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            quiet: false,
        }
    }

    /// Omits group update lines for groups where no node was recomputed.
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::UpdateTransforms => "update",
        PhaseKind::BuildInstructions => "build",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_group_update(&mut self, e: &GroupUpdateEvent) {
        if self.quiet && e.nodes_updated == 0 {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[group:update] frame={} group=#{} nodes={}",
            e.frame_index, e.group_index, e.nodes_updated,
        );
    }

    fn on_group_rebuild(&mut self, e: &GroupRebuildEvent) {
        let _ = writeln!(
            self.writer,
            "[group:rebuild] frame={} group=#{} instructions={}",
            e.frame_index, e.group_index, e.instruction_count,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} nodes={} groups={} rebuilt={} \
             refreshed={} textures={}",
            s.frame_index,
            s.nodes_updated,
            s.groups_updated,
            s.groups_rebuilt,
            s.renderables_updated,
            s.textures_invalidated,
        );
    }
}
