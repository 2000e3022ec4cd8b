// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Recorded events carry no clock readings, so the exporter lays them out on
//! a synthetic timeline: the `n`th event is placed at `n` microseconds. Phase
//! slices nest correctly and frames appear in order, but durations only
//! reflect how many events a phase produced.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Frame summaries become counter tracks.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for (ts, recorded) in decode(bytes).enumerate() {
        match recorded {
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::GroupUpdate(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "GroupUpdate",
                    "cat": "Group",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "group": e.group_index,
                        "nodes_updated": e.nodes_updated,
                    }
                }));
            }
            RecordedEvent::GroupRebuild(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "GroupRebuild",
                    "cat": "Group",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "group": e.group_index,
                        "instruction_count": e.instruction_count,
                    }
                }));
            }
            RecordedEvent::FrameSummary(s) => {
                events.push(json!({
                    "ph": "C",
                    "name": "FrameWork",
                    "cat": "Summary",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "nodes_updated": s.nodes_updated,
                        "groups_rebuilt": s.groups_rebuilt,
                        "renderables_updated": s.renderables_updated,
                        "textures_invalidated": s.textures_invalidated,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}
