// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use lamina_core::trace::{
    FrameSummary, GroupRebuildEvent, GroupUpdateEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PHASE_BEGIN: u8 = 1;
const TAG_PHASE_END: u8 = 2;
const TAG_GROUP_UPDATE: u8 = 3;
const TAG_GROUP_REBUILD: u8 = 4;
const TAG_FRAME_SUMMARY: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_phase(&mut self, p: PhaseKind) {
        self.write_u8(match p {
            PhaseKind::UpdateTransforms => 0,
            PhaseKind::BuildInstructions => 1,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_u8(TAG_PHASE_BEGIN);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_u8(TAG_PHASE_END);
        self.write_u64(e.frame_index);
        self.write_phase(e.phase);
    }

    fn on_group_update(&mut self, e: &GroupUpdateEvent) {
        self.write_u8(TAG_GROUP_UPDATE);
        self.write_u64(e.frame_index);
        self.write_u32(e.group_index);
        self.write_u32(e.nodes_updated);
    }

    fn on_group_rebuild(&mut self, e: &GroupRebuildEvent) {
        self.write_u8(TAG_GROUP_REBUILD);
        self.write_u64(e.frame_index);
        self.write_u32(e.group_index);
        self.write_u32(e.instruction_count);
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.write_u8(TAG_FRAME_SUMMARY);
        self.write_u64(s.frame_index);
        self.write_u32(s.nodes_updated);
        self.write_u32(s.groups_updated);
        self.write_u32(s.groups_rebuilt);
        self.write_u32(s.renderables_updated);
        self.write_u32(s.textures_invalidated);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`GroupUpdateEvent`].
    GroupUpdate(GroupUpdateEvent),
    /// A [`GroupRebuildEvent`].
    GroupRebuild(GroupRebuildEvent),
    /// A [`FrameSummary`].
    FrameSummary(FrameSummary),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        Some(match self.read_u8()? {
            0 => PhaseKind::UpdateTransforms,
            _ => PhaseKind::BuildInstructions,
        })
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            frame_index: self.read_u64()?,
            phase: self.read_phase()?,
        }))
    }

    fn decode_group_update(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::GroupUpdate(GroupUpdateEvent {
            frame_index: self.read_u64()?,
            group_index: self.read_u32()?,
            nodes_updated: self.read_u32()?,
        }))
    }

    fn decode_group_rebuild(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::GroupRebuild(GroupRebuildEvent {
            frame_index: self.read_u64()?,
            group_index: self.read_u32()?,
            instruction_count: self.read_u32()?,
        }))
    }

    fn decode_frame_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameSummary(FrameSummary {
            frame_index: self.read_u64()?,
            nodes_updated: self.read_u32()?,
            groups_updated: self.read_u32()?,
            groups_rebuilt: self.read_u32()?,
            renderables_updated: self.read_u32()?,
            textures_invalidated: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_GROUP_UPDATE => self.decode_group_update(),
            TAG_GROUP_REBUILD => self.decode_group_rebuild(),
            TAG_FRAME_SUMMARY => self.decode_frame_summary(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 7,
            nodes_updated: 120,
            groups_updated: 3,
            groups_rebuilt: 1,
            renderables_updated: 4,
            textures_invalidated: 2,
        }
    }

    #[test]
    fn phase_events_keep_their_kind() {
        let mut rec = RecorderSink::new();
        rec.on_phase_begin(&PhaseBeginEvent {
            frame_index: 5,
            phase: PhaseKind::UpdateTransforms,
        });
        rec.on_phase_end(&PhaseEndEvent {
            frame_index: 5,
            phase: PhaseKind::BuildInstructions,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecordedEvent::PhaseBegin(e) => {
                assert_eq!(e.frame_index, 5);
                assert_eq!(e.phase, PhaseKind::UpdateTransforms);
            }
            other => panic!("expected PhaseBegin, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::PhaseEnd(e) => {
                assert_eq!(e.frame_index, 5);
                assert_eq!(e.phase, PhaseKind::BuildInstructions);
            }
            other => panic!("expected PhaseEnd, got {other:?}"),
        }
    }

    #[test]
    fn group_events_decode_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_group_update(&GroupUpdateEvent {
            frame_index: 2,
            group_index: 0,
            nodes_updated: 17,
        });
        rec.on_group_rebuild(&GroupRebuildEvent {
            frame_index: 2,
            group_index: 4,
            instruction_count: 9,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            RecordedEvent::GroupUpdate(GroupUpdateEvent {
                group_index: 0,
                nodes_updated: 17,
                ..
            })
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::GroupRebuild(GroupRebuildEvent {
                group_index: 4,
                instruction_count: 9,
                ..
            })
        ));
    }

    #[test]
    fn frame_summary_survives_recording() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&sample_summary());

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::FrameSummary(s)] => assert_eq!(*s, sample_summary()),
            other => panic!("expected one FrameSummary, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_frame_summary(&sample_summary());
        rec.on_frame_summary(&sample_summary());
        let bytes = rec.into_bytes();

        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
