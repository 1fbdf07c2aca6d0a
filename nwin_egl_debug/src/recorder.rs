// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use nwin_egl_core::attachment::AttachmentKind;
use nwin_egl_core::fence::Fence;
use nwin_egl_core::format::PixelFormat;
use nwin_egl_core::framebuffer::FramebufferId;
use nwin_egl_core::trace::{
    AttachmentCreatedEvent, FenceAttachedEvent, SlotAcquiredEvent, SlotCanceledEvent,
    SlotQueuedEvent, SurfaceCreatedEvent, SurfaceDestroyedEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_SURFACE_CREATED: u8 = 1;
const TAG_SLOT_ACQUIRED: u8 = 2;
const TAG_ATTACHMENT_CREATED: u8 = 3;
const TAG_FENCE_ATTACHED: u8 = 4;
const TAG_SLOT_QUEUED: u8 = 5;
const TAG_SLOT_CANCELED: u8 = 6;
const TAG_SURFACE_DESTROYED: u8 = 7;

const FORMATS: [PixelFormat; 9] = [
    PixelFormat::None,
    PixelFormat::R8G8B8A8Unorm,
    PixelFormat::R16G16B16A16Float,
    PixelFormat::S8Uint,
    PixelFormat::Z16Unorm,
    PixelFormat::Z24X8Unorm,
    PixelFormat::Z24UnormS8Uint,
    PixelFormat::Z32Float,
    PixelFormat::Z32FloatS8X24Uint,
];

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

    fn write_header(&mut self, tag: u8, framebuffer: FramebufferId) {
        self.write_u8(tag);
        self.write_u32(framebuffer.0);
    }

    fn write_format(&mut self, format: PixelFormat) {
        let index = FORMATS.iter().position(|f| *f == format).unwrap_or(0);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "format table has fewer than 256 entries"
        )]
        let index = index as u8;
        self.write_u8(index);
    }

    fn write_kind(&mut self, kind: AttachmentKind) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "attachment kinds fit in a byte"
        )]
        let index = kind.index() as u8;
        self.write_u8(index);
    }
}

impl TraceSink for RecorderSink {
    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        self.write_header(TAG_SURFACE_CREATED, e.framebuffer);
        self.write_u32(e.width);
        self.write_u32(e.height);
        self.write_format(e.color_format);
        self.write_u8(u8::from(e.default_window));
    }

    fn on_slot_acquired(&mut self, e: &SlotAcquiredEvent) {
        self.write_header(TAG_SLOT_ACQUIRED, e.framebuffer);
        self.write_u32(e.slot);
        self.write_u32(e.stamp);
    }

    fn on_attachment_created(&mut self, e: &AttachmentCreatedEvent) {
        self.write_header(TAG_ATTACHMENT_CREATED, e.framebuffer);
        self.write_kind(e.kind);
        self.write_format(e.format);
    }

    fn on_fence_attached(&mut self, e: &FenceAttachedEvent) {
        self.write_header(TAG_FENCE_ATTACHED, e.framebuffer);
        self.write_u32(e.slot);
        self.write_u32(e.fence.id);
        self.write_u32(e.fence.value);
    }

    fn on_slot_queued(&mut self, e: &SlotQueuedEvent) {
        self.write_header(TAG_SLOT_QUEUED, e.framebuffer);
        self.write_u32(e.slot);
        self.write_u8(u8::from(e.fenced));
        self.write_u32(e.stamp);
    }

    fn on_slot_canceled(&mut self, e: &SlotCanceledEvent) {
        self.write_header(TAG_SLOT_CANCELED, e.framebuffer);
        self.write_u32(e.slot);
    }

    fn on_surface_destroyed(&mut self, e: &SurfaceDestroyedEvent) {
        self.write_header(TAG_SURFACE_DESTROYED, e.framebuffer);
        self.write_u32(e.presents);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`SurfaceCreatedEvent`].
    SurfaceCreated(SurfaceCreatedEvent),
    /// A [`SlotAcquiredEvent`].
    SlotAcquired(SlotAcquiredEvent),
    /// An [`AttachmentCreatedEvent`].
    AttachmentCreated(AttachmentCreatedEvent),
    /// A [`FenceAttachedEvent`].
    FenceAttached(FenceAttachedEvent),
    /// A [`SlotQueuedEvent`].
    SlotQueued(SlotQueuedEvent),
    /// A [`SlotCanceledEvent`].
    SlotCanceled(SlotCanceledEvent),
    /// A [`SurfaceDestroyedEvent`].
    SurfaceDestroyed(SurfaceDestroyedEvent),
}

impl RecordedEvent {
    /// The surface the event belongs to.
    #[must_use]
    pub fn framebuffer(&self) -> FramebufferId {
        match self {
            Self::SurfaceCreated(e) => e.framebuffer,
            Self::SlotAcquired(e) => e.framebuffer,
            Self::AttachmentCreated(e) => e.framebuffer,
            Self::FenceAttached(e) => e.framebuffer,
            Self::SlotQueued(e) => e.framebuffer,
            Self::SlotCanceled(e) => e.framebuffer,
            Self::SurfaceDestroyed(e) => e.framebuffer,
        }
    }

    /// Short event name, as used by the exporters.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SurfaceCreated(_) => "SurfaceCreated",
            Self::SlotAcquired(_) => "SlotAcquired",
            Self::AttachmentCreated(_) => "AttachmentCreated",
            Self::FenceAttached(_) => "FenceAttached",
            Self::SlotQueued(_) => "SlotQueued",
            Self::SlotCanceled(_) => "SlotCanceled",
            Self::SurfaceDestroyed(_) => "SurfaceDestroyed",
        }
    }
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

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_framebuffer(&mut self) -> Option<FramebufferId> {
        Some(FramebufferId(self.read_u32()?))
    }

    fn read_format(&mut self) -> Option<PixelFormat> {
        FORMATS.get(usize::from(self.read_u8()?)).copied()
    }

    fn read_kind(&mut self) -> Option<AttachmentKind> {
        AttachmentKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn decode_surface_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SurfaceCreated(SurfaceCreatedEvent {
            framebuffer: self.read_framebuffer()?,
            width: self.read_u32()?,
            height: self.read_u32()?,
            color_format: self.read_format()?,
            default_window: self.read_bool()?,
        }))
    }

    fn decode_slot_acquired(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotAcquired(SlotAcquiredEvent {
            framebuffer: self.read_framebuffer()?,
            slot: self.read_u32()?,
            stamp: self.read_u32()?,
        }))
    }

    fn decode_attachment_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AttachmentCreated(AttachmentCreatedEvent {
            framebuffer: self.read_framebuffer()?,
            kind: self.read_kind()?,
            format: self.read_format()?,
        }))
    }

    fn decode_fence_attached(&mut self) -> Option<RecordedEvent> {
        let framebuffer = self.read_framebuffer()?;
        let slot = self.read_u32()?;
        let fence = Fence::new(self.read_u32()?, self.read_u32()?);
        Some(RecordedEvent::FenceAttached(FenceAttachedEvent {
            framebuffer,
            slot,
            fence,
        }))
    }

    fn decode_slot_queued(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotQueued(SlotQueuedEvent {
            framebuffer: self.read_framebuffer()?,
            slot: self.read_u32()?,
            fenced: self.read_bool()?,
            stamp: self.read_u32()?,
        }))
    }

    fn decode_slot_canceled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SlotCanceled(SlotCanceledEvent {
            framebuffer: self.read_framebuffer()?,
            slot: self.read_u32()?,
        }))
    }

    fn decode_surface_destroyed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SurfaceDestroyed(SurfaceDestroyedEvent {
            framebuffer: self.read_framebuffer()?,
            presents: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_SURFACE_CREATED => self.decode_surface_created(),
            TAG_SLOT_ACQUIRED => self.decode_slot_acquired(),
            TAG_ATTACHMENT_CREATED => self.decode_attachment_created(),
            TAG_FENCE_ATTACHED => self.decode_fence_attached(),
            TAG_SLOT_QUEUED => self.decode_slot_queued(),
            TAG_SLOT_CANCELED => self.decode_slot_canceled(),
            TAG_SURFACE_DESTROYED => self.decode_surface_destroyed(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
