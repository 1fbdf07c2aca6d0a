// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the surface lifecycle.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! surfaces call as buffers move through the swap chain. All method bodies
//! default to no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional shared sink. Surfaces outlive any single call,
//! so the sink is held as a [`SharedSink`] rather than borrowed. When the
//! `trace` feature is **off**, every `Tracer` method compiles to nothing. When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::attachment::AttachmentKind;
use crate::fence::Fence;
use crate::format::PixelFormat;
use crate::framebuffer::FramebufferId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a window surface finishes construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceCreatedEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Color buffer format.
    pub color_format: PixelFormat,
    /// Whether the surface presents to the default window.
    pub default_window: bool,
}

/// Emitted when a slot is dequeued for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotAcquiredEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Acquired slot index.
    pub slot: u32,
    /// Surface stamp at acquisition.
    pub stamp: u32,
}

/// Emitted when a depth/stencil or accumulation attachment is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttachmentCreatedEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Which attachment was created.
    pub kind: AttachmentKind,
    /// Format of the new resource.
    pub format: PixelFormat,
}

/// Emitted when a completion fence is attached to a queued slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FenceAttachedEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Slot the fence guards.
    pub slot: u32,
    /// The attached fence.
    pub fence: Fence,
}

/// Emitted when a slot is queued for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotQueuedEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Queued slot index.
    pub slot: u32,
    /// Whether a fence accompanied the buffer.
    pub fenced: bool,
    /// Surface stamp after the present.
    pub stamp: u32,
}

/// Emitted when an acquired slot is returned without display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotCanceledEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Canceled slot index.
    pub slot: u32,
}

/// Emitted when a surface is torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDestroyedEvent {
    /// Framebuffer identity of the surface.
    pub framebuffer: FramebufferId,
    /// Number of presents over the surface's lifetime.
    pub presents: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from surfaces.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a surface is created.
    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        _ = e;
    }

    /// Called when a slot is acquired.
    fn on_slot_acquired(&mut self, e: &SlotAcquiredEvent) {
        _ = e;
    }

    /// Called when an attachment is allocated.
    fn on_attachment_created(&mut self, e: &AttachmentCreatedEvent) {
        _ = e;
    }

    /// Called when a fence is attached to a submission.
    fn on_fence_attached(&mut self, e: &FenceAttachedEvent) {
        _ = e;
    }

    /// Called when a slot is queued.
    fn on_slot_queued(&mut self, e: &SlotQueuedEvent) {
        _ = e;
    }

    /// Called when a slot is canceled.
    fn on_slot_canceled(&mut self, e: &SlotCanceledEvent) {
        _ = e;
    }

    /// Called when a surface is destroyed.
    fn on_surface_destroyed(&mut self, e: &SurfaceDestroyedEvent) {
        _ = e;
    }
}

/// Shared handle to a sink, cloned into every traced surface.
pub type SharedSink = Rc<RefCell<dyn TraceSink>>;

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

/// Thin wrapper around an optional [`SharedSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Clone, Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<SharedSink>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $e:ident) => {
        #[cfg(feature = "trace")]
        if let Some(s) = &$self.sink {
            s.borrow_mut().$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (&$self, $e);
        }
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: SharedSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits a [`SurfaceCreatedEvent`].
    #[inline]
    pub fn surface_created(&self, e: &SurfaceCreatedEvent) {
        dispatch!(self, on_surface_created, e);
    }

    /// Emits a [`SlotAcquiredEvent`].
    #[inline]
    pub fn slot_acquired(&self, e: &SlotAcquiredEvent) {
        dispatch!(self, on_slot_acquired, e);
    }

    /// Emits an [`AttachmentCreatedEvent`].
    #[inline]
    pub fn attachment_created(&self, e: &AttachmentCreatedEvent) {
        dispatch!(self, on_attachment_created, e);
    }

    /// Emits a [`FenceAttachedEvent`].
    #[inline]
    pub fn fence_attached(&self, e: &FenceAttachedEvent) {
        dispatch!(self, on_fence_attached, e);
    }

    /// Emits a [`SlotQueuedEvent`].
    #[inline]
    pub fn slot_queued(&self, e: &SlotQueuedEvent) {
        dispatch!(self, on_slot_queued, e);
    }

    /// Emits a [`SlotCanceledEvent`].
    #[inline]
    pub fn slot_canceled(&self, e: &SlotCanceledEvent) {
        dispatch!(self, on_slot_canceled, e);
    }

    /// Emits a [`SurfaceDestroyedEvent`].
    #[inline]
    pub fn surface_destroyed(&self, e: &SurfaceDestroyedEvent) {
        dispatch!(self, on_surface_destroyed, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_queued() -> SlotQueuedEvent {
        SlotQueuedEvent {
            framebuffer: FramebufferId(7),
            slot: 1,
            fenced: true,
            stamp: 4,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_slot_queued(&sample_queued());
        sink.on_slot_canceled(&SlotCanceledEvent {
            framebuffer: FramebufferId(7),
            slot: 2,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let tracer = Tracer::none();
        tracer.slot_queued(&sample_queued());
        tracer.surface_destroyed(&SurfaceDestroyedEvent {
            framebuffer: FramebufferId(7),
            presents: 0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct RecordingSink {
            slots: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_slot_queued(&mut self, e: &SlotQueuedEvent) {
                self.slots.push(e.slot);
            }
        }

        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let tracer = Tracer::new(sink.clone());
        tracer.slot_queued(&sample_queued());
        let cloned = tracer.clone();
        cloned.slot_queued(&sample_queued());
        assert_eq!(sink.borrow().slots, [1, 1]);
    }
}
