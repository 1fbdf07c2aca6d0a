// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Write errors
//! are ignored.

use std::io::Write;

use nwin_egl_core::trace::{
    AttachmentCreatedEvent, FenceAttachedEvent, SlotAcquiredEvent, SlotCanceledEvent,
    SlotQueuedEvent, SurfaceCreatedEvent, SurfaceDestroyedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[fb {}] created {}x{} {:?}{}",
            e.framebuffer.0,
            e.width,
            e.height,
            e.color_format,
            if e.default_window {
                " (default window)"
            } else {
                ""
            },
        );
    }

    fn on_slot_acquired(&mut self, e: &SlotAcquiredEvent) {
        let _ = writeln!(
            self.writer,
            "[fb {}] acquired slot {} at stamp {}",
            e.framebuffer.0, e.slot, e.stamp
        );
    }

    fn on_attachment_created(&mut self, e: &AttachmentCreatedEvent) {
        let _ = writeln!(
            self.writer,
            "[fb {}] allocated {:?} as {:?}",
            e.framebuffer.0, e.kind, e.format
        );
    }

    fn on_fence_attached(&mut self, e: &FenceAttachedEvent) {
        let _ = writeln!(
            self.writer,
            "[fb {}] slot {} fence {{{}, {}}}",
            e.framebuffer.0, e.slot, e.fence.id, e.fence.value
        );
    }

    fn on_slot_queued(&mut self, e: &SlotQueuedEvent) {
        let _ = writeln!(
            self.writer,
            "[fb {}] queued slot {}{} -> stamp {}",
            e.framebuffer.0,
            e.slot,
            if e.fenced { " (fenced)" } else { "" },
            e.stamp
        );
    }

    fn on_slot_canceled(&mut self, e: &SlotCanceledEvent) {
        let _ = writeln!(self.writer, "[fb {}] canceled slot {}", e.framebuffer.0, e.slot);
    }

    fn on_surface_destroyed(&mut self, e: &SurfaceDestroyedEvent) {
        let _ = writeln!(
            self.writer,
            "[fb {}] destroyed after {} presents",
            e.framebuffer.0, e.presents
        );
    }
}
