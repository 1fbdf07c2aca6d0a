// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace events emitted over a surface's lifetime.

#![cfg(feature = "trace")]

use std::cell::RefCell;
use std::rc::Rc;

use nwin_egl_core::attachment::AttachmentKind;
use nwin_egl_core::default_window::DefaultWindow;
use nwin_egl_core::fence::Fence;
use nwin_egl_core::format::PixelFormat;
use nwin_egl_core::framebuffer::Framebuffer;
use nwin_egl_core::surface::Surface;
use nwin_egl_core::trace::{
    AttachmentCreatedEvent, FenceAttachedEvent, SlotAcquiredEvent, SlotCanceledEvent,
    SlotQueuedEvent, SurfaceCreatedEvent, SurfaceDestroyedEvent, TraceSink, Tracer,
};
use nwin_egl_core::visual::Visual;
use nwin_egl_harness::{FakeCompositor, FakeScreen};

#[derive(Debug, Default)]
struct EventLog(Vec<String>);

impl TraceSink for EventLog {
    fn on_surface_created(&mut self, e: &SurfaceCreatedEvent) {
        self.0.push(format!("created {}x{}", e.width, e.height));
    }
    fn on_slot_acquired(&mut self, e: &SlotAcquiredEvent) {
        self.0.push(format!("acquired {}", e.slot));
    }
    fn on_attachment_created(&mut self, e: &AttachmentCreatedEvent) {
        self.0.push(format!("attachment {:?}", e.kind));
    }
    fn on_fence_attached(&mut self, e: &FenceAttachedEvent) {
        self.0.push(format!("fence {}:{}", e.fence.id, e.fence.value));
    }
    fn on_slot_queued(&mut self, e: &SlotQueuedEvent) {
        self.0.push(format!("queued {} stamp {}", e.slot, e.stamp));
    }
    fn on_slot_canceled(&mut self, e: &SlotCanceledEvent) {
        self.0.push(format!("canceled {}", e.slot));
    }
    fn on_surface_destroyed(&mut self, e: &SurfaceDestroyedEvent) {
        self.0.push(format!("destroyed after {}", e.presents));
    }
}

#[test]
fn surface_lifecycle_events() {
    let compositor = Rc::new(FakeCompositor::new());
    let screen = Rc::new(FakeScreen::new());
    let registry = Rc::new(DefaultWindow::new(Rc::clone(&compositor)));
    let log = Rc::new(RefCell::new(EventLog::default()));
    let window = compositor.add_window(64, 32);

    let surface = Surface::new(
        Rc::clone(&screen),
        &registry,
        Some(window),
        Visual::double_buffered(PixelFormat::R8G8B8A8Unorm, PixelFormat::Z16Unorm),
        Tracer::new(log.clone()),
    )
    .unwrap();

    screen.set_default_token(Some(Fence::new(4, 9)));
    compositor.force_next_dequeue(1);
    surface
        .validate(&[AttachmentKind::BackLeft, AttachmentKind::DepthStencil])
        .unwrap();
    surface.present(None);
    compositor.force_next_dequeue(2);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    drop(surface);

    assert_eq!(
        log.borrow().0,
        [
            "created 64x32",
            "acquired 1",
            "attachment DepthStencil",
            "fence 4:9",
            "queued 1 stamp 1",
            "acquired 2",
            "canceled 2",
            "destroyed after 1",
        ]
    );
}
