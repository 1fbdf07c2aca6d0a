// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording a live surface and reading it back.

use std::cell::RefCell;
use std::rc::Rc;

use nwin_egl_core::attachment::AttachmentKind;
use nwin_egl_core::default_window::DefaultWindow;
use nwin_egl_core::fence::Fence;
use nwin_egl_core::format::PixelFormat;
use nwin_egl_core::framebuffer::Framebuffer;
use nwin_egl_core::surface::Surface;
use nwin_egl_core::trace::Tracer;
use nwin_egl_core::visual::Visual;
use nwin_egl_debug::recorder::{RecordedEvent, RecorderSink, decode};
use nwin_egl_harness::{FakeCompositor, FakeScreen};

#[test]
fn recorded_surface_lifecycle() {
    let compositor = Rc::new(FakeCompositor::new());
    let screen = Rc::new(FakeScreen::new());
    let registry = Rc::new(DefaultWindow::new(Rc::clone(&compositor)));
    let recorder = Rc::new(RefCell::new(RecorderSink::new()));

    let surface = Surface::new(
        Rc::clone(&screen),
        &registry,
        None,
        Visual::double_buffered(PixelFormat::R8G8B8A8Unorm, PixelFormat::Z16Unorm),
        Tracer::new(recorder.clone()),
    )
    .unwrap();
    let id = surface.id();

    screen.set_default_token(Some(Fence::new(1, 2)));
    for _ in 0..2 {
        surface
            .validate(&[AttachmentKind::BackLeft, AttachmentKind::DepthStencil])
            .unwrap();
        surface.present(None);
    }
    drop(surface);

    let names: Vec<_> = decode(recorder.borrow().as_bytes())
        .map(|e| {
            assert_eq!(e.framebuffer(), id);
            e.name()
        })
        .collect();
    assert_eq!(
        names,
        [
            "SurfaceCreated",
            "SlotAcquired",
            "AttachmentCreated",
            "FenceAttached",
            "SlotQueued",
            "SlotAcquired",
            "FenceAttached",
            "SlotQueued",
            "SurfaceDestroyed",
        ]
    );

    let first = decode(recorder.borrow().as_bytes()).next();
    match first {
        Some(RecordedEvent::SurfaceCreated(e)) => {
            assert!(e.default_window);
            assert_eq!((e.width, e.height), (1280, 720));
        }
        other => panic!("expected SurfaceCreated, got {other:?}"),
    }
}
