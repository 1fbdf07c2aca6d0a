// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface lifecycle against the in-memory compositor and screen.

use std::rc::Rc;

use nwin_egl_core::Error;
use nwin_egl_core::attachment::AttachmentKind;
use nwin_egl_core::default_window::DefaultWindow;
use nwin_egl_core::fence::Fence;
use nwin_egl_core::format::PixelFormat;
use nwin_egl_core::framebuffer::Framebuffer;
use nwin_egl_core::platform::{ContextApi, ContextAttribs, ContextFlags, FlushFlags, Profile};
use nwin_egl_core::resource::{BindFlags, TextureTarget};
use nwin_egl_core::surface::{PresentOutcome, Surface};
use nwin_egl_core::swap_chain::Slot;
use nwin_egl_core::trace::Tracer;
use nwin_egl_core::visual::Visual;
use nwin_egl_harness::{
    CompositorCall, FakeApi, FakeCompositor, FakeContext, FakeScreen, TransportOp, WindowHandle,
};

type TestSurface = Surface<FakeCompositor, FakeScreen>;

struct Fixture {
    compositor: Rc<FakeCompositor>,
    screen: Rc<FakeScreen>,
    registry: Rc<DefaultWindow<FakeCompositor>>,
}

impl Fixture {
    fn new() -> Self {
        let compositor = Rc::new(FakeCompositor::new());
        let registry = Rc::new(DefaultWindow::new(Rc::clone(&compositor)));
        Self {
            compositor,
            screen: Rc::new(FakeScreen::new()),
            registry,
        }
    }

    fn surface(
        &self,
        window: Option<WindowHandle>,
        depth: PixelFormat,
    ) -> Result<TestSurface, Error> {
        Surface::new(
            Rc::clone(&self.screen),
            &self.registry,
            window,
            Visual::double_buffered(PixelFormat::R8G8B8A8Unorm, depth),
            Tracer::none(),
        )
    }

    fn window_surface(&self, depth: PixelFormat) -> (WindowHandle, TestSurface) {
        let window = self.compositor.add_window(1280, 720);
        let surface = self.surface(Some(window), depth).unwrap();
        (window, surface)
    }

    fn dequeues(&self) -> usize {
        self.compositor
            .count(|c| matches!(c, CompositorCall::Dequeue { .. }))
    }

    fn queues(&self) -> usize {
        self.compositor
            .count(|c| matches!(c, CompositorCall::Queue { .. }))
    }
}

fn context() -> (FakeApi, FakeContext) {
    let api = FakeApi::new();
    let ctx = api
        .create_context(&ContextAttribs {
            profile: Profile::OpenGlEs2,
            major: 2,
            minor: 0,
            flags: ContextFlags::empty(),
            visual: Visual::double_buffered(PixelFormat::R8G8B8A8Unorm, PixelFormat::None),
        })
        .unwrap();
    (api, ctx)
}

fn slot(i: u32) -> Slot {
    Slot::new(i).unwrap()
}

#[test]
fn creation_registers_three_buffers() {
    let fx = Fixture::new();
    let (window, surface) = fx.window_surface(PixelFormat::None);

    assert_eq!(fx.compositor.configured_buffers(window), 3);
    let created = fx.screen.created();
    assert_eq!(created.len(), 3);
    for t in &created {
        assert_eq!(t.target, TextureTarget::TextureRect);
        assert_eq!(t.format, PixelFormat::R8G8B8A8Unorm);
        assert_eq!((t.width, t.height), (1280, 720));
        assert_eq!(t.bind, BindFlags::RENDER_TARGET);
    }
    assert_eq!(surface.current_slot(), None);
    assert_eq!(surface.dimensions(), (1280, 720));
    assert_eq!(surface.stamp(), 0);
    assert!(!surface.uses_default_window());
}

#[test]
fn back_buffer_validate_dequeues_once() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);

    let first = surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    let slot = surface.current_slot().expect("slot acquired");
    assert!(slot.get() < 3);
    assert_eq!(fx.dequeues(), 1);

    let second = surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    assert_eq!(fx.dequeues(), 1);
    let (a, b) = (first[0].as_ref().unwrap(), second[0].as_ref().unwrap());
    assert!(Rc::ptr_eq(a, b));
    assert!(Rc::ptr_eq(a, &surface.buffer(slot)));
}

#[test]
fn present_queues_slot_and_rotates_front() {
    let fx = Fixture::new();
    let (window, surface) = fx.window_surface(PixelFormat::None);
    let (api, mut ctx) = context();

    let back = surface.validate(&[AttachmentKind::BackLeft]).unwrap()[0]
        .clone()
        .unwrap();
    let acquired = surface.current_slot().unwrap();

    let outcome = surface.present(Some(&mut ctx));
    assert_eq!(
        outcome,
        PresentOutcome::Queued {
            slot: acquired,
            fence: None
        }
    );
    assert_eq!(fx.queues(), 1);
    assert!(fx.compositor.calls().contains(&CompositorCall::Queue {
        window,
        slot: acquired.get(),
        fence: None,
    }));
    assert_eq!(surface.current_slot(), None);
    assert!(surface.attachment(AttachmentKind::BackLeft).is_none());
    let front = surface.attachment(AttachmentKind::FrontLeft).unwrap();
    assert!(Rc::ptr_eq(&front, &back));
    assert_eq!(surface.stamp(), 1);
    assert_eq!(api.flushes(), [(ctx.id(), FlushFlags::END_OF_FRAME)]);
}

#[test]
fn present_without_acquired_slot_is_noop() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    let (api, mut ctx) = context();
    fx.screen.set_default_token(Some(Fence::new(1, 1)));

    assert_eq!(surface.present(Some(&mut ctx)), PresentOutcome::Idle);
    assert_eq!(fx.queues(), 0);
    assert!(api.flushes().is_empty());
    for s in Slot::all() {
        assert_eq!(surface.fence(s), None);
    }
    assert_eq!(surface.stamp(), 0);
}

#[test]
fn next_frame_acquires_a_new_back_buffer() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    let (_api, mut ctx) = context();

    for frame in 1..=5_u32 {
        surface.validate(&[AttachmentKind::BackLeft]).unwrap();
        surface.present(Some(&mut ctx));
        assert_eq!(surface.stamp(), frame);
    }
    assert_eq!(fx.dequeues(), 5);
    assert_eq!(fx.queues(), 5);
    assert_eq!(surface.presents(), 5);
}

#[test]
fn depth_stencil_is_created_once() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::Z24UnormS8Uint);
    let before = fx.screen.created().len();

    let first = surface.validate(&[AttachmentKind::DepthStencil]).unwrap();
    let created = fx.screen.created();
    assert_eq!(created.len(), before + 1);
    let t = created.last().unwrap();
    assert_eq!(t.bind, BindFlags::DEPTH_STENCIL);
    assert_eq!(t.format, PixelFormat::Z24UnormS8Uint);
    assert_eq!((t.width, t.height), (1280, 720));

    let second = surface.validate(&[AttachmentKind::DepthStencil]).unwrap();
    assert_eq!(fx.screen.created().len(), before + 1);
    assert!(Rc::ptr_eq(
        first[0].as_ref().unwrap(),
        second[0].as_ref().unwrap()
    ));
    assert_eq!(fx.dequeues(), 0);
}

#[test]
fn depth_stencil_survives_present() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::Z16Unorm);
    let (_api, mut ctx) = context();

    let kinds = [AttachmentKind::BackLeft, AttachmentKind::DepthStencil];
    let first = surface.validate(&kinds).unwrap();
    surface.present(Some(&mut ctx));
    let second = surface.validate(&kinds).unwrap();

    assert!(Rc::ptr_eq(
        first[1].as_ref().unwrap(),
        second[1].as_ref().unwrap()
    ));
    assert_eq!(fx.screen.created().len(), 4);
    assert_eq!(fx.dequeues(), 2);
}

#[test]
fn accumulation_uses_float_render_target() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);

    let res = surface.validate(&[AttachmentKind::Accum]).unwrap();
    assert!(res[0].is_some());
    let t = fx.screen.created().last().copied().unwrap();
    assert_eq!(t.format, PixelFormat::R16G16B16A16Float);
    assert_eq!(t.bind, BindFlags::RENDER_TARGET);
}

#[test]
fn unproduced_kinds_resolve_to_none() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);

    let res = surface
        .validate(&[
            AttachmentKind::FrontLeft,
            AttachmentKind::FrontRight,
            AttachmentKind::BackRight,
            AttachmentKind::DepthStencil,
        ])
        .unwrap();
    assert_eq!(res.len(), 4);
    assert!(res.iter().all(Option::is_none));
    assert_eq!(fx.dequeues(), 0);
    assert_eq!(fx.screen.created().len(), 3);
}

#[test]
fn depth_allocation_failure_is_retryable() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::Z24X8Unorm);

    fx.screen.fail_allocations_after(0);
    assert_eq!(
        surface
            .validate(&[AttachmentKind::DepthStencil])
            .unwrap_err(),
        Error::BadAlloc("depth/stencil attachment")
    );
    assert!(surface.attachment(AttachmentKind::DepthStencil).is_none());

    fx.screen.allow_allocations();
    let res = surface.validate(&[AttachmentKind::DepthStencil]).unwrap();
    assert!(res[0].is_some());
}

#[test]
fn failed_validate_keeps_earlier_kinds() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::Z32Float);

    fx.screen.fail_allocations_after(0);
    let err = surface
        .validate(&[AttachmentKind::BackLeft, AttachmentKind::DepthStencil])
        .unwrap_err();
    assert_eq!(err, Error::BadAlloc("depth/stencil attachment"));
    assert!(surface.current_slot().is_some());
    assert!(surface.attachment(AttachmentKind::BackLeft).is_some());
}

#[test]
fn repeated_fence_is_not_reattached() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    let (_api, mut ctx) = context();
    let fence = Fence::new(5, 10);
    fx.screen.set_default_token(Some(fence));

    fx.compositor.force_next_dequeue(0);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    assert_eq!(
        surface.present(Some(&mut ctx)),
        PresentOutcome::Queued {
            slot: slot(0),
            fence: Some(fence)
        }
    );
    assert_eq!(surface.fence(slot(0)), Some(fence));

    fx.compositor.force_next_dequeue(0);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    assert_eq!(
        surface.present(Some(&mut ctx)),
        PresentOutcome::Queued {
            slot: slot(0),
            fence: None
        }
    );

    let next = Fence::new(5, 11);
    fx.screen.set_default_token(Some(next));
    fx.compositor.force_next_dequeue(0);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    assert_eq!(
        surface.present(Some(&mut ctx)),
        PresentOutcome::Queued {
            slot: slot(0),
            fence: Some(next)
        }
    );
    assert_eq!(surface.fence(slot(0)), Some(next));
}

#[test]
fn fences_are_tracked_per_slot() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    let (_api, mut ctx) = context();
    let fence = Fence::new(2, 7);
    fx.screen.set_default_token(Some(fence));

    fx.compositor.force_next_dequeue(0);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    surface.present(Some(&mut ctx));

    fx.compositor.force_next_dequeue(1);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    assert_eq!(
        surface.present(Some(&mut ctx)),
        PresentOutcome::Queued {
            slot: slot(1),
            fence: Some(fence)
        }
    );
}

#[test]
fn missing_token_queues_without_fence() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);

    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    let slot = surface.current_slot().unwrap();
    assert_eq!(
        surface.present(None),
        PresentOutcome::Queued { slot, fence: None }
    );
    assert_eq!(surface.fence(slot), None);
}

#[test]
fn destroy_cancels_acquired_slot_before_release() {
    let fx = Fixture::new();
    let (window, surface) = fx.window_surface(PixelFormat::Z24UnormS8Uint);

    fx.compositor.force_next_dequeue(2);
    surface
        .validate(&[AttachmentKind::BackLeft, AttachmentKind::DepthStencil])
        .unwrap();
    assert_eq!(surface.current_slot(), Some(slot(2)));
    fx.compositor.clear_calls();
    drop(surface);

    assert_eq!(
        fx.compositor.calls(),
        [
            CompositorCall::Cancel {
                window,
                slot: 2,
                fence: None
            },
            CompositorCall::ReleaseBuffers { window },
        ]
    );
    assert_eq!(fx.screen.live_resources(), 0);
}

#[test]
fn destroy_idle_surface_only_releases() {
    let fx = Fixture::new();
    let (window, surface) = fx.window_surface(PixelFormat::None);
    let (_api, mut ctx) = context();
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    surface.present(Some(&mut ctx));
    fx.compositor.clear_calls();

    drop(surface);
    assert_eq!(
        fx.compositor.calls(),
        [CompositorCall::ReleaseBuffers { window }]
    );
    assert_eq!(fx.screen.live_resources(), 0);
}

#[test]
fn missing_window_uses_default_window() {
    let fx = Fixture::new();
    let surface = fx.surface(None, PixelFormat::None).unwrap();

    assert!(surface.uses_default_window());
    assert!(fx.registry.is_in_use());
    assert_eq!(surface.dimensions(), (1280, 720));
    assert_eq!(
        fx.compositor.calls()[0],
        CompositorCall::CreateDefaultWindow {
            window: surface.window(),
            width: 1280,
            height: 720,
        }
    );
}

#[test]
fn invalid_window_falls_back_to_default() {
    let fx = Fixture::new();
    let window = fx.compositor.add_window(640, 480);
    fx.compositor.close_window(window);

    let surface = fx.surface(Some(window), PixelFormat::None).unwrap();
    assert!(surface.uses_default_window());
    assert_ne!(surface.window(), window);
}

#[test]
fn second_default_window_surface_is_rejected() {
    let fx = Fixture::new();
    let (_api, mut ctx) = context();
    let first = fx.surface(None, PixelFormat::None).unwrap();

    assert_eq!(
        fx.surface(None, PixelFormat::None).unwrap_err(),
        Error::BadNativeWindow
    );

    // The first surface keeps working.
    first.validate(&[AttachmentKind::BackLeft]).unwrap();
    assert!(matches!(
        first.present(Some(&mut ctx)),
        PresentOutcome::Queued { .. }
    ));

    let window = first.window();
    drop(first);
    assert!(
        fx.compositor
            .calls()
            .contains(&CompositorCall::DestroyDefaultWindow { window })
    );
    assert!(!fx.registry.is_in_use());
    assert!(fx.surface(None, PixelFormat::None).is_ok());
}

#[test]
fn default_window_uses_configured_resolution() {
    let fx = Fixture::new();
    fx.registry.set_resolution(1920, 1080);
    let surface = fx.surface(None, PixelFormat::None).unwrap();
    assert_eq!(surface.dimensions(), (1920, 1080));
}

#[test]
fn buffer_allocation_failure_rolls_back() {
    let fx = Fixture::new();
    let window = fx.compositor.add_window(320, 240);
    fx.screen.fail_allocations_after(2);

    assert_eq!(
        fx.surface(Some(window), PixelFormat::None).unwrap_err(),
        Error::BadAlloc("window buffer")
    );
    assert_eq!(fx.screen.live_resources(), 0);
    assert_eq!(fx.compositor.configured_buffers(window), 0);
    assert_eq!(
        fx.compositor.calls().last(),
        Some(&CompositorCall::ReleaseBuffers { window })
    );
}

#[test]
fn export_failure_releases_default_window() {
    let fx = Fixture::new();
    fx.screen.fail_native_export(true);

    assert_eq!(
        fx.surface(None, PixelFormat::None).unwrap_err(),
        Error::BadAlloc("native buffer descriptor")
    );
    assert_eq!(fx.screen.live_resources(), 0);
    assert!(!fx.registry.is_in_use());
    assert!(matches!(
        fx.compositor.calls().last(),
        Some(CompositorCall::DestroyDefaultWindow { .. })
    ));
}

#[test]
fn flush_hooks_do_nothing() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    fx.compositor.clear_calls();

    assert_eq!(surface.flush_front(AttachmentKind::FrontLeft), Ok(()));
    assert_eq!(surface.flush_swapbuffers(), Ok(()));
    assert!(fx.compositor.calls().is_empty());
    assert_eq!(surface.stamp(), 0);
}

#[test]
fn swap_interval_is_forwarded() {
    let fx = Fixture::new();
    let (window, surface) = fx.window_surface(PixelFormat::None);
    surface.set_swap_interval(0);
    assert_eq!(fx.compositor.swap_interval(window), Some(0));
}

#[test]
fn framebuffer_ids_are_distinct() {
    let fx = Fixture::new();
    let (_, a) = fx.window_surface(PixelFormat::None);
    let (_, b) = fx.window_surface(PixelFormat::None);
    assert_ne!(a.id(), b.id());
    assert_eq!(a.visual().render_buffer, AttachmentKind::BackLeft);
}

#[test]
#[should_panic(expected = "configure buffer")]
fn configure_failure_is_fatal() {
    let fx = Fixture::new();
    fx.compositor.fail_next(TransportOp::Configure, 0x1f);
    let _ = fx.window_surface(PixelFormat::None);
}

#[test]
#[should_panic(expected = "dequeue buffer")]
fn dequeue_failure_is_fatal() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    fx.compositor.fail_next(TransportOp::Dequeue, 0x20);
    let _ = surface.validate(&[AttachmentKind::BackLeft]);
}

#[test]
#[should_panic(expected = "dequeue buffer returned slot 7")]
fn out_of_range_slot_is_fatal() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    fx.compositor.force_next_dequeue(7);
    let _ = surface.validate(&[AttachmentKind::BackLeft]);
}

#[test]
#[should_panic(expected = "queue buffer")]
fn queue_failure_is_fatal() {
    let fx = Fixture::new();
    let (_, surface) = fx.window_surface(PixelFormat::None);
    surface.validate(&[AttachmentKind::BackLeft]).unwrap();
    fx.compositor.fail_next(TransportOp::Queue, 0x21);
    surface.present(None);
}
