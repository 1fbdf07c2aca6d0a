// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window surfaces: one swap chain, attachment cache and fence tracker per
//! drawable.
//!
//! A [`Surface`] implements [`Framebuffer`] for the rendering context and
//! [`present`](Surface::present) for the display layer. Between presents the
//! surface cycles through two states:
//!
//! ```text
//!   IDLE (no slot) ──validate(BackLeft)──► ACQUIRED (slot, back bound)
//!        ▲                                        │
//!        └──────────────── present() ─────────────┘
//! ```
//!
//! Presenting flushes the bound context, attaches the back buffer's
//! completion fence if it changed since that slot was last queued, queues the
//! slot, moves the back buffer to the front and bumps the stamp.
//!
//! Teardown releases owned attachments, cancels an acquired slot, drops the
//! window's buffer registrations and finally destroys the default window if
//! the surface leased it.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::attachment::{AttachmentCache, AttachmentKind};
use crate::default_window::{DefaultWindow, DefaultWindowLease};
use crate::error::Error;
use crate::fence::{Fence, FenceTracker};
use crate::format::PixelFormat;
use crate::framebuffer::{Framebuffer, FramebufferId};
use crate::platform::{Compositor, FlushFlags, RenderContext, Screen};
use crate::resource::{BindFlags, ResourceTemplate};
use crate::swap_chain::{Slot, SwapChain};
use crate::trace::{
    AttachmentCreatedEvent, FenceAttachedEvent, SlotAcquiredEvent, SlotCanceledEvent,
    SlotQueuedEvent, SurfaceCreatedEvent, SurfaceDestroyedEvent, Tracer,
};
use crate::visual::Visual;

/// Result of [`Surface::present`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentOutcome {
    /// No slot was acquired; nothing was queued.
    Idle,
    /// `slot` was queued, with `fence` attached if one was needed.
    Queued {
        /// The queued slot.
        slot: Slot,
        /// The fence sent with the buffer.
        fence: Option<Fence>,
    },
}

/// On-screen drawable bound to one compositor window.
pub struct Surface<C: Compositor, S: Screen> {
    screen: Rc<S>,
    // Field order is drop order: cached attachments go before the chain
    // releases its buffers, and the lease goes last.
    attachments: RefCell<AttachmentCache<S::Resource>>,
    fences: RefCell<FenceTracker>,
    chain: RefCell<SwapChain<C, S::Resource>>,
    template: ResourceTemplate,
    visual: Visual,
    id: FramebufferId,
    stamp: Cell<u32>,
    presents: Cell<u32>,
    tracer: Tracer,
    lease: Option<DefaultWindowLease<C>>,
}

impl<C: Compositor, S: Screen> fmt::Debug for Surface<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("window", &self.window())
            .field("current_slot", &self.current_slot())
            .field("stamp", &self.stamp.get())
            .field("default_window", &self.lease.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Compositor, S: Screen> Surface<C, S> {
    /// Creates a surface presenting to `window`.
    ///
    /// A missing or invalid `window` falls back to the default window of
    /// `registry`, failing with [`Error::BadNativeWindow`] if another surface
    /// holds it. Buffers are sized to the window and use the visual's color
    /// format. Allocation failures roll back everything created so far.
    pub fn new(
        screen: Rc<S>,
        registry: &Rc<DefaultWindow<C>>,
        window: Option<C::Window>,
        visual: Visual,
        tracer: Tracer,
    ) -> Result<Self, Error> {
        let compositor = Rc::clone(registry.compositor());
        let (window, lease) = match window.filter(|w| compositor.is_valid(*w)) {
            Some(w) => (w, None),
            None => {
                log::debug!("no valid native window; falling back to the default window");
                let lease = registry.lease()?;
                (lease.window(), Some(lease))
            }
        };

        let (width, height) = compositor.dimensions(window);
        let template = ResourceTemplate::window_buffer(visual.color_format, width, height);
        let chain = SwapChain::new(compositor, &*screen, window, &template)?;

        let surface = Self {
            screen,
            attachments: RefCell::new(AttachmentCache::new()),
            fences: RefCell::new(FenceTracker::new()),
            chain: RefCell::new(chain),
            template,
            visual,
            id: FramebufferId::next(),
            stamp: Cell::new(0),
            presents: Cell::new(0),
            tracer,
            lease,
        };
        log::debug!(
            "created {:?} on {window:?} ({width}x{height} {:?})",
            surface.id,
            visual.color_format
        );
        surface.tracer.surface_created(&SurfaceCreatedEvent {
            framebuffer: surface.id,
            width,
            height,
            color_format: visual.color_format,
            default_window: surface.lease.is_some(),
        });
        Ok(surface)
    }

    /// The window this surface presents to.
    #[must_use]
    pub fn window(&self) -> C::Window {
        self.chain.borrow().window()
    }

    /// Returns `true` if this surface holds the default window.
    #[must_use]
    pub fn uses_default_window(&self) -> bool {
        self.lease.is_some()
    }

    /// Buffer dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.template.width, self.template.height)
    }

    /// The slot currently acquired for rendering, if any.
    #[must_use]
    pub fn current_slot(&self) -> Option<Slot> {
        self.chain.borrow().current()
    }

    /// The cached resource for `kind`, without resolving a miss.
    #[must_use]
    pub fn attachment(&self, kind: AttachmentKind) -> Option<Rc<S::Resource>> {
        self.attachments.borrow().get(kind).cloned()
    }

    /// The buffer backing `slot`.
    #[must_use]
    pub fn buffer(&self, slot: Slot) -> Rc<S::Resource> {
        Rc::clone(self.chain.borrow().buffer(slot))
    }

    /// The fence last attached when `slot` was queued.
    #[must_use]
    pub fn fence(&self, slot: Slot) -> Option<Fence> {
        self.fences.borrow().get(slot)
    }

    /// Number of buffers queued over the surface's lifetime.
    #[must_use]
    pub fn presents(&self) -> u32 {
        self.presents.get()
    }

    /// Forwards the swap interval to the compositor.
    pub fn set_swap_interval(&self, interval: u32) {
        let chain = self.chain.borrow();
        chain.compositor().set_swap_interval(chain.window(), interval);
    }

    /// Presents the acquired back buffer.
    ///
    /// `context` is flushed with [`FlushFlags::END_OF_FRAME`] first. With no
    /// acquired slot this does nothing and returns [`PresentOutcome::Idle`].
    pub fn present(&self, context: Option<&mut dyn RenderContext>) -> PresentOutcome {
        let Some(slot) = self.current_slot() else {
            log::trace!("{:?}: nothing to present", self.id);
            return PresentOutcome::Idle;
        };

        match context {
            Some(context) => {
                log::trace!("{:?}: flushing context", self.id);
                context.flush(FlushFlags::END_OF_FRAME);
            }
            None => log::warn!("{:?}: presenting without a bound context", self.id),
        }

        let back = self.buffer(slot);
        let token = self.screen.completion_token(&back);
        let fence = self.fences.borrow_mut().observe(slot, token);
        if let Some(fence) = fence {
            log::trace!("{:?}: using fence {fence:?} for {slot:?}", self.id);
            self.tracer.fence_attached(&FenceAttachedEvent {
                framebuffer: self.id,
                slot: slot.get(),
                fence,
            });
        }

        self.chain.borrow_mut().submit(fence);
        self.attachments.borrow_mut().rotate_presented(back);

        let stamp = self.stamp.get().wrapping_add(1);
        self.stamp.set(stamp);
        self.presents.set(self.presents.get().wrapping_add(1));
        self.tracer.slot_queued(&SlotQueuedEvent {
            framebuffer: self.id,
            slot: slot.get(),
            fenced: fence.is_some(),
            stamp,
        });
        PresentOutcome::Queued { slot, fence }
    }

    fn resolve(&self, kind: AttachmentKind) -> Result<Option<Rc<S::Resource>>, Error> {
        if let Some(resource) = self.attachments.borrow().get(kind) {
            return Ok(Some(Rc::clone(resource)));
        }
        let resource = match kind {
            AttachmentKind::DepthStencil
                if self.visual.depth_stencil_format == PixelFormat::None =>
            {
                return Ok(None);
            }
            AttachmentKind::BackLeft => {
                let (slot, buffer) = self.chain.borrow_mut().acquire();
                self.tracer.slot_acquired(&SlotAcquiredEvent {
                    framebuffer: self.id,
                    slot: slot.get(),
                    stamp: self.stamp.get(),
                });
                buffer
            }
            AttachmentKind::DepthStencil => self.allocate(
                kind,
                self.visual.depth_stencil_format,
                BindFlags::DEPTH_STENCIL,
                "depth/stencil attachment",
            )?,
            AttachmentKind::Accum => self.allocate(
                kind,
                self.visual.accum_format,
                BindFlags::RENDER_TARGET,
                "accumulation attachment",
            )?,
            AttachmentKind::FrontLeft | AttachmentKind::FrontRight | AttachmentKind::BackRight => {
                return Ok(None);
            }
        };
        self.attachments
            .borrow_mut()
            .insert(kind, Rc::clone(&resource));
        Ok(Some(resource))
    }

    fn allocate(
        &self,
        kind: AttachmentKind,
        format: PixelFormat,
        bind: BindFlags,
        what: &'static str,
    ) -> Result<Rc<S::Resource>, Error> {
        let template = self.template.with_format(format, bind);
        let Some(resource) = self.screen.resource_create(&template) else {
            log::warn!("{:?}: failed to allocate {what} ({format:?})", self.id);
            return Err(Error::BadAlloc(what));
        };
        self.tracer.attachment_created(&AttachmentCreatedEvent {
            framebuffer: self.id,
            kind,
            format,
        });
        Ok(Rc::new(resource))
    }
}

impl<C: Compositor, S: Screen> Framebuffer for Surface<C, S> {
    type Resource = S::Resource;

    fn id(&self) -> FramebufferId {
        self.id
    }

    fn visual(&self) -> &Visual {
        &self.visual
    }

    fn stamp(&self) -> u32 {
        self.stamp.get()
    }

    fn validate(&self, kinds: &[AttachmentKind]) -> Result<Vec<Option<Rc<S::Resource>>>, Error> {
        kinds.iter().map(|&kind| self.resolve(kind)).collect()
    }

    fn flush_front(&self, kind: AttachmentKind) -> Result<(), Error> {
        // Rendering never targets the front buffer.
        _ = kind;
        Ok(())
    }

    fn flush_swapbuffers(&self) -> Result<(), Error> {
        // Presentation happens only in `present`.
        Ok(())
    }
}

impl<C: Compositor, S: Screen> Drop for Surface<C, S> {
    fn drop(&mut self) {
        self.attachments.get_mut().release_owned();
        if let Some(slot) = self.chain.get_mut().abandon() {
            self.tracer.slot_canceled(&SlotCanceledEvent {
                framebuffer: self.id,
                slot: slot.get(),
            });
        }
        log::debug!("destroying {:?}", self.id);
        self.tracer.surface_destroyed(&SurfaceDestroyedEvent {
            framebuffer: self.id,
            presents: self.presents.get(),
        });
    }
}
