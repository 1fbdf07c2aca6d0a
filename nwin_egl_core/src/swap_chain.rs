// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed ring of window buffers and the dequeue/queue/cancel protocol.
//!
//! A [`SwapChain`] allocates [`SLOT_COUNT`] buffers up front and registers
//! each with the compositor. At most one slot is acquired at a time; it stays
//! acquired until it is either submitted for display or abandoned.
//!
//! ```text
//!   IDLE ──acquire()──► ACQUIRED ──submit(fence)──► IDLE
//!                           │
//!                           └──abandon()──► IDLE
//! ```
//!
//! Any transport failure during these transitions is fatal.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::{Error, fatal, or_fatal};
use crate::fence::Fence;
use crate::platform::{Compositor, Screen};
use crate::resource::ResourceTemplate;

/// Number of buffers per window.
pub const SLOT_COUNT: usize = 3;

/// Index of one buffer in a [`SwapChain`]. Always below [`SLOT_COUNT`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// Returns the slot for `index`, or `None` if it is out of range.
    #[must_use]
    pub const fn new(index: u32) -> Option<Self> {
        if (index as usize) < SLOT_COUNT {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is below SLOT_COUNT"
            )]
            let index = index as u8;
            Some(Self(index))
        } else {
            None
        }
    }

    /// Iterates every slot in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SLOT_COUNT).filter_map(|i| u32::try_from(i).ok().and_then(Self::new))
    }

    /// Position of this slot in per-slot arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The slot index as the transport reports it.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// Buffer ring registered with one compositor window.
pub struct SwapChain<C: Compositor, R> {
    compositor: Rc<C>,
    window: C::Window,
    buffers: Vec<Rc<R>>,
    current: Option<Slot>,
}

impl<C: Compositor, R> fmt::Debug for SwapChain<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwapChain")
            .field("window", &self.window)
            .field("buffers", &self.buffers.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<C: Compositor, R> SwapChain<C, R> {
    /// Allocates [`SLOT_COUNT`] buffers from `template` and registers them
    /// with `window`.
    ///
    /// On allocation failure every buffer created so far is released and the
    /// window's registrations are dropped before the error is returned.
    pub fn new<S>(
        compositor: Rc<C>,
        screen: &S,
        window: C::Window,
        template: &ResourceTemplate,
    ) -> Result<Self, Error>
    where
        S: Screen<Resource = R>,
    {
        // Dropping a partially built chain performs the rollback.
        let mut chain = Self {
            compositor,
            window,
            buffers: Vec::with_capacity(SLOT_COUNT),
            current: None,
        };
        for slot in Slot::all() {
            let resource = screen
                .resource_create(template)
                .ok_or(Error::BadAlloc("window buffer"))?;
            let native = screen
                .native_buffer(&resource)
                .ok_or(Error::BadAlloc("native buffer descriptor"))?;
            or_fatal(
                "configure buffer",
                chain.compositor.configure_buffer(window, slot, &native),
            );
            log::debug!("configured {slot:?} for {window:?}: {native:?}");
            chain.buffers.push(Rc::new(resource));
        }
        Ok(chain)
    }

    /// The window this chain presents to.
    #[must_use]
    pub fn window(&self) -> C::Window {
        self.window
    }

    /// The compositor this chain presents through.
    #[must_use]
    pub fn compositor(&self) -> &Rc<C> {
        &self.compositor
    }

    /// The currently acquired slot, if any.
    #[must_use]
    pub fn current(&self) -> Option<Slot> {
        self.current
    }

    /// The buffer backing `slot`.
    #[must_use]
    pub fn buffer(&self, slot: Slot) -> &Rc<R> {
        &self.buffers[slot.index()]
    }

    /// Acquires a slot for rendering and returns it with its buffer.
    ///
    /// Returns the already acquired slot without dequeuing if there is one.
    /// Otherwise dequeues from the compositor, which may block.
    pub fn acquire(&mut self) -> (Slot, Rc<R>) {
        if let Some(slot) = self.current {
            return (slot, Rc::clone(self.buffer(slot)));
        }
        let index = or_fatal(
            "dequeue buffer",
            self.compositor.dequeue_buffer(self.window),
        );
        let Some(slot) = Slot::new(index) else {
            log::error!("dequeue buffer returned slot {index} of {SLOT_COUNT}");
            panic!("dequeue buffer returned slot {index} of {SLOT_COUNT}");
        };
        log::trace!("dequeued {slot:?}");
        self.current = Some(slot);
        (slot, Rc::clone(self.buffer(slot)))
    }

    /// Queues the acquired slot for display, attaching `fence` if present.
    ///
    /// Returns the submitted slot, or `None` if nothing was acquired.
    pub fn submit(&mut self, fence: Option<Fence>) -> Option<Slot> {
        let slot = self.current.take()?;
        log::trace!("queuing {slot:?} with fence {fence:?}");
        if let Err(err) = self.compositor.queue_buffer(self.window, slot, fence) {
            fatal("queue buffer", err);
        }
        Some(slot)
    }

    /// Returns the acquired slot to the compositor without displaying it.
    ///
    /// Returns the abandoned slot, or `None` if nothing was acquired.
    pub fn abandon(&mut self) -> Option<Slot> {
        let slot = self.current.take()?;
        log::trace!("canceling {slot:?}");
        if let Err(err) = self.compositor.cancel_buffer(self.window, slot, None) {
            fatal("cancel buffer", err);
        }
        Some(slot)
    }
}

impl<C: Compositor, R> Drop for SwapChain<C, R> {
    fn drop(&mut self) {
        self.abandon();
        self.compositor.release_buffers(self.window);
        self.buffers.clear();
    }
}
