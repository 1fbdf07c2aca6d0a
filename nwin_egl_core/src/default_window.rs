// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default-window registry for clients that create surfaces without a window.
//!
//! Older clients never create a native window; they expect the driver to
//! present to a default full-screen layer. The registry creates that window
//! on demand and hands out at most one [`DefaultWindowLease`] at a time.
//! Dropping the lease destroys the window.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::error::{Error, or_fatal};
use crate::platform::Compositor;

/// Default window width in pixels.
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default window height in pixels.
pub const DEFAULT_HEIGHT: u32 = 720;

struct State<W> {
    width: u32,
    height: u32,
    active: Option<W>,
}

/// Single-owner registry of the default window.
pub struct DefaultWindow<C: Compositor> {
    compositor: Rc<C>,
    state: RefCell<State<C::Window>>,
}

impl<C: Compositor> fmt::Debug for DefaultWindow<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DefaultWindow")
            .field("width", &state.width)
            .field("height", &state.height)
            .field("active", &state.active)
            .finish_non_exhaustive()
    }
}

impl<C: Compositor> DefaultWindow<C> {
    /// Creates an idle registry with the default resolution.
    #[must_use]
    pub fn new(compositor: Rc<C>) -> Self {
        Self {
            compositor,
            state: RefCell::new(State {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
                active: None,
            }),
        }
    }

    /// Resolution used the next time the window is created.
    #[must_use]
    pub fn resolution(&self) -> (u32, u32) {
        let state = self.state.borrow();
        (state.width, state.height)
    }

    /// Sets the resolution used the next time the window is created.
    ///
    /// An already active window keeps its dimensions.
    pub fn set_resolution(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.width = width;
        state.height = height;
    }

    /// The window currently leased out, if any.
    #[must_use]
    pub fn active(&self) -> Option<C::Window> {
        self.state.borrow().active
    }

    /// Returns `true` while a lease is outstanding.
    #[must_use]
    pub fn is_in_use(&self) -> bool {
        self.active().is_some()
    }

    /// The compositor the window is created on.
    #[must_use]
    pub fn compositor(&self) -> &Rc<C> {
        &self.compositor
    }

    /// Creates the default window and leases it to the caller.
    ///
    /// Fails with [`Error::BadNativeWindow`] if another lease is
    /// outstanding. A transport failure while creating the window is fatal.
    pub fn lease(self: &Rc<Self>) -> Result<DefaultWindowLease<C>, Error> {
        let (width, height) = {
            let state = self.state.borrow();
            if state.active.is_some() {
                log::warn!("default window already in use by another surface");
                return Err(Error::BadNativeWindow);
            }
            (state.width, state.height)
        };
        let window = or_fatal(
            "create default window",
            self.compositor.create_default_window(width, height),
        );
        log::debug!("created default window {window:?} ({width}x{height})");
        self.state.borrow_mut().active = Some(window);
        Ok(DefaultWindowLease {
            registry: Rc::clone(self),
            window,
        })
    }

    fn release(&self, window: C::Window) {
        self.compositor.destroy_default_window(window);
        self.state.borrow_mut().active = None;
        log::debug!("destroyed default window {window:?}");
    }
}

/// Exclusive use of the default window. Dropping it destroys the window.
pub struct DefaultWindowLease<C: Compositor> {
    registry: Rc<DefaultWindow<C>>,
    window: C::Window,
}

impl<C: Compositor> DefaultWindowLease<C> {
    /// The leased window.
    #[must_use]
    pub fn window(&self) -> C::Window {
        self.window
    }
}

impl<C: Compositor> fmt::Debug for DefaultWindowLease<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultWindowLease")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl<C: Compositor> Drop for DefaultWindowLease<C> {
    fn drop(&mut self) {
        self.registry.release(self.window);
    }
}
