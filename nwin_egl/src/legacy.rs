// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window configuration for clients that render to the default window
//! without ever naming one.

use std::fmt;
use std::rc::Rc;

use nwin_egl_core::default_window::DefaultWindow;
use nwin_egl_core::platform::{Compositor, CropRect, Transform};

/// Resolution set by [`LegacyGfx::init_resolution_default`].
pub const LEGACY_DEFAULT_RESOLUTION: (u32, u32) = (1920, 1080);

/// Legacy configuration calls over a display's default window.
pub struct LegacyGfx<C: Compositor> {
    registry: Rc<DefaultWindow<C>>,
}

impl<C: Compositor> fmt::Debug for LegacyGfx<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyGfx")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<C: Compositor> LegacyGfx<C> {
    /// Wraps a default-window registry.
    #[must_use]
    pub fn new(registry: Rc<DefaultWindow<C>>) -> Self {
        Self { registry }
    }

    /// Sets the size the default window is created with.
    pub fn init_resolution(&self, width: u32, height: u32) {
        self.registry.set_resolution(width, height);
    }

    /// Sets the default window size to 1920x1080.
    pub fn init_resolution_default(&self) {
        let (width, height) = LEGACY_DEFAULT_RESOLUTION;
        self.init_resolution(width, height);
    }

    /// Crops buffers queued to the default window.
    pub fn configure_crop(&self, left: i32, top: i32, right: i32, bottom: i32) {
        let crop = CropRect {
            left,
            top,
            right,
            bottom,
        };
        match self.registry.active() {
            Some(window) => self.registry.compositor().set_crop(window, crop),
            None => log::debug!("ignoring crop {crop:?}: no default window"),
        }
    }

    /// Shows only the top-left `width` x `height` region of each buffer.
    pub fn configure_resolution(&self, width: i32, height: i32) {
        self.configure_crop(0, 0, width, height);
    }

    /// Sets the transform applied to buffers queued to the default window.
    pub fn configure_transform(&self, transform: Transform) {
        match self.registry.active() {
            Some(window) => self.registry.compositor().set_transform(window, transform),
            None => log::debug!("ignoring transform {transform:?}: no default window"),
        }
    }
}
