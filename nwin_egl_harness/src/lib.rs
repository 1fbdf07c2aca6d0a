// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory doubles of the compositor, screen and context capabilities.
//!
//! Each double records the calls it receives and supports failure injection,
//! so tests can assert the exact transport traffic a surface generates:
//!
//! - [`FakeCompositor`]: window transport with a free-slot queue per window.
//! - [`FakeScreen`]: allocator with live-resource accounting and settable
//!   completion tokens.
//! - [`FakeApi`] / [`FakeContext`]: context layer that logs flushes, binds
//!   and destruction.

pub mod compositor;
pub mod context;
pub mod screen;

use std::rc::Rc;

pub use compositor::{CompositorCall, FakeCompositor, TransportOp, WindowHandle};
pub use context::{Binding, FakeApi, FakeContext};
pub use screen::{FakeResource, FakeScreen};

/// The three doubles wired together.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    /// Window transport.
    pub compositor: Rc<FakeCompositor>,
    /// Resource allocator.
    pub screen: Rc<FakeScreen>,
    /// Context layer.
    pub api: FakeApi,
}

impl Rig {
    /// Creates a rig with fresh doubles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
