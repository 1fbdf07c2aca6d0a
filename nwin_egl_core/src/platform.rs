// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the driver consumes.
//!
//! - [`Compositor`]: the window transport. Buffer registration and the
//!   dequeue/queue/cancel protocol, plus window attributes.
//! - [`Screen`]: the GPU resource allocator.
//! - [`ContextApi`] and [`RenderContext`]: the rendering-context layer.
//!
//! All capabilities are driven from the single thread that owns the
//! rendering context, so methods take `&self` and implementations use
//! interior mutability where they need it.

use alloc::rc::Rc;
use core::fmt;

use crate::error::TransportError;
use crate::fence::Fence;
use crate::format::PixelFormat;
use crate::framebuffer::Framebuffer;
use crate::resource::{BindFlags, NativeBuffer, ResourceTemplate, TextureTarget};
use crate::swap_chain::Slot;
use crate::visual::Visual;

/// Crop rectangle applied to queued buffers, in buffer pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

bitflags::bitflags! {
    /// Orientation applied by the compositor when displaying a buffer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Transform: u32 {
        /// Mirror horizontally.
        const FLIP_H = 1;
        /// Mirror vertically.
        const FLIP_V = 2;
        /// Rotate 90 degrees clockwise.
        const ROT_90 = 4;
        /// Rotate 180 degrees.
        const ROT_180 = Self::FLIP_H.bits() | Self::FLIP_V.bits();
        /// Rotate 270 degrees clockwise.
        const ROT_270 = Self::ROT_180.bits() | Self::ROT_90.bits();
    }
}

/// Window transport.
///
/// Transport calls return [`TransportError`] on failure; the driver treats
/// every such failure as fatal.
pub trait Compositor {
    /// Handle naming a native window.
    type Window: Copy + Eq + fmt::Debug;

    /// Returns `true` if `window` names a live window.
    fn is_valid(&self, window: Self::Window) -> bool;

    /// Current window dimensions in pixels.
    fn dimensions(&self, window: Self::Window) -> (u32, u32);

    /// Registers the buffer backing `slot`.
    fn configure_buffer(
        &self,
        window: Self::Window,
        slot: Slot,
        buffer: &NativeBuffer,
    ) -> Result<(), TransportError>;

    /// Waits for a free buffer and returns its slot index.
    ///
    /// May block until the compositor releases a buffer.
    fn dequeue_buffer(&self, window: Self::Window) -> Result<u32, TransportError>;

    /// Hands `slot` to the compositor for display once `fence` signals.
    fn queue_buffer(
        &self,
        window: Self::Window,
        slot: Slot,
        fence: Option<Fence>,
    ) -> Result<(), TransportError>;

    /// Returns `slot` to the compositor without displaying it.
    fn cancel_buffer(
        &self,
        window: Self::Window,
        slot: Slot,
        fence: Option<Fence>,
    ) -> Result<(), TransportError>;

    /// Drops every buffer registration of `window`.
    fn release_buffers(&self, window: Self::Window);

    /// Sets the number of vertical blanks between presentations.
    fn set_swap_interval(&self, window: Self::Window, interval: u32);

    /// Sets the crop rectangle for subsequent queued buffers.
    fn set_crop(&self, window: Self::Window, crop: CropRect);

    /// Sets the transform for subsequent queued buffers.
    fn set_transform(&self, window: Self::Window, transform: Transform);

    /// Creates the process default window with the given dimensions.
    fn create_default_window(&self, width: u32, height: u32)
    -> Result<Self::Window, TransportError>;

    /// Tears down a window created by [`create_default_window`](Self::create_default_window).
    fn destroy_default_window(&self, window: Self::Window);
}

/// GPU resource allocator.
///
/// Resources are released by dropping them.
pub trait Screen {
    /// Allocated GPU resource.
    type Resource: fmt::Debug;

    /// Allocates a resource, or returns `None` when out of memory.
    fn resource_create(&self, template: &ResourceTemplate) -> Option<Self::Resource>;

    /// Exports the native buffer descriptor backing `resource`.
    fn native_buffer(&self, resource: &Self::Resource) -> Option<NativeBuffer>;

    /// Completion token of the last GPU work writing `resource`, if any.
    fn completion_token(&self, resource: &Self::Resource) -> Option<Fence>;

    /// Returns `true` if `format` can be allocated with `target` and `bind`.
    fn is_format_supported(&self, format: PixelFormat, target: TextureTarget, bind: BindFlags)
    -> bool;
}

bitflags::bitflags! {
    /// Hints passed to [`RenderContext::flush`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FlushFlags: u32 {
        /// The flush ends a frame that is about to be presented.
        const END_OF_FRAME = 1 << 0;
        /// Submission may be deferred until the next flush.
        const DEFERRED = 1 << 1;
    }
}

/// A live rendering context. Dropping it destroys the context.
pub trait RenderContext {
    /// Submits pending rendering work.
    fn flush(&mut self, flags: FlushFlags);
}

/// Context profile selected from the client's API and version request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Desktop OpenGL, legacy or compatibility.
    Default,
    /// Desktop OpenGL core profile (3.2 and later).
    OpenGlCore,
    /// OpenGL ES 1.x.
    OpenGlEs1,
    /// OpenGL ES 2.x and 3.x.
    OpenGlEs2,
}

bitflags::bitflags! {
    /// Context creation flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        /// Debug context.
        const DEBUG = 1 << 0;
        /// Forward-compatible context (no deprecated functionality).
        const FORWARD_COMPATIBLE = 1 << 1;
        /// Robust buffer access.
        const ROBUST_ACCESS = 1 << 2;
    }
}

/// Attributes handed to [`ContextApi::create_context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextAttribs {
    /// Selected profile.
    pub profile: Profile,
    /// Requested major version.
    pub major: u32,
    /// Requested minor version.
    pub minor: u32,
    /// Creation flags.
    pub flags: ContextFlags,
    /// Visual of the config the context is created for.
    pub visual: Visual,
}

/// Reasons the context layer rejects a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ContextError {
    /// Out of memory.
    #[error("out of memory")]
    NoMemory,
    /// The API is not supported.
    #[error("unsupported API")]
    BadApi,
    /// The version is not supported.
    #[error("unsupported version")]
    BadVersion,
    /// A flag is not supported.
    #[error("unsupported flag")]
    BadFlag,
    /// An attribute is unknown.
    #[error("unknown attribute")]
    UnknownAttribute,
    /// A flag is unknown.
    #[error("unknown flag")]
    UnknownFlag,
}

/// Shared framebuffer handle passed to the context layer on bind.
pub type SharedFramebuffer<R> = Rc<dyn Framebuffer<Resource = R>>;

/// Rendering-context layer operating on framebuffers with resources of type
/// `R`.
pub trait ContextApi<R> {
    /// Context type produced by this layer.
    type Context: RenderContext;

    /// Creates a context.
    fn create_context(&self, attribs: &ContextAttribs) -> Result<Self::Context, ContextError>;

    /// Binds `context` to the draw and read framebuffers, or unbinds the
    /// current context when `context` is `None`.
    ///
    /// Returns `false` if the context layer refused the binding.
    fn make_current(
        &self,
        context: Option<&mut Self::Context>,
        draw: Option<SharedFramebuffer<R>>,
        read: Option<SharedFramebuffer<R>>,
    ) -> bool;
}
