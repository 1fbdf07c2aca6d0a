// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource templates and native buffer descriptors.
//!
//! A [`ResourceTemplate`] describes a GPU resource to the
//! [`Screen`](crate::platform::Screen) allocator. A [`NativeBuffer`] is the
//! descriptor the screen exports for a resource so the compositor can scan it
//! out.

use crate::format::PixelFormat;

/// Dimensionality of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Ordinary 2D texture with normalized coordinates.
    Texture2D,
    /// Rectangle texture with unnormalized coordinates (window buffers).
    TextureRect,
}

/// Expected access pattern of a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceUsage {
    /// GPU read/write, no CPU access.
    #[default]
    Default,
    /// Contents never change after creation.
    Immutable,
    /// Frequently updated from the CPU.
    Dynamic,
    /// CPU-visible transfer resource.
    Staging,
}

bitflags::bitflags! {
    /// How a resource may be bound to the pipeline.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BindFlags: u32 {
        /// Color render target.
        const RENDER_TARGET = 1 << 0;
        /// Depth/stencil target.
        const DEPTH_STENCIL = 1 << 1;
        /// Sampled by shaders.
        const SAMPLER_VIEW = 1 << 2;
        /// Scanned out by the display.
        const DISPLAY_TARGET = 1 << 3;
    }
}

/// Parameters for allocating a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceTemplate {
    /// Dimensionality.
    pub target: TextureTarget,
    /// Pixel format.
    pub format: PixelFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Depth in pixels (1 for 2D targets).
    pub depth: u32,
    /// Number of array layers.
    pub array_size: u32,
    /// Access pattern.
    pub usage: ResourceUsage,
    /// Allowed bindings.
    pub bind: BindFlags,
}

impl ResourceTemplate {
    /// Template for a presentable window buffer of the given size and color
    /// format.
    #[must_use]
    pub const fn window_buffer(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            target: TextureTarget::TextureRect,
            format,
            width,
            height,
            depth: 1,
            array_size: 1,
            usage: ResourceUsage::Default,
            bind: BindFlags::RENDER_TARGET,
        }
    }

    /// Returns a copy with `format` and `bind` replaced.
    ///
    /// Synthesized attachments share the window buffer's dimensions and only
    /// differ in these two fields.
    #[must_use]
    pub const fn with_format(self, format: PixelFormat, bind: BindFlags) -> Self {
        Self {
            format,
            bind,
            ..self
        }
    }
}

/// Descriptor of the memory backing a resource, as handed to the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeBuffer {
    /// Opaque memory handle understood by the compositor.
    pub handle: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row pitch in bytes.
    pub stride: u32,
    /// Pixel format.
    pub format: PixelFormat,
}
