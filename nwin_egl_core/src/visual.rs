// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Framebuffer visuals.

use crate::attachment::{AttachmentKind, AttachmentMask};
use crate::format::PixelFormat;

/// Format of accumulation buffers.
pub const ACCUM_FORMAT: PixelFormat = PixelFormat::R16G16B16A16Float;

/// Buffer layout of a framebuffer as seen by the rendering context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visual {
    /// Attachments the framebuffer can provide.
    pub buffer_mask: AttachmentMask,
    /// Color buffer format.
    pub color_format: PixelFormat,
    /// Depth/stencil buffer format, or [`PixelFormat::None`].
    pub depth_stencil_format: PixelFormat,
    /// Accumulation buffer format.
    pub accum_format: PixelFormat,
    /// Attachment rendered into by default.
    pub render_buffer: AttachmentKind,
    /// Samples per pixel (0 for single-sampled).
    pub samples: u8,
}

impl Visual {
    /// Double-buffered window visual with the given color and depth/stencil
    /// formats.
    #[must_use]
    pub const fn double_buffered(color: PixelFormat, depth_stencil: PixelFormat) -> Self {
        Self {
            buffer_mask: AttachmentMask::FRONT_LEFT.union(AttachmentMask::BACK_LEFT),
            color_format: color,
            depth_stencil_format: depth_stencil,
            accum_format: ACCUM_FORMAT,
            render_buffer: AttachmentKind::BackLeft,
            samples: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_buffered_renders_to_back() {
        let v = Visual::double_buffered(PixelFormat::R8G8B8A8Unorm, PixelFormat::Z16Unorm);
        assert_eq!(v.render_buffer, AttachmentKind::BackLeft);
        assert!(v.buffer_mask.contains(AttachmentMask::FRONT_LEFT));
        assert!(!v.buffer_mask.contains(AttachmentMask::DEPTH_STENCIL));
        assert_eq!(v.accum_format, PixelFormat::R16G16B16A16Float);
    }
}
