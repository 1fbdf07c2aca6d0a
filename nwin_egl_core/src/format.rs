// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel formats used by window buffers and synthesized attachments.

/// Pixel formats the driver allocates or advertises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// No format (used as "no depth/stencil buffer").
    None,
    /// 8-bit RGBA color, unsigned normalized.
    R8G8B8A8Unorm,
    /// 16-bit float RGBA color, used for accumulation buffers.
    R16G16B16A16Float,
    /// 8-bit stencil only.
    S8Uint,
    /// 16-bit depth.
    Z16Unorm,
    /// 24-bit depth padded to 32 bits.
    Z24X8Unorm,
    /// 24-bit depth with 8-bit stencil.
    Z24UnormS8Uint,
    /// 32-bit float depth.
    Z32Float,
    /// 32-bit float depth with 8-bit stencil, padded to 64 bits.
    Z32FloatS8X24Uint,
}

/// Per-channel bit sizes of a [`PixelFormat`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelBits {
    /// Red bits.
    pub red: u8,
    /// Green bits.
    pub green: u8,
    /// Blue bits.
    pub blue: u8,
    /// Alpha bits.
    pub alpha: u8,
    /// Depth bits.
    pub depth: u8,
    /// Stencil bits.
    pub stencil: u8,
}

impl ChannelBits {
    /// Sum of the color channel sizes.
    #[must_use]
    pub const fn color(self) -> u8 {
        self.red + self.green + self.blue + self.alpha
    }
}

impl PixelFormat {
    /// Returns the size of each channel in bits.
    #[must_use]
    pub const fn channel_bits(self) -> ChannelBits {
        const fn rgba(bits: u8) -> ChannelBits {
            ChannelBits {
                red: bits,
                green: bits,
                blue: bits,
                alpha: bits,
                depth: 0,
                stencil: 0,
            }
        }
        const fn zs(depth: u8, stencil: u8) -> ChannelBits {
            ChannelBits {
                red: 0,
                green: 0,
                blue: 0,
                alpha: 0,
                depth,
                stencil,
            }
        }
        match self {
            Self::None => zs(0, 0),
            Self::R8G8B8A8Unorm => rgba(8),
            Self::R16G16B16A16Float => rgba(16),
            Self::S8Uint => zs(0, 8),
            Self::Z16Unorm => zs(16, 0),
            Self::Z24X8Unorm => zs(24, 0),
            Self::Z24UnormS8Uint => zs(24, 8),
            Self::Z32Float => zs(32, 0),
            Self::Z32FloatS8X24Uint => zs(32, 8),
        }
    }

    /// Storage size of one pixel in bytes.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::None => 0,
            Self::S8Uint => 1,
            Self::Z16Unorm => 2,
            Self::R8G8B8A8Unorm | Self::Z24X8Unorm | Self::Z24UnormS8Uint | Self::Z32Float => 4,
            Self::R16G16B16A16Float | Self::Z32FloatS8X24Uint => 8,
        }
    }

    /// Returns `true` for formats carrying depth or stencil data.
    #[must_use]
    pub const fn is_depth_stencil(self) -> bool {
        let bits = self.channel_bits();
        bits.depth != 0 || bits.stencil != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_bits() {
        let bits = PixelFormat::R8G8B8A8Unorm.channel_bits();
        assert_eq!(bits.color(), 32);
        assert_eq!(bits.depth, 0);
        assert!(!PixelFormat::R8G8B8A8Unorm.is_depth_stencil());
    }

    #[test]
    fn depth_stencil_bits() {
        let bits = PixelFormat::Z24UnormS8Uint.channel_bits();
        assert_eq!((bits.depth, bits.stencil), (24, 8));
        assert!(PixelFormat::S8Uint.is_depth_stencil());
        assert!(!PixelFormat::None.is_depth_stencil());
        assert_eq!(PixelFormat::Z32FloatS8X24Uint.bytes_per_pixel(), 8);
    }
}
