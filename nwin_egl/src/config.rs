// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Framebuffer configs advertised by a display.
//!
//! Every supported color format is paired with every supported depth/stencil
//! format. Pairings the screen cannot allocate are skipped.

use nwin_egl_core::format::PixelFormat;
use nwin_egl_core::platform::Screen;
use nwin_egl_core::resource::{BindFlags, TextureTarget};
use nwin_egl_core::visual::Visual;

/// Color formats window buffers may use.
pub const COLOR_FORMATS: [PixelFormat; 1] = [PixelFormat::R8G8B8A8Unorm];

/// Depth/stencil formats offered with each color format.
pub const DEPTH_STENCIL_FORMATS: [PixelFormat; 7] = [
    PixelFormat::None,
    PixelFormat::S8Uint,
    PixelFormat::Z16Unorm,
    PixelFormat::Z24X8Unorm,
    PixelFormat::Z24UnormS8Uint,
    PixelFormat::Z32Float,
    PixelFormat::Z32FloatS8X24Uint,
];

bitflags::bitflags! {
    /// Client APIs, using the EGL renderable-type bit values.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ApiMask: u32 {
        /// OpenGL ES 1.x.
        const OPENGL_ES = 0x0001;
        /// OpenGL ES 2.x.
        const OPENGL_ES2 = 0x0004;
        /// Desktop OpenGL.
        const OPENGL = 0x0008;
        /// OpenGL ES 3.x.
        const OPENGL_ES3 = 0x0040;
    }
}

bitflags::bitflags! {
    /// Surface kinds a config can create, using the EGL bit values.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SurfaceType: u32 {
        /// Off-screen pbuffer.
        const PBUFFER = 0x0001;
        /// Native pixmap.
        const PIXMAP = 0x0002;
        /// Native window.
        const WINDOW = 0x0004;
    }
}

/// 1-based config identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigId(pub u32);

/// One supported color/depth-stencil pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Identifier, unique within the display.
    pub id: ConfigId,
    /// Visual handed to contexts and surfaces created from this config.
    pub visual: Visual,
    /// Red bits.
    pub red_size: u8,
    /// Green bits.
    pub green_size: u8,
    /// Blue bits.
    pub blue_size: u8,
    /// Alpha bits.
    pub alpha_size: u8,
    /// Total color bits.
    pub buffer_size: u8,
    /// Depth bits.
    pub depth_size: u8,
    /// Stencil bits.
    pub stencil_size: u8,
    /// Whether native rendering APIs can draw to the surfaces.
    pub native_renderable: bool,
    /// Creatable surface kinds.
    pub surface_type: SurfaceType,
    /// APIs contexts may be created for.
    pub renderable_type: ApiMask,
    /// APIs for which the config is conformant.
    pub conformant: ApiMask,
    /// Smallest accepted swap interval.
    pub min_swap_interval: u32,
    /// Largest accepted swap interval.
    pub max_swap_interval: u32,
}

impl Config {
    /// Builds the config for one pairing.
    #[must_use]
    pub fn new(id: ConfigId, color: PixelFormat, depth_stencil: PixelFormat) -> Self {
        let rgba = color.channel_bits();
        let zs = depth_stencil.channel_bits();
        let apis = ApiMask::all();
        Self {
            id,
            visual: Visual::double_buffered(color, depth_stencil),
            red_size: rgba.red,
            green_size: rgba.green,
            blue_size: rgba.blue,
            alpha_size: rgba.alpha,
            buffer_size: rgba.color(),
            depth_size: zs.depth,
            stencil_size: zs.stencil,
            native_renderable: true,
            surface_type: SurfaceType::WINDOW,
            renderable_type: apis,
            conformant: apis,
            min_swap_interval: 0,
            max_swap_interval: i32::MAX.unsigned_abs(),
        }
    }

    /// Clamps a requested swap interval into this config's range.
    #[must_use]
    pub fn clamp_swap_interval(&self, interval: i32) -> u32 {
        interval
            .max(0)
            .unsigned_abs()
            .clamp(self.min_swap_interval, self.max_swap_interval)
    }
}

fn supported<S: Screen>(screen: &S, color: PixelFormat, depth_stencil: PixelFormat) -> bool {
    let color_ok = screen.is_format_supported(
        color,
        TextureTarget::TextureRect,
        BindFlags::RENDER_TARGET | BindFlags::DISPLAY_TARGET,
    );
    let zs_ok = depth_stencil == PixelFormat::None
        || screen.is_format_supported(
            depth_stencil,
            TextureTarget::TextureRect,
            BindFlags::DEPTH_STENCIL,
        );
    color_ok && zs_ok
}

/// Builds the config list for `screen`, numbering configs from 1.
pub fn enumerate<S: Screen>(screen: &S) -> Vec<Config> {
    let mut configs = Vec::with_capacity(COLOR_FORMATS.len() * DEPTH_STENCIL_FORMATS.len());
    let mut next_id = 1;
    for color in COLOR_FORMATS {
        for depth_stencil in DEPTH_STENCIL_FORMATS {
            if !supported(screen, color, depth_stencil) {
                log::debug!("skipping config {color:?}/{depth_stencil:?}: format unsupported");
                continue;
            }
            configs.push(Config::new(ConfigId(next_id), color, depth_stencil));
            next_id += 1;
        }
    }
    configs
}
