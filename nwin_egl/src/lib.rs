// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! EGL display layer over a native-window compositor.
//!
//! This crate provides the display-level objects of the driver:
//!
//! - Config enumeration: one config per supported color/depth-stencil pairing
//! - Context creation with API/version to profile selection
//! - Window surfaces built on [`nwin_egl_core::surface::Surface`], with
//!   deferred destruction of bound objects
//! - Swap interval and swap buffers
//! - Legacy default-window configuration calls

mod config;
mod context;
mod display;
mod legacy;

pub use config::{
    ApiMask, COLOR_FORMATS, Config, ConfigId, DEPTH_STENCIL_FORMATS, SurfaceType, enumerate,
};
pub use context::{ClientApi, ContextId, ContextRequest, ProfileMask};
pub use display::{Binding, Display, EXTENSIONS, SurfaceId, VERSION};
pub use legacy::{LEGACY_DEFAULT_RESOLUTION, LegacyGfx};
pub use nwin_egl_core::surface::PresentOutcome;
pub use nwin_egl_core::{Error, ErrorCode};
