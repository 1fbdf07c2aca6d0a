// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy.
//!
//! Allocation and validation failures are recoverable and surface as
//! [`Error`]. Compositor transport failures have no degraded mode and go
//! through [`fatal`], which never returns.

use crate::platform::ContextError;

/// Recoverable driver error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A resource, buffer or record could not be allocated.
    #[error("failed to allocate {0}")]
    BadAlloc(&'static str),
    /// The window handle is invalid and the default window is unavailable.
    #[error("not a valid native window reference")]
    BadNativeWindow,
    /// The config or the requested API/profile combination is unsupported.
    #[error("unsupported config or context profile")]
    BadConfig,
    /// The context layer rejected the context attributes.
    #[error("context creation failed: {0}")]
    BadMatch(ContextError),
    /// The surface handle does not name a live surface.
    #[error("invalid surface")]
    BadSurface,
    /// The context handle does not name a live context.
    #[error("invalid context")]
    BadContext,
    /// Pixmap and pbuffer surfaces are not supported.
    #[error("unsupported surface type")]
    UnsupportedSurface,
    /// The display has no usable configs or was terminated.
    #[error("display not initialized")]
    NotInitialized,
}

/// Numeric error codes as reported through the EGL error query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// `EGL_SUCCESS`.
    Success = 0x3000,
    /// `EGL_NOT_INITIALIZED`.
    NotInitialized = 0x3001,
    /// `EGL_BAD_ALLOC`.
    BadAlloc = 0x3003,
    /// `EGL_BAD_CONFIG`.
    BadConfig = 0x3005,
    /// `EGL_BAD_CONTEXT`.
    BadContext = 0x3006,
    /// `EGL_BAD_MATCH`.
    BadMatch = 0x3009,
    /// `EGL_BAD_NATIVE_WINDOW`.
    BadNativeWindow = 0x300B,
    /// `EGL_BAD_SURFACE`.
    BadSurface = 0x300D,
}

impl Error {
    /// The EGL error code reported for this error.
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::BadAlloc(_) | Self::UnsupportedSurface => ErrorCode::BadAlloc,
            Self::BadNativeWindow => ErrorCode::BadNativeWindow,
            Self::BadConfig => ErrorCode::BadConfig,
            Self::BadMatch(_) => ErrorCode::BadMatch,
            Self::BadSurface => ErrorCode::BadSurface,
            Self::BadContext => ErrorCode::BadContext,
            Self::NotInitialized => ErrorCode::NotInitialized,
        }
    }
}

/// Failure reported by the compositor transport, carrying its result code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[error("compositor transport failure (result code {0:#x})")]
pub struct TransportError(pub u32);

/// Terminates on a transport failure.
///
/// Logs `what` with the result code, then panics. Release builds abort on
/// panic, so the process goes down with the failing call on the stack.
#[cold]
#[track_caller]
pub fn fatal(what: &str, err: TransportError) -> ! {
    log::error!("{what}: {err}");
    panic!("{what}: {err}");
}

/// Unwraps a transport result or terminates via [`fatal`].
#[track_caller]
pub(crate) fn or_fatal<T>(what: &str, result: Result<T, TransportError>) -> T {
    match result {
        Ok(v) => v,
        Err(err) => fatal(what, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn codes_match_egl() {
        assert_eq!(Error::BadAlloc("buffer").code() as u32, 0x3003);
        assert_eq!(Error::BadNativeWindow.code() as u32, 0x300B);
        assert_eq!(Error::BadConfig.code() as u32, 0x3005);
        assert_eq!(
            Error::BadMatch(ContextError::BadVersion).code() as u32,
            0x3009
        );
        assert_eq!(Error::BadSurface.code() as u32, 0x300D);
        assert_eq!(Error::BadContext.code() as u32, 0x3006);
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::BadAlloc("depth/stencil attachment").to_string(),
            "failed to allocate depth/stencil attachment"
        );
        assert_eq!(
            TransportError(0x2a).to_string(),
            "compositor transport failure (result code 0x2a)"
        );
    }

    #[test]
    #[should_panic(expected = "dequeue buffer: compositor transport failure")]
    fn fatal_panics() {
        or_fatal::<()>("dequeue buffer", Err(TransportError(1)));
    }
}
