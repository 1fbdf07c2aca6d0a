// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client context requests and their mapping to rendering profiles.

use nwin_egl_core::Error;
use nwin_egl_core::platform::{ContextFlags, Profile};

/// Client API bound when a context is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientApi {
    /// Desktop OpenGL.
    OpenGl,
    /// OpenGL ES.
    OpenGlEs,
}

bitflags::bitflags! {
    /// Requested desktop OpenGL profile, using the `EGL_KHR_create_context`
    /// bit values.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ProfileMask: u32 {
        /// Core profile.
        const CORE = 0x1;
        /// Compatibility profile.
        const COMPATIBILITY = 0x2;
    }
}

/// Handle naming a context created on a [`Display`](crate::Display).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u32);

/// Attributes a client passes when creating a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextRequest {
    /// API the context is created for.
    pub api: ClientApi,
    /// Requested major version.
    pub major: u32,
    /// Requested minor version.
    pub minor: u32,
    /// Requested profile. Only meaningful for desktop OpenGL.
    pub profile_mask: ProfileMask,
    /// Creation flags.
    pub flags: ContextFlags,
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self::gles(1)
    }
}

impl ContextRequest {
    /// Desktop OpenGL at `major.minor` with the core profile.
    #[must_use]
    pub fn opengl(major: u32, minor: u32) -> Self {
        Self {
            api: ClientApi::OpenGl,
            major,
            minor,
            profile_mask: ProfileMask::CORE,
            flags: ContextFlags::empty(),
        }
    }

    /// OpenGL ES with the given major version.
    #[must_use]
    pub fn gles(major: u32) -> Self {
        Self {
            api: ClientApi::OpenGlEs,
            major,
            minor: 0,
            profile_mask: ProfileMask::CORE,
            flags: ContextFlags::empty(),
        }
    }

    /// Replaces the profile mask.
    #[must_use]
    pub fn with_profile(mut self, profile_mask: ProfileMask) -> Self {
        self.profile_mask = profile_mask;
        self
    }

    /// Replaces the creation flags.
    #[must_use]
    pub fn with_flags(mut self, flags: ContextFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Selects the rendering profile for this request.
    ///
    /// Profiles do not exist before OpenGL 3.2, so a core request below that
    /// version gets the default profile.
    pub fn profile(&self) -> Result<Profile, Error> {
        match self.api {
            ClientApi::OpenGl => {
                if self.profile_mask == ProfileMask::CORE {
                    if (self.major, self.minor) >= (3, 2) {
                        Ok(Profile::OpenGlCore)
                    } else {
                        Ok(Profile::Default)
                    }
                } else if self.profile_mask == ProfileMask::COMPATIBILITY {
                    Ok(Profile::Default)
                } else {
                    Err(Error::BadConfig)
                }
            }
            ClientApi::OpenGlEs => match self.major {
                1 => Ok(Profile::OpenGlEs1),
                // ES 3.x shares the ES 2 profile.
                2 | 3 => Ok(Profile::OpenGlEs2),
                _ => Err(Error::BadConfig),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_profiles() {
        let cases = [
            (ContextRequest::opengl(3, 2), Ok(Profile::OpenGlCore)),
            (ContextRequest::opengl(4, 0), Ok(Profile::OpenGlCore)),
            (ContextRequest::opengl(3, 1), Ok(Profile::Default)),
            (ContextRequest::opengl(2, 1), Ok(Profile::Default)),
            (
                ContextRequest::opengl(4, 6).with_profile(ProfileMask::COMPATIBILITY),
                Ok(Profile::Default),
            ),
            (
                ContextRequest::opengl(3, 3).with_profile(ProfileMask::empty()),
                Err(Error::BadConfig),
            ),
            (
                ContextRequest::opengl(3, 3).with_profile(ProfileMask::all()),
                Err(Error::BadConfig),
            ),
        ];
        for (request, expected) in cases {
            assert_eq!(request.profile(), expected, "{request:?}");
        }
    }

    #[test]
    fn es_profiles() {
        assert_eq!(ContextRequest::gles(1).profile(), Ok(Profile::OpenGlEs1));
        assert_eq!(ContextRequest::gles(2).profile(), Ok(Profile::OpenGlEs2));
        assert_eq!(ContextRequest::gles(3).profile(), Ok(Profile::OpenGlEs2));
        assert_eq!(ContextRequest::gles(4).profile(), Err(Error::BadConfig));
        assert_eq!(ContextRequest::gles(0).profile(), Err(Error::BadConfig));
    }

    #[test]
    fn es_ignores_profile_mask() {
        let request = ContextRequest::gles(2).with_profile(ProfileMask::empty());
        assert_eq!(request.profile(), Ok(Profile::OpenGlEs2));
    }
}
