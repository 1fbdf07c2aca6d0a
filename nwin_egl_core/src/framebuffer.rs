// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Framebuffer contract exposed to the rendering-context layer.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::attachment::AttachmentKind;
use crate::error::Error;
use crate::visual::Visual;

/// Process-unique framebuffer identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub u32);

impl FramebufferId {
    /// Allocates the next identifier.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for FramebufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FramebufferId({})", self.0)
    }
}

/// A drawable with named attachments, as consumed by a rendering context.
///
/// The context resolves the attachments it is about to render into with
/// [`validate`](Self::validate) and re-validates whenever
/// [`stamp`](Self::stamp) changes.
pub trait Framebuffer {
    /// Resource type backing the attachments.
    type Resource;

    /// Identity of this framebuffer.
    fn id(&self) -> FramebufferId;

    /// Buffer layout of this framebuffer.
    fn visual(&self) -> &Visual;

    /// Modification counter, bumped whenever the attachments change.
    fn stamp(&self) -> u32;

    /// Resolves `kinds` to resources, creating or acquiring them on a miss.
    ///
    /// The result has one entry per requested kind. Kinds this framebuffer
    /// never produces resolve to `None`.
    fn validate(&self, kinds: &[AttachmentKind]) -> Result<Vec<Option<Rc<Self::Resource>>>, Error>;

    /// Makes front-buffer rendering to `kind` visible.
    fn flush_front(&self, kind: AttachmentKind) -> Result<(), Error>;

    /// Called by the context before a blocking finish on a double-buffered
    /// framebuffer.
    fn flush_swapbuffers(&self) -> Result<(), Error>;
}
