// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Framebuffer attachment kinds and the per-surface attachment cache.
//!
//! Every attachment kind has a fixed slot in the [`AttachmentCache`]. The
//! front-left and back-left entries alias swap-chain buffers and are only
//! rotated by presentation; every other entry is owned by the cache and lives
//! until [`AttachmentCache::release_owned`] or the cache is dropped.

use alloc::rc::Rc;

/// Logical image slot of a framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    /// Front color buffer (last presented image).
    FrontLeft,
    /// Back color buffer (current render target).
    BackLeft,
    /// Right-eye front color buffer (stereo, never produced).
    FrontRight,
    /// Right-eye back color buffer (stereo, never produced).
    BackRight,
    /// Combined depth/stencil buffer.
    DepthStencil,
    /// Accumulation buffer.
    Accum,
}

impl AttachmentKind {
    /// Number of attachment kinds.
    pub const COUNT: usize = 6;

    /// All attachment kinds, in cache order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::FrontLeft,
        Self::BackLeft,
        Self::FrontRight,
        Self::BackRight,
        Self::DepthStencil,
        Self::Accum,
    ];

    /// Position of this kind in the cache.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::FrontLeft => 0,
            Self::BackLeft => 1,
            Self::FrontRight => 2,
            Self::BackRight => 3,
            Self::DepthStencil => 4,
            Self::Accum => 5,
        }
    }

    /// The single-bit mask for this kind.
    #[must_use]
    pub const fn mask(self) -> AttachmentMask {
        match self {
            Self::FrontLeft => AttachmentMask::FRONT_LEFT,
            Self::BackLeft => AttachmentMask::BACK_LEFT,
            Self::FrontRight => AttachmentMask::FRONT_RIGHT,
            Self::BackRight => AttachmentMask::BACK_RIGHT,
            Self::DepthStencil => AttachmentMask::DEPTH_STENCIL,
            Self::Accum => AttachmentMask::ACCUM,
        }
    }

    /// Returns `true` for the two entries that alias swap-chain buffers.
    #[must_use]
    pub const fn is_presentable(self) -> bool {
        matches!(self, Self::FrontLeft | Self::BackLeft)
    }
}

bitflags::bitflags! {
    /// Set of attachment kinds.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AttachmentMask: u32 {
        /// [`AttachmentKind::FrontLeft`].
        const FRONT_LEFT = 1 << 0;
        /// [`AttachmentKind::BackLeft`].
        const BACK_LEFT = 1 << 1;
        /// [`AttachmentKind::FrontRight`].
        const FRONT_RIGHT = 1 << 2;
        /// [`AttachmentKind::BackRight`].
        const BACK_RIGHT = 1 << 3;
        /// [`AttachmentKind::DepthStencil`].
        const DEPTH_STENCIL = 1 << 4;
        /// [`AttachmentKind::Accum`].
        const ACCUM = 1 << 5;
    }
}

impl AttachmentMask {
    /// Iterates the kinds contained in this mask, in cache order.
    pub fn kinds(self) -> impl Iterator<Item = AttachmentKind> {
        AttachmentKind::ALL
            .into_iter()
            .filter(move |k| self.contains(k.mask()))
    }
}

/// Mapping from attachment kind to a shared resource.
///
/// Overwriting or clearing an entry drops its `Rc`, releasing the resource
/// once no other holder remains.
#[derive(Debug)]
pub struct AttachmentCache<R> {
    entries: [Option<Rc<R>>; AttachmentKind::COUNT],
}

impl<R> Default for AttachmentCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> AttachmentCache<R> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [const { None }; AttachmentKind::COUNT],
        }
    }

    /// Returns the cached resource for `kind`.
    #[must_use]
    pub fn get(&self, kind: AttachmentKind) -> Option<&Rc<R>> {
        self.entries[kind.index()].as_ref()
    }

    /// Returns `true` if `kind` has a cached resource.
    #[must_use]
    pub fn contains(&self, kind: AttachmentKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Stores `resource` for `kind`, returning the previous entry.
    pub fn insert(&mut self, kind: AttachmentKind, resource: Rc<R>) -> Option<Rc<R>> {
        self.entries[kind.index()].replace(resource)
    }

    /// Removes and returns the entry for `kind`.
    pub fn take(&mut self, kind: AttachmentKind) -> Option<Rc<R>> {
        self.entries[kind.index()].take()
    }

    /// Records a presentation of `presented`.
    ///
    /// Clears the back-left entry and makes `presented` the front-left entry.
    /// Returns the previous front entry.
    pub fn rotate_presented(&mut self, presented: Rc<R>) -> Option<Rc<R>> {
        self.take(AttachmentKind::BackLeft);
        self.insert(AttachmentKind::FrontLeft, presented)
    }

    /// Releases every entry that does not alias a swap-chain buffer.
    pub fn release_owned(&mut self) {
        for kind in AttachmentKind::ALL {
            if !kind.is_presentable() {
                self.entries[kind.index()] = None;
            }
        }
    }

    /// Mask of the kinds currently cached.
    #[must_use]
    pub fn cached_mask(&self) -> AttachmentMask {
        AttachmentKind::ALL
            .into_iter()
            .filter(|k| self.contains(*k))
            .fold(AttachmentMask::empty(), |m, k| m | k.mask())
    }
}
