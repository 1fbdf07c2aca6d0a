// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Completion tokens and per-slot fence bookkeeping.

use crate::swap_chain::{SLOT_COUNT, Slot};

/// GPU completion token: a syncpoint id and the value it must reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fence {
    /// Syncpoint identifier.
    pub id: u32,
    /// Threshold value signaling completion.
    pub value: u32,
}

impl Fence {
    /// Creates a fence.
    #[must_use]
    pub const fn new(id: u32, value: u32) -> Self {
        Self { id, value }
    }
}

/// Last completion token attached for each swap-chain slot.
///
/// Re-presenting a buffer whose rendering produced the same token as last
/// time must not attach the fence again; the compositor already waits on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FenceTracker {
    records: [Option<Fence>; SLOT_COUNT],
}

impl FenceTracker {
    /// Creates a tracker with no recorded fences.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: [None; SLOT_COUNT],
        }
    }

    /// Returns the fence last attached for `slot`.
    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<Fence> {
        self.records[slot.index()]
    }

    /// Records `token` for `slot` and returns the fence to attach.
    ///
    /// Returns `None` when there is no token or it equals the stored record;
    /// the record is left untouched in both cases.
    pub fn observe(&mut self, slot: Slot, token: Option<Fence>) -> Option<Fence> {
        let token = token?;
        let record = &mut self.records[slot.index()];
        if *record == Some(token) {
            return None;
        }
        *record = Some(token);
        Some(token)
    }
}
