// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory resource allocator.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use nwin_egl_core::fence::Fence;
use nwin_egl_core::format::PixelFormat;
use nwin_egl_core::platform::Screen;
use nwin_egl_core::resource::{BindFlags, NativeBuffer, ResourceTemplate, TextureTarget};

/// Resource handed out by [`FakeScreen`].
///
/// Dropping it decrements the screen's live-resource count.
#[derive(Debug)]
pub struct FakeResource {
    /// Allocation order, starting at 1.
    pub id: u32,
    /// Template it was created from.
    pub template: ResourceTemplate,
    live: Rc<Cell<usize>>,
}

impl Drop for FakeResource {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    created: Vec<ResourceTemplate>,
    allocations_left: Option<usize>,
    fail_export: bool,
    default_token: Option<Fence>,
    tokens: BTreeMap<u32, Option<Fence>>,
    unsupported: Vec<(BindFlags, PixelFormat)>,
}

/// Resource allocator double with allocation accounting.
#[derive(Debug, Default)]
pub struct FakeScreen {
    state: RefCell<State>,
    live: Rc<Cell<usize>>,
}

impl FakeScreen {
    /// Creates an allocator that supports every format and never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates of every successful allocation, oldest first.
    #[must_use]
    pub fn created(&self) -> Vec<ResourceTemplate> {
        self.state.borrow().created.clone()
    }

    /// Number of allocated resources not yet dropped.
    #[must_use]
    pub fn live_resources(&self) -> usize {
        self.live.get()
    }

    /// Lets `n` more allocations succeed, then fails every later one.
    pub fn fail_allocations_after(&self, n: usize) {
        self.state.borrow_mut().allocations_left = Some(n);
    }

    /// Lifts an allocation limit.
    pub fn allow_allocations(&self) {
        self.state.borrow_mut().allocations_left = None;
    }

    /// Makes native buffer export fail.
    pub fn fail_native_export(&self, fail: bool) {
        self.state.borrow_mut().fail_export = fail;
    }

    /// Completion token reported for resources without an override.
    pub fn set_default_token(&self, token: Option<Fence>) {
        self.state.borrow_mut().default_token = token;
    }

    /// Completion token reported for the resource with `id`.
    pub fn set_token(&self, id: u32, token: Option<Fence>) {
        self.state.borrow_mut().tokens.insert(id, token);
    }

    /// Marks `format` unsupported for `bind`.
    pub fn unsupport(&self, format: PixelFormat, bind: BindFlags) {
        self.state.borrow_mut().unsupported.push((bind, format));
    }
}

impl Screen for FakeScreen {
    type Resource = FakeResource;

    fn resource_create(&self, template: &ResourceTemplate) -> Option<FakeResource> {
        let mut state = self.state.borrow_mut();
        if let Some(left) = state.allocations_left.as_mut() {
            if *left == 0 {
                return None;
            }
            *left -= 1;
        }
        state.next_id += 1;
        state.created.push(*template);
        self.live.set(self.live.get() + 1);
        Some(FakeResource {
            id: state.next_id,
            template: *template,
            live: Rc::clone(&self.live),
        })
    }

    fn native_buffer(&self, resource: &FakeResource) -> Option<NativeBuffer> {
        if self.state.borrow().fail_export {
            return None;
        }
        let t = &resource.template;
        Some(NativeBuffer {
            handle: 0x1000 + u64::from(resource.id),
            width: t.width,
            height: t.height,
            stride: t.width * t.format.bytes_per_pixel(),
            format: t.format,
        })
    }

    fn completion_token(&self, resource: &FakeResource) -> Option<Fence> {
        let state = self.state.borrow();
        match state.tokens.get(&resource.id) {
            Some(token) => *token,
            None => state.default_token,
        }
    }

    fn is_format_supported(
        &self,
        format: PixelFormat,
        target: TextureTarget,
        bind: BindFlags,
    ) -> bool {
        _ = target;
        let state = self.state.borrow();
        !state
            .unsupported
            .iter()
            .any(|(b, f)| *f == format && b.intersects(bind))
    }
}
