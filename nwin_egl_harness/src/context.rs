// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering-context layer double.

use std::cell::RefCell;
use std::rc::Rc;

use nwin_egl_core::Error;
use nwin_egl_core::attachment::AttachmentKind;
use nwin_egl_core::framebuffer::FramebufferId;
use nwin_egl_core::platform::{
    ContextApi, ContextAttribs, ContextError, FlushFlags, RenderContext, SharedFramebuffer,
};

use crate::screen::FakeResource;

/// One recorded [`ContextApi::make_current`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Bound context id, or `None` to unbind.
    pub context: Option<u32>,
    /// Draw framebuffer.
    pub draw: Option<FramebufferId>,
    /// Read framebuffer.
    pub read: Option<FramebufferId>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    created: Vec<ContextAttribs>,
    destroyed: Vec<u32>,
    flushes: Vec<(u32, FlushFlags)>,
    bindings: Vec<Binding>,
    draw: Option<SharedFramebuffer<FakeResource>>,
    fail_create: Option<ContextError>,
    refuse_bind: bool,
}

/// Context produced by [`FakeApi`]. Flushes and drops are logged on the API.
#[derive(Debug)]
pub struct FakeContext {
    id: u32,
    attribs: ContextAttribs,
    state: Rc<RefCell<State>>,
}

impl FakeContext {
    /// Identifier assigned at creation, starting at 1.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Attributes the context was created with.
    #[must_use]
    pub fn attribs(&self) -> &ContextAttribs {
        &self.attribs
    }
}

impl RenderContext for FakeContext {
    fn flush(&mut self, flags: FlushFlags) {
        self.state.borrow_mut().flushes.push((self.id, flags));
    }
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        self.state.borrow_mut().destroyed.push(self.id);
    }
}

/// Context layer double.
///
/// Holds the bound draw framebuffer like a real context would, so
/// [`render`](Self::render) can resolve attachments through it.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Rc<RefCell<State>>,
}

impl std::fmt::Debug for FakeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FakeApi")
            .field("created", &state.created.len())
            .field("destroyed", &state.destroyed)
            .field("bindings", &state.bindings.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State").finish_non_exhaustive()
    }
}

impl FakeApi {
    /// Creates a context layer that accepts every request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next context creation fail with `err`.
    pub fn fail_next_create(&self, err: ContextError) {
        self.state.borrow_mut().fail_create = Some(err);
    }

    /// Makes every later bind fail.
    pub fn refuse_binds(&self, refuse: bool) {
        self.state.borrow_mut().refuse_bind = refuse;
    }

    /// Attributes of every created context, oldest first.
    #[must_use]
    pub fn created(&self) -> Vec<ContextAttribs> {
        self.state.borrow().created.clone()
    }

    /// Ids of destroyed contexts, in drop order.
    #[must_use]
    pub fn destroyed(&self) -> Vec<u32> {
        self.state.borrow().destroyed.clone()
    }

    /// Every flush as `(context id, flags)`.
    #[must_use]
    pub fn flushes(&self) -> Vec<(u32, FlushFlags)> {
        self.state.borrow().flushes.clone()
    }

    /// Every bind request, oldest first.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        self.state.borrow().bindings.clone()
    }

    /// Framebuffer currently bound for drawing.
    #[must_use]
    pub fn bound_draw(&self) -> Option<FramebufferId> {
        self.state.borrow().draw.as_ref().map(|fb| fb.id())
    }

    /// Simulates a draw call: resolves `kinds` on the bound draw framebuffer.
    ///
    /// Returns `Ok(None)` when nothing is bound.
    pub fn render(
        &self,
        kinds: &[AttachmentKind],
    ) -> Result<Option<Vec<Option<Rc<FakeResource>>>>, Error> {
        let draw = self.state.borrow().draw.clone();
        match draw {
            Some(fb) => fb.validate(kinds).map(Some),
            None => Ok(None),
        }
    }
}

impl ContextApi<FakeResource> for FakeApi {
    type Context = FakeContext;

    fn create_context(&self, attribs: &ContextAttribs) -> Result<FakeContext, ContextError> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.fail_create.take() {
            return Err(err);
        }
        state.next_id += 1;
        state.created.push(*attribs);
        Ok(FakeContext {
            id: state.next_id,
            attribs: *attribs,
            state: Rc::clone(&self.state),
        })
    }

    fn make_current(
        &self,
        context: Option<&mut FakeContext>,
        draw: Option<SharedFramebuffer<FakeResource>>,
        read: Option<SharedFramebuffer<FakeResource>>,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        state.bindings.push(Binding {
            context: context.map(|c| c.id),
            draw: draw.as_ref().map(|fb| fb.id()),
            read: read.as_ref().map(|fb| fb.id()),
        });
        if state.refuse_bind {
            return false;
        }
        state.draw = draw;
        true
    }
}
