// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory compositor with a call log and failure injection.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use nwin_egl_core::TransportError;
use nwin_egl_core::fence::Fence;
use nwin_egl_core::platform::{Compositor, CropRect, Transform};
use nwin_egl_core::resource::NativeBuffer;
use nwin_egl_core::swap_chain::{SLOT_COUNT, Slot};

/// Result code returned when a dequeue finds no free buffer.
pub const NO_FREE_BUFFER: u32 = 0xE401;

/// Window handle issued by [`FakeCompositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u32);

/// Transport operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportOp {
    /// [`Compositor::configure_buffer`].
    Configure,
    /// [`Compositor::dequeue_buffer`].
    Dequeue,
    /// [`Compositor::queue_buffer`].
    Queue,
    /// [`Compositor::cancel_buffer`].
    Cancel,
    /// [`Compositor::create_default_window`].
    CreateDefaultWindow,
}

/// One recorded transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositorCall {
    /// A buffer was registered.
    Configure {
        /// Target window.
        window: WindowHandle,
        /// Slot index.
        slot: u32,
        /// Native handle of the buffer.
        handle: u64,
    },
    /// A slot was dequeued.
    Dequeue {
        /// Target window.
        window: WindowHandle,
        /// Returned slot index.
        slot: u32,
    },
    /// A slot was queued for display.
    Queue {
        /// Target window.
        window: WindowHandle,
        /// Slot index.
        slot: u32,
        /// Attached fence.
        fence: Option<Fence>,
    },
    /// A slot was returned without display.
    Cancel {
        /// Target window.
        window: WindowHandle,
        /// Slot index.
        slot: u32,
        /// Attached fence.
        fence: Option<Fence>,
    },
    /// All buffer registrations were dropped.
    ReleaseBuffers {
        /// Target window.
        window: WindowHandle,
    },
    /// The swap interval changed.
    SetSwapInterval {
        /// Target window.
        window: WindowHandle,
        /// New interval.
        interval: u32,
    },
    /// The crop rectangle changed.
    SetCrop {
        /// Target window.
        window: WindowHandle,
        /// New crop.
        crop: CropRect,
    },
    /// The transform changed.
    SetTransform {
        /// Target window.
        window: WindowHandle,
        /// New transform.
        transform: Transform,
    },
    /// The default window was created.
    CreateDefaultWindow {
        /// Issued handle.
        window: WindowHandle,
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The default window was destroyed.
    DestroyDefaultWindow {
        /// Destroyed handle.
        window: WindowHandle,
    },
}

#[derive(Debug)]
struct WindowState {
    width: u32,
    height: u32,
    configured: [Option<NativeBuffer>; SLOT_COUNT],
    free: VecDeque<u32>,
    swap_interval: u32,
    crop: CropRect,
    transform: Transform,
}

impl WindowState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            configured: [None; SLOT_COUNT],
            free: VecDeque::new(),
            swap_interval: 1,
            crop: CropRect::default(),
            transform: Transform::empty(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    windows: BTreeMap<WindowHandle, WindowState>,
    next_window: u32,
    calls: Vec<CompositorCall>,
    failures: BTreeMap<TransportOp, TransportError>,
    forced_dequeue: VecDeque<u32>,
}

impl State {
    fn take_failure(&mut self, op: TransportOp) -> Result<(), TransportError> {
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn window_mut(&mut self, window: WindowHandle) -> Result<&mut WindowState, TransportError> {
        self.windows
            .get_mut(&window)
            .ok_or(TransportError(0xBAD_0001))
    }

    fn add_window(&mut self, width: u32, height: u32) -> WindowHandle {
        self.next_window += 1;
        let handle = WindowHandle(self.next_window);
        self.windows.insert(handle, WindowState::new(width, height));
        handle
    }
}

/// Compositor double.
///
/// Queued and canceled buffers become free again immediately, so a dequeue
/// only fails when every slot is held by the client.
#[derive(Debug, Default)]
pub struct FakeCompositor {
    state: RefCell<State>,
}

impl FakeCompositor {
    /// Creates a compositor with no windows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a window with the given dimensions.
    pub fn add_window(&self, width: u32, height: u32) -> WindowHandle {
        self.state.borrow_mut().add_window(width, height)
    }

    /// Closes a window; its handle becomes invalid.
    pub fn close_window(&self, window: WindowHandle) {
        self.state.borrow_mut().windows.remove(&window);
    }

    /// Makes the next call of `op` fail with `code`.
    pub fn fail_next(&self, op: TransportOp, code: u32) {
        self.state
            .borrow_mut()
            .failures
            .insert(op, TransportError(code));
    }

    /// Makes the next dequeue return `slot`, bypassing the free list.
    ///
    /// `slot` need not be in range.
    pub fn force_next_dequeue(&self, slot: u32) {
        self.state.borrow_mut().forced_dequeue.push_back(slot);
    }

    /// Every transport call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<CompositorCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&CompositorCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Number of registered buffers of `window`.
    #[must_use]
    pub fn configured_buffers(&self, window: WindowHandle) -> usize {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map_or(0, |w| w.configured.iter().flatten().count())
    }

    /// Current swap interval of `window`.
    #[must_use]
    pub fn swap_interval(&self, window: WindowHandle) -> Option<u32> {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map(|w| w.swap_interval)
    }

    /// Current crop rectangle of `window`.
    #[must_use]
    pub fn crop(&self, window: WindowHandle) -> Option<CropRect> {
        self.state.borrow().windows.get(&window).map(|w| w.crop)
    }

    /// Current transform of `window`.
    #[must_use]
    pub fn transform(&self, window: WindowHandle) -> Option<Transform> {
        self.state.borrow().windows.get(&window).map(|w| w.transform)
    }

    fn record(&self, call: CompositorCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl Compositor for FakeCompositor {
    type Window = WindowHandle;

    fn is_valid(&self, window: WindowHandle) -> bool {
        self.state.borrow().windows.contains_key(&window)
    }

    fn dimensions(&self, window: WindowHandle) -> (u32, u32) {
        self.state
            .borrow()
            .windows
            .get(&window)
            .map_or((0, 0), |w| (w.width, w.height))
    }

    fn configure_buffer(
        &self,
        window: WindowHandle,
        slot: Slot,
        buffer: &NativeBuffer,
    ) -> Result<(), TransportError> {
        {
            let mut state = self.state.borrow_mut();
            state.take_failure(TransportOp::Configure)?;
            let win = state.window_mut(window)?;
            win.configured[slot.index()] = Some(*buffer);
            win.free.push_back(slot.get());
        }
        self.record(CompositorCall::Configure {
            window,
            slot: slot.get(),
            handle: buffer.handle,
        });
        Ok(())
    }

    fn dequeue_buffer(&self, window: WindowHandle) -> Result<u32, TransportError> {
        let slot = {
            let mut state = self.state.borrow_mut();
            state.take_failure(TransportOp::Dequeue)?;
            let forced = state.forced_dequeue.pop_front();
            let win = state.window_mut(window)?;
            match forced {
                Some(slot) => {
                    win.free.retain(|s| *s != slot);
                    slot
                }
                None => win.free.pop_front().ok_or(TransportError(NO_FREE_BUFFER))?,
            }
        };
        self.record(CompositorCall::Dequeue { window, slot });
        Ok(slot)
    }

    fn queue_buffer(
        &self,
        window: WindowHandle,
        slot: Slot,
        fence: Option<Fence>,
    ) -> Result<(), TransportError> {
        {
            let mut state = self.state.borrow_mut();
            state.take_failure(TransportOp::Queue)?;
            state.window_mut(window)?.free.push_back(slot.get());
        }
        self.record(CompositorCall::Queue {
            window,
            slot: slot.get(),
            fence,
        });
        Ok(())
    }

    fn cancel_buffer(
        &self,
        window: WindowHandle,
        slot: Slot,
        fence: Option<Fence>,
    ) -> Result<(), TransportError> {
        {
            let mut state = self.state.borrow_mut();
            state.take_failure(TransportOp::Cancel)?;
            state.window_mut(window)?.free.push_front(slot.get());
        }
        self.record(CompositorCall::Cancel {
            window,
            slot: slot.get(),
            fence,
        });
        Ok(())
    }

    fn release_buffers(&self, window: WindowHandle) {
        if let Ok(win) = self.state.borrow_mut().window_mut(window) {
            win.configured = [None; SLOT_COUNT];
            win.free.clear();
        }
        self.record(CompositorCall::ReleaseBuffers { window });
    }

    fn set_swap_interval(&self, window: WindowHandle, interval: u32) {
        if let Ok(win) = self.state.borrow_mut().window_mut(window) {
            win.swap_interval = interval;
        }
        self.record(CompositorCall::SetSwapInterval { window, interval });
    }

    fn set_crop(&self, window: WindowHandle, crop: CropRect) {
        if let Ok(win) = self.state.borrow_mut().window_mut(window) {
            win.crop = crop;
        }
        self.record(CompositorCall::SetCrop { window, crop });
    }

    fn set_transform(&self, window: WindowHandle, transform: Transform) {
        if let Ok(win) = self.state.borrow_mut().window_mut(window) {
            win.transform = transform;
        }
        self.record(CompositorCall::SetTransform { window, transform });
    }

    fn create_default_window(
        &self,
        width: u32,
        height: u32,
    ) -> Result<WindowHandle, TransportError> {
        let window = {
            let mut state = self.state.borrow_mut();
            state.take_failure(TransportOp::CreateDefaultWindow)?;
            state.add_window(width, height)
        };
        self.record(CompositorCall::CreateDefaultWindow {
            window,
            width,
            height,
        });
        Ok(window)
    }

    fn destroy_default_window(&self, window: WindowHandle) {
        self.state.borrow_mut().windows.remove(&window);
        self.record(CompositorCall::DestroyDefaultWindow { window });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(handle: u64) -> NativeBuffer {
        NativeBuffer {
            handle,
            width: 4,
            height: 4,
            stride: 16,
            format: nwin_egl_core::format::PixelFormat::R8G8B8A8Unorm,
        }
    }

    fn slot(i: u32) -> Slot {
        Slot::new(i).unwrap()
    }

    #[test]
    fn dequeue_cycles_configured_slots() {
        let comp = FakeCompositor::new();
        let win = comp.add_window(4, 4);
        for i in 0..3 {
            comp.configure_buffer(win, slot(i), &native(u64::from(i))).unwrap();
        }
        assert_eq!(comp.configured_buffers(win), 3);
        assert_eq!(comp.dequeue_buffer(win), Ok(0));
        assert_eq!(comp.dequeue_buffer(win), Ok(1));
        assert_eq!(comp.dequeue_buffer(win), Ok(2));
        assert_eq!(
            comp.dequeue_buffer(win),
            Err(TransportError(NO_FREE_BUFFER))
        );
        comp.queue_buffer(win, slot(1), None).unwrap();
        assert_eq!(comp.dequeue_buffer(win), Ok(1));
    }

    #[test]
    fn injected_failure_fires_once() {
        let comp = FakeCompositor::new();
        let win = comp.add_window(4, 4);
        comp.fail_next(TransportOp::Configure, 7);
        assert_eq!(
            comp.configure_buffer(win, slot(0), &native(0)),
            Err(TransportError(7))
        );
        assert_eq!(comp.configure_buffer(win, slot(0), &native(0)), Ok(()));
    }

    #[test]
    fn default_window_lifecycle() {
        let comp = FakeCompositor::new();
        let win = comp.create_default_window(1280, 720).unwrap();
        assert!(comp.is_valid(win));
        assert_eq!(comp.dimensions(win), (1280, 720));
        comp.destroy_default_window(win);
        assert!(!comp.is_valid(win));
    }
}
