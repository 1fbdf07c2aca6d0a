// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swap chain, attachment cache and presentation protocol for native-window
//! EGL surfaces.
//!
//! `nwin_egl_core` binds a compositor's triple-buffered window protocol to a
//! rendering layer that thinks in framebuffers with named attachments. It is
//! `no_std` compatible (with `alloc`) and single-threaded: every type is
//! driven from the thread that owns the rendering context.
//!
//! # Architecture
//!
//! ```text
//!   RenderContext ──validate(kinds)──► Surface (Framebuffer)
//!                                          │
//!                    ┌─────────────────────┼──────────────────────┐
//!                    ▼                     ▼                      ▼
//!             AttachmentCache        SwapChain::acquire()   Screen::resource_create()
//!                                      (BackLeft)           (DepthStencil, Accum)
//!
//!   Surface::present() ──► flush ──► FenceTracker ──► SwapChain::submit()
//!                                                          │
//!                                                          ▼
//!                                               Compositor::queue_buffer()
//! ```
//!
//! **[`platform`]**: The capabilities the driver consumes: [`Compositor`],
//! [`Screen`], [`ContextApi`] and [`RenderContext`].
//!
//! **[`swap_chain`]**: Fixed ring of [`SLOT_COUNT`] window buffers and the
//! dequeue/queue/cancel protocol.
//!
//! **[`attachment`]**: Attachment kinds and the per-surface cache.
//!
//! **[`fence`]**: Completion tokens and the per-slot [`FenceTracker`].
//!
//! **[`surface`]**: [`Surface`], which ties the above together and implements
//! [`Framebuffer`].
//!
//! **[`default_window`]**: Single-owner registry for clients that present
//! without creating a window.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! surface lifecycle instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Errors
//!
//! Allocation and validation failures are returned as [`Error`]. Compositor
//! transport failures are fatal: they are logged and the driver panics.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//!
//! [`Compositor`]: platform::Compositor
//! [`Screen`]: platform::Screen
//! [`ContextApi`]: platform::ContextApi
//! [`RenderContext`]: platform::RenderContext
//! [`SLOT_COUNT`]: swap_chain::SLOT_COUNT
//! [`FenceTracker`]: fence::FenceTracker
//! [`Surface`]: surface::Surface
//! [`Framebuffer`]: framebuffer::Framebuffer
//! [`Error`]: error::Error

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod attachment;
pub mod default_window;
pub mod error;
pub mod fence;
pub mod format;
pub mod framebuffer;
pub mod platform;
pub mod resource;
pub mod surface;
pub mod swap_chain;
pub mod trace;
pub mod visual;

pub use error::{Error, ErrorCode, TransportError};
