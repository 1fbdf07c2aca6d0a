// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display: configs, contexts, surfaces and the current binding.
//!
//! Contexts and surfaces are named by handles. Destroying one that is part of
//! the current binding only marks it; the object is released once a later
//! [`make_current`](Display::make_current) unbinds it. Marked handles are
//! rejected by every other operation.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use nwin_egl_core::Error;
use nwin_egl_core::default_window::DefaultWindow;
use nwin_egl_core::platform::{
    Compositor, ContextApi, ContextAttribs, RenderContext, Screen, SharedFramebuffer,
};
use nwin_egl_core::surface::{PresentOutcome, Surface};
use nwin_egl_core::trace::Tracer;

use crate::config::{self, ApiMask, Config, ConfigId};
use crate::context::{ContextId, ContextRequest};
use crate::legacy::LegacyGfx;

/// Reported display version as `(major, minor)`.
pub const VERSION: (u32, u32) = (1, 4);

/// Extensions the display advertises.
pub const EXTENSIONS: [&str; 2] = ["EGL_KHR_create_context", "EGL_KHR_surfaceless_context"];

/// Handle naming a surface created on a [`Display`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// The context and surfaces bound by the last successful
/// [`Display::make_current`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Bound context.
    pub context: ContextId,
    /// Draw surface, or `None` for a surfaceless binding.
    pub draw: Option<SurfaceId>,
    /// Read surface, or `None` for a surfaceless binding.
    pub read: Option<SurfaceId>,
}

impl Binding {
    fn uses_surface(&self, id: SurfaceId) -> bool {
        self.draw == Some(id) || self.read == Some(id)
    }
}

struct ContextEntry<X> {
    context: X,
    config: ConfigId,
    doomed: bool,
}

struct SurfaceEntry<C: Compositor, S: Screen> {
    surface: Rc<Surface<C, S>>,
    config: ConfigId,
    doomed: bool,
}

/// An initialized display.
pub struct Display<C: Compositor, S: Screen, A: ContextApi<S::Resource>> {
    screen: Rc<S>,
    api: A,
    registry: Rc<DefaultWindow<C>>,
    configs: Vec<Config>,
    contexts: BTreeMap<ContextId, ContextEntry<A::Context>>,
    surfaces: BTreeMap<SurfaceId, SurfaceEntry<C, S>>,
    current: Option<Binding>,
    next_handle: u32,
    tracer: Tracer,
}

impl<C, S, A> fmt::Debug for Display<C, S, A>
where
    C: Compositor,
    S: Screen,
    A: ContextApi<S::Resource>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Display")
            .field("configs", &self.configs.len())
            .field("contexts", &self.contexts.len())
            .field("surfaces", &self.surfaces.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<C, S, A> Display<C, S, A>
where
    C: Compositor + 'static,
    S: Screen + 'static,
    A: ContextApi<S::Resource>,
{
    /// Initializes a display over the given capabilities.
    ///
    /// Fails with [`Error::NotInitialized`] if the screen supports none of
    /// the advertised formats.
    pub fn initialize(compositor: Rc<C>, screen: Rc<S>, api: A) -> Result<Self, Error> {
        let configs = config::enumerate(&*screen);
        if configs.is_empty() {
            log::warn!("no usable framebuffer configs");
            return Err(Error::NotInitialized);
        }
        log::debug!("initialized display with {} configs", configs.len());
        Ok(Self {
            screen,
            api,
            registry: Rc::new(DefaultWindow::new(compositor)),
            configs,
            contexts: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            current: None,
            next_handle: 1,
            tracer: Tracer::none(),
        })
    }

    /// Display version as `(major, minor)`.
    #[must_use]
    pub fn version(&self) -> (u32, u32) {
        VERSION
    }

    /// Client APIs contexts can be created for.
    #[must_use]
    pub fn client_apis(&self) -> ApiMask {
        ApiMask::all()
    }

    /// Advertised extension names.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        &EXTENSIONS
    }

    /// Returns `true` until [`terminate`](Self::terminate) is called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        !self.configs.is_empty()
    }

    /// All configs, ordered by id.
    #[must_use]
    pub fn configs(&self) -> &[Config] {
        &self.configs
    }

    /// Looks up a config.
    #[must_use]
    pub fn config(&self, id: ConfigId) -> Option<&Config> {
        self.configs.iter().find(|c| c.id == id)
    }

    /// The context layer.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The default-window registry shared by this display's surfaces.
    #[must_use]
    pub fn default_window(&self) -> &Rc<DefaultWindow<C>> {
        &self.registry
    }

    /// Legacy window-configuration calls operating on the default window.
    #[must_use]
    pub fn legacy(&self) -> LegacyGfx<C> {
        LegacyGfx::new(Rc::clone(&self.registry))
    }

    /// Sets the tracer handed to surfaces created from now on.
    pub fn set_tracer(&mut self, tracer: Tracer) {
        self.tracer = tracer;
    }

    /// The current binding, if any.
    #[must_use]
    pub fn current(&self) -> Option<Binding> {
        self.current
    }

    /// A live surface.
    #[must_use]
    pub fn surface(&self, id: SurfaceId) -> Option<&Rc<Surface<C, S>>> {
        self.surfaces
            .get(&id)
            .filter(|e| !e.doomed)
            .map(|e| &e.surface)
    }

    /// A live context.
    #[must_use]
    pub fn context(&self, id: ContextId) -> Option<&A::Context> {
        self.contexts
            .get(&id)
            .filter(|e| !e.doomed)
            .map(|e| &e.context)
    }

    /// Returns `true` while `id` still holds its context, including one
    /// marked for destruction.
    #[must_use]
    pub fn holds_context(&self, id: ContextId) -> bool {
        self.contexts.contains_key(&id)
    }

    /// Returns `true` while `id` still holds its surface, including one
    /// marked for destruction.
    #[must_use]
    pub fn holds_surface(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(&id)
    }

    fn ensure_initialized(&self) -> Result<(), Error> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn live_config(&self, id: ConfigId) -> Result<Config, Error> {
        self.ensure_initialized()?;
        self.config(id).copied().ok_or(Error::BadConfig)
    }

    fn live_surface(&self, id: SurfaceId) -> Result<&SurfaceEntry<C, S>, Error> {
        self.ensure_initialized()?;
        self.surfaces
            .get(&id)
            .filter(|e| !e.doomed)
            .ok_or(Error::BadSurface)
    }

    fn next_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Creates a context for `config`.
    pub fn create_context(
        &mut self,
        config: ConfigId,
        request: &ContextRequest,
    ) -> Result<ContextId, Error> {
        let config = self.live_config(config)?;
        let profile = request.profile()?;
        let attribs = ContextAttribs {
            profile,
            major: request.major,
            minor: request.minor,
            flags: request.flags,
            visual: config.visual,
        };
        let context = self.api.create_context(&attribs).map_err(|err| {
            log::warn!("context creation rejected ({attribs:?}): {err}");
            Error::BadMatch(err)
        })?;
        let id = ContextId(self.next_handle());
        log::debug!("created {id:?} ({profile:?} {}.{})", request.major, request.minor);
        self.contexts.insert(
            id,
            ContextEntry {
                context,
                config: config.id,
                doomed: false,
            },
        );
        Ok(id)
    }

    /// The config a context was created for.
    pub fn context_config(&self, id: ContextId) -> Result<ConfigId, Error> {
        self.contexts
            .get(&id)
            .filter(|e| !e.doomed)
            .map(|e| e.config)
            .ok_or(Error::BadContext)
    }

    /// Destroys a context, or marks it if it is current.
    pub fn destroy_context(&mut self, id: ContextId) -> Result<(), Error> {
        self.ensure_initialized()?;
        let is_current = self.current.is_some_and(|b| b.context == id);
        let Some(entry) = self.contexts.get_mut(&id).filter(|e| !e.doomed) else {
            return Err(Error::BadContext);
        };
        if is_current {
            log::debug!("{id:?} is current; destruction deferred");
            entry.doomed = true;
        } else {
            self.contexts.remove(&id);
            log::debug!("destroyed {id:?}");
        }
        Ok(())
    }

    /// Creates a surface presenting to `window`.
    ///
    /// With no window, or one the compositor does not recognize, the surface
    /// takes the default window.
    pub fn create_window_surface(
        &mut self,
        config: ConfigId,
        window: Option<C::Window>,
    ) -> Result<SurfaceId, Error> {
        let config = self.live_config(config)?;
        let surface = Surface::new(
            Rc::clone(&self.screen),
            &self.registry,
            window,
            config.visual,
            self.tracer.clone(),
        )?;
        let id = SurfaceId(self.next_handle());
        self.surfaces.insert(
            id,
            SurfaceEntry {
                surface: Rc::new(surface),
                config: config.id,
                doomed: false,
            },
        );
        Ok(id)
    }

    /// Pixmap surfaces are not supported.
    pub fn create_pixmap_surface(&mut self, config: ConfigId) -> Result<SurfaceId, Error> {
        self.live_config(config)?;
        log::debug!("pixmap surfaces are not supported");
        Err(Error::UnsupportedSurface)
    }

    /// Pbuffer surfaces are not supported.
    pub fn create_pbuffer_surface(
        &mut self,
        config: ConfigId,
        width: u32,
        height: u32,
    ) -> Result<SurfaceId, Error> {
        self.live_config(config)?;
        log::debug!("pbuffer surfaces ({width}x{height}) are not supported");
        Err(Error::UnsupportedSurface)
    }

    /// Destroys a surface, or marks it if it is bound.
    pub fn destroy_surface(&mut self, id: SurfaceId) -> Result<(), Error> {
        self.live_surface(id)?;
        let bound = self.current.is_some_and(|b| b.uses_surface(id));
        if bound {
            log::debug!("{id:?} is bound; destruction deferred");
            if let Some(entry) = self.surfaces.get_mut(&id) {
                entry.doomed = true;
            }
        } else {
            self.surfaces.remove(&id);
        }
        Ok(())
    }

    fn framebuffer(&self, id: Option<SurfaceId>) -> Option<SharedFramebuffer<S::Resource>> {
        let entry = self.surfaces.get(&id?)?;
        let surface: SharedFramebuffer<S::Resource> = entry.surface.clone();
        Some(surface)
    }

    /// Binds `context` with `draw` and `read`, or unbinds with `None`.
    ///
    /// A context may be bound without surfaces. Once the new binding is in
    /// place, a previously bound context or surface that was destroyed while
    /// bound is released.
    pub fn make_current(
        &mut self,
        context: Option<ContextId>,
        draw: Option<SurfaceId>,
        read: Option<SurfaceId>,
    ) -> Result<(), Error> {
        self.ensure_initialized()?;
        let next = match context {
            None if draw.is_some() || read.is_some() => return Err(Error::BadContext),
            None => None,
            Some(id) => {
                if self.context(id).is_none() {
                    return Err(Error::BadContext);
                }
                if draw.is_some() != read.is_some() {
                    return Err(Error::BadSurface);
                }
                for surface in draw.into_iter().chain(read) {
                    self.live_surface(surface)?;
                }
                Some(Binding {
                    context: id,
                    draw,
                    read,
                })
            }
        };

        let draw_fb = self.framebuffer(draw);
        let read_fb = self.framebuffer(read);
        let target = context
            .and_then(|id| self.contexts.get_mut(&id))
            .map(|e| &mut e.context);
        if !self.api.make_current(target, draw_fb, read_fb) {
            log::warn!("context layer refused binding {next:?}");
            return Err(Error::BadContext);
        }

        let previous = core::mem::replace(&mut self.current, next);
        if let Some(previous) = previous {
            self.reap(previous);
        }
        Ok(())
    }

    /// Releases the objects of `previous` that were destroyed while bound
    /// and are no longer part of the current binding.
    fn reap(&mut self, previous: Binding) {
        let current = self.current;
        for id in previous.draw.into_iter().chain(previous.read) {
            let still_bound = current.is_some_and(|b| b.uses_surface(id));
            if !still_bound && self.surfaces.get(&id).is_some_and(|e| e.doomed) {
                self.surfaces.remove(&id);
                log::debug!("released deferred {id:?}");
            }
        }
        let id = previous.context;
        let still_bound = current.is_some_and(|b| b.context == id);
        if !still_bound && self.contexts.get(&id).is_some_and(|e| e.doomed) {
            self.contexts.remove(&id);
            log::debug!("released deferred {id:?}");
        }
    }

    /// Sets the number of vertical blanks between presents, clamped to the
    /// surface config's range.
    pub fn swap_interval(&mut self, id: SurfaceId, interval: i32) -> Result<u32, Error> {
        let entry = self.live_surface(id)?;
        let clamped = self
            .config(entry.config)
            .map_or(1, |c| c.clamp_swap_interval(interval));
        entry.surface.set_swap_interval(clamped);
        Ok(clamped)
    }

    /// Presents the back buffer of `id`, flushing the context bound to it.
    pub fn swap_buffers(&mut self, id: SurfaceId) -> Result<PresentOutcome, Error> {
        let surface = Rc::clone(&self.live_surface(id)?.surface);
        let context = match self.current {
            Some(binding) if binding.draw == Some(id) => self
                .contexts
                .get_mut(&binding.context)
                .map(|e| &mut e.context as &mut dyn RenderContext),
            _ => None,
        };
        Ok(surface.present(context))
    }

    /// Unbinds the current context and releases every context and surface.
    ///
    /// Later operations fail with [`Error::NotInitialized`].
    pub fn terminate(&mut self) {
        if self.current.take().is_some() && !self.api.make_current(None, None, None) {
            log::warn!("context layer refused to unbind during terminate");
        }
        self.surfaces.clear();
        self.contexts.clear();
        self.configs.clear();
        log::debug!("terminated display");
    }
}

impl<C, S, A> Drop for Display<C, S, A>
where
    C: Compositor,
    S: Screen,
    A: ContextApi<S::Resource>,
{
    fn drop(&mut self) {
        if self.current.take().is_some() {
            _ = self.api.make_current(None, None, None);
        }
    }
}
