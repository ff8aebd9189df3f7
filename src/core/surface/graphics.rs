//=========================================================================
// Graphics Abstraction
//=========================================================================
//
// The bridge does not pick a graphics API. A `GraphicsBackend` turns a
// host surface handle into a `GraphicsContext`; the context is what the
// application core draws with and what the surface manager presents and
// releases.
//
// `HeadlessBackend` is the null implementation: it does no GPU work and
// only counts calls, which is all the desktop harness and the tests need.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, trace};

//=== Internal Dependencies ===============================================

use crate::core::event::SurfaceHandle;
use crate::error::SurfaceError;

//=== Extent ==============================================================

/// Surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

//=== Traits ==============================================================

/// A live rendering context bound to one host surface.
pub trait GraphicsContext: Send {
    /// Rebuilds viewport/framebuffers for a new surface size.
    fn reconfigure(&mut self, extent: Extent);

    fn clear(&mut self, color: [f32; 4]);

    fn draw(&mut self, vertex_count: u32, instance_count: u32);

    /// Swaps buffers. May block on vsync when [`vsync`](Self::vsync) is `true`.
    fn present(&mut self) -> Result<(), SurfaceError>;

    /// Destroys everything bound to the surface. Called exactly once.
    fn release(&mut self);

    /// Whether `present` paces frames to the display.
    fn vsync(&self) -> bool {
        false
    }
}

/// Factory for [`GraphicsContext`]s.
pub trait GraphicsBackend: Send {
    fn name(&self) -> &'static str;

    fn create_context(
        &mut self,
        handle: SurfaceHandle,
        extent: Extent,
    ) -> Result<Box<dyn GraphicsContext>, SurfaceError>;
}

//=== HeadlessBackend =====================================================

/// Call counters shared by a [`HeadlessBackend`] and its contexts.
#[derive(Debug, Default)]
pub struct HeadlessStats {
    pub contexts_created: AtomicU32,
    pub contexts_released: AtomicU32,
    pub reconfigures: AtomicU32,
    pub clears: AtomicU64,
    pub draws: AtomicU64,
    pub presents: AtomicU64,
    last_extent: Mutex<Option<Extent>>,
    last_clear: Mutex<Option<[f32; 4]>>,
}

impl HeadlessStats {
    /// Contexts created but not yet released.
    pub fn live_contexts(&self) -> u32 {
        self.contexts_created.load(Ordering::SeqCst) - self.contexts_released.load(Ordering::SeqCst)
    }

    pub fn presents(&self) -> u64 {
        self.presents.load(Ordering::SeqCst)
    }

    pub fn draws(&self) -> u64 {
        self.draws.load(Ordering::SeqCst)
    }

    /// Extent of the most recent creation or reconfiguration.
    pub fn last_extent(&self) -> Option<Extent> {
        *self.last_extent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_clear(&self) -> Option<[f32; 4]> {
        *self.last_clear.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_extent(&self, extent: Extent) {
        *self.last_extent.lock().unwrap_or_else(PoisonError::into_inner) = Some(extent);
    }
}

/// Backend that performs no GPU work.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: Arc<HeadlessStats>,
    vsync: bool,
    failing_creates: u32,
    failing_presents: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contexts report vsync pacing.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// The next `count` context creations fail.
    pub fn with_create_failures(mut self, count: u32) -> Self {
        self.failing_creates = count;
        self
    }

    /// The first `count` presents of the next created context fail.
    pub fn with_present_failures(mut self, count: u32) -> Self {
        self.failing_presents = count;
        self
    }

    /// Shared counters; stays valid after the backend moves into a bridge.
    pub fn stats(&self) -> Arc<HeadlessStats> {
        Arc::clone(&self.stats)
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_context(
        &mut self,
        handle: SurfaceHandle,
        extent: Extent,
    ) -> Result<Box<dyn GraphicsContext>, SurfaceError> {
        if self.failing_creates > 0 {
            self.failing_creates -= 1;
            return Err(SurfaceError::ContextCreation {
                backend: self.name(),
                reason: "injected failure".to_string(),
            });
        }

        self.stats.contexts_created.fetch_add(1, Ordering::SeqCst);
        self.stats.set_extent(extent);
        debug!(
            target: "surface",
            "Headless context for {:#x} ({}x{})",
            handle.raw(),
            extent.width,
            extent.height
        );

        Ok(Box::new(HeadlessContext {
            stats: Arc::clone(&self.stats),
            vsync: self.vsync,
            failing_presents: std::mem::take(&mut self.failing_presents),
            released: false,
        }))
    }
}

//=== HeadlessContext =====================================================

struct HeadlessContext {
    stats: Arc<HeadlessStats>,
    vsync: bool,
    failing_presents: u32,
    released: bool,
}

impl GraphicsContext for HeadlessContext {
    fn reconfigure(&mut self, extent: Extent) {
        self.stats.reconfigures.fetch_add(1, Ordering::SeqCst);
        self.stats.set_extent(extent);
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.stats.clears.fetch_add(1, Ordering::SeqCst);
        *self.stats.last_clear.lock().unwrap_or_else(PoisonError::into_inner) = Some(color);
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) {
        trace!(target: "surface", "draw {} x {}", vertex_count, instance_count);
        self.stats.draws.fetch_add(1, Ordering::SeqCst);
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        if self.failing_presents > 0 {
            self.failing_presents -= 1;
            return Err(SurfaceError::Present("injected failure".to_string()));
        }
        self.stats.presents.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.contexts_released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn vsync(&self) -> bool {
        self.vsync
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
