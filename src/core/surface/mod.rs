//=========================================================================
// Surface Manager
//=========================================================================
//
// Owns the host surface handle and the graphics context bound to it.
//
// State machine:
// ```text
//            on_surface_created            on_surface_destroyed
//   Absent ─────────────────────► Ready ─────────────────────────► Lost
//                                  │ ▲  ◄───────────────────────────┘
//              on_surface_changed  └─┘      on_surface_created
// ```
//
// The host thread drives transitions; the render thread reads the state
// and renders through `render_with`. Both sides share one mutex. The
// render thread holds it for exactly one render + present, so a host
// `on_surface_destroyed` waits for the in-flight frame to reach its
// boundary and then releases the context before returning.
//
// Contexts are created lazily by the render thread, on the first render
// after the surface appears, and are never created for a surface that
// is not `Ready`.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod graphics;

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::event::SurfaceHandle;
use crate::error::SurfaceError;
use graphics::{Extent, GraphicsBackend, GraphicsContext};

//=== SurfaceState ========================================================

/// Host surface availability as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    /// No surface has ever been provided.
    Absent,
    /// A drawable surface exists.
    Ready {
        handle: SurfaceHandle,
        width: u32,
        height: u32,
    },
    /// The surface was destroyed (or became unusable) and not replaced yet.
    Lost,
}

impl SurfaceState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn extent(&self) -> Option<Extent> {
        match *self {
            Self::Ready { width, height, .. } => Some(Extent::new(width, height)),
            _ => None,
        }
    }

    /// Whether `from -> to` is one of the permitted surface transitions.
    pub fn is_valid_transition(from: &Self, to: &Self) -> bool {
        matches!(
            (from, to),
            (Self::Absent, Self::Ready { .. })
                | (Self::Ready { .. }, Self::Lost)
                | (Self::Lost, Self::Ready { .. })
                | (Self::Ready { .. }, Self::Ready { .. })
        )
    }
}

/// One recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceTransition {
    pub from: SurfaceState,
    pub to: SurfaceState,
}

//=== SurfaceManager ======================================================

const HISTORY_LEN: usize = 64;

struct Slot {
    state: SurfaceState,
    backend: Box<dyn GraphicsBackend>,
    context: Option<Box<dyn GraphicsContext>>,
    needs_reconfigure: bool,
    generation: u64,
    history: VecDeque<SurfaceTransition>,
}

impl Slot {
    fn transition(&mut self, to: SurfaceState) {
        let from = self.state;
        debug_assert!(
            SurfaceState::is_valid_transition(&from, &to),
            "invalid surface transition {:?} -> {:?}",
            from,
            to
        );

        self.state = to;
        self.generation += 1;
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(SurfaceTransition { from, to });
        info!(target: "surface", "Surface {:?} -> {:?}", from, to);
    }

    fn release_context(&mut self) -> bool {
        match self.context.take() {
            Some(mut ctx) => {
                ctx.release();
                debug!(target: "surface", "Graphics context released");
                true
            }
            None => false,
        }
    }

    /// Ready -> Lost after a context failure. No retry until the host
    /// reports a new surface.
    fn lose(&mut self) {
        self.release_context();
        if self.state.is_ready() {
            self.transition(SurfaceState::Lost);
        }
    }
}

/// Tracks the host surface and the graphics context bound to it.
pub struct SurfaceManager {
    slot: Mutex<Slot>,
}

impl SurfaceManager {
    //--- Construction -----------------------------------------------------

    pub fn new(backend: Box<dyn GraphicsBackend>) -> Self {
        info!(target: "surface", "Surface manager using {} backend", backend.name());
        Self {
            slot: Mutex::new(Slot {
                state: SurfaceState::Absent,
                backend,
                context: None,
                needs_reconfigure: false,
                generation: 0,
                history: VecDeque::with_capacity(HISTORY_LEN),
            }),
        }
    }

    //--- Host Side --------------------------------------------------------

    /// The host created a drawable surface.
    pub fn on_surface_created(&self, handle: SurfaceHandle, width: u32, height: u32) {
        let mut slot = self.lock();

        if slot.state.is_ready() {
            warn!(
                target: "surface",
                "Surface created while another is ready; releasing the old one first"
            );
            slot.release_context();
            slot.transition(SurfaceState::Lost);
        }

        slot.needs_reconfigure = false;
        slot.transition(SurfaceState::Ready { handle, width, height });
    }

    /// The host resized the surface. Applied at the start of the next render.
    ///
    /// Returns `false` when ignored (no ready surface, or same size).
    pub fn on_surface_changed(&self, width: u32, height: u32) -> bool {
        let mut slot = self.lock();

        match slot.state {
            SurfaceState::Ready { handle, width: w, height: h } => {
                if (w, h) == (width, height) {
                    debug!(target: "surface", "Resize to current size {}x{} ignored", w, h);
                    return false;
                }
                slot.needs_reconfigure = slot.context.is_some();
                slot.transition(SurfaceState::Ready { handle, width, height });
                true
            }
            state => {
                warn!(target: "surface", "Resize {}x{} ignored in state {:?}", width, height, state);
                false
            }
        }
    }

    /// The host is about to destroy the surface.
    ///
    /// Waits for an in-flight render to finish, then releases the context
    /// before returning so the next surface starts clean.
    pub fn on_surface_destroyed(&self) {
        let mut slot = self.lock();

        if !slot.state.is_ready() {
            warn!(target: "surface", "Surface destroyed in state {:?}; ignored", slot.state);
            return;
        }

        slot.release_context();
        slot.needs_reconfigure = false;
        slot.transition(SurfaceState::Lost);
    }

    //--- Render Side ------------------------------------------------------

    /// Renders one frame through `render` and presents it.
    ///
    /// Returns `Ok(None)` without calling `render` unless the surface is
    /// `Ready`. A context creation or present failure releases the context,
    /// moves the surface to `Lost` and is returned as an error.
    pub fn render_with<R>(
        &self,
        render: impl FnOnce(&mut dyn GraphicsContext, Extent) -> R,
    ) -> Result<Option<R>, SurfaceError> {
        let mut slot = self.lock();

        let SurfaceState::Ready { handle, width, height } = slot.state else {
            return Ok(None);
        };
        let extent = Extent::new(width, height);

        if slot.context.is_none() {
            match slot.backend.create_context(handle, extent) {
                Ok(ctx) => {
                    info!(target: "surface", "Graphics context created ({}x{})", width, height);
                    slot.context = Some(ctx);
                    slot.needs_reconfigure = false;
                }
                Err(e) => {
                    error!(target: "surface", "Surface acquisition failed: {}", e);
                    slot.lose();
                    return Err(e);
                }
            }
        }

        let needs_reconfigure = std::mem::take(&mut slot.needs_reconfigure);
        let Some(ctx) = slot.context.as_mut() else {
            return Err(SurfaceError::NotReady);
        };

        if needs_reconfigure {
            debug!(target: "surface", "Reconfiguring for {}x{}", width, height);
            ctx.reconfigure(extent);
        }

        let output = render(ctx.as_mut(), extent);

        if let Err(e) = ctx.present() {
            error!(target: "surface", "Present failed: {}", e);
            slot.lose();
            return Err(e);
        }

        Ok(Some(output))
    }

    /// Releases the live context, if any. The surface state is unchanged;
    /// a later render recreates the context.
    pub fn release(&self) -> bool {
        self.lock().release_context()
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> SurfaceState {
        self.lock().state
    }

    pub fn is_ready(&self) -> bool {
        self.lock().state.is_ready()
    }

    pub fn has_context(&self) -> bool {
        self.lock().context.is_some()
    }

    /// `Some(vsync)` for the live context, `None` without one.
    pub fn context_vsync(&self) -> Option<bool> {
        self.lock().context.as_ref().map(|ctx| ctx.vsync())
    }

    /// Incremented on every state transition.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Most recent transitions, oldest first.
    pub fn transitions(&self) -> Vec<SurfaceTransition> {
        self.lock().history.iter().copied().collect()
    }

    //--- Internal Helpers -------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SurfaceManager {
    fn drop(&mut self) {
        self.lock().release_context();
    }
}

impl std::fmt::Debug for SurfaceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.lock();
        f.debug_struct("SurfaceManager")
            .field("state", &slot.state)
            .field("backend", &slot.backend.name())
            .field("has_context", &slot.context.is_some())
            .field("generation", &slot.generation)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use graphics::HeadlessBackend;
    use std::sync::Arc;

    const H: SurfaceHandle = SurfaceHandle::from_raw(0xA11);

    fn manager() -> (SurfaceManager, Arc<graphics::HeadlessStats>) {
        let backend = HeadlessBackend::new();
        let stats = backend.stats();
        (SurfaceManager::new(Box::new(backend)), stats)
    }

    fn render(manager: &SurfaceManager) -> Result<Option<()>, SurfaceError> {
        manager.render_with(|ctx, _| ctx.draw(3, 1))
    }

    #[test]
    fn starts_absent_and_skips_render() {
        let (manager, stats) = manager();
        assert_eq!(manager.state(), SurfaceState::Absent);
        assert_eq!(render(&manager).unwrap(), None);
        assert_eq!(stats.contexts_created.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn context_is_created_lazily_on_first_render() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 1080, 2400);
        assert!(!manager.has_context());

        assert_eq!(render(&manager).unwrap(), Some(()));
        assert!(manager.has_context());
        assert_eq!(stats.live_contexts(), 1);
        assert_eq!(stats.presents(), 1);
        assert_eq!(stats.last_extent(), Some(Extent::new(1080, 2400)));
    }

    #[test]
    fn destroy_releases_context_synchronously() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 100, 100);
        render(&manager).unwrap();

        manager.on_surface_destroyed();

        assert_eq!(manager.state(), SurfaceState::Lost);
        assert_eq!(stats.live_contexts(), 0);
        assert_eq!(render(&manager).unwrap(), None);
        assert_eq!(stats.presents(), 1);
    }

    #[test]
    fn resize_is_deferred_to_next_render() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 100, 100);
        render(&manager).unwrap();

        assert!(manager.on_surface_changed(200, 50));
        assert_eq!(stats.reconfigures.load(std::sync::atomic::Ordering::SeqCst), 0);

        render(&manager).unwrap();
        assert_eq!(stats.reconfigures.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(stats.last_extent(), Some(Extent::new(200, 50)));
    }

    #[test]
    fn resize_to_same_size_is_ignored() {
        let (manager, _) = manager();
        manager.on_surface_created(H, 100, 100);
        let generation = manager.generation();

        assert!(!manager.on_surface_changed(100, 100));
        assert_eq!(manager.generation(), generation);
    }

    #[test]
    fn resize_without_surface_is_ignored() {
        let (manager, _) = manager();
        assert!(!manager.on_surface_changed(10, 10));
        assert_eq!(manager.state(), SurfaceState::Absent);
    }

    #[test]
    fn destroy_without_surface_is_ignored() {
        let (manager, _) = manager();
        manager.on_surface_destroyed();
        assert_eq!(manager.state(), SurfaceState::Absent);
        assert!(manager.transitions().is_empty());
    }

    #[test]
    fn recreate_after_loss() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 10, 10);
        render(&manager).unwrap();
        manager.on_surface_destroyed();

        let h2 = SurfaceHandle::from_raw(0xB22);
        manager.on_surface_created(h2, 20, 20);
        render(&manager).unwrap();

        assert_eq!(stats.contexts_created.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(stats.live_contexts(), 1);
        assert_eq!(
            manager.state(),
            SurfaceState::Ready { handle: h2, width: 20, height: 20 }
        );
    }

    #[test]
    fn double_create_passes_through_lost() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 10, 10);
        render(&manager).unwrap();
        manager.on_surface_created(SurfaceHandle::from_raw(2), 10, 10);

        assert_eq!(stats.live_contexts(), 0);
        let kinds: Vec<_> = manager.transitions().iter().map(|t| t.to).collect();
        assert!(matches!(kinds[..], [SurfaceState::Ready { .. }, SurfaceState::Lost, SurfaceState::Ready { .. }]));
        for t in manager.transitions() {
            assert!(SurfaceState::is_valid_transition(&t.from, &t.to));
        }
    }

    #[test]
    fn acquisition_failure_moves_to_lost_without_retry() {
        let backend = HeadlessBackend::new().with_create_failures(1);
        let stats = backend.stats();
        let manager = SurfaceManager::new(Box::new(backend));
        manager.on_surface_created(H, 10, 10);

        assert!(render(&manager).is_err());
        assert_eq!(manager.state(), SurfaceState::Lost);

        // Stays lost until the host reports a surface again.
        assert_eq!(render(&manager).unwrap(), None);
        manager.on_surface_created(H, 10, 10);
        assert_eq!(render(&manager).unwrap(), Some(()));
        assert_eq!(stats.live_contexts(), 1);
    }

    #[test]
    fn present_failure_releases_context() {
        let backend = HeadlessBackend::new().with_present_failures(1);
        let stats = backend.stats();
        let manager = SurfaceManager::new(Box::new(backend));
        manager.on_surface_created(H, 10, 10);

        assert!(matches!(render(&manager), Err(SurfaceError::Present(_))));
        assert_eq!(manager.state(), SurfaceState::Lost);
        assert_eq!(stats.live_contexts(), 0);
    }

    #[test]
    fn release_keeps_state() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 10, 10);
        render(&manager).unwrap();

        assert!(manager.release());
        assert!(!manager.release());
        assert!(manager.is_ready());
        assert_eq!(stats.live_contexts(), 0);
    }

    #[test]
    fn drop_releases_live_context() {
        let (manager, stats) = manager();
        manager.on_surface_created(H, 10, 10);
        render(&manager).unwrap();
        drop(manager);
        assert_eq!(stats.live_contexts(), 0);
    }

    #[test]
    fn vsync_reported_by_live_context() {
        let manager = SurfaceManager::new(Box::new(HeadlessBackend::new().with_vsync(true)));
        assert_eq!(manager.context_vsync(), None);
        manager.on_surface_created(H, 10, 10);
        render(&manager).unwrap();
        assert_eq!(manager.context_vsync(), Some(true));
    }
}
