//=========================================================================
// Bridge Entry Points
//=========================================================================
//
// The fixed set of calls the host makes into the native side.
//
// Architecture:
// ```text
//  Host thread:                               Render thread ("hearth-render"):
//  ┌────────────────────────────┐            ┌──────────────────────────────┐
//  │ on_start/resume/pause/stop │── push ──► │ EventQueue::drain_into       │
//  │ on_input_event             │── push ──► │   ↓                          │
//  │                            │            │ FrameScheduler::tick         │
//  │ on_surface_created/changed │─┐          │   ├─ update(ApplicationCore) │
//  │ on_surface_destroyed       │ └─ lock ─► │   └─ render (SurfaceManager) │
//  │                            │            │                              │
//  │ on_destroy ── StopSignal ──┼──────────► │ run() exits, stop()          │
//  │            ◄──── join ─────┼────────────┤ ShutdownReport               │
//  └────────────────────────────┘            └──────────────────────────────┘
// ```
//
// Lifecycle and input calls never block: they push onto the queue.
// Surface calls update the surface manager synchronously, so
// `on_surface_destroyed` returns only after the context bound to the old
// window is gone. `on_destroy` joins the render thread.
//
//=========================================================================

//=== Submodules ==========================================================

mod builder;
pub mod ffi;
mod lifecycle;

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, SendError};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::config::BridgeConfig;
use crate::core::app::ApplicationCore;
use crate::core::event::{Event, KeyEvent, LifecycleEvent, MotionEvent, SurfaceHandle};
use crate::core::event_queue::{EventQueue, PushOutcome};
use crate::core::scheduler::{FrameScheduler, ShutdownReport, StopSignal};
use crate::core::surface::graphics::GraphicsBackend;
use crate::core::surface::{SurfaceManager, SurfaceState};
use crate::error::BridgeError;

pub use builder::BridgeBuilder;
pub use lifecycle::{ContractPolicy, HostLifecycle};
use lifecycle::LifecycleGuard;

const RENDER_THREAD_NAME: &str = "hearth-render";

//=== Bridge ==============================================================

/// Native side of one host activity.
///
/// Owns the event queue and surface manager shared with the render thread,
/// and the render thread itself once `on_start` has been called.
pub struct Bridge {
    queue: Arc<EventQueue>,
    surface: Arc<SurfaceManager>,
    lifecycle: LifecycleGuard,

    /// Held here until the render thread takes it on first `on_start`.
    scheduler: Option<FrameScheduler>,
    render_thread: Option<JoinHandle<ShutdownReport>>,
    stop: StopSignal,

    report: Option<ShutdownReport>,
}

impl Bridge {
    //=====================================================================
    // Creation
    //=====================================================================

    /// `on_create`: builds the bridge with the headless graphics backend.
    ///
    /// Use [`BridgeBuilder`] to supply another backend.
    pub fn on_create(config: BridgeConfig, core: Box<dyn ApplicationCore>) -> Result<Self, BridgeError> {
        BridgeBuilder::from_config(config).build(core)
    }

    pub(crate) fn create(
        config: BridgeConfig,
        backend: Box<dyn GraphicsBackend>,
        core: Box<dyn ApplicationCore>,
    ) -> Result<Self, BridgeError> {
        config.validate()?;

        let queue = Arc::new(EventQueue::new(config.queue_capacity, config.overflow_policy));
        let surface = Arc::new(SurfaceManager::new(backend));
        let scheduler = FrameScheduler::new(Arc::clone(&queue), Arc::clone(&surface), core, &config);

        queue.push(Event::Lifecycle(LifecycleEvent::Created));
        info!(
            target: "bridge",
            "Bridge created (queue: {} {:?}, pacing: {:?})",
            config.queue_capacity,
            config.overflow_policy,
            config.pacing
        );

        Ok(Self {
            queue,
            surface,
            lifecycle: LifecycleGuard::new(config.contract_policy),
            scheduler: Some(scheduler),
            render_thread: None,
            stop: StopSignal::new(),
            report: None,
        })
    }

    //=====================================================================
    // Lifecycle Entry Points
    //=====================================================================

    /// Enqueues `Started`; the first call spawns the render thread.
    pub fn on_start(&mut self) -> Result<(), BridgeError> {
        self.start_with(thread::Builder::new().name(RENDER_THREAD_NAME.to_string()))
    }

    /// `on_start` with a caller-supplied thread builder for the render thread.
    pub(crate) fn start_with(&mut self, builder: thread::Builder) -> Result<(), BridgeError> {
        self.lifecycle.check("on_start", HostLifecycle::Started)?;

        if self.scheduler.is_some() && self.render_thread.is_none() {
            self.spawn_render_thread(builder)?;
        }

        self.lifecycle.commit(HostLifecycle::Started);
        self.push_lifecycle(LifecycleEvent::Started);
        Ok(())
    }

    pub fn on_resume(&mut self) -> Result<(), BridgeError> {
        self.lifecycle.advance("on_resume", HostLifecycle::Resumed)?;
        self.push_lifecycle(LifecycleEvent::Resumed);
        Ok(())
    }

    pub fn on_pause(&mut self) -> Result<(), BridgeError> {
        self.lifecycle.advance("on_pause", HostLifecycle::Paused)?;
        self.push_lifecycle(LifecycleEvent::Paused);
        Ok(())
    }

    /// The render loop pauses; the application core stays alive.
    pub fn on_stop(&mut self) -> Result<(), BridgeError> {
        self.lifecycle.advance("on_stop", HostLifecycle::Stopped)?;
        self.push_lifecycle(LifecycleEvent::Stopped);
        Ok(())
    }

    /// Stops the render loop and releases everything before returning.
    pub fn on_destroy(&mut self) -> Result<ShutdownReport, BridgeError> {
        self.lifecycle.advance("on_destroy", HostLifecycle::Destroyed)?;
        self.push_lifecycle(LifecycleEvent::Destroyed);

        let report = self.shutdown()?;
        info!(
            target: "bridge",
            "Bridge destroyed (discarded events: {}, queue drops: {})",
            report.discarded_events,
            self.queue.dropped()
        );
        Ok(report)
    }

    //=====================================================================
    // Surface Entry Points
    //=====================================================================

    pub fn on_surface_created(
        &mut self,
        handle: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> Result<(), BridgeError> {
        self.lifecycle.check_alive("on_surface_created")?;
        self.surface.on_surface_created(handle, width, height);
        self.queue.push(Event::SurfaceChanged { width, height, handle });
        Ok(())
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) -> Result<(), BridgeError> {
        self.lifecycle.check_alive("on_surface_changed")?;
        if self.surface.on_surface_changed(width, height) {
            if let SurfaceState::Ready { handle, .. } = self.surface.state() {
                self.queue.push(Event::SurfaceChanged { width, height, handle });
            }
        }
        Ok(())
    }

    /// Returns once the graphics context bound to the old surface is released.
    pub fn on_surface_destroyed(&mut self) -> Result<(), BridgeError> {
        self.lifecycle.check_alive("on_surface_destroyed")?;
        self.surface.on_surface_destroyed();
        Ok(())
    }

    //=====================================================================
    // Input Entry Points
    //=====================================================================

    /// Enqueues a motion or key event. Never blocks.
    pub fn on_input_event(&mut self, event: Event) -> Result<PushOutcome, BridgeError> {
        self.lifecycle.check_alive("on_input_event")?;

        if !event.is_input() {
            warn!(target: "bridge", "Non-input event {:?} passed to on_input_event; ignored", event);
            return Ok(PushOutcome::Dropped);
        }
        Ok(self.queue.push(event))
    }

    pub fn on_motion_event(&mut self, event: MotionEvent) -> Result<PushOutcome, BridgeError> {
        self.on_input_event(Event::InputMotion(event))
    }

    pub fn on_key_event(&mut self, event: KeyEvent) -> Result<PushOutcome, BridgeError> {
        self.on_input_event(Event::InputKey(event))
    }

    //=====================================================================
    // Queries
    //=====================================================================

    pub fn lifecycle(&self) -> HostLifecycle {
        self.lifecycle.state()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn surface(&self) -> &Arc<SurfaceManager> {
        &self.surface
    }

    pub fn is_render_thread_running(&self) -> bool {
        self.render_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Report of the completed `on_destroy`, if any.
    pub fn shutdown_report(&self) -> Option<ShutdownReport> {
        self.report
    }

    /// Number of entry point calls rejected as contract violations.
    pub fn contract_violations(&self) -> u64 {
        self.lifecycle.violations()
    }

    //--- Internal Helpers -------------------------------------------------

    fn push_lifecycle(&self, event: LifecycleEvent) {
        let outcome = self.queue.push(Event::Lifecycle(event));
        debug!(target: "bridge", "{:?} queued ({:?})", event, outcome);
    }

    /// Spawns the render thread, then hands it the scheduler. The scheduler
    /// stays here if the spawn fails, so a later `on_start` can retry.
    fn spawn_render_thread(&mut self, builder: thread::Builder) -> Result<(), BridgeError> {
        let stop = self.stop.clone();
        let (handoff_tx, handoff_rx) = bounded::<FrameScheduler>(1);

        let handle = builder
            .spawn(move || {
                let Ok(mut scheduler) = handoff_rx.recv() else {
                    warn!(target: "bridge", "Render thread received no scheduler");
                    return ShutdownReport::default();
                };
                info!(target: "bridge", "Render thread started");
                let report = scheduler.run(&stop);
                info!(target: "bridge", "Render thread exiting");
                report
            })
            .map_err(|e| {
                error!(target: "bridge", "Render thread spawn failed: {}", e);
                BridgeError::ThreadSpawn(e)
            })?;

        if let Some(scheduler) = self.scheduler.take() {
            if let Err(SendError(scheduler)) = handoff_tx.send(scheduler) {
                error!(target: "bridge", "Render thread exited before taking the scheduler");
                self.scheduler = Some(scheduler);
                let _ = handle.join();
                return Err(BridgeError::ThreadPanicked);
            }
        }

        self.render_thread = Some(handle);
        Ok(())
    }

    /// Stops the render loop at a frame boundary and releases all resources.
    fn shutdown(&mut self) -> Result<ShutdownReport, BridgeError> {
        if let Some(report) = self.report {
            return Ok(report);
        }

        self.stop.raise();
        self.queue.wake();

        let joined = match self.render_thread.take() {
            Some(handle) => handle.join().map_err(|_| {
                error!(target: "bridge", "Render thread panicked");
                BridgeError::ThreadPanicked
            }),
            None => match self.scheduler.as_mut() {
                // Never started: release directly on this thread.
                Some(scheduler) => Ok(scheduler.stop()),
                None => Ok(ShutdownReport::default()),
            },
        };
        self.scheduler = None;

        // A panicked render thread may have left the context behind.
        let leftover = self.surface.release();

        let mut report = joined?;
        report.context_released |= leftover;
        report.context_live = self.surface.has_context();
        self.report = Some(report);
        Ok(report)
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        let running = self.render_thread.is_some() || self.scheduler.is_some();
        if self.report.is_none() && running {
            warn!(target: "bridge", "Bridge dropped without on_destroy; shutting down");
            if let Err(e) = self.shutdown() {
                error!(target: "bridge", "Shutdown on drop failed: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("lifecycle", &self.lifecycle.state())
            .field("queue", &self.queue)
            .field("surface", &self.surface)
            .field("render_thread", &self.render_thread.is_some())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::TestBed;
    use crate::core::event::{KeyAction, KeyCode, MotionAction};
    use crate::core::scheduler::FrameContext;
    use crate::core::surface::graphics::{GraphicsContext, HeadlessBackend};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn config() -> BridgeConfig {
        BridgeConfig {
            contract_policy: ContractPolicy::Log,
            log_fps: false,
            ..BridgeConfig::default()
        }
    }

    fn bridge() -> Bridge {
        Bridge::on_create(config(), Box::new(TestBed::new())).unwrap()
    }

    #[test]
    fn create_enqueues_created() {
        let bridge = bridge();
        assert_eq!(bridge.lifecycle(), HostLifecycle::Created);
        assert_eq!(bridge.queue().drain_all(), vec![Event::Lifecycle(LifecycleEvent::Created)]);
        assert!(!bridge.is_render_thread_running());
    }

    #[test]
    fn invalid_config_is_reported() {
        let cfg = BridgeConfig {
            queue_capacity: 0,
            ..config()
        };
        let err = Bridge::on_create(cfg, Box::new(TestBed::new())).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    struct ShutdownFlag(Arc<AtomicBool>);

    impl ApplicationCore for ShutdownFlag {
        fn update(&mut self, _frame: &FrameContext<'_>) {}

        fn render(&mut self, _gfx: &mut dyn GraphicsContext) {}

        fn shutdown(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn unrepresentable_log_period_is_a_config_error() {
        let cfg = BridgeConfig {
            fps_log_period_sec: 1e30,
            ..config()
        };
        let err = Bridge::on_create(cfg, Box::new(TestBed::new())).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn drop_without_start_shuts_the_core_down() {
        let flag = Arc::new(AtomicBool::new(false));
        let bridge = Bridge::on_create(config(), Box::new(ShutdownFlag(Arc::clone(&flag)))).unwrap();
        drop(bridge);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn failed_spawn_keeps_the_scheduler_for_a_retry() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut bridge = Bridge::on_create(config(), Box::new(ShutdownFlag(Arc::clone(&flag)))).unwrap();

        // No address space can hold this stack.
        let oversized = thread::Builder::new().stack_size(1 << 60);
        assert!(matches!(bridge.start_with(oversized), Err(BridgeError::ThreadSpawn(_))));
        assert_eq!(bridge.lifecycle(), HostLifecycle::Created);
        assert!(!bridge.is_render_thread_running());
        assert!(!flag.load(Ordering::SeqCst));

        bridge.on_start().unwrap();
        assert!(bridge.is_render_thread_running());
        bridge.on_stop().unwrap();

        let report = bridge.on_destroy().unwrap();
        assert!(report.core_released);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn out_of_order_call_is_rejected_under_log_policy() {
        let mut bridge = bridge();
        bridge.queue().drain_all();

        assert!(matches!(
            bridge.on_resume(),
            Err(BridgeError::ContractViolation { entry: "on_resume", .. })
        ));
        assert_eq!(bridge.lifecycle(), HostLifecycle::Created);
        assert!(bridge.queue().is_empty());
        assert_eq!(bridge.contract_violations(), 1);
    }

    #[test]
    #[should_panic(expected = "host contract violation")]
    fn out_of_order_call_panics_under_panic_policy() {
        let cfg = BridgeConfig {
            contract_policy: ContractPolicy::Panic,
            ..config()
        };
        let mut bridge = Bridge::on_create(cfg, Box::new(TestBed::new())).unwrap();
        let _ = bridge.on_pause();
    }

    #[test]
    fn destroy_without_start_releases_directly() {
        let mut bridge = bridge();
        let report = bridge.on_destroy().unwrap();

        assert!(report.core_released);
        assert!(report.all_released());
        assert_eq!(bridge.lifecycle(), HostLifecycle::Destroyed);
    }

    #[test]
    fn calls_after_destroy_are_violations() {
        let mut bridge = bridge();
        bridge.on_destroy().unwrap();

        assert!(bridge.on_start().is_err());
        assert!(bridge.on_surface_created(SurfaceHandle::from_raw(1), 1, 1).is_err());
        assert!(bridge
            .on_key_event(KeyEvent { code: KeyCode::KeyA, action: KeyAction::Down })
            .is_err());
    }

    #[test]
    fn surface_calls_update_manager_synchronously() {
        let backend = HeadlessBackend::new();
        let mut bridge = BridgeBuilder::from_config(config())
            .with_backend(Box::new(backend))
            .build(Box::new(TestBed::new()))
            .unwrap();
        bridge.queue().drain_all();
        let h = SurfaceHandle::from_raw(0x77);

        bridge.on_surface_created(h, 1080, 2400).unwrap();
        assert_eq!(
            bridge.surface_state(),
            SurfaceState::Ready { handle: h, width: 1080, height: 2400 }
        );

        bridge.on_surface_changed(2400, 1080).unwrap();
        bridge.on_surface_changed(2400, 1080).unwrap();
        bridge.on_surface_destroyed().unwrap();
        assert_eq!(bridge.surface_state(), SurfaceState::Lost);

        assert_eq!(
            bridge.queue().drain_all(),
            vec![
                Event::SurfaceChanged { width: 1080, height: 2400, handle: h },
                Event::SurfaceChanged { width: 2400, height: 1080, handle: h },
            ]
        );
    }

    #[test]
    fn non_input_event_is_not_queued() {
        let mut bridge = bridge();
        bridge.queue().drain_all();

        let outcome = bridge
            .on_input_event(Event::Lifecycle(LifecycleEvent::Paused))
            .unwrap();
        assert_eq!(outcome, PushOutcome::Dropped);
        assert!(bridge.queue().is_empty());

        let motion = MotionEvent {
            pointer_id: 0,
            x: 1.0,
            y: 2.0,
            action: MotionAction::Down,
            timestamp_nanos: 0,
        };
        assert!(bridge.on_motion_event(motion).unwrap().is_queued());
    }
}
