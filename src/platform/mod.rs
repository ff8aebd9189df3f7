//=========================================================================
// Desktop Host Harness
//
// Plays the part of the Android activity on a desktop: a Winit event
// loop that drives the bridge entry points the way the activity glue
// does on a device.
//
// Architecture:
// ```text
//  Main Thread (Winit):                  Render Thread:
//  ┌─────────────────────────────┐      ┌─────────────────────────┐
//  │ resumed     → create window │      │ FrameScheduler::run     │
//  │               on_surface_*  │      │  ├─ drain EventQueue    │
//  │ Focused     → on_resume /   │      │  ├─ update(TestBed)     │
//  │               on_pause      │─────►│  └─ render + present    │
//  │ Resized     → surface resize│      │                         │
//  │ mouse/keys  → input events  │      │                         │
//  │ CloseReq.   → full teardown │      │                         │
//  └─────────────────────────────┘      └─────────────────────────┘
// ```
//
// Mapping:
// - `resumed`: create the window (first time), `on_start` if needed,
//   `on_surface_created` with the window's inner size
// - `suspended`: `on_surface_destroyed`, window dropped
// - `Focused(true/false)`: `on_resume` / `on_pause`
// - cursor and left button: motion events for pointer 0
// - keyboard: key events
// - `CloseRequested`: `on_surface_destroyed`, `on_pause`, `on_stop`,
//   `on_destroy`, then exit
//
// The harness only issues calls valid in the current host lifecycle
// state, since desktop focus events do not follow Android ordering.
// When the render loop ends by itself (the test-bed's exit key), the
// harness tears down as if the window were closed.
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;
mod input_processor;

//=== External Crates =====================================================

use std::time::{Duration, Instant};

use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::bridge::{Bridge, HostLifecycle};
use crate::config::WindowConfig;
use crate::core::event::SurfaceHandle;
use crate::core::scheduler::ShutdownReport;
use crate::error::BridgeError;
use input_processor::InputProcessor;

/// How often the idle event loop checks whether the render loop ended.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

//=== PlatformError =======================================================

/// Event loop failures. Fatal for the harness.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}

//=== DesktopHost =========================================================

/// Winit application standing in for the Android host.
pub struct DesktopHost {
    bridge: Bridge,
    window_config: WindowConfig,
    window: Option<Window>,
    input: InputProcessor,
    report: Option<ShutdownReport>,
}

impl DesktopHost {
    //--- Construction -----------------------------------------------------

    /// Wraps a freshly created bridge. The window is created lazily in
    /// `resumed()`.
    pub fn new(bridge: Bridge, window_config: WindowConfig) -> Self {
        info!(target: "platform", "Desktop host initialized");
        Self {
            bridge,
            window_config,
            window: None,
            input: InputProcessor::new(),
            report: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes or the render loop ends.
    ///
    /// The bridge is destroyed before this returns.
    pub fn run(mut self) -> Result<ShutdownReport, PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        let result = event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution);

        // Event loop errors and early exits still release the bridge.
        let report = self.teardown();
        result.map(|()| report)
    }

    //--- Lifecycle Helpers ------------------------------------------------

    fn ensure_started(&mut self) {
        if matches!(self.bridge.lifecycle(), HostLifecycle::Created | HostLifecycle::Stopped) {
            let result = self.bridge.on_start();
            Self::check("on_start", result);
        }
    }

    fn focus_gained(&mut self) {
        self.ensure_started();
        if matches!(self.bridge.lifecycle(), HostLifecycle::Started | HostLifecycle::Paused) {
            let result = self.bridge.on_resume();
            Self::check("on_resume", result);
        }
    }

    fn focus_lost(&mut self) {
        if self.bridge.lifecycle() == HostLifecycle::Resumed {
            let result = self.bridge.on_pause();
            Self::check("on_pause", result);
        }
        if let Some(cancel) = self.input.cancel() {
            let result = self.bridge.on_motion_event(cancel);
            Self::check("on_motion_event", result);
        }
    }

    /// Walks the host down to Destroyed, issuing only valid calls.
    fn teardown(&mut self) -> ShutdownReport {
        if let Some(report) = self.report {
            return report;
        }

        if self.window.take().is_some() {
            let result = self.bridge.on_surface_destroyed();
            Self::check("on_surface_destroyed", result);
        }
        if self.bridge.lifecycle() == HostLifecycle::Resumed {
            let result = self.bridge.on_pause();
            Self::check("on_pause", result);
        }
        if matches!(self.bridge.lifecycle(), HostLifecycle::Started | HostLifecycle::Paused) {
            let result = self.bridge.on_stop();
            Self::check("on_stop", result);
        }

        let report = match self.bridge.on_destroy() {
            Ok(report) => report,
            Err(e) => {
                error!(target: "platform", "on_destroy failed: {}", e);
                self.bridge.shutdown_report().unwrap_or_default()
            }
        };
        info!(
            target: "platform",
            "Host torn down (all released: {})",
            report.all_released()
        );
        self.report = Some(report);
        report
    }

    fn check<T>(entry: &str, result: Result<T, BridgeError>) {
        if let Err(e) = result {
            warn!(target: "platform", "{} rejected: {}", entry, e);
        }
    }

    //--- Surface Helpers --------------------------------------------------

    fn surface_handle(id: WindowId) -> SurfaceHandle {
        SurfaceHandle::from_raw(u64::from(id) as usize)
    }

    fn surface_resized(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            debug!(target: "platform", "Zero-sized surface (minimized); resize ignored");
            return;
        }
        let result = self.bridge.on_surface_changed(size.width, size.height);
        Self::check("on_surface_changed", result);
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for DesktopHost {
    /// App became active (startup, or resume on mobile targets).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.ensure_started();

        if self.window.is_some() {
            debug!(target: "platform", "Window already exists");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                let handle = Self::surface_handle(window.id());
                self.window = Some(window);

                let result = self.bridge.on_surface_created(handle, size.width, size.height);
                Self::check("on_surface_created", result);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                event_loop.exit();
            }
        }
    }

    /// The surface is going away (mobile targets).
    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if self.window.take().is_some() {
            info!(target: "platform", "Suspended; releasing surface");
            let result = self.bridge.on_surface_destroyed();
            Self::check("on_surface_destroyed", result);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.teardown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => self.surface_resized(size),

            WindowEvent::Focused(true) => self.focus_gained(),
            WindowEvent::Focused(false) => self.focus_lost(),

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(motion) = self
                    .input
                    .process_cursor_moved(position.x as f32, position.y as f32)
                {
                    let result = self.bridge.on_motion_event(motion);
                    Self::check("on_motion_event", result);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(cancel) = self.input.cancel() {
                    let result = self.bridge.on_motion_event(cancel);
                    Self::check("on_motion_event", result);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(motion) = self.input.process_mouse_button(button, state) {
                    trace!(target: "platform::input", "Pointer {:?}", motion.action);
                    let result = self.bridge.on_motion_event(motion);
                    Self::check("on_motion_event", result);
                }
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match self.input.process_key(key_event.physical_key, key_event.state) {
                    Some(key) => {
                        let result = self.bridge.on_key_event(key);
                        Self::check("on_key_event", result);
                    }
                    None => trace!(target: "platform::input", "Unmapped key ignored"),
                }
            }

            _ => {}
        }
    }

    /// Ends the harness once the render loop stopped on its own.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let started = !matches!(
            self.bridge.lifecycle(),
            HostLifecycle::Created | HostLifecycle::Destroyed
        );
        if started && !self.bridge.is_render_thread_running() {
            info!(target: "platform", "Render loop finished; closing");
            self.teardown();
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ContractPolicy;
    use crate::config::BridgeConfig;
    use crate::core::app::TestBed;

    fn host() -> DesktopHost {
        let config = BridgeConfig {
            contract_policy: ContractPolicy::Log,
            log_fps: false,
            ..BridgeConfig::default()
        };
        let bridge = Bridge::on_create(config.clone(), Box::new(TestBed::new())).unwrap();
        DesktopHost::new(bridge, config.window)
    }

    #[test]
    fn host_creation_is_lazy() {
        let host = host();
        assert!(host.window.is_none());
        assert_eq!(host.bridge.lifecycle(), HostLifecycle::Created);
    }

    #[test]
    fn focus_cycle_follows_host_contract() {
        let mut host = host();

        host.focus_lost();
        assert_eq!(host.bridge.lifecycle(), HostLifecycle::Created);

        host.focus_gained();
        assert_eq!(host.bridge.lifecycle(), HostLifecycle::Resumed);
        host.focus_gained();
        assert_eq!(host.bridge.lifecycle(), HostLifecycle::Resumed);

        host.focus_lost();
        assert_eq!(host.bridge.lifecycle(), HostLifecycle::Paused);
        assert_eq!(host.bridge.contract_violations(), 0);

        let report = host.teardown();
        assert!(report.all_released());
        assert_eq!(host.bridge.lifecycle(), HostLifecycle::Destroyed);
        assert_eq!(host.bridge.contract_violations(), 0);
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut host = host();
        let first = host.teardown();
        let second = host.teardown();
        assert_eq!(first, second);
        assert_eq!(host.bridge.contract_violations(), 0);
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut host = host();
        host.surface_resized(PhysicalSize::new(0, 0));
        assert!(host.bridge.queue().drain_all().len() == 1);
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
