//=========================================================================
// Frame Scheduler
//=========================================================================
//
// Drives the update/render loop on the render thread.
//
// State machine:
// ```text
//            start()            pause()
//   Stopped ────────► Running ─────────► Paused
//      ▲                │   ▲   resume()   │
//      │     stop()     │   └──────────────┘
//      └────────────────┴──────────────────┘
//                          stop()
// ```
//
// Frame pipeline (`tick_at`):
//   1. Drain the event queue (one critical section).
//   2. Apply lifecycle events in order: Paused/Stopped pause,
//      Resumed/Started resume, Destroyed requests a stop.
//   3. Paused: stash the batch for the first resumed frame and return.
//   4. Build the FrameContext and call `update`.
//   5. Render and present, only if the surface is Ready.
//   6. Honour a pending stop request once the frame is complete.
//
// Everything in here is confined to the render thread. The only shared
// state it touches is the event queue and the surface manager.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod frame;
pub mod pacing;
pub mod stats;
pub mod stop_signal;

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::config::BridgeConfig;
use crate::core::app::ApplicationCore;
use crate::core::event::{Event, LifecycleEvent};
use crate::core::event_queue::EventQueue;
use crate::core::surface::SurfaceManager;
use crate::error::SchedulerError;

use frame::FrameClock;
use pacing::Pacer;
use stats::FpsLogger;

pub use frame::FrameContext;
pub use pacing::FramePacing;
pub use stats::FrameStats;
pub use stop_signal::StopSignal;

//=== SchedulerState ======================================================

/// Frame issuance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    Stopped,
    Running,
    Paused,
}

//=== FrameOutcome ========================================================

/// What a single `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Updated, rendered and presented.
    Rendered,
    /// Updated; render skipped or failed.
    Updated,
    /// Paused: events stashed, no update.
    Paused,
    /// The scheduler is stopped (possibly by this tick, after its frame).
    Stopped,
}

//=== ShutdownReport ======================================================

/// Result of `stop()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Events drained or stashed but never delivered.
    pub discarded_events: u64,
    /// An application core was shut down and dropped.
    pub core_released: bool,
    /// A live graphics context was released.
    pub context_released: bool,
    /// A graphics context was still alive after the stop.
    pub context_live: bool,
}

impl ShutdownReport {
    pub fn all_released(&self) -> bool {
        !self.context_live
    }
}

//=== FrameScheduler ======================================================

pub struct FrameScheduler {
    state: SchedulerState,

    //--- Shared With Host -------------------------------------------------
    queue: Arc<EventQueue>,
    surface: Arc<SurfaceManager>,

    //--- Application ------------------------------------------------------
    core: Option<Box<dyn ApplicationCore>>,
    core_initialized: bool,

    //--- Timing -----------------------------------------------------------
    clock: FrameClock,
    pacer: Pacer,
    frame_index: u64,
    idle_wait: Duration,

    //--- Per-Frame Buffers ------------------------------------------------
    batch: Vec<Event>,
    stash: VecDeque<Event>,
    stash_overflow_logged: bool,

    //--- Bookkeeping ------------------------------------------------------
    stop_requested: bool,
    render_skip_logged: bool,
    stats: FrameStats,
    fps: FpsLogger,
    last_report: Option<ShutdownReport>,
}

impl FrameScheduler {
    //--- Construction -----------------------------------------------------

    pub fn new(
        queue: Arc<EventQueue>,
        surface: Arc<SurfaceManager>,
        core: Box<dyn ApplicationCore>,
        config: &BridgeConfig,
    ) -> Self {
        let batch_capacity = queue.capacity();
        Self {
            state: SchedulerState::Stopped,
            queue,
            surface,
            core: Some(core),
            core_initialized: false,
            clock: FrameClock::new(config.max_delta()),
            pacer: Pacer::new(config.pacing),
            frame_index: 0,
            idle_wait: config.idle_wait(),
            batch: Vec::with_capacity(batch_capacity),
            stash: VecDeque::new(),
            stash_overflow_logged: false,
            stop_requested: false,
            render_skip_logged: false,
            stats: FrameStats::default(),
            fps: FpsLogger::new(config.log_fps, config.fps_log_period_sec),
            last_report: None,
        }
    }

    /// Replaces the application core. Only allowed while stopped.
    pub fn install_core(&mut self, core: Box<dyn ApplicationCore>) -> Result<(), SchedulerError> {
        if self.state != SchedulerState::Stopped {
            return Err(SchedulerError::CoreInUse(self.state));
        }
        self.core = Some(core);
        self.core_initialized = false;
        Ok(())
    }

    //=====================================================================
    // State Transitions
    //=====================================================================

    /// Stopped → Running. `Ok(false)` when already running.
    pub fn start(&mut self) -> Result<bool, SchedulerError> {
        match self.state {
            SchedulerState::Running => Ok(false),
            SchedulerState::Paused => Err(Self::invalid(SchedulerState::Paused, SchedulerState::Running)),
            SchedulerState::Stopped => {
                if self.core.is_none() {
                    return Err(SchedulerError::NoCore);
                }
                self.clock.restart();
                self.pacer.reset();
                self.fps.reset();
                self.frame_index = 0;
                self.stop_requested = false;
                self.render_skip_logged = false;
                self.last_report = None;
                self.set_state(SchedulerState::Running);
                Ok(true)
            }
        }
    }

    /// Running → Paused. The core is kept; frames stop being issued.
    pub fn pause(&mut self) -> Result<bool, SchedulerError> {
        match self.state {
            SchedulerState::Paused => Ok(false),
            SchedulerState::Stopped => Err(Self::invalid(SchedulerState::Stopped, SchedulerState::Paused)),
            SchedulerState::Running => {
                self.stash_overflow_logged = false;
                self.set_state(SchedulerState::Paused);
                Ok(true)
            }
        }
    }

    /// Paused → Running. The frame clock restarts so the paused time is
    /// not reported as delta-time.
    pub fn resume(&mut self) -> Result<bool, SchedulerError> {
        match self.state {
            SchedulerState::Running => Ok(false),
            SchedulerState::Stopped => Err(Self::invalid(SchedulerState::Stopped, SchedulerState::Running)),
            SchedulerState::Paused => {
                self.clock.reset();
                self.pacer.reset();
                self.fps.reset();
                self.set_state(SchedulerState::Running);
                Ok(true)
            }
        }
    }

    /// Running/Paused → Stopped.
    ///
    /// Discards pending events, shuts down and drops the core, and releases
    /// the graphics context. A scheduler that never started still releases
    /// its core. Calling it again returns the same report.
    pub fn stop(&mut self) -> ShutdownReport {
        if self.state == SchedulerState::Stopped && self.core.is_none() {
            return self.last_report.unwrap_or(ShutdownReport {
                context_live: self.surface.has_context(),
                ..ShutdownReport::default()
            });
        }

        //--- Final Drain --------------------------------------------------
        self.batch.clear();
        self.queue.drain_into(&mut self.batch);
        let discarded = (self.batch.len() + self.stash.len()) as u64;
        self.batch.clear();
        self.stash.clear();
        self.stats.events_discarded += discarded;

        //--- Release Resources --------------------------------------------
        let core_released = match self.core.take() {
            Some(mut core) => {
                core.shutdown();
                true
            }
            None => false,
        };
        self.core_initialized = false;
        let context_released = self.surface.release();

        self.stop_requested = false;
        if self.state != SchedulerState::Stopped {
            self.set_state(SchedulerState::Stopped);
        }

        let report = ShutdownReport {
            discarded_events: discarded,
            core_released,
            context_released,
            context_live: self.surface.has_context(),
        };
        info!(
            target: "scheduler",
            "Stopped after {} frames ({} renders); discarded {} events",
            self.stats.frames,
            self.stats.renders,
            discarded
        );
        self.last_report = Some(report);
        report
    }

    /// Stops after the current (or next) frame completes.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    //=====================================================================
    // Frame Execution
    //=====================================================================

    pub fn tick(&mut self) -> FrameOutcome {
        self.tick_at(Instant::now())
    }

    /// Runs one frame as if the clock read `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameOutcome {
        if self.state == SchedulerState::Stopped {
            return FrameOutcome::Stopped;
        }

        //--- Step 1: Drain host events ------------------------------------
        let mut batch = std::mem::take(&mut self.batch);
        batch.clear();
        self.queue.drain_into(&mut batch);

        //--- Step 2: Lifecycle effects ------------------------------------
        self.apply_lifecycle(&batch);

        //--- Step 3: Paused frames only collect events --------------------
        if self.state == SchedulerState::Paused {
            self.stash_events(&mut batch);
            self.batch = batch;
            self.stats.paused_ticks += 1;

            if self.stop_requested {
                self.stop();
                return FrameOutcome::Stopped;
            }
            return FrameOutcome::Paused;
        }

        if !self.stash.is_empty() {
            debug!(
                target: "scheduler",
                "Delivering {} stashed events with {} new",
                self.stash.len(),
                batch.len()
            );
            // Stashed events go first.
            self.stash.extend(batch.drain(..));
            batch.extend(self.stash.drain(..));
        }

        let outcome = self.run_frame(now, &batch);

        batch.clear();
        self.batch = batch;

        if self.stop_requested {
            self.stop();
            return FrameOutcome::Stopped;
        }
        outcome
    }

    /// Render-thread loop: ticks until stopped or `signal` is raised, then
    /// stops and returns the shutdown report.
    pub fn run(&mut self, signal: &StopSignal) -> ShutdownReport {
        if self.state == SchedulerState::Stopped {
            if let Err(e) = self.start() {
                error!(target: "scheduler", "Render loop cannot start: {}", e);
                return self.stop();
            }
        }

        info!(target: "scheduler", "Render loop running");

        loop {
            if signal.is_raised() {
                info!(target: "scheduler", "Stop signal raised");
                break;
            }

            match self.tick_at(Instant::now()) {
                FrameOutcome::Stopped => break,
                FrameOutcome::Paused => {
                    self.queue.wait_for_events(self.idle_wait);
                }
                outcome @ (FrameOutcome::Rendered | FrameOutcome::Updated) => {
                    let vsync = outcome == FrameOutcome::Rendered
                        && self.surface.context_vsync().unwrap_or(false);
                    let wait = self.pacer.wait_after_frame(Instant::now(), vsync);
                    if !wait.is_zero() {
                        thread::sleep(wait);
                    }
                }
            }
        }

        let report = self.stop();
        info!(target: "scheduler", "Render loop exited");
        report
    }

    //--- Internal Helpers -------------------------------------------------

    fn run_frame(&mut self, now: Instant, events: &[Event]) -> FrameOutcome {
        let Some(core) = self.core.as_mut() else {
            error!(target: "scheduler", "Running without an application core");
            self.stop_requested = true;
            return FrameOutcome::Updated;
        };

        if !self.core_initialized {
            core.initialize();
            self.core_initialized = true;
        }

        //--- Step 4: Update -----------------------------------------------
        let delta = self.clock.advance(now);
        let frame = FrameContext {
            delta,
            elapsed: self.clock.elapsed(),
            frame_index: self.frame_index,
            events,
            surface: self.surface.state().extent(),
        };
        trace!(
            target: "scheduler",
            "Frame {} dt={:?} events={}",
            frame.frame_index,
            delta,
            events.len()
        );
        core.update(&frame);
        self.stats.frames += 1;
        self.stats.events_delivered += events.len() as u64;

        //--- Step 5: Render -----------------------------------------------
        let outcome = match self.surface.render_with(|gfx, _| core.render(gfx)) {
            Ok(Some(())) => {
                self.stats.renders += 1;
                self.render_skip_logged = false;
                FrameOutcome::Rendered
            }
            Ok(None) => {
                self.stats.skipped_renders += 1;
                if !self.render_skip_logged {
                    debug!(target: "scheduler", "No ready surface; skipping render");
                    self.render_skip_logged = true;
                }
                FrameOutcome::Updated
            }
            Err(e) => {
                self.stats.render_failures += 1;
                warn!(target: "scheduler", "Render skipped: {}", e);
                FrameOutcome::Updated
            }
        };

        //--- Step 6: Stop request from the core ---------------------------
        if !core.is_running() && !self.stop_requested {
            info!(target: "scheduler", "Application core finished; stopping");
            self.stop_requested = true;
        }

        self.frame_index += 1;
        self.fps.frame(now, &self.stats);
        outcome
    }

    fn apply_lifecycle(&mut self, events: &[Event]) {
        for event in events {
            let Event::Lifecycle(lifecycle) = *event else {
                continue;
            };

            let result = match lifecycle {
                LifecycleEvent::Created => Ok(false),
                LifecycleEvent::Started | LifecycleEvent::Resumed => self.resume(),
                LifecycleEvent::Paused | LifecycleEvent::Stopped => self.pause(),
                LifecycleEvent::Destroyed => {
                    self.stop_requested = true;
                    Ok(true)
                }
            };

            match result {
                Ok(changed) => debug!(
                    target: "scheduler",
                    "Lifecycle {:?} applied (changed: {})",
                    lifecycle,
                    changed
                ),
                Err(e) => warn!(target: "scheduler", "Lifecycle {:?} ignored: {}", lifecycle, e),
            }
        }
    }

    /// Keeps a paused frame's events for the first resumed frame. Bounded
    /// by the queue capacity; the oldest input is evicted first, and a
    /// critical event only once no input is left.
    fn stash_events(&mut self, batch: &mut Vec<Event>) {
        self.stash.extend(batch.drain(..));

        let limit = self.queue.capacity();
        if self.stash.len() <= limit {
            return;
        }

        let excess = self.stash.len() - limit;
        for _ in 0..excess {
            match self.stash.iter().position(Event::is_input) {
                Some(oldest_input) => {
                    self.stash.remove(oldest_input);
                }
                None => {
                    if let Some(evicted) = self.stash.pop_front() {
                        error!(
                            target: "scheduler",
                            "Paused event stash full of critical events, dropping {:?}",
                            evicted
                        );
                    }
                }
            }
        }
        self.stats.events_discarded += excess as u64;

        if !self.stash_overflow_logged {
            warn!(
                target: "scheduler",
                "Paused event stash full ({}); evicting oldest events",
                limit
            );
            self.stash_overflow_logged = true;
        }
    }

    fn set_state(&mut self, to: SchedulerState) {
        info!(target: "scheduler", "Scheduler {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    fn invalid(from: SchedulerState, to: SchedulerState) -> SchedulerError {
        SchedulerError::InvalidTransition { from, to }
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn has_core(&self) -> bool {
        self.core.is_some()
    }

    /// Events held back while paused.
    pub fn stashed_events(&self) -> usize {
        self.stash.len()
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn surface(&self) -> &Arc<SurfaceManager> {
        &self.surface
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state)
            .field("frame_index", &self.frame_index)
            .field("has_core", &self.core.is_some())
            .field("stashed", &self.stash.len())
            .field("stats", &self.stats)
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
