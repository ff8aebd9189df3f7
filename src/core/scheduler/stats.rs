//=========================================================================
// Frame Statistics
//=========================================================================
//
// Counters kept by the frame scheduler plus a periodic FPS line in the
// log. Cheap enough to update every frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::info;

//=== FrameStats ==========================================================

/// Cumulative scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames that ran `update`.
    pub frames: u64,
    /// Frames that also rendered and presented.
    pub renders: u64,
    /// Frames whose render was skipped for lack of a ready surface.
    pub skipped_renders: u64,
    /// Renders that failed to acquire a context or present.
    pub render_failures: u64,
    /// Events handed to the application core.
    pub events_delivered: u64,
    /// Events consumed without reaching the core (stop, paused overflow).
    pub events_discarded: u64,
    /// Ticks spent paused.
    pub paused_ticks: u64,
}

//=== FpsLogger ===========================================================

/// Logs frame rate and counters once per period.
#[derive(Debug)]
pub(crate) struct FpsLogger {
    enabled: bool,
    period: Duration,
    window_start: Option<Instant>,
    frames_in_window: u32,
}

impl FpsLogger {
    const MIN_PERIOD_SEC: f32 = 0.25;
    const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    pub(crate) fn new(enabled: bool, period_sec: f32) -> Self {
        Self {
            enabled,
            period: Duration::try_from_secs_f32(period_sec.max(Self::MIN_PERIOD_SEC))
                .unwrap_or(Self::DEFAULT_PERIOD),
            window_start: None,
            frames_in_window: 0,
        }
    }

    /// Counts one frame ending at `now`; returns the FPS when a line was logged.
    pub(crate) fn frame(&mut self, now: Instant, stats: &FrameStats) -> Option<f32> {
        if !self.enabled {
            return None;
        }

        let start = *self.window_start.get_or_insert(now);
        self.frames_in_window += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < self.period {
            return None;
        }

        let fps = self.frames_in_window as f32 / elapsed.as_secs_f32().max(0.0001);
        info!(
            target: "scheduler::stats",
            "fps={:.1} frames={} renders={} skipped={} failures={} events={} discarded={}",
            fps,
            stats.frames,
            stats.renders,
            stats.skipped_renders,
            stats.render_failures,
            stats.events_delivered,
            stats.events_discarded
        );

        self.window_start = Some(now);
        self.frames_in_window = 0;
        Some(fps)
    }

    /// Drops the current window (paused time must not lower the FPS).
    pub(crate) fn reset(&mut self) {
        self.window_start = None;
        self.frames_in_window = 0;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
