//=========================================================================
// Frame Pacing
//=========================================================================
//
// Decides how long the render thread sleeps between frames.
//
// - Vsync: `present()` blocks on the display, so no extra sleep. Without
//   a vsync-capable context the pacer falls back to a fixed 60 Hz.
// - Fixed: deadlines advance by one interval per frame. When a frame
//   overruns, the deadline is rebased to "now" instead of accumulating
//   debt, so an overrun costs one late frame and never a burst.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

//=== FramePacing =========================================================

/// Frame cadence source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FramePacing {
    /// Let the graphics context's present block on vsync.
    Vsync,
    /// Fixed-interval frames.
    Fixed { fps: f64 },
}

impl FramePacing {
    const FALLBACK_FPS: f64 = 60.0;

    /// Interval used when frames are not paced by present().
    pub fn interval(self) -> Duration {
        let fps = match self {
            Self::Vsync => Self::FALLBACK_FPS,
            Self::Fixed { fps } => fps,
        };
        assert!(fps > 0.0, "Frame rate must be positive, got {}", fps);
        Duration::from_secs_f64(1.0 / fps)
    }
}

impl Default for FramePacing {
    fn default() -> Self {
        Self::Fixed { fps: Self::FALLBACK_FPS }
    }
}

//=== Pacer ===============================================================

/// Deadline tracker for the render loop.
#[derive(Debug)]
pub(crate) struct Pacer {
    pacing: FramePacing,
    interval: Duration,
    deadline: Option<Instant>,
}

impl Pacer {
    pub(crate) fn new(pacing: FramePacing) -> Self {
        Self {
            pacing,
            interval: pacing.interval(),
            deadline: None,
        }
    }

    /// Forgets the current deadline (after a pause or a restart).
    pub(crate) fn reset(&mut self) {
        self.deadline = None;
    }

    /// Time to sleep after a frame that finished at `now`.
    ///
    /// `presented_with_vsync` is `true` when the frame's present already
    /// waited for the display.
    pub(crate) fn wait_after_frame(&mut self, now: Instant, presented_with_vsync: bool) -> Duration {
        if self.pacing == FramePacing::Vsync && presented_with_vsync {
            self.deadline = None;
            return Duration::ZERO;
        }

        let next = match self.deadline {
            Some(previous) => previous + self.interval,
            None => now + self.interval,
        };

        // Overran: rebase, do not try to catch up.
        let next = next.max(now);
        self.deadline = Some(next);
        next - now
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fixed_interval_from_fps() {
        let interval = FramePacing::Fixed { fps: 50.0 }.interval();
        assert_eq!(interval, Duration::from_millis(20));
    }

    #[test]
    fn vsync_falls_back_to_sixty() {
        let interval = FramePacing::Vsync.interval();
        assert!(interval > 16 * MS && interval < 17 * MS);
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn zero_fps_panics() {
        FramePacing::Fixed { fps: 0.0 }.interval();
    }

    #[test]
    fn steady_frames_sleep_remaining_time() {
        let mut pacer = Pacer::new(FramePacing::Fixed { fps: 50.0 });
        let t0 = Instant::now();

        assert_eq!(pacer.wait_after_frame(t0, false), 20 * MS);
        // Next frame took 5ms of work after waking at the deadline.
        assert_eq!(pacer.wait_after_frame(t0 + 25 * MS, false), 15 * MS);
    }

    #[test]
    fn overrun_rebases_without_burst() {
        let mut pacer = Pacer::new(FramePacing::Fixed { fps: 50.0 });
        let t0 = Instant::now();
        pacer.wait_after_frame(t0, false);

        // A 100ms hitch: deadline was t0+20ms, now is t0+120ms.
        assert_eq!(pacer.wait_after_frame(t0 + 120 * MS, false), Duration::ZERO);
        // The following frame waits a full interval again instead of
        // firing the four frames it "missed".
        assert_eq!(pacer.wait_after_frame(t0 + 121 * MS, false), 19 * MS);
    }

    #[test]
    fn vsync_presents_do_not_sleep() {
        let mut pacer = Pacer::new(FramePacing::Vsync);
        assert_eq!(pacer.wait_after_frame(Instant::now(), true), Duration::ZERO);
    }

    #[test]
    fn vsync_without_capable_context_uses_fallback() {
        let mut pacer = Pacer::new(FramePacing::Vsync);
        assert!(pacer.wait_after_frame(Instant::now(), false) > Duration::ZERO);
    }

    #[test]
    fn reset_starts_fresh_interval() {
        let mut pacer = Pacer::new(FramePacing::Fixed { fps: 50.0 });
        let t0 = Instant::now();
        pacer.wait_after_frame(t0, false);
        pacer.reset();
        assert_eq!(pacer.wait_after_frame(t0 + 500 * MS, false), 20 * MS);
    }
}
