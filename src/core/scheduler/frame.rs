//=========================================================================
// Frame Context & Clock
//=========================================================================

use std::time::{Duration, Instant};

use crate::core::event::Event;
use crate::core::surface::graphics::Extent;

//=== FrameContext ========================================================

/// Per-frame input to [`ApplicationCore::update`](crate::core::app::ApplicationCore::update).
///
/// Borrowed from the scheduler for the duration of one update call.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Real time since the previous frame, clamped to the configured maximum.
    pub delta: Duration,
    /// Sum of all deltas since `start()`.
    pub elapsed: Duration,
    /// Zero for the first frame after `start()`.
    pub frame_index: u64,
    /// Events drained for this frame, in host order.
    pub events: &'a [Event],
    /// Extent of the ready surface, `None` while rendering is skipped.
    pub surface: Option<Extent>,
}

impl FrameContext<'_> {
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

//=== FrameClock ==========================================================

/// Monotonic delta source with anti-spiral clamping.
#[derive(Debug)]
pub(crate) struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
    elapsed: Duration,
}

impl FrameClock {
    pub(crate) fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances to `now` and returns the clamped delta.
    ///
    /// The first tick after construction or `reset` yields zero.
    pub(crate) fn advance(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last).min(self.max_delta),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.elapsed += delta;
        delta
    }

    /// Forgets the last timestamp so a pause does not count as frame time.
    pub(crate) fn reset(&mut self) {
        self.last = None;
    }

    /// Full restart: also clears elapsed time.
    pub(crate) fn restart(&mut self) {
        self.last = None;
        self.elapsed = Duration::ZERO;
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
