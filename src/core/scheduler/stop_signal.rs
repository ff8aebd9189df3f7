//=========================================================================
// Stop Signal
//=========================================================================
//
// One-way flag the host raises to end the render loop. Checked at frame
// boundaries only; raising it never interrupts a frame in progress.
//
//=========================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cross-thread stop request.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
