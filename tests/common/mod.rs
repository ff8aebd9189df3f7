//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hearth_bridge::core::event::{Event, MotionAction, MotionEvent};
use hearth_bridge::core::scheduler::FrameContext;
use hearth_bridge::core::surface::graphics::GraphicsContext;
use hearth_bridge::{ApplicationCore, BridgeConfig, ContractPolicy};

// ── Recording core ────────────────────────────────────────────────────

/// What a [`RecordingCore`] observed, readable from the test thread.
#[derive(Debug, Default)]
pub struct Record {
    pub initialized: u32,
    pub updates: Vec<Vec<Event>>,
    pub deltas: Vec<Duration>,
    pub renders: u32,
    pub shutdowns: u32,
}

impl Record {
    /// Every input event delivered so far, in delivery order.
    pub fn inputs(&self) -> Vec<Event> {
        self.updates
            .iter()
            .flatten()
            .copied()
            .filter(Event::is_input)
            .collect()
    }
}

pub struct RecordingCore {
    pub record: Arc<Mutex<Record>>,
    pub running: Arc<AtomicBool>,
}

impl RecordingCore {
    pub fn new() -> (Self, Arc<Mutex<Record>>, Arc<AtomicBool>) {
        let record = Arc::new(Mutex::new(Record::default()));
        let running = Arc::new(AtomicBool::new(true));
        let core = Self {
            record: Arc::clone(&record),
            running: Arc::clone(&running),
        };
        (core, record, running)
    }
}

impl ApplicationCore for RecordingCore {
    fn initialize(&mut self) {
        self.record.lock().unwrap().initialized += 1;
    }

    fn update(&mut self, frame: &FrameContext<'_>) {
        let mut record = self.record.lock().unwrap();
        record.updates.push(frame.events.to_vec());
        record.deltas.push(frame.delta);
    }

    fn render(&mut self, gfx: &mut dyn GraphicsContext) {
        gfx.clear([0.0, 0.0, 0.0, 1.0]);
        gfx.draw(3, 1);
        self.record.lock().unwrap().renders += 1;
    }

    fn shutdown(&mut self) {
        self.record.lock().unwrap().shutdowns += 1;
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// ── Builders ──────────────────────────────────────────────────────────

pub fn config() -> BridgeConfig {
    BridgeConfig {
        contract_policy: ContractPolicy::Log,
        log_fps: false,
        ..BridgeConfig::default()
    }
}

pub fn touch(x: f32, action: MotionAction, timestamp_nanos: i64) -> MotionEvent {
    MotionEvent {
        pointer_id: 0,
        x,
        y: 100.0,
        action,
        timestamp_nanos,
    }
}

/// Polls `condition` for up to two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
