//=========================================================================
// TestBed
//=========================================================================
//
// Bundled application core used to exercise the bridge end to end.
//
// Each frame it animates the clear color from elapsed time, draws a
// single triangle and follows pointers and keys. Escape (desktop) or
// Back (device) asks the loop to stop.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, info};

//=== Internal Dependencies ===============================================

use super::ApplicationCore;
use crate::core::event::{Event, KeyAction, KeyCode};
use crate::core::input::InputTracker;
use crate::core::scheduler::FrameContext;
use crate::core::surface::graphics::GraphicsContext;

//=== TestBed =============================================================

#[derive(Debug)]
pub struct TestBed {
    input: InputTracker,
    clear_color: [f32; 4],
    running: bool,
    updates: u64,
    renders: u64,
}

impl TestBed {
    pub fn new() -> Self {
        Self {
            input: InputTracker::new(),
            clear_color: Self::color_at(0.0),
            running: true,
            updates: 0,
            renders: 0,
        }
    }

    /// Clear color for a given elapsed time in seconds.
    pub fn color_at(t: f32) -> [f32; 4] {
        [t.sin() * 0.5 + 0.5, t.cos() * 0.5 + 0.5, 0.33, 1.0]
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn input(&self) -> &InputTracker {
        &self.input
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn log_input(events: &[Event]) {
        for event in events {
            match event {
                Event::InputMotion(m) if m.action.is_press() => {
                    debug!(
                        target: "testbed",
                        "Pointer {} down at ({:.1}, {:.1})",
                        m.pointer_id,
                        m.x,
                        m.y
                    );
                }
                Event::InputKey(k) if k.action == KeyAction::Down => {
                    debug!(target: "testbed", "Key {:?} pressed", k.code);
                }
                _ => {}
            }
        }
    }
}

impl Default for TestBed {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationCore for TestBed {
    fn initialize(&mut self) {
        info!(target: "testbed", "TestBed initialized");
    }

    fn update(&mut self, frame: &FrameContext<'_>) {
        self.input.begin_frame();
        self.input.process(frame.events);
        Self::log_input(frame.events);

        if self.input.is_key_pressed(KeyCode::Escape) || self.input.is_key_pressed(KeyCode::Back) {
            info!(target: "testbed", "Exit key pressed, stopping");
            self.running = false;
        }

        self.clear_color = Self::color_at(frame.elapsed_secs());
        self.updates += 1;
    }

    fn render(&mut self, gfx: &mut dyn GraphicsContext) {
        gfx.clear(self.clear_color);
        gfx.draw(3, 1);
        self.renders += 1;
    }

    fn shutdown(&mut self) {
        info!(
            target: "testbed",
            "TestBed shut down after {} updates, {} renders",
            self.updates,
            self.renders
        );
        self.input.reset();
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
