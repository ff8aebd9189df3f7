//=========================================================================
// Input Tracker
//=========================================================================
//
// Rebuilds key and pointer state from a frame's ordered host events.
//
// Architecture:
//   &[Event] → process() → HashSet/HashMap (held keys, live pointers) → query
//
// Frame lifecycle: begin_frame() → process() → query
//
// Motion events must be replayed in host order: a Down/Move/Up triple
// processed out of order leaves a pointer stuck down.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};

//=== Internal Dependencies ===============================================

use crate::core::event::{Event, KeyAction, KeyCode, LifecycleEvent, MotionAction, MotionEvent};

//=== Pointer =============================================================

/// Last known sample of an active pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub timestamp_nanos: i64,
}

//=== InputTracker ========================================================

/// Persistent input state plus per-frame deltas.
#[derive(Debug, Default)]
pub struct InputTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    keys_down: HashSet<KeyCode>,
    pointers: HashMap<i32, Pointer>,

    //--- Frame Deltas (reset by begin_frame) -----------------------------
    keys_pressed_this_frame: HashSet<KeyCode>,
    keys_released_this_frame: HashSet<KeyCode>,
    pointers_pressed_this_frame: HashSet<i32>,
    pointers_released_this_frame: HashSet<i32>,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears per-frame deltas.
    pub fn begin_frame(&mut self) {
        self.keys_pressed_this_frame.clear();
        self.keys_released_this_frame.clear();
        self.pointers_pressed_this_frame.clear();
        self.pointers_released_this_frame.clear();
    }

    /// Applies a frame's events in order.
    ///
    /// `Paused` and `Stopped` release everything held: the host stops
    /// delivering release events once the activity loses focus.
    pub fn process(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::InputMotion(motion) => self.process_motion(motion),
                Event::InputKey(key) => self.process_key(key.code, key.action),
                Event::Lifecycle(LifecycleEvent::Paused | LifecycleEvent::Stopped) => {
                    self.release_held();
                }
                Event::Lifecycle(_) | Event::SurfaceChanged { .. } => {}
            }
        }
    }

    /// Forgets held keys, pointers and this frame's deltas.
    pub fn reset(&mut self) {
        self.keys_down.clear();
        self.pointers.clear();
        self.begin_frame();
    }

    //--- Internal Helpers -------------------------------------------------

    /// Ends every held key and pointer, reported as released this frame.
    fn release_held(&mut self) {
        self.keys_released_this_frame.extend(self.keys_down.drain());
        self.pointers_released_this_frame
            .extend(self.pointers.drain().map(|(id, _)| id));
    }

    fn process_key(&mut self, code: KeyCode, action: KeyAction) {
        match action {
            KeyAction::Down => {
                // Auto-repeat arrives as repeated Downs; only the first counts.
                if self.keys_down.insert(code) {
                    self.keys_pressed_this_frame.insert(code);
                }
            }
            KeyAction::Up => {
                if self.keys_down.remove(&code) {
                    self.keys_released_this_frame.insert(code);
                }
            }
        }
    }

    fn process_motion(&mut self, motion: &MotionEvent) {
        let sample = Pointer {
            x: motion.x,
            y: motion.y,
            timestamp_nanos: motion.timestamp_nanos,
        };

        match motion.action {
            MotionAction::Down | MotionAction::PointerDown => {
                if self.pointers.insert(motion.pointer_id, sample).is_none() {
                    self.pointers_pressed_this_frame.insert(motion.pointer_id);
                }
            }
            MotionAction::Move => {
                if let Some(pointer) = self.pointers.get_mut(&motion.pointer_id) {
                    *pointer = sample;
                }
            }
            MotionAction::Up | MotionAction::PointerUp => {
                if self.pointers.remove(&motion.pointer_id).is_some() {
                    self.pointers_released_this_frame.insert(motion.pointer_id);
                }
            }
            MotionAction::Cancel => {
                // The gesture was taken over by the system: every pointer ends.
                let ids: Vec<i32> = self.pointers.keys().copied().collect();
                self.pointers_released_this_frame.extend(ids);
                self.pointers.clear();
            }
        }
    }

    //=====================================================================
    // Query API - Keys
    //=====================================================================

    /// `true` only in the frame the key went down.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed_this_frame.contains(&key)
    }

    /// `true` while the key is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// `true` only in the frame the key went up.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released_this_frame.contains(&key)
    }

    //=====================================================================
    // Query API - Pointers
    //=====================================================================

    pub fn pointer(&self, id: i32) -> Option<Pointer> {
        self.pointers.get(&id).copied()
    }

    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Like [`is_key_pressed`](Self::is_key_pressed) but for pointers.
    pub fn is_pointer_pressed(&self, id: i32) -> bool {
        self.pointers_pressed_this_frame.contains(&id)
    }

    /// Like [`is_key_released`](Self::is_key_released) but for pointers.
    pub fn is_pointer_released(&self, id: i32) -> bool {
        self.pointers_released_this_frame.contains(&id)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
