//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit keyboard and mouse events into host input events.
//
// Architecture:
//   Winit Events → InputProcessor → MotionEvent / KeyEvent → Bridge
//
// The mouse plays the part of a single touch pointer (id 0): pressing
// the left button is Down, releasing it is Up, and cursor movement is
// Move only while the button is held. Hover movement only updates the
// cached cursor position, as a touch screen has no hover.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Instant;

use winit::event::{ElementState, MouseButton};
use winit::keyboard::PhysicalKey;

//=== Internal Dependencies ===============================================

use super::event_mapper::map_physical_key;
use crate::core::event::{KeyEvent, MotionAction, MotionEvent};

//=== InputProcessor ======================================================

pub(crate) struct InputProcessor {
    epoch: Instant,
    cursor: (f32, f32),
    pressed: bool,
}

impl InputProcessor {
    pub(crate) const POINTER_ID: i32 = 0;

    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            epoch: Instant::now(),
            cursor: (0.0, 0.0),
            pressed: false,
        }
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a physical key transition (filters unmapped keys).
    pub(crate) fn process_key(&self, key: PhysicalKey, state: ElementState) -> Option<KeyEvent> {
        map_physical_key(key).map(|code| KeyEvent {
            code,
            action: state.into(),
        })
    }

    /// Only the left button acts as the touch pointer.
    pub(crate) fn process_mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
    ) -> Option<MotionEvent> {
        if button != MouseButton::Left {
            return None;
        }

        let action = match (state, self.pressed) {
            (ElementState::Pressed, false) => MotionAction::Down,
            (ElementState::Released, true) => MotionAction::Up,
            _ => return None,
        };
        self.pressed = state == ElementState::Pressed;
        Some(self.motion(action))
    }

    pub(crate) fn process_cursor_moved(&mut self, x: f32, y: f32) -> Option<MotionEvent> {
        self.cursor = (x, y);
        self.pressed.then(|| self.motion(MotionAction::Move))
    }

    /// The cursor left the window or focus was lost mid-drag.
    pub(crate) fn cancel(&mut self) -> Option<MotionEvent> {
        if !self.pressed {
            return None;
        }
        self.pressed = false;
        Some(self.motion(MotionAction::Cancel))
    }

    //--- Internal Helpers -------------------------------------------------

    fn motion(&self, action: MotionAction) -> MotionEvent {
        MotionEvent {
            pointer_id: Self::POINTER_ID,
            x: self.cursor.0,
            y: self.cursor.1,
            action,
            timestamp_nanos: self.epoch.elapsed().as_nanos() as i64,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{KeyAction, KeyCode};
    use winit::keyboard::KeyCode as WinitKeyCode;

    fn actions(events: &[Option<MotionEvent>]) -> Vec<Option<MotionAction>> {
        events.iter().map(|e| e.map(|m| m.action)).collect()
    }

    #[test]
    fn hover_does_not_produce_motion() {
        let mut processor = InputProcessor::new();
        assert!(processor.process_cursor_moved(10.0, 10.0).is_none());
    }

    #[test]
    fn drag_is_down_move_up() {
        let mut processor = InputProcessor::new();
        let events = [
            processor.process_cursor_moved(1.0, 2.0),
            processor.process_mouse_button(MouseButton::Left, ElementState::Pressed),
            processor.process_cursor_moved(3.0, 4.0),
            processor.process_mouse_button(MouseButton::Left, ElementState::Released),
        ];

        assert_eq!(
            actions(&events),
            vec![
                None,
                Some(MotionAction::Down),
                Some(MotionAction::Move),
                Some(MotionAction::Up)
            ]
        );
        let down = events[1].unwrap();
        assert_eq!((down.pointer_id, down.x, down.y), (0, 1.0, 2.0));
        let up = events[3].unwrap();
        assert_eq!((up.x, up.y), (3.0, 4.0));
        assert!(up.timestamp_nanos >= down.timestamp_nanos);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut processor = InputProcessor::new();
        assert!(processor
            .process_mouse_button(MouseButton::Right, ElementState::Pressed)
            .is_none());
    }

    #[test]
    fn unmatched_release_is_ignored() {
        let mut processor = InputProcessor::new();
        assert!(processor
            .process_mouse_button(MouseButton::Left, ElementState::Released)
            .is_none());
    }

    #[test]
    fn cancel_only_while_pressed() {
        let mut processor = InputProcessor::new();
        assert!(processor.cancel().is_none());

        processor.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert_eq!(processor.cancel().map(|m| m.action), Some(MotionAction::Cancel));
        assert!(processor.process_cursor_moved(5.0, 5.0).is_none());
    }

    #[test]
    fn keys_are_converted() {
        let processor = InputProcessor::new();
        let event = processor
            .process_key(PhysicalKey::Code(WinitKeyCode::Space), ElementState::Pressed)
            .unwrap();
        assert_eq!(event.code, KeyCode::Space);
        assert_eq!(event.action, KeyAction::Down);

        assert!(processor
            .process_key(PhysicalKey::Code(WinitKeyCode::F24), ElementState::Pressed)
            .is_none());
    }
}
