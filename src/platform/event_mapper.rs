//=========================================================================
// Platform Event Mapper
//
// Converts Winit keyboard codes and element states to the portable host
// event types the bridge accepts.
//
// Responsibilities:
// - Translate physical key codes to `KeyCode`
// - Translate pressed/released to `KeyAction`
// - Filter keys with no portable counterpart (`None`)
//
//=========================================================================

use winit::event::ElementState;
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::core::event::{KeyAction, KeyCode};

//=== Key Conversion ======================================================
//
// Left and right modifier keys collapse to one code each. Browser-back
// stands in for the Android back button.
//

pub(crate) fn map_key_code(code: WinitKeyCode) -> Option<KeyCode> {
    use WinitKeyCode::*;
    let key = match code {
        //--- Numeric keys -----------------------------------------------------
        Digit0 => KeyCode::Digit0, Digit1 => KeyCode::Digit1,
        Digit2 => KeyCode::Digit2, Digit3 => KeyCode::Digit3,
        Digit4 => KeyCode::Digit4, Digit5 => KeyCode::Digit5,
        Digit6 => KeyCode::Digit6, Digit7 => KeyCode::Digit7,
        Digit8 => KeyCode::Digit8, Digit9 => KeyCode::Digit9,

        //--- Alphabetic keys --------------------------------------------------
        KeyA => KeyCode::KeyA, KeyB => KeyCode::KeyB, KeyC => KeyCode::KeyC,
        KeyD => KeyCode::KeyD, KeyE => KeyCode::KeyE, KeyF => KeyCode::KeyF,
        KeyG => KeyCode::KeyG, KeyH => KeyCode::KeyH, KeyI => KeyCode::KeyI,
        KeyJ => KeyCode::KeyJ, KeyK => KeyCode::KeyK, KeyL => KeyCode::KeyL,
        KeyM => KeyCode::KeyM, KeyN => KeyCode::KeyN, KeyO => KeyCode::KeyO,
        KeyP => KeyCode::KeyP, KeyQ => KeyCode::KeyQ, KeyR => KeyCode::KeyR,
        KeyS => KeyCode::KeyS, KeyT => KeyCode::KeyT, KeyU => KeyCode::KeyU,
        KeyV => KeyCode::KeyV, KeyW => KeyCode::KeyW, KeyX => KeyCode::KeyX,
        KeyY => KeyCode::KeyY, KeyZ => KeyCode::KeyZ,

        //--- Function keys ----------------------------------------------------
        F1 => KeyCode::F1, F2 => KeyCode::F2, F3 => KeyCode::F3,
        F4 => KeyCode::F4, F5 => KeyCode::F5, F6 => KeyCode::F6,
        F7 => KeyCode::F7, F8 => KeyCode::F8, F9 => KeyCode::F9,
        F10 => KeyCode::F10, F11 => KeyCode::F11, F12 => KeyCode::F12,

        //--- Arrow keys -------------------------------------------------------
        ArrowDown => KeyCode::ArrowDown, ArrowLeft => KeyCode::ArrowLeft,
        ArrowRight => KeyCode::ArrowRight, ArrowUp => KeyCode::ArrowUp,

        //--- Editing and control ----------------------------------------------
        Escape => KeyCode::Escape,
        BrowserBack => KeyCode::Back,
        Enter | NumpadEnter => KeyCode::Enter,
        Space => KeyCode::Space,
        Tab => KeyCode::Tab,
        Backspace => KeyCode::Backspace,
        Delete => KeyCode::Delete,
        ShiftLeft | ShiftRight => KeyCode::Shift,
        ControlLeft | ControlRight => KeyCode::Control,
        AltLeft | AltRight => KeyCode::Alt,

        //--- Fallback ---------------------------------------------------------
        _ => return None,
    };
    Some(key)
}

pub(crate) fn map_physical_key(key: PhysicalKey) -> Option<KeyCode> {
    match key {
        PhysicalKey::Code(code) => map_key_code(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

//=== State Conversion ====================================================

impl From<ElementState> for KeyAction {
    fn from(state: ElementState) -> Self {
        match state {
            ElementState::Pressed => KeyAction::Down,
            ElementState::Released => KeyAction::Up,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn maps_common_keys() {
        assert_eq!(map_key_code(WinitKeyCode::KeyW), Some(KeyCode::KeyW));
        assert_eq!(map_key_code(WinitKeyCode::Digit7), Some(KeyCode::Digit7));
        assert_eq!(map_key_code(WinitKeyCode::F12), Some(KeyCode::F12));
        assert_eq!(map_key_code(WinitKeyCode::Escape), Some(KeyCode::Escape));
    }

    #[test]
    fn collapses_left_and_right_modifiers() {
        assert_eq!(map_key_code(WinitKeyCode::ShiftLeft), Some(KeyCode::Shift));
        assert_eq!(map_key_code(WinitKeyCode::ShiftRight), Some(KeyCode::Shift));
        assert_eq!(map_key_code(WinitKeyCode::ControlRight), Some(KeyCode::Control));
    }

    #[test]
    fn browser_back_is_back() {
        assert_eq!(map_key_code(WinitKeyCode::BrowserBack), Some(KeyCode::Back));
        assert!(KeyCode::Back.is_exit());
    }

    #[test]
    fn unmapped_keys_are_filtered() {
        assert_eq!(map_key_code(WinitKeyCode::F24), None);
        assert_eq!(map_key_code(WinitKeyCode::MediaPlayPause), None);
        assert_eq!(
            map_physical_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)),
            None
        );
    }

    #[test]
    fn element_state_to_key_action() {
        assert_eq!(KeyAction::from(ElementState::Pressed), KeyAction::Down);
        assert_eq!(KeyAction::from(ElementState::Released), KeyAction::Up);
    }
}
