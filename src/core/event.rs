//=========================================================================
// Host Event Types
//=========================================================================
//
// The only data that crosses from the host thread into the render
// thread. Everything here is plain data: `Copy`, `Send`, no pointers
// that the core ever dereferences.
//
// Android codes handled here are the NDK `AMOTION_EVENT_ACTION_*`,
// `AKEY_EVENT_ACTION_*` and `AKEYCODE_*` values, so the C entry points
// can forward raw integers without a Java-side translation table.
//
//=========================================================================

//=== SurfaceHandle =======================================================

/// Opaque host window handle (e.g. the address of an `ANativeWindow`).
///
/// Stored as an integer so it is `Send`; only the graphics backend ever
/// turns it back into a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(usize);

impl SurfaceHandle {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub fn from_ptr<T>(ptr: *mut T) -> Self {
        Self(ptr as usize)
    }

    pub const fn raw(self) -> usize {
        self.0
    }
}

//=== LifecycleEvent ======================================================

/// Host activity lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

//=== MotionAction ========================================================

/// Pointer action of a motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionAction {
    Down,
    Up,
    Move,
    Cancel,
    /// A secondary pointer went down (multi-touch).
    PointerDown,
    /// A secondary pointer went up (multi-touch).
    PointerUp,
}

impl MotionAction {
    const ACTION_MASK: i32 = 0xff;

    /// Converts an `AMOTION_EVENT_ACTION_*` value.
    ///
    /// The pointer index bits are masked off. Hover, scroll and button
    /// actions have no counterpart and yield `None`.
    pub fn from_android(action: i32) -> Option<Self> {
        match action & Self::ACTION_MASK {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            2 => Some(Self::Move),
            3 => Some(Self::Cancel),
            5 => Some(Self::PointerDown),
            6 => Some(Self::PointerUp),
            _ => None,
        }
    }

    /// `true` for actions that start a pointer contact.
    pub fn is_press(self) -> bool {
        matches!(self, Self::Down | Self::PointerDown)
    }

    /// `true` for actions that end a pointer contact.
    pub fn is_release(self) -> bool {
        matches!(self, Self::Up | Self::PointerUp | Self::Cancel)
    }
}

//=== KeyAction ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
}

impl KeyAction {
    /// Converts an `AKEY_EVENT_ACTION_*` value (`ACTION_MULTIPLE` is ignored).
    pub fn from_android(action: i32) -> Option<Self> {
        match action {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            _ => None,
        }
    }
}

//=== KeyCode =============================================================

/// Portable key identifiers.
///
/// Covers what the test-bed and typical game input need; anything else
/// is carried through as `Other` with the platform's raw code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    //--- Alphabetic keys --------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Numeric keys -----------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Function keys ----------------------------------------------------
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Navigation -------------------------------------------------------
    ArrowDown, ArrowLeft, ArrowRight, ArrowUp,

    //--- Editing and control ----------------------------------------------
    Escape, Back, Enter, Space, Tab, Backspace, Delete,
    Shift, Control, Alt,

    //--- Fallback ---------------------------------------------------------
    Other(u32),
}

impl KeyCode {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
        KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
        KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
        KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
        KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
        KeyCode::KeyZ,
    ];

    const DIGITS: [KeyCode; 10] = [
        KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
        KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
    ];

    const FUNCTION: [KeyCode; 12] = [
        KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
        KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    ];

    /// Converts an `AKEYCODE_*` value.
    pub fn from_android(code: u32) -> Self {
        match code {
            4 => Self::Back,
            7..=16 => Self::DIGITS[(code - 7) as usize],
            19 => Self::ArrowUp,
            20 => Self::ArrowDown,
            21 => Self::ArrowLeft,
            22 => Self::ArrowRight,
            29..=54 => Self::LETTERS[(code - 29) as usize],
            57 | 58 => Self::Alt,
            59 | 60 => Self::Shift,
            61 => Self::Tab,
            62 => Self::Space,
            66 => Self::Enter,
            67 => Self::Backspace,
            111 => Self::Escape,
            112 => Self::Delete,
            113 | 114 => Self::Control,
            131..=142 => Self::FUNCTION[(code - 131) as usize],
            other => Self::Other(other),
        }
    }

    /// Keys that ask the test-bed to quit.
    pub fn is_exit(self) -> bool {
        matches!(self, Self::Escape | Self::Back)
    }
}

//=== Event ===============================================================

/// A pointer sample in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub pointer_id: i32,
    pub x: f32,
    pub y: f32,
    pub action: MotionAction,
    /// Host monotonic timestamp of the sample.
    pub timestamp_nanos: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub action: KeyAction,
}

/// Everything the host can tell the native side.
///
/// FIFO order is significant: gesture state is rebuilt by replaying
/// motion events exactly in the order the host produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Lifecycle(LifecycleEvent),
    SurfaceChanged {
        width: u32,
        height: u32,
        handle: SurfaceHandle,
    },
    InputMotion(MotionEvent),
    InputKey(KeyEvent),
}

impl Event {
    /// Lifecycle and surface events must reach the render thread even
    /// under input flooding; input may be dropped by the overflow policy.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Lifecycle(_) | Self::SurfaceChanged { .. })
    }

    pub fn is_input(&self) -> bool {
        !self.is_critical()
    }
}

impl From<MotionEvent> for Event {
    fn from(event: MotionEvent) -> Self {
        Self::InputMotion(event)
    }
}

impl From<KeyEvent> for Event {
    fn from(event: KeyEvent) -> Self {
        Self::InputKey(event)
    }
}

impl From<LifecycleEvent> for Event {
    fn from(event: LifecycleEvent) -> Self {
        Self::Lifecycle(event)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
