//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use hearth_bridge::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Bridge facade
pub use crate::bridge::{Bridge, BridgeBuilder, ContractPolicy, HostLifecycle};
pub use crate::config::{BridgeConfig, WindowConfig};

// Application core
pub use crate::core::app::{ApplicationCore, TestBed};
pub use crate::core::scheduler::{FrameContext, FramePacing, FrameStats, ShutdownReport};

// Events and input
pub use crate::core::event::{Event, KeyAction, KeyCode, KeyEvent, LifecycleEvent, MotionAction, MotionEvent};
pub use crate::core::input::InputTracker;

// Graphics
pub use crate::core::surface::graphics::{GraphicsBackend, GraphicsContext};
pub use crate::core::surface::SurfaceState;

// Errors
pub use crate::error::BridgeError;
