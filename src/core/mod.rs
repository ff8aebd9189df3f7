//=========================================================================
// Native Core
//
// Everything that runs behind the bridge entry points.
//
// Components (leaves first):
// - `event` / `event_queue`: host events and the bounded queue carrying
//   them from the host thread to the render thread
// - `surface`: host surface state and the graphics context bound to it
// - `scheduler`: the render-thread frame loop and its state machine
// - `app`: the application core driven once per frame
// - `input`: key and pointer state rebuilt from frame events
//
// Notes:
// Only the event queue and the surface manager are shared between
// threads. The scheduler, and the application core it owns, live on the
// render thread for their whole life.
//
//=========================================================================

pub mod app;
pub mod event;
pub mod event_queue;
pub mod input;
pub mod scheduler;
pub mod surface;
