//=========================================================================
// Hearth Bridge — Library Root
//
// Native side of a game-activity test-bed: the host calls a fixed set of
// entry points, events cross to a dedicated render thread through a
// bounded queue, and a frame scheduler drives an application core once
// per frame.
//
// Responsibilities:
// - Expose the host-facing facade (`Bridge`, `BridgeBuilder`)
// - Expose the C ABI used by the activity glue (`bridge::ffi`)
// - Expose the render-thread internals (`core`) for custom cores and tests
// - Provide a desktop harness standing in for the activity (`platform`)
//
// Typical usage:
// ```no_run
// use hearth_bridge::{BridgeBuilder, DesktopHost, TestBed};
//
// fn main() -> anyhow::Result<()> {
//     let builder = BridgeBuilder::new();
//     let window = builder.config().window.clone();
//     let bridge = builder.build(Box::new(TestBed::new()))?;
//     DesktopHost::new(bridge, window).run()?;
//     Ok(())
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `bridge` holds the entry points and the C ABI. `core` contains the
// queue, surface manager, scheduler and application core, all reachable
// for embedding a custom core.
//
pub mod bridge;
pub mod config;
pub mod core;
pub mod error;
pub mod prelude;

//--- Host Harness --------------------------------------------------------
//
// Winit-driven stand-in for the Android activity. Only `DesktopHost` and
// its error type are part of the API.
//
mod platform;

//--- Public Exports ------------------------------------------------------

pub use crate::bridge::{Bridge, BridgeBuilder, ContractPolicy, HostLifecycle};
pub use crate::config::BridgeConfig;
pub use crate::core::app::{ApplicationCore, TestBed};
pub use crate::core::scheduler::ShutdownReport;
pub use crate::error::BridgeError;
pub use crate::platform::{DesktopHost, PlatformError};
