//=========================================================================
// Application Core
//=========================================================================
//
// The payload the render loop drives. Implementations own all simulation
// and render state; the scheduler only hands them frames.
//
// Per frame, on the render thread:
//   drain events → update(&FrameContext) → render(&mut dyn GraphicsContext)
//
// `render` is called only while a surface is ready, and never without
// the `update` of the same frame preceding it.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod testbed;

//=== Internal Dependencies ===============================================

use crate::core::scheduler::FrameContext;
use crate::core::surface::graphics::GraphicsContext;

pub use testbed::TestBed;

//=== ApplicationCore =====================================================

/// Simulation and rendering payload owned by the render thread.
pub trait ApplicationCore: Send {
    /// Called once on the first frame after the scheduler starts.
    fn initialize(&mut self) {}

    /// Advances state by one frame.
    fn update(&mut self, frame: &FrameContext<'_>);

    /// Records draw commands for the frame just updated.
    fn render(&mut self, gfx: &mut dyn GraphicsContext);

    /// Called from `stop()` before the core is dropped.
    fn shutdown(&mut self) {}

    /// Returning `false` asks the scheduler to stop after the current frame.
    fn is_running(&self) -> bool {
        true
    }
}
