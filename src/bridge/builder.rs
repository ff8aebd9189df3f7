//=========================================================================
// Bridge Builder
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::{Bridge, ContractPolicy};
use crate::config::BridgeConfig;
use crate::core::app::ApplicationCore;
use crate::core::event_queue::OverflowPolicy;
use crate::core::scheduler::FramePacing;
use crate::core::surface::graphics::{GraphicsBackend, HeadlessBackend};
use crate::error::BridgeError;

//=== BridgeBuilder =======================================================

/// Fluent construction of a [`Bridge`].
///
/// # Default Values
///
/// Everything not set explicitly comes from [`BridgeConfig::default`];
/// the graphics backend defaults to [`HeadlessBackend`].
///
/// # Examples
///
/// ```no_run
/// use hearth_bridge::{BridgeBuilder, TestBed};
/// use hearth_bridge::core::scheduler::FramePacing;
///
/// let mut bridge = BridgeBuilder::new()
///     .with_queue_capacity(512)
///     .with_pacing(FramePacing::Fixed { fps: 120.0 })
///     .build(Box::new(TestBed::new()))
///     .expect("bridge");
///
/// bridge.on_start().unwrap();
/// ```
pub struct BridgeBuilder {
    config: BridgeConfig,
    backend: Option<Box<dyn GraphicsBackend>>,
}

impl BridgeBuilder {
    pub fn new() -> Self {
        Self::from_config(BridgeConfig::default())
    }

    pub fn from_config(config: BridgeConfig) -> Self {
        Self {
            config,
            backend: None,
        }
    }

    /// Hard bound on events queued between two frames.
    ///
    /// Default: 256
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Queue capacity must be positive");
        self.config.queue_capacity = capacity;
        self
    }

    /// Default: [`OverflowPolicy::DropOldest`]
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow_policy = policy;
        self
    }

    /// # Panics
    ///
    /// Panics if a fixed frame rate is not positive.
    pub fn with_pacing(mut self, pacing: FramePacing) -> Self {
        if let FramePacing::Fixed { fps } = pacing {
            assert!(fps > 0.0, "Frame rate must be positive, got {}", fps);
        }
        self.config.pacing = pacing;
        self
    }

    /// Upper bound for one frame's delta-time.
    ///
    /// Default: 250 ms
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.config.max_delta_ms = max_delta.as_millis() as u64;
        self
    }

    pub fn with_contract_policy(mut self, policy: ContractPolicy) -> Self {
        self.config.contract_policy = policy;
        self
    }

    pub fn with_fps_logging(mut self, enabled: bool) -> Self {
        self.config.log_fps = enabled;
        self
    }

    pub fn with_backend(mut self, backend: Box<dyn GraphicsBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Creates the bridge (the `on_create` entry point).
    pub fn build(self, core: Box<dyn ApplicationCore>) -> Result<Bridge, BridgeError> {
        let backend = self
            .backend
            .unwrap_or_else(|| Box::new(HeadlessBackend::new()));
        Bridge::create(self.config, backend, core)
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_config() {
        let builder = BridgeBuilder::new();
        assert_eq!(builder.config(), &BridgeConfig::default());
    }

    #[test]
    fn builder_overrides() {
        let builder = BridgeBuilder::new()
            .with_queue_capacity(8)
            .with_overflow_policy(OverflowPolicy::DropNewest)
            .with_pacing(FramePacing::Vsync)
            .with_max_delta(Duration::from_millis(100))
            .with_contract_policy(ContractPolicy::Log)
            .with_fps_logging(false);

        let cfg = builder.config();
        assert_eq!(cfg.queue_capacity, 8);
        assert_eq!(cfg.overflow_policy, OverflowPolicy::DropNewest);
        assert_eq!(cfg.pacing, FramePacing::Vsync);
        assert_eq!(cfg.max_delta_ms, 100);
        assert_eq!(cfg.contract_policy, ContractPolicy::Log);
        assert!(!cfg.log_fps);
    }

    #[test]
    #[should_panic(expected = "Queue capacity must be positive")]
    fn zero_capacity_panics() {
        BridgeBuilder::new().with_queue_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Frame rate must be positive")]
    fn negative_fps_panics() {
        BridgeBuilder::new().with_pacing(FramePacing::Fixed { fps: -30.0 });
    }
}
