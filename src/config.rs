//=========================================================================
// Bridge Configuration
//=========================================================================
//
// Tunables for the queue, the frame scheduler and the desktop harness.
// Every field has a default so a partial (or missing) TOML file works.
//
// Example `hearth.toml`:
// ```toml
// queue_capacity = 512
// overflow_policy = "drop_newest"
// pacing = { mode = "fixed", fps = 120.0 }
// max_delta_ms = 100
//
// [window]
// title = "TestBed"
// width = 1080
// height = 2400
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::bridge::ContractPolicy;
use crate::core::event_queue::OverflowPolicy;
use crate::core::scheduler::FramePacing;
use crate::error::ConfigError;

//=== BridgeConfig ========================================================

/// Runtime configuration for a [`crate::Bridge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Hard bound on queued host events between two frames.
    pub queue_capacity: usize,

    /// What to drop once `queue_capacity` is reached.
    pub overflow_policy: OverflowPolicy,

    /// Frame cadence source.
    pub pacing: FramePacing,

    /// Upper bound for a single frame's delta-time.
    pub max_delta_ms: u64,

    /// How long the paused render thread waits for host events per poll.
    pub idle_wait_ms: u64,

    /// Log frame statistics periodically.
    pub log_fps: bool,
    pub fps_log_period_sec: f32,

    /// Reaction to host entry points called out of lifecycle order.
    pub contract_policy: ContractPolicy,

    /// Window used by the desktop host harness only.
    pub window: WindowConfig,
}

/// Window settings for the desktop harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

//--- Defaults ------------------------------------------------------------

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            overflow_policy: OverflowPolicy::DropOldest,
            pacing: FramePacing::Fixed { fps: 60.0 },
            max_delta_ms: 250,
            idle_wait_ms: 10,
            log_fps: true,
            fps_log_period_sec: 1.0,
            contract_policy: ContractPolicy::default(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hearth TestBed".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

//--- Loading -------------------------------------------------------------

impl BridgeConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error: silently
    /// ignoring a typo'd config is worse than refusing to start.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, &display),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!(target: "bridge", "No config at {}, using defaults", display);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path: display, source }),
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<inline>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Rejects values the queue and scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "queue_capacity",
                reason: "must be positive".to_string(),
            });
        }
        if let FramePacing::Fixed { fps } = self.pacing {
            let usable = fps.is_finite() && fps > 0.0 && Duration::try_from_secs_f64(1.0 / fps).is_ok();
            if !usable {
                return Err(ConfigError::Invalid {
                    field: "pacing.fps",
                    reason: format!("must be a positive frame rate, got {}", fps),
                });
            }
        }
        let period = self.fps_log_period_sec;
        if !(period.is_finite() && Duration::try_from_secs_f32(period.max(0.0)).is_ok()) {
            return Err(ConfigError::Invalid {
                field: "fps_log_period_sec",
                reason: format!("must be a finite number of seconds, got {}", period),
            });
        }
        Ok(())
    }

    //--- Derived Values ---------------------------------------------------

    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms.max(1))
    }

    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms.max(1))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.queue_capacity, 256);
        assert_eq!(cfg.overflow_policy, OverflowPolicy::DropOldest);
        assert_eq!(cfg.pacing, FramePacing::Fixed { fps: 60.0 });
        assert_eq!(cfg.max_delta(), Duration::from_millis(250));
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = BridgeConfig::from_toml_str("queue_capacity = 32").unwrap();
        assert_eq!(cfg.queue_capacity, 32);
        assert_eq!(cfg.idle_wait_ms, 10);
        assert_eq!(cfg.window, WindowConfig::default());
    }

    #[test]
    fn parses_policies_and_pacing() {
        let cfg = BridgeConfig::from_toml_str(
            r#"
            overflow_policy = "drop_newest"
            pacing = { mode = "vsync" }
            contract_policy = "log"

            [window]
            width = 1080
            height = 2400
            "#,
        )
        .unwrap();

        assert_eq!(cfg.overflow_policy, OverflowPolicy::DropNewest);
        assert_eq!(cfg.pacing, FramePacing::Vsync);
        assert_eq!(cfg.contract_policy, ContractPolicy::Log);
        assert_eq!((cfg.window.width, cfg.window.height), (1080, 2400));
    }

    #[test]
    fn fixed_pacing_with_rate() {
        let cfg = BridgeConfig::from_toml_str(r#"pacing = { mode = "fixed", fps = 120.0 }"#).unwrap();
        assert_eq!(cfg.pacing, FramePacing::Fixed { fps: 120.0 });
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = BridgeConfig::from_toml_str("queue_capacity = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = BridgeConfig::load_or_default("/definitely/not/here/hearth.toml").unwrap();
        assert_eq!(cfg, BridgeConfig::default());
    }

    #[test]
    fn validation_rejects_unusable_values() {
        assert!(BridgeConfig::default().validate().is_ok());

        let empty_queue = BridgeConfig {
            queue_capacity: 0,
            ..BridgeConfig::default()
        };
        assert!(matches!(
            empty_queue.validate(),
            Err(ConfigError::Invalid { field: "queue_capacity", .. })
        ));

        let frozen = BridgeConfig {
            pacing: FramePacing::Fixed { fps: 0.0 },
            ..BridgeConfig::default()
        };
        assert!(matches!(
            frozen.validate(),
            Err(ConfigError::Invalid { field: "pacing.fps", .. })
        ));

        let glacial = BridgeConfig {
            pacing: FramePacing::Fixed { fps: 1e-30 },
            ..BridgeConfig::default()
        };
        assert!(matches!(
            glacial.validate(),
            Err(ConfigError::Invalid { field: "pacing.fps", .. })
        ));
    }

    #[test]
    fn validation_rejects_unrepresentable_log_period() {
        for text in ["fps_log_period_sec = 1e30", "fps_log_period_sec = inf", "fps_log_period_sec = nan"] {
            let cfg = BridgeConfig::from_toml_str(text).unwrap();
            assert!(
                matches!(cfg.validate(), Err(ConfigError::Invalid { field: "fps_log_period_sec", .. })),
                "{} should be rejected",
                text
            );
        }

        let negative = BridgeConfig {
            fps_log_period_sec: -1.0,
            ..BridgeConfig::default()
        };
        assert!(negative.validate().is_ok());
    }

    #[test]
    fn zero_durations_are_clamped() {
        let cfg = BridgeConfig {
            max_delta_ms: 0,
            idle_wait_ms: 0,
            ..BridgeConfig::default()
        };
        assert_eq!(cfg.max_delta(), Duration::from_millis(1));
        assert_eq!(cfg.idle_wait(), Duration::from_millis(1));
    }
}
