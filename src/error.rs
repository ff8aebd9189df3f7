//=========================================================================
// Error Types
//=========================================================================
//
// One error enum per subsystem. None of these are fatal to the host:
// surface errors degrade to "skip rendering", scheduler errors reject a
// single transition, bridge errors are reported back through the entry
// point that caused them.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::bridge::HostLifecycle;
use crate::core::scheduler::SchedulerState;

//=== SurfaceError ========================================================

/// Graphics surface and context failures.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The backend could not bind a context to the host surface.
    #[error("context creation failed on {backend}: {reason}")]
    ContextCreation { backend: &'static str, reason: String },

    /// Presenting the frame failed (surface gone, device lost, ...).
    #[error("present failed: {0}")]
    Present(String),

    /// An operation needed a ready surface.
    #[error("surface is not ready")]
    NotReady,
}

//=== SchedulerError ======================================================

/// Rejected frame scheduler state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: SchedulerState,
        to: SchedulerState,
    },

    /// `start()` was called after `stop()` without installing a new core.
    #[error("no application core installed")]
    NoCore,

    /// A core can only be replaced while the scheduler is stopped.
    #[error("application core is in use by a {0:?} scheduler")]
    CoreInUse(SchedulerState),
}

//=== ConfigError =========================================================

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A value that parses but cannot be used.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

//=== BridgeError =========================================================

/// Entry point failures reported to the host.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Entry point called in a host lifecycle state that does not allow it.
    #[error("entry point `{entry}` called in lifecycle state {state:?}")]
    ContractViolation {
        entry: &'static str,
        state: HostLifecycle,
    },

    #[error("render thread could not be spawned: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("render thread panicked")]
    ThreadPanicked,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_error_names_both_states() {
        let err = SchedulerError::InvalidTransition {
            from: SchedulerState::Stopped,
            to: SchedulerState::Paused,
        };
        let msg = err.to_string();
        assert!(msg.contains("Stopped"));
        assert!(msg.contains("Paused"));
    }

    #[test]
    fn contract_violation_names_entry_point() {
        let err = BridgeError::ContractViolation {
            entry: "on_resume",
            state: HostLifecycle::Created,
        };
        assert!(err.to_string().contains("on_resume"));
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<SurfaceError>();
        assert_error::<SchedulerError>();
        assert_error::<ConfigError>();
        assert_error::<BridgeError>();
    }
}
