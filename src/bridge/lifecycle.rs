//=========================================================================
// Host Lifecycle Contract
//=========================================================================
//
// Validates the order in which the host calls the bridge entry points.
//
// ```text
//   Created ──► Started ──► Resumed ◄──► Paused ──► Stopped ──► Destroyed
//      │           │                                 │  ▲
//      │           └─────────────────────────────────┘  │ (Stopped → Started)
//      └───────────────────────────────────────────────────────► Destroyed
// ```
//
// A call outside these edges is a contract violation. Debug builds panic
// so the slip is found during development; release builds log it and
// ignore the call.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::error;
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::error::BridgeError;

//=== HostLifecycle =======================================================

/// Activity lifecycle position as reported through the entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostLifecycle {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

impl HostLifecycle {
    pub fn can_transition(self, to: Self) -> bool {
        use HostLifecycle::*;
        matches!(
            (self, to),
            (Created, Started)
                | (Started, Resumed)
                | (Resumed, Paused)
                | (Paused, Resumed)
                | (Paused, Stopped)
                | (Started, Stopped)
                | (Stopped, Started)
                | (Stopped, Destroyed)
                | (Created, Destroyed)
        )
    }
}

//=== ContractPolicy ======================================================

/// Reaction to a host call that breaks the lifecycle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractPolicy {
    /// Panic with the offending entry point and state.
    Panic,
    /// Log at `error` and ignore the call.
    Log,
}

impl Default for ContractPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Log
        }
    }
}

//=== LifecycleGuard ======================================================

#[derive(Debug)]
pub(crate) struct LifecycleGuard {
    state: HostLifecycle,
    policy: ContractPolicy,
    violations: u64,
}

impl LifecycleGuard {
    pub(crate) fn new(policy: ContractPolicy) -> Self {
        Self {
            state: HostLifecycle::Created,
            policy,
            violations: 0,
        }
    }

    /// Checks that `entry` may move the host to `to`, without committing.
    pub(crate) fn check(&mut self, entry: &'static str, to: HostLifecycle) -> Result<(), BridgeError> {
        if self.state.can_transition(to) {
            Ok(())
        } else {
            Err(self.violation(entry))
        }
    }

    pub(crate) fn commit(&mut self, to: HostLifecycle) {
        self.state = to;
    }

    /// Checks and commits in one step.
    pub(crate) fn advance(&mut self, entry: &'static str, to: HostLifecycle) -> Result<(), BridgeError> {
        self.check(entry, to)?;
        self.commit(to);
        Ok(())
    }

    /// Surface and input entry points are valid until `on_destroy`.
    pub(crate) fn check_alive(&mut self, entry: &'static str) -> Result<(), BridgeError> {
        if self.state == HostLifecycle::Destroyed {
            Err(self.violation(entry))
        } else {
            Ok(())
        }
    }

    pub(crate) fn state(&self) -> HostLifecycle {
        self.state
    }

    pub(crate) fn violations(&self) -> u64 {
        self.violations
    }

    fn violation(&mut self, entry: &'static str) -> BridgeError {
        self.violations += 1;
        let err = BridgeError::ContractViolation {
            entry,
            state: self.state,
        };
        match self.policy {
            ContractPolicy::Panic => panic!("host contract violation: {}", err),
            ContractPolicy::Log => {
                error!(target: "bridge", "Host contract violation ignored: {}", err);
                err
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
