//! Worker Lifecycle State
//!
//! `Parsed -> Installing -> Installed -> Activating -> Activated`, with
//! `Redundant` reached when install fails.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerState {
    /// Constructed, install not yet started
    Parsed,
    /// Priming caches
    Installing,
    /// Installed and waiting to activate
    Installed,
    /// Removing stale-version partitions
    Activating,
    /// In control, intercepting fetches
    Activated,
    /// Install failed; never activates
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }

    pub fn can_install(&self) -> bool {
        matches!(self, WorkerState::Parsed)
    }

    pub fn can_activate(&self) -> bool {
        matches!(self, WorkerState::Installed)
    }

    /// Whether fetches are intercepted in this state.
    pub fn is_controlling(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
