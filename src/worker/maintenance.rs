//! Maintenance Plans
//!
//! Fixed sets of expiry sweeps and size-budget passes run by the sync triggers.

use std::time::Duration;

use serde::Serialize;

use crate::cache::PartitionKind;
use crate::config::Config;

/// Background sync tag requesting a full cleanup.
pub const CLEANUP_TAG: &str = "cache-cleanup";

/// Periodic sync tag for routine maintenance.
pub const MAINTENANCE_TAG: &str = "cache-maintenance";

// == Maintenance Step ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceStep {
    /// Expiry sweep with the given max age
    Expire {
        kind: PartitionKind,
        max_age: Duration,
    },
    /// Size-budget enforcement with the given byte budget
    Trim { kind: PartitionKind, max_bytes: u64 },
}

// == Maintenance Plan ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenancePlan {
    pub steps: Vec<MaintenanceStep>,
}

impl MaintenancePlan {
    /// Expire every partition, then hold dynamic to 40% and images to 30% of the ceiling.
    pub fn cleanup(config: &Config) -> Self {
        let mut steps: Vec<MaintenanceStep> = PartitionKind::ALL
            .iter()
            .map(|kind| MaintenanceStep::Expire {
                kind: *kind,
                max_age: config.max_age(*kind),
            })
            .collect();

        steps.push(MaintenanceStep::Trim {
            kind: PartitionKind::Dynamic,
            max_bytes: config.budget(0.4),
        });
        steps.push(MaintenanceStep::Trim {
            kind: PartitionKind::Images,
            max_bytes: config.budget(0.3),
        });

        Self { steps }
    }

    /// Expire static, dynamic and api, then hold dynamic to the full ceiling.
    pub fn periodic(config: &Config) -> Self {
        let mut steps: Vec<MaintenanceStep> =
            [PartitionKind::Static, PartitionKind::Dynamic, PartitionKind::Api]
                .iter()
                .map(|kind| MaintenanceStep::Expire {
                    kind: *kind,
                    max_age: config.max_age(*kind),
                })
                .collect();

        steps.push(MaintenanceStep::Trim {
            kind: PartitionKind::Dynamic,
            max_bytes: config.budget(1.0),
        });

        Self { steps }
    }
}

// == Maintenance Report ==
/// What a plan removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    pub expired: usize,
    pub evicted: usize,
}
