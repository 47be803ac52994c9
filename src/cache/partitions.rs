//! Partition Naming
//!
//! The four cache partitions and their versioned names.

use std::fmt;

use serde::Serialize;

// == Partition Kind ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    Static,
    Dynamic,
    Api,
    Images,
}

impl PartitionKind {
    pub const ALL: [PartitionKind; 4] = [
        PartitionKind::Static,
        PartitionKind::Dynamic,
        PartitionKind::Api,
        PartitionKind::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionKind::Static => "static",
            PartitionKind::Dynamic => "dynamic",
            PartitionKind::Api => "api",
            PartitionKind::Images => "images",
        }
    }
}

impl fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Partition Set ==
/// Versioned partition names for one build of the cache.
///
/// Names have the form `{prefix}-{kind}-{version}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSet {
    prefix: String,
    version: String,
}

impl PartitionSet {
    pub fn new(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self, kind: PartitionKind) -> String {
        format!("{}-{}-{}", self.prefix, kind, self.version)
    }

    /// All names valid for the current version.
    pub fn names(&self) -> Vec<String> {
        PartitionKind::ALL.iter().map(|k| self.name(*k)).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        PartitionKind::ALL.iter().any(|k| self.name(*k) == name)
    }
}
