use std::time::Duration;

use crate::IdAllocation;

/// Per-entity replication settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// How many times per second the host checks the entity for changes.
    /// Also sets the blend interval clients use when applying Updates.
    pub updates_per_second: u8,
}

impl ReplicationConfig {
    pub fn new(updates_per_second: u8) -> Self {
        Self { updates_per_second }
    }

    /// Time between ticks; a rate of zero is treated as one per second
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs(1) / u32::from(self.updates_per_second.max(1))
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            updates_per_second: 3,
        }
    }
}

/// Contains Config properties which will be used by a replication session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How the host assigns identifiers to hosted entities
    pub id_allocation: IdAllocation,
    /// Used for entities built without a template
    pub default_replication: ReplicationConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id_allocation: IdAllocation::Sequential,
            default_replication: ReplicationConfig::default(),
        }
    }
}
