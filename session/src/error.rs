use std::fmt;

use thiserror::Error;

use tether_shared::ReplicationError;

use crate::ReplicatedEntity;

/// `host_spawn` refused an entity. The entity comes back untouched so the
/// caller keeps the components it built.
#[derive(Error)]
#[error("{error}")]
pub struct HostSpawnError {
    error: ReplicationError,
    entity: ReplicatedEntity,
}

impl HostSpawnError {
    pub(crate) fn new(error: impl Into<ReplicationError>, entity: ReplicatedEntity) -> Self {
        Self {
            error: error.into(),
            entity,
        }
    }

    pub fn error(&self) -> &ReplicationError {
        &self.error
    }

    pub fn into_entity(self) -> ReplicatedEntity {
        self.entity
    }

    pub fn into_parts(self) -> (ReplicationError, ReplicatedEntity) {
        (self.error, self.entity)
    }
}

impl fmt::Debug for HostSpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSpawnError")
            .field("error", &self.error)
            .field("origin", &self.entity.origin())
            .field("network_id", &self.entity.network_id())
            .finish()
    }
}

impl From<HostSpawnError> for ReplicationError {
    fn from(rejected: HostSpawnError) -> Self {
        rejected.error
    }
}
