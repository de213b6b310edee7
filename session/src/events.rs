use tether_shared::{NetworkId, OriginId};

/// What an accepted inbound message did to the local registry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicationEvent {
    /// A Spawn created (or replaced) an entity
    Spawned { id: NetworkId, origin: OriginId },
    /// An Update, or a repeated Spawn for the same origin, refreshed an
    /// existing entity
    Updated { id: NetworkId },
}

impl ReplicationEvent {
    pub fn id(&self) -> NetworkId {
        match self {
            ReplicationEvent::Spawned { id, .. } | ReplicationEvent::Updated { id } => *id,
        }
    }
}
