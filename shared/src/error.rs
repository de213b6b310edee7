use thiserror::Error;

use tether_serde::SerdeErr;

use crate::{id_pool::IdPoolError, ChannelKind, MessageKind, NetworkId, OriginId};

/// Reasons an inbound replication message is dropped as unreadable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMessageError {
    /// The stream ended (or held an invalid value) while reading `context`
    #[error("Malformed message: failed reading {context}: {source}")]
    Truncated {
        context: &'static str,
        #[source]
        source: SerdeErr,
    },

    /// The leading byte does not name a known message kind
    #[error("Malformed message: unknown message kind {kind}")]
    UnknownMessageKind { kind: u8 },

    /// Bits past the entity's field count were set in the dirty mask
    #[error("Malformed message: dirty mask for {bit_count} fields has padding bits set")]
    MaskPadding { bit_count: usize },

    /// Payload remained after every component was read, so the sender's
    /// field layout differs from ours
    #[error("Malformed message: {remaining_bits} bits left unread after the last component")]
    TrailingBytes { remaining_bits: u32 },

    /// The message arrived on a channel it is never sent on
    #[error("Malformed message: {kind:?} received on {channel:?} channel")]
    ChannelMismatch {
        kind: MessageKind,
        channel: ChannelKind,
    },
}

/// Errors raised by replication operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// A non-authoritative process attempted a host-only operation
    #[error("Cannot {operation}: this process is not the replication host")]
    NotHost { operation: &'static str },

    /// A process that is not a client attempted a client-only operation
    #[error("Cannot {operation}: this process is not a replication client")]
    NotClient { operation: &'static str },

    /// A Spawn referenced a template with no local counterpart
    #[error("Spawn references origin {origin:?} which has no local template")]
    UnknownOrigin { origin: OriginId },

    /// An Update referenced an entity that is not registered locally
    #[error("Update references entity {id} which is not registered")]
    UnknownIdentifier { id: NetworkId },

    #[error(transparent)]
    Malformed(#[from] MalformedMessageError),

    /// Components were attached to an entity that already has them
    #[error("Components are already attached to this entity")]
    AlreadyAttached,

    /// The entity was despawned and can not be hosted again
    #[error("Entity {id:?} was destroyed")]
    EntityDestroyed { id: Option<NetworkId> },

    #[error(transparent)]
    IdPool(#[from] IdPoolError),
}

impl ReplicationError {
    /// Whether the error is an expected consequence of packet loss or join races
    pub fn is_transient(&self) -> bool {
        matches!(self, ReplicationError::UnknownIdentifier { .. })
    }
}
