//! # Tether Session
//! Keeps a dynamic set of entities consistent between one authoritative host
//! and its ready peers: reliable Spawns carry full state, periodic
//! unreliable Updates carry only the fields that changed.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tether_shared::{
        Animator, AnimatorParameter, AnimatorValue, BitReader, BitWrite, BitWriter, ChannelKind,
        Clock, IdAllocation, ManualClock, NetworkId, OriginId, OriginResolver, OriginTable,
        PeerKey, PeerState, ReplicationConfig, ReplicationError, Rigidbody, Serde, SerdeErr,
        SessionConfig, SyncComponent, SystemClock, Template, Transform, Transport,
        TransportError,
    };
}

mod entity;
mod error;
mod events;
mod manager;
mod peer_table;
mod scheduler;

pub use entity::{EntityState, ReplicatedEntity, TickOutcome};
pub use error::HostSpawnError;
pub use events::ReplicationEvent;
pub use manager::{ReplicationManager, Role};
pub use peer_table::PeerTable;
pub use scheduler::{TickHandle, TickScheduler};
