//! # Tether Shared
//! Dirty-mask codec, synchronized component contract, wire messages and the
//! collaborator contracts shared by the tether replication crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use tether_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, SignedInteger,
    SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};

mod component;
mod config;
mod dirty_mask;
mod error;
mod id_pool;
mod messages;
mod network_id;
mod origin;
mod time;
mod transport;

pub use component::{
    unstage, Animator, AnimatorError, AnimatorParameter, AnimatorValue, AnimatorValueKind, Blend,
    Interpolate, Property, ReadMode, Rigidbody, Staged, SyncComponent, Transform,
};
pub use config::{ReplicationConfig, SessionConfig};
pub use dirty_mask::{any_set, byte_len, pack, unpack, DirtyMask};
pub use error::{MalformedMessageError, ReplicationError};
pub use id_pool::{IdAllocation, IdPoolError, NetworkIdPool};
pub use messages::{MessageKind, SpawnHeader, UpdateHeader};
pub use network_id::NetworkId;
pub use origin::{OriginId, OriginResolver, OriginTable, Template};
pub use time::{Clock, ManualClock, SystemClock, Timer};
pub use transport::{ChannelKind, PeerKey, PeerState, Transport, TransportError};
