use thiserror::Error;

use crate::{ChannelKind, PeerKey};

/// Errors reported by a transport when delivering a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport has no live connection for the peer
    #[error("Peer {peer:?} is not connected")]
    PeerNotConnected { peer: PeerKey },

    /// The underlying connection refused the payload
    #[error("Failed to send {bytes} bytes to {peer:?} on {channel:?} channel: {reason}")]
    SendFailed {
        peer: PeerKey,
        channel: ChannelKind,
        bytes: usize,
        reason: String,
    },
}
