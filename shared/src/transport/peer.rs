/// Stable key for a connection, issued by the transport
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct PeerKey(u64);

impl PeerKey {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Lifecycle of a connection as seen by replication
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerState {
    Connecting,
    Handshaking,
    /// Eligible for Spawn / Update traffic
    Ready,
    Disconnected,
}

impl PeerState {
    pub fn is_ready(&self) -> bool {
        matches!(self, PeerState::Ready)
    }
}
