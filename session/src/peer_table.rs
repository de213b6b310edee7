use std::collections::HashMap;

use tether_shared::{PeerKey, PeerState};

/// Readiness of every peer the transport has told us about. The transport
/// owns the connections; this only records their state.
#[derive(Default)]
pub struct PeerTable {
    states: HashMap<PeerKey, PeerState>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Records `state` for `peer`. Returns `true` when the peer just became
    /// ready. A disconnected peer is forgotten.
    pub fn set(&mut self, peer: PeerKey, state: PeerState) -> bool {
        if state == PeerState::Disconnected {
            self.states.remove(&peer);
            return false;
        }
        let previous = self.states.insert(peer, state);
        state.is_ready() && !previous.is_some_and(|previous| previous.is_ready())
    }

    pub fn state(&self, peer: &PeerKey) -> Option<PeerState> {
        self.states.get(peer).copied()
    }

    pub fn is_ready(&self, peer: &PeerKey) -> bool {
        self.state(peer).is_some_and(|state| state.is_ready())
    }

    /// Ready peers in key order
    pub fn ready_peers(&self) -> Vec<PeerKey> {
        let mut ready: Vec<PeerKey> = self
            .states
            .iter()
            .filter(|(_, state)| state.is_ready())
            .map(|(peer, _)| *peer)
            .collect();
        ready.sort();
        ready
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
