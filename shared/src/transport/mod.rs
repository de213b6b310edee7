mod channel;
mod error;
mod peer;

pub use channel::ChannelKind;
pub use error::TransportError;
pub use peer::{PeerKey, PeerState};

/// Delivery surface the replication core sends through.
///
/// The transport owns its connections; replication only refers to them by
/// `PeerKey`.
pub trait Transport: Send {
    /// Peers the transport currently holds a connection for
    fn peers(&self) -> Vec<PeerKey>;

    fn send(
        &mut self,
        peer: &PeerKey,
        channel: ChannelKind,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Sends `payload` to every connected peer accepted by `predicate`.
    /// Returns the peers whose send failed.
    fn broadcast(
        &mut self,
        channel: ChannelKind,
        payload: &[u8],
        predicate: &dyn Fn(&PeerKey) -> bool,
    ) -> Vec<(PeerKey, TransportError)> {
        let mut failures = Vec::new();
        for peer in self.peers() {
            if !predicate(&peer) {
                continue;
            }
            if let Err(error) = self.send(&peer, channel, payload) {
                failures.push((peer, error));
            }
        }
        failures
    }
}
