/// The two delivery guarantees replication relies on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Every payload arrives, in the order it was sent. Used for Spawns.
    OrderedReliable,
    /// Payloads may be dropped or reordered. Used for Updates.
    UnorderedUnreliable,
}

impl ChannelKind {
    pub fn is_reliable(&self) -> bool {
        matches!(self, ChannelKind::OrderedReliable)
    }
}
