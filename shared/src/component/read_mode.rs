use std::time::Duration;

use crate::DirtyMask;

/// Which fields `SyncComponent::decode` reads
#[derive(Clone, Copy, Debug)]
pub enum ReadMode<'m> {
    /// Every field is present (Spawn). Values are applied immediately.
    Full,
    /// Only fields whose bit is set in `mask` are present (Update).
    /// The component's first field is at `mask[offset]`.
    Delta {
        mask: &'m DirtyMask,
        offset: usize,
        blend_interval: Duration,
    },
}

impl ReadMode<'_> {
    pub fn is_forced(&self) -> bool {
        matches!(self, ReadMode::Full)
    }

    /// Whether the component's field `field` is present in the stream
    pub fn selects(&self, field: usize) -> bool {
        match self {
            ReadMode::Full => true,
            ReadMode::Delta { mask, offset, .. } => mask.bit(offset + field),
        }
    }

    /// Time over which a component may smooth toward the received value
    pub fn blend_interval(&self) -> Duration {
        match self {
            ReadMode::Full => Duration::ZERO,
            ReadMode::Delta { blend_interval, .. } => *blend_interval,
        }
    }
}
