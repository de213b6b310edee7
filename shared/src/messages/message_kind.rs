use tether_serde::{BitReader, BitWrite, Serde};

use crate::{error::MalformedMessageError, ChannelKind};

/// Leading byte of every replication message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Full initial state of an entity, reliable channel
    Spawn,
    /// Changed fields of a spawned entity, unreliable channel
    Update,
}

impl MessageKind {
    const SPAWN: u8 = 1;
    const UPDATE: u8 = 2;

    pub fn to_byte(self) -> u8 {
        match self {
            MessageKind::Spawn => Self::SPAWN,
            MessageKind::Update => Self::UPDATE,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            Self::SPAWN => Some(MessageKind::Spawn),
            Self::UPDATE => Some(MessageKind::Update),
            _ => None,
        }
    }

    /// The channel this kind of message travels on
    pub fn channel(self) -> ChannelKind {
        match self {
            MessageKind::Spawn => ChannelKind::OrderedReliable,
            MessageKind::Update => ChannelKind::UnorderedUnreliable,
        }
    }

    pub fn write(self, writer: &mut dyn BitWrite) {
        self.to_byte().ser(writer);
    }

    pub fn read(reader: &mut BitReader) -> Result<Self, MalformedMessageError> {
        let byte = u8::de(reader).map_err(|source| MalformedMessageError::Truncated {
            context: "message kind",
            source,
        })?;
        Self::from_byte(byte).ok_or(MalformedMessageError::UnknownMessageKind { kind: byte })
    }

    /// Reads the kind and checks it arrived on the channel it is sent on
    pub fn read_on(
        reader: &mut BitReader,
        channel: ChannelKind,
    ) -> Result<Self, MalformedMessageError> {
        let kind = Self::read(reader)?;
        if kind.channel() != channel {
            return Err(MalformedMessageError::ChannelMismatch { kind, channel });
        }
        Ok(kind)
    }
}
