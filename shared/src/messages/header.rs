use tether_serde::{BitReader, BitWrite, Serde};

use crate::{error::MalformedMessageError, MessageKind, NetworkId, OriginId};

/// `kind, origin, identifier`; component values follow in registration order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnHeader {
    pub origin: OriginId,
    pub id: NetworkId,
}

impl SpawnHeader {
    pub fn write(&self, writer: &mut dyn BitWrite) {
        MessageKind::Spawn.write(writer);
        self.origin.ser(writer);
        self.id.ser(writer);
    }

    /// Reads the fields following the message kind
    pub fn read(reader: &mut BitReader) -> Result<Self, MalformedMessageError> {
        let origin = OriginId::de(reader).map_err(|source| MalformedMessageError::Truncated {
            context: "spawn origin",
            source,
        })?;
        let id = NetworkId::de(reader).map_err(|source| MalformedMessageError::Truncated {
            context: "spawn identifier",
            source,
        })?;
        Ok(Self { origin, id })
    }
}

/// `kind, identifier`; the dirty mask and changed values follow
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateHeader {
    pub id: NetworkId,
}

impl UpdateHeader {
    pub fn write(&self, writer: &mut dyn BitWrite) {
        MessageKind::Update.write(writer);
        self.id.ser(writer);
    }

    /// Reads the fields following the message kind
    pub fn read(reader: &mut BitReader) -> Result<Self, MalformedMessageError> {
        let id = NetworkId::de(reader).map_err(|source| MalformedMessageError::Truncated {
            context: "update identifier",
            source,
        })?;
        Ok(Self { id })
    }
}
