use std::{fmt, num::NonZeroU16};

use tether_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Identifies a replicated entity across the session.
///
/// Zero means "unassigned" and is never a valid identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(NonZeroU16);

impl NetworkId {
    pub fn new(value: u16) -> Option<Self> {
        NonZeroU16::new(value).map(Self)
    }

    pub fn value(&self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serde for NetworkId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.value().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = u16::de(reader)?;
        Self::new(value).ok_or(SerdeErr::InvalidValue {
            type_name: "NetworkId",
            value: i64::from(value),
        })
    }

    fn bit_length(&self) -> u32 {
        Self::const_bit_length()
    }
}

impl ConstBitLength for NetworkId {
    fn const_bit_length() -> u32 {
        16
    }
}
