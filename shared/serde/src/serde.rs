use crate::{
    bit_reader::BitReader,
    bit_writer::{BitCounter, BitWrite},
    error::SerdeErr,
};

/// A type that can be written to and read from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the outgoing stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Parses a value out of the incoming stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` would write for this value
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// A type whose encoded length never depends on its value
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// Multi-byte values are written little-endian
macro_rules! impl_serde_le_bytes {
    ($($t:ty),*) => {$(
        impl Serde for $t {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$t>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$t>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <$t as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $t {
            fn const_bit_length() -> u32 {
                (std::mem::size_of::<$t>() * 8) as u32
            }
        }
    )*};
}

impl_serde_le_bytes!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}
