use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, serde::Serde, ConstBitLength};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

/// An integer written with an explicit bit width.
///
/// Fixed integers always occupy `BITS` bits (plus a sign bit when signed).
/// Variable integers are written in groups of `BITS` bits, each group
/// preceded by a "proceed" bit, so small values stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    value: i64,
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> SerdeInteger<SIGNED, VARIABLE, BITS> {
    /// # Panics
    ///
    /// Panics if `value` can not be represented by this integer type.
    /// Consider using `try_new` for non-panicking construction.
    pub fn new<T: Into<i64>>(value: T) -> Self {
        match Self::try_new(value) {
            Ok(integer) => integer,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_new<T: Into<i64>>(value: T) -> Result<Self, SerdeErr> {
        let value = value.into();
        check_width(BITS)?;

        if !SIGNED && value < 0 {
            return Err(SerdeErr::IntegerOutOfRange { value, bits: BITS });
        }
        if !VARIABLE && value.unsigned_abs() >> BITS != 0 {
            return Err(SerdeErr::IntegerOutOfRange { value, bits: BITS });
        }

        Ok(Self { value })
    }

    pub fn get(&self) -> i64 {
        self.value
    }
}

fn check_width(bits: u8) -> Result<(), SerdeErr> {
    if bits == 0 || bits > 63 {
        return Err(SerdeErr::InvalidValue {
            type_name: "integer bit width",
            value: i64::from(bits),
        });
    }
    Ok(())
}

fn write_bits(writer: &mut dyn BitWrite, magnitude: &mut u64, bits: u8) {
    for _ in 0..bits {
        writer.write_bit(*magnitude & 1 != 0);
        *magnitude >>= 1;
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde for SerdeInteger<SIGNED, VARIABLE, BITS> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        if SIGNED {
            writer.write_bit(self.value < 0);
        }

        let mut magnitude = self.value.unsigned_abs();

        if VARIABLE {
            loop {
                let proceed = magnitude >> BITS != 0;
                writer.write_bit(proceed);
                write_bits(writer, &mut magnitude, BITS);
                if !proceed {
                    break;
                }
            }
        } else {
            write_bits(writer, &mut magnitude, BITS);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        check_width(BITS)?;

        let negative = SIGNED && reader.read_bit()?;

        let mut magnitude: u64 = 0;
        let mut position: u32 = 0;
        loop {
            let proceed = VARIABLE && reader.read_bit()?;
            for _ in 0..BITS {
                let bit = reader.read_bit()?;
                if bit {
                    if position >= 63 {
                        return Err(SerdeErr::IntegerOutOfRange {
                            value: i64::MAX,
                            bits: BITS,
                        });
                    }
                    magnitude |= 1 << position;
                }
                position += 1;
            }
            if !proceed {
                break;
            }
        }

        // magnitude < 2^63 here, so the cast is lossless
        let value = magnitude as i64;
        if negative {
            if value == 0 {
                return Err(SerdeErr::InvalidValue {
                    type_name: "negative zero",
                    value,
                });
            }
            Ok(Self { value: -value })
        } else {
            Ok(Self { value })
        }
    }
}

impl<const SIGNED: bool, const BITS: u8> ConstBitLength for SerdeInteger<SIGNED, false, BITS> {
    fn const_bit_length() -> u32 {
        u32::from(SIGNED) + u32::from(BITS)
    }
}

// Tests
