use tether_serde::{BitReader, BitWrite};

use crate::error::MalformedMessageError;

// Bit order is LSB-first: field `i` lives in byte `i / 8` under `1 << (i % 8)`.

/// Number of bytes needed to hold `bit_count` packed flags
pub fn byte_len(bit_count: usize) -> usize {
    bit_count.div_ceil(8)
}

/// Packs a flag vector, 8 flags per byte, zero-padding the last byte
pub fn pack(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; byte_len(bits.len())];
    for (index, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[index / 8] |= 1 << (index % 8);
        }
    }
    bytes
}

/// Unpacks `count` flags. Flags beyond the end of `bytes` read as clear.
pub fn unpack(bytes: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map(|index| {
            bytes
                .get(index / 8)
                .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
        })
        .collect()
}

/// Returns on the first set flag
pub fn any_set(bits: &[bool]) -> bool {
    bits.iter().any(|bit| *bit)
}

/// Which fields of an entity changed, packed for the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyMask {
    bit_count: usize,
    bytes: Vec<u8>,
}

impl DirtyMask {
    pub fn new(bit_count: usize) -> Self {
        Self {
            bit_count,
            bytes: vec![0; byte_len(bit_count)],
        }
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        Self {
            bit_count: bits.len(),
            bytes: pack(bits),
        }
    }

    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bits(&self) -> Vec<bool> {
        unpack(&self.bytes, self.bit_count)
    }

    /// Out-of-range indices read as clear
    pub fn bit(&self, index: usize) -> bool {
        index < self.bit_count && self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    /// Returns false if `index` is outside the mask
    pub fn set_bit(&mut self, index: usize, value: bool) -> bool {
        if index >= self.bit_count {
            return false;
        }
        if value {
            self.bytes[index / 8] |= 1 << (index % 8);
        } else {
            self.bytes[index / 8] &= !(1 << (index % 8));
        }
        true
    }

    pub fn is_clear(&self) -> bool {
        self.bytes.iter().all(|byte| *byte == 0)
    }

    pub fn count_set(&self) -> usize {
        self.bytes.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    pub fn or(&mut self, other: &DirtyMask) {
        for (byte, other_byte) in self.bytes.iter_mut().zip(other.bytes.iter()) {
            *byte |= *other_byte;
        }
        self.clear_padding();
    }

    pub fn clear(&mut self) {
        for byte in self.bytes.iter_mut() {
            *byte = 0;
        }
    }

    fn clear_padding(&mut self) {
        let used = self.bit_count % 8;
        if used != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }

    fn padding_is_clear(bytes: &[u8], bit_count: usize) -> bool {
        let used = bit_count % 8;
        match bytes.last() {
            Some(last) if used != 0 => last >> used == 0,
            _ => true,
        }
    }

    pub fn write(&self, writer: &mut dyn BitWrite) {
        writer.write_bytes(&self.bytes);
    }

    /// Reads a mask of `bit_count` flags. The byte length comes from
    /// `bit_count`, never from the stream.
    pub fn read(reader: &mut BitReader, bit_count: usize) -> Result<Self, MalformedMessageError> {
        let bytes = reader
            .read_bytes(byte_len(bit_count))
            .map_err(|source| MalformedMessageError::Truncated {
                context: "dirty mask",
                source,
            })?;

        if !Self::padding_is_clear(&bytes, bit_count) {
            return Err(MalformedMessageError::MaskPadding { bit_count });
        }

        Ok(Self { bit_count, bytes })
    }
}
