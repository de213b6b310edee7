use crate::error::SerdeErr;

/// Reads a bit stream produced by `BitWriter`
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    pub fn bits_remaining(&self) -> u32 {
        let total = self.buffer.len() * 8;
        u32::try_from(total.saturating_sub(self.bit_index)).unwrap_or(u32::MAX)
    }

    /// True once every bit up to the end of the current byte has been read
    pub fn is_exhausted(&self) -> bool {
        self.bits_remaining() < 8
    }

    fn ensure(&self, wanted_bits: u32) -> Result<(), SerdeErr> {
        let remaining_bits = self.bits_remaining();
        if remaining_bits < wanted_bits {
            return Err(SerdeErr::UnexpectedEnd {
                wanted_bits,
                remaining_bits,
            });
        }
        Ok(())
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        self.ensure(1)?;
        let byte = self.buffer[self.bit_index / 8];
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        self.ensure(8)?;
        let mut output: u8 = 0;
        for i in 0..8 {
            if self.read_bit()? {
                output |= 1 << i;
            }
        }
        Ok(output)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        let wanted_bits = u32::try_from(count.saturating_mul(8)).unwrap_or(u32::MAX);
        self.ensure(wanted_bits)?;
        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }
}
