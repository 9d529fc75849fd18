//! Bit-level reader with bounded operations.

use crate::error::{CursorError, CursorResult};

/// A bit-level reader for decoding packed binary data.
///
/// Bits are consumed least-significant first within each byte, and multi-bit
/// values are assembled least-significant bit first. All read operations are
/// bounds-checked and the reader never panics on malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
    bit_len: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over all bits of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_pos: 0,
            bit_len: data.len().saturating_mul(8),
        }
    }

    /// Creates a reader limited to the first `bit_len` bits of `data`.
    pub const fn with_bit_len(data: &'a [u8], bit_len: usize) -> CursorResult<Self> {
        let capacity = data.len().saturating_mul(8);
        if bit_len > capacity {
            return Err(CursorError::Overflow {
                requested: bit_len,
                capacity,
            });
        }
        Ok(Self {
            data,
            bit_pos: 0,
            bit_len,
        })
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.bit_len.saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> CursorResult<bool> {
        self.ensure_bits(1)?;
        let byte = self.data[self.bit_pos / 8];
        let bit = (byte >> (self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 32 bits as an unsigned integer.
    pub fn read_bits(&mut self, bits: u8) -> CursorResult<u32> {
        if bits > 32 {
            return Err(CursorError::InvalidBitCount { bits, max_bits: 32 });
        }
        self.ensure_bits(bits as usize)?;

        let mut value = 0u32;
        for shift in 0..bits {
            value |= u32::from(self.read_bit()?) << shift;
        }
        Ok(value)
    }

    /// Skips `bits` bits.
    pub fn skip_bits(&mut self, bits: usize) -> CursorResult<()> {
        self.ensure_bits(bits)?;
        self.bit_pos += bits;
        Ok(())
    }

    pub fn read_u8(&mut self) -> CursorResult<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    pub fn read_u16(&mut self) -> CursorResult<u16> {
        Ok(self.read_bits(16)? as u16)
    }

    pub fn read_i16(&mut self) -> CursorResult<i16> {
        Ok(self.read_bits(16)? as u16 as i16)
    }

    pub fn read_u32(&mut self) -> CursorResult<u32> {
        self.read_bits(32)
    }

    /// Reads an IEEE-754 single-precision float stored as 32 raw bits.
    pub fn read_f32(&mut self) -> CursorResult<f32> {
        Ok(f32::from_bits(self.read_bits(32)?))
    }

    /// Reads a NUL-terminated byte string of at most `max_len` bytes.
    ///
    /// The terminator is consumed but not returned.
    pub fn read_cstring(&mut self, max_len: usize) -> CursorResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let byte = self.read_u8()?;
            if byte == 0 {
                return Ok(out);
            }
            if out.len() == max_len {
                return Err(CursorError::Overflow {
                    requested: max_len + 1,
                    capacity: max_len,
                });
            }
            out.push(byte);
        }
    }

    const fn ensure_bits(&self, bits: usize) -> CursorResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(CursorError::TruncatedInput {
                requested: bits,
                available,
            });
        }
        Ok(())
    }
}
