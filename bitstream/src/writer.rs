//! Bit-level writer for encoding packed binary data.

use crate::error::{CursorError, CursorResult};

/// A bit-level writer for encoding packed binary data.
///
/// Bit order mirrors [`BitReader`](crate::BitReader): least-significant bit
/// first within each byte. Call [`finish`](Self::finish) to get the final
/// byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Completed bytes plus the partially filled trailing byte.
    bytes: Vec<u8>,
    /// Total number of bits written.
    bit_len: usize,
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit_len
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) {
        let shift = self.bit_len % 8;
        if shift == 0 {
            self.bytes.push(0);
        }
        if value {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 1 << shift;
            }
        }
        self.bit_len += 1;
    }

    /// Writes the low `bits` bits of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::InvalidBitCount`] if `bits > 32`.
    /// Returns [`CursorError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u32, bits: u8) -> CursorResult<()> {
        if bits > 32 {
            return Err(CursorError::InvalidBitCount { bits, max_bits: 32 });
        }
        if bits < 32 && u64::from(value) >= (1u64 << bits) {
            return Err(CursorError::ValueOutOfRange {
                value: u64::from(value),
                bits,
            });
        }
        for shift in 0..bits {
            self.write_bit((value >> shift) & 1 == 1);
        }
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) {
        self.write_value(u32::from(value), 8);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_value(u32::from(value), 16);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_value(u32::from(value as u16), 16);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_value(value, 32);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_value(value.to_bits(), 32);
    }

    /// Writes the bytes of `value` followed by a NUL terminator.
    pub fn write_cstring(&mut self, value: &[u8]) {
        for &byte in value {
            self.write_u8(byte);
        }
        self.write_u8(0);
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// If the last byte is incomplete, its unused high bits are zero.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    fn write_value(&mut self, value: u32, bits: u8) {
        for shift in 0..bits {
            self.write_bit((value >> shift) & 1 == 1);
        }
    }
}
