//! Bounds-checked cursors for the demedit demo engine.
//!
//! This crate provides [`ByteReader`] and [`ByteWriter`] for the little-endian,
//! byte-aligned container layout of a demo file, and [`BitReader`] and
//! [`BitWriter`] for the LSB-first bit packing used inside frame payloads.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads/writes are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about frames, headers, or user commands.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! ```

mod bytes;
mod error;
mod reader;
mod writer;

pub use bytes::{ByteReader, ByteWriter};
pub use error::{CursorError, CursorResult};
pub use reader::BitReader;
pub use writer::BitWriter;

/// Sets or clears a single bit in `data`, addressed LSB-first.
///
/// Bit `n` lives in byte `n / 8` at position `n % 8`, the same order
/// [`BitReader`] consumes bits in.
///
/// # Errors
///
/// Returns [`CursorError::Overflow`] if `bit` is past the end of `data`.
pub fn set_bit(data: &mut [u8], bit: usize, value: bool) -> CursorResult<()> {
    let capacity = data.len().saturating_mul(8);
    let Some(byte) = data.get_mut(bit / 8) else {
        return Err(CursorError::Overflow {
            requested: bit + 1,
            capacity,
        });
    };
    let mask = 1u8 << (bit % 8);
    if value {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = BitWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = BitReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(0b1010, 4).unwrap();
        writer.write_bit(false);
        writer.write_u8(0xFF);
        writer.write_bits(42, 7).unwrap();
        writer.write_f32(-0.25);
        writer.write_i16(-1234);
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(4).unwrap(), 0b1010);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.read_bits(7).unwrap(), 42);
        assert_eq!(reader.read_f32().unwrap().to_bits(), (-0.25f32).to_bits());
        assert_eq!(reader.read_i16().unwrap(), -1234);
    }

    #[test]
    fn set_bit_flips_only_target() {
        let mut data = [0u8; 2];
        set_bit(&mut data, 9, true).unwrap();
        assert_eq!(data, [0x00, 0x02]);
        set_bit(&mut data, 0, true).unwrap();
        set_bit(&mut data, 9, false).unwrap();
        assert_eq!(data, [0x01, 0x00]);
    }

    #[test]
    fn set_bit_past_end_fails() {
        let mut data = [0u8; 1];
        assert!(matches!(
            set_bit(&mut data, 8, true),
            Err(CursorError::Overflow {
                requested: 9,
                capacity: 8
            })
        ));
    }

    #[test]
    fn set_bit_is_visible_to_reader() {
        let mut writer = BitWriter::new();
        writer.write_u16(0x1234);
        writer.write_bit(false);
        let mut bytes = writer.finish();
        set_bit(&mut bytes, 16, true).unwrap();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert!(reader.read_bit().unwrap());
    }
}
