//! Byte-level cursors over little-endian demo data.

use crate::error::{CursorError, CursorResult};

/// A sequential, bounds-checked reader over a byte slice.
///
/// All multi-byte integers are little-endian. Slices returned by the reader
/// borrow from the underlying buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader positioned at `pos`.
    ///
    /// Fails with [`CursorError::Overflow`] if `pos` lies past the end.
    pub const fn at(data: &'a [u8], pos: usize) -> CursorResult<Self> {
        if pos > data.len() {
            return Err(CursorError::Overflow {
                requested: pos,
                capacity: data.len(),
            });
        }
        Ok(Self { data, pos })
    }

    /// Returns the underlying buffer.
    #[must_use]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes left to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if no bytes are left.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reads `len` bytes as a borrowed slice.
    pub fn read_bytes(&mut self, len: usize) -> CursorResult<&'a [u8]> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Advances past `len` bytes.
    pub fn skip(&mut self, len: usize) -> CursorResult<()> {
        self.ensure(len)?;
        self.pos += len;
        Ok(())
    }

    pub fn read_u8(&mut self) -> CursorResult<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> CursorResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> CursorResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> CursorResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> CursorResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a signed 32-bit length field.
    ///
    /// Negative values fail with [`CursorError::Overflow`]. The length is not
    /// checked against the remaining bytes; callers decide how to report that.
    pub fn read_len(&mut self) -> CursorResult<usize> {
        let raw = self.read_i32()?;
        usize::try_from(raw).map_err(|_| CursorError::Overflow {
            requested: raw.unsigned_abs() as usize,
            capacity: self.remaining(),
        })
    }

    /// Reads a NUL-terminated string of at most `max_len` bytes (terminator excluded).
    ///
    /// The terminator is consumed but not returned.
    pub fn read_cstr(&mut self, max_len: usize) -> CursorResult<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let Some(end) = rest.iter().position(|&b| b == 0) else {
            return Err(CursorError::TruncatedInput {
                requested: rest.len() + 1,
                available: rest.len(),
            });
        };
        if end > max_len {
            return Err(CursorError::Overflow {
                requested: end,
                capacity: max_len,
            });
        }
        let out = &rest[..end];
        self.pos += end + 1;
        Ok(out)
    }

    const fn ensure(&self, len: usize) -> CursorResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(CursorError::TruncatedInput {
                requested: len,
                available,
            });
        }
        Ok(())
    }
}

/// A growable little-endian byte writer with in-place patching.
///
/// Writes append at the end. [`patch`](Self::patch) and
/// [`patch_bit`](Self::patch_bit) overwrite previously written bytes without
/// moving surrounding data.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written, which is also the next write offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes `bytes` into a fixed-width field, NUL-padding the remainder.
    pub fn write_fixed(&mut self, bytes: &[u8], width: usize) -> CursorResult<()> {
        if bytes.len() > width {
            return Err(CursorError::Overflow {
                requested: bytes.len(),
                capacity: width,
            });
        }
        self.bytes.extend_from_slice(bytes);
        self.bytes.resize(self.bytes.len() + (width - bytes.len()), 0);
        Ok(())
    }

    /// Writes a length-prefixed (`i32`) byte block.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) -> CursorResult<()> {
        let len = i32::try_from(bytes.len()).map_err(|_| CursorError::Overflow {
            requested: bytes.len(),
            capacity: i32::MAX as usize,
        })?;
        self.write_i32(len);
        self.write_bytes(bytes);
        Ok(())
    }

    /// Copies `len` bytes starting at `start` from `src` verbatim.
    pub fn append_region(&mut self, src: &[u8], start: usize, len: usize) -> CursorResult<()> {
        let end = start.checked_add(len).ok_or(CursorError::Overflow {
            requested: len,
            capacity: src.len(),
        })?;
        if end > src.len() {
            return Err(CursorError::TruncatedInput {
                requested: end,
                available: src.len(),
            });
        }
        self.bytes.extend_from_slice(&src[start..end]);
        Ok(())
    }

    /// Overwrites bytes at a previously written `offset`.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) -> CursorResult<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= self.bytes.len())
            .ok_or(CursorError::Overflow {
                requested: offset.saturating_add(bytes.len()),
                capacity: self.bytes.len(),
            })?;
        self.bytes[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrites a little-endian `u32` at `offset`.
    pub fn patch_u32(&mut self, offset: usize, value: u32) -> CursorResult<()> {
        self.patch(offset, &value.to_le_bytes())
    }

    /// Sets or clears a single bit at an absolute LSB-first bit position.
    pub fn patch_bit(&mut self, bit_position: usize, value: bool) -> CursorResult<()> {
        crate::set_bit(&mut self.bytes, bit_position, value)
    }

    /// Overwrites the low `bits` bits of `value` starting at an absolute
    /// LSB-first bit position. The field need not be byte aligned.
    pub fn patch_bits(&mut self, bit_position: usize, value: u32, bits: u8) -> CursorResult<()> {
        if bits > 32 {
            return Err(CursorError::InvalidBitCount { bits, max_bits: 32 });
        }
        let end = bit_position.saturating_add(usize::from(bits));
        let capacity = self.bytes.len().saturating_mul(8);
        if end > capacity {
            return Err(CursorError::Overflow {
                requested: end,
                capacity,
            });
        }
        for shift in 0..bits {
            crate::set_bit(
                &mut self.bytes,
                bit_position + usize::from(shift),
                (value >> shift) & 1 == 1,
            )?;
        }
        Ok(())
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_integers() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF, 0x34, 0x12];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_past_end_is_truncated() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        let err = reader.read_u32().unwrap_err();
        assert_eq!(
            err,
            CursorError::TruncatedInput {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(reader.position(), 0, "failed reads do not advance");
    }

    #[test]
    fn negative_length_is_overflow() {
        let data = (-5i32).to_le_bytes();
        let mut reader = ByteReader::new(&data);
        let err = reader.read_len().unwrap_err();
        assert!(matches!(err, CursorError::Overflow { requested: 5, .. }));
    }

    #[test]
    fn read_cstr_consumes_terminator() {
        let mut reader = ByteReader::new(b"abc\0de\0");
        assert_eq!(reader.read_cstr(16).unwrap(), b"abc");
        assert_eq!(reader.read_cstr(16).unwrap(), b"de");
        assert!(reader.is_empty());
    }

    #[test]
    fn read_cstr_without_terminator_fails() {
        let mut reader = ByteReader::new(b"abc");
        assert!(matches!(
            reader.read_cstr(16),
            Err(CursorError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn read_cstr_respects_max_len() {
        let mut reader = ByteReader::new(b"abcdef\0");
        assert!(matches!(
            reader.read_cstr(3),
            Err(CursorError::Overflow {
                requested: 6,
                capacity: 3
            })
        ));
    }

    #[test]
    fn at_rejects_out_of_range_position() {
        assert!(ByteReader::at(&[0u8; 4], 4).is_ok());
        assert!(ByteReader::at(&[0u8; 4], 5).is_err());
    }

    #[test]
    fn write_fixed_pads_with_nul() {
        let mut writer = ByteWriter::new();
        writer.write_fixed(b"hi", 5).unwrap();
        assert_eq!(writer.finish(), b"hi\0\0\0");
    }

    #[test]
    fn write_fixed_rejects_oversized_field() {
        let mut writer = ByteWriter::new();
        assert!(writer.write_fixed(b"toolong", 3).is_err());
    }

    #[test]
    fn patch_overwrites_in_place() {
        let mut writer = ByteWriter::new();
        writer.write_u32(0);
        writer.write_u8(9);
        writer.patch_u32(0, 0xAABB_CCDD).unwrap();
        assert_eq!(writer.finish(), vec![0xDD, 0xCC, 0xBB, 0xAA, 9]);
    }

    #[test]
    fn patch_past_end_is_overflow() {
        let mut writer = ByteWriter::new();
        writer.write_u8(0);
        assert!(matches!(
            writer.patch(0, &[1, 2]),
            Err(CursorError::Overflow { .. })
        ));
    }

    #[test]
    fn append_region_copies_verbatim() {
        let src = [1u8, 2, 3, 4, 5];
        let mut writer = ByteWriter::with_capacity(8);
        writer.append_region(&src, 1, 3).unwrap();
        assert_eq!(writer.as_slice(), &[2, 3, 4]);
        assert!(writer.append_region(&src, 4, 2).is_err());
    }

    #[test]
    fn patch_bit_is_lsb_first() {
        let mut writer = ByteWriter::new();
        writer.write_bytes(&[0, 0]);
        writer.patch_bit(9, true).unwrap();
        assert_eq!(writer.as_slice(), &[0, 0b0000_0010]);
        writer.patch_bit(9, false).unwrap();
        assert_eq!(writer.as_slice(), &[0, 0]);
    }

    #[test]
    fn patch_bits_spans_byte_boundary() {
        let mut writer = ByteWriter::new();
        writer.write_bytes(&[0xFF, 0xFF]);
        writer.patch_bits(4, 0, 8).unwrap();
        assert_eq!(writer.as_slice(), &[0x0F, 0xF0]);
        writer.patch_bits(4, 0xA5, 8).unwrap();
        assert_eq!(writer.as_slice(), &[0x5F, 0xFA]);
        assert!(matches!(
            writer.patch_bits(12, 0, 8),
            Err(CursorError::Overflow {
                requested: 20,
                capacity: 16
            })
        ));
        assert_eq!(writer.as_slice(), &[0x5F, 0xFA]);
    }
}
