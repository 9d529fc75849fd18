//! Bit-packed user command encoding.

use bitstream::BitWriter;

/// Fields of one user command; `None` leaves the field absent so the reader
/// falls back to the null command's value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CmdFields {
    pub command_number: Option<u32>,
    pub tick_count: Option<u32>,
    pub view_angles: [Option<f32>; 3],
    pub forward_move: Option<f32>,
    pub side_move: Option<f32>,
    pub up_move: Option<f32>,
    pub buttons: Option<u32>,
    pub impulse: Option<u8>,
    /// 11-bit weapon index with an optional 6-bit subtype.
    pub weapon: Option<(u16, Option<u8>)>,
    pub mouse_dx: Option<i16>,
    pub mouse_dy: Option<i16>,
}

impl CmdFields {
    /// A command that only sets the button mask.
    #[must_use]
    pub fn buttons(mask: u32) -> Self {
        Self {
            buttons: Some(mask),
            ..Self::default()
        }
    }

    /// Encodes the command as an LSB-first bit stream padded to whole bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bits = BitWriter::with_capacity(32);
        field(&mut bits, self.command_number, BitWriter::write_u32);
        field(&mut bits, self.tick_count, BitWriter::write_u32);
        for angle in self.view_angles {
            field(&mut bits, angle, BitWriter::write_f32);
        }
        field(&mut bits, self.forward_move, BitWriter::write_f32);
        field(&mut bits, self.side_move, BitWriter::write_f32);
        field(&mut bits, self.up_move, BitWriter::write_f32);
        field(&mut bits, self.buttons, BitWriter::write_u32);
        field(&mut bits, self.impulse, BitWriter::write_u8);

        match self.weapon {
            Some((select, subtype)) => {
                bits.write_bit(true);
                write_masked(&mut bits, u32::from(select), 11);
                match subtype {
                    Some(subtype) => {
                        bits.write_bit(true);
                        write_masked(&mut bits, u32::from(subtype), 6);
                    }
                    None => bits.write_bit(false),
                }
            }
            None => bits.write_bit(false),
        }

        field(&mut bits, self.mouse_dx, BitWriter::write_i16);
        field(&mut bits, self.mouse_dy, BitWriter::write_i16);
        bits.finish()
    }
}

fn field<T>(bits: &mut BitWriter, value: Option<T>, write: fn(&mut BitWriter, T)) {
    match value {
        Some(value) => {
            bits.write_bit(true);
            write(bits, value);
        }
        None => bits.write_bit(false),
    }
}

fn write_masked(bits: &mut BitWriter, value: u32, count: u8) {
    // Masking keeps the value in range, so this cannot fail.
    let _ = bits.write_bits(value & ((1 << count) - 1), count);
}
