//! User command payload decoding.
//!
//! A user command is a bit-packed, LSB-first record. Every field is preceded
//! by a presence bit. Demo commands are coded against a null command, so an
//! absent field takes its default value.

use std::fmt;

use bitstream::{BitReader, CursorResult};

use crate::error::InputReason;

/// Button bitmask carried by a user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Buttons(u32);

impl Buttons {
    pub const ATTACK: u32 = 1 << 0;
    pub const JUMP: u32 = 1 << 1;
    pub const DUCK: u32 = 1 << 2;
    pub const FORWARD: u32 = 1 << 3;
    pub const BACK: u32 = 1 << 4;
    pub const USE: u32 = 1 << 5;
    pub const CANCEL: u32 = 1 << 6;
    pub const LEFT: u32 = 1 << 7;
    pub const RIGHT: u32 = 1 << 8;
    pub const MOVE_LEFT: u32 = 1 << 9;
    pub const MOVE_RIGHT: u32 = 1 << 10;
    pub const ATTACK2: u32 = 1 << 11;
    pub const RUN: u32 = 1 << 12;
    pub const RELOAD: u32 = 1 << 13;
    pub const ALT1: u32 = 1 << 14;
    pub const ALT2: u32 = 1 << 15;
    pub const SCORE: u32 = 1 << 16;
    pub const SPEED: u32 = 1 << 17;
    pub const WALK: u32 = 1 << 18;
    pub const ZOOM: u32 = 1 << 19;
    pub const WEAPON1: u32 = 1 << 20;
    pub const WEAPON2: u32 = 1 << 21;
    pub const BULLRUSH: u32 = 1 << 22;
    pub const GRENADE1: u32 = 1 << 23;
    pub const GRENADE2: u32 = 1 << 24;
    pub const ATTACK3: u32 = 1 << 25;

    const NAMES: [(u32, &'static str); 26] = [
        (Self::ATTACK, "attack"),
        (Self::JUMP, "jump"),
        (Self::DUCK, "duck"),
        (Self::FORWARD, "forward"),
        (Self::BACK, "back"),
        (Self::USE, "use"),
        (Self::CANCEL, "cancel"),
        (Self::LEFT, "left"),
        (Self::RIGHT, "right"),
        (Self::MOVE_LEFT, "moveleft"),
        (Self::MOVE_RIGHT, "moveright"),
        (Self::ATTACK2, "attack2"),
        (Self::RUN, "run"),
        (Self::RELOAD, "reload"),
        (Self::ALT1, "alt1"),
        (Self::ALT2, "alt2"),
        (Self::SCORE, "score"),
        (Self::SPEED, "speed"),
        (Self::WALK, "walk"),
        (Self::ZOOM, "zoom"),
        (Self::WEAPON1, "weapon1"),
        (Self::WEAPON2, "weapon2"),
        (Self::BULLRUSH, "bullrush"),
        (Self::GRENADE1, "grenade1"),
        (Self::GRENADE2, "grenade2"),
        (Self::ATTACK3, "attack3"),
    ];

    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `mask` is pressed.
    #[must_use]
    pub const fn contains(self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Names of the pressed buttons, lowest bit first. Unnamed bits are skipped.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |&(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| name)
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in self.names() {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(name)?;
            first = false;
        }
        if first {
            f.write_str("-")?;
        }
        Ok(())
    }
}

/// A fully resolved user command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserCmd {
    pub command_number: u32,
    pub tick_count: u32,
    /// Pitch, yaw, roll in degrees.
    pub view_angles: [f32; 3],
    pub forward_move: f32,
    pub side_move: f32,
    pub up_move: f32,
    pub buttons: Buttons,
    pub impulse: u8,
    /// 11-bit weapon entity index.
    pub weapon_select: u16,
    /// 6-bit weapon subtype.
    pub weapon_subtype: u8,
    pub mouse_dx: i16,
    pub mouse_dy: i16,
}

/// Decodes one user command, delta-coded against `baseline`.
///
/// Demo frames always use `UserCmd::default()` as the baseline. An absent
/// command number or tick count is the baseline value plus one.
pub fn decode_user_cmd(data: &[u8], baseline: &UserCmd) -> Result<UserCmd, InputReason> {
    let mut reader = BitReader::new(data);
    let mut cmd = UserCmd {
        command_number: baseline.command_number.wrapping_add(1),
        tick_count: baseline.tick_count.wrapping_add(1),
        ..*baseline
    };

    read_field(&mut reader, "command number", &mut cmd.command_number, BitReader::read_u32)?;
    read_field(&mut reader, "tick count", &mut cmd.tick_count, BitReader::read_u32)?;
    for angle in &mut cmd.view_angles {
        read_field(&mut reader, "view angle", angle, BitReader::read_f32)?;
    }
    read_field(&mut reader, "forward move", &mut cmd.forward_move, BitReader::read_f32)?;
    read_field(&mut reader, "side move", &mut cmd.side_move, BitReader::read_f32)?;
    read_field(&mut reader, "up move", &mut cmd.up_move, BitReader::read_f32)?;

    let mut buttons = cmd.buttons.raw();
    read_field(&mut reader, "buttons", &mut buttons, BitReader::read_u32)?;
    cmd.buttons = Buttons::from_raw(buttons);

    read_field(&mut reader, "impulse", &mut cmd.impulse, BitReader::read_u8)?;

    if present(&mut reader, "weapon select")? {
        cmd.weapon_select = bits(&mut reader, "weapon select", 11)? as u16;
        if present(&mut reader, "weapon subtype")? {
            cmd.weapon_subtype = bits(&mut reader, "weapon subtype", 6)? as u8;
        }
    }

    read_field(&mut reader, "mouse dx", &mut cmd.mouse_dx, BitReader::read_i16)?;
    read_field(&mut reader, "mouse dy", &mut cmd.mouse_dy, BitReader::read_i16)?;

    Ok(cmd)
}

fn read_field<'a, T>(
    reader: &mut BitReader<'a>,
    field: &'static str,
    slot: &mut T,
    read: fn(&mut BitReader<'a>) -> CursorResult<T>,
) -> Result<(), InputReason> {
    if present(reader, field)? {
        *slot = read(reader).map_err(|_| InputReason::OutOfBits { field })?;
    }
    Ok(())
}

fn present(reader: &mut BitReader<'_>, field: &'static str) -> Result<bool, InputReason> {
    reader
        .read_bit()
        .map_err(|_| InputReason::OutOfBits { field })
}

fn bits(reader: &mut BitReader<'_>, field: &'static str, count: u8) -> Result<u32, InputReason> {
    reader
        .read_bits(count)
        .map_err(|_| InputReason::OutOfBits { field })
}
