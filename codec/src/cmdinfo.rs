//! Command info: the per-packet camera block that pins playback to the
//! recorded viewpoint.

use bitstream::{ByteReader, ByteWriter, CursorResult};
use wire::CMD_INFO_SLOT_SIZE;

/// Command info flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CmdInfoFlags(i32);

impl CmdInfoFlags {
    /// Playback uses `view_origin2` instead of the interpolated origin.
    pub const USE_ORIGIN2: i32 = 1 << 0;
    /// Playback uses `view_angles2` instead of the interpolated angles.
    pub const USE_ANGLES2: i32 = 1 << 1;
    pub const NOINTERP: i32 = 1 << 2;

    /// Flags that lock the camera to the recorded view.
    const VIEW_LOCK: i32 = Self::USE_ORIGIN2 | Self::USE_ANGLES2;

    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns `true` if either view override flag is set.
    #[must_use]
    pub const fn locks_view(self) -> bool {
        self.0 & Self::VIEW_LOCK != 0
    }
}

/// One split-screen slot of command info.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CmdInfo {
    pub flags: CmdInfoFlags,
    pub view_origin: [f32; 3],
    pub view_angles: [f32; 3],
    pub local_view_angles: [f32; 3],
    pub view_origin2: [f32; 3],
    pub view_angles2: [f32; 3],
    pub local_view_angles2: [f32; 3],
}

impl CmdInfo {
    /// Reads one slot.
    pub fn decode(reader: &mut ByteReader<'_>) -> CursorResult<Self> {
        let flags = CmdInfoFlags::from_raw(reader.read_i32()?);
        Ok(Self {
            flags,
            view_origin: read_vector(reader)?,
            view_angles: read_vector(reader)?,
            local_view_angles: read_vector(reader)?,
            view_origin2: read_vector(reader)?,
            view_angles2: read_vector(reader)?,
            local_view_angles2: read_vector(reader)?,
        })
    }

    /// Writes one slot, exactly [`CMD_INFO_SLOT_SIZE`] bytes.
    pub fn encode(&self, out: &mut ByteWriter) {
        out.write_i32(self.flags.raw());
        for vector in [
            self.view_origin,
            self.view_angles,
            self.local_view_angles,
            self.view_origin2,
            self.view_angles2,
            self.local_view_angles2,
        ] {
            for component in vector {
                out.write_f32(component);
            }
        }
    }

    /// Clears the view override flags and zeroes every view vector.
    ///
    /// Zeroing the vectors alone leaves the flags pointing playback at the
    /// zeroed `*2` vectors; clearing `USE_ORIGIN2`/`USE_ANGLES2` too hands the
    /// camera back to the viewer. Other flag bits such as `NOINTERP` are kept.
    pub fn neutralize(&mut self) {
        *self = Self {
            flags: CmdInfoFlags::from_raw(self.flags.raw() & !CmdInfoFlags::VIEW_LOCK),
            ..Self::default()
        };
    }

    /// Returns `true` if [`neutralize`](Self::neutralize) would change nothing.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        let mut neutral = *self;
        neutral.neutralize();
        neutral == *self
    }
}

fn read_vector(reader: &mut ByteReader<'_>) -> CursorResult<[f32; 3]> {
    Ok([reader.read_f32()?, reader.read_f32()?, reader.read_f32()?])
}

/// Decodes every slot of a command info block.
pub fn decode_cmd_info_block(block: &[u8]) -> CursorResult<Vec<CmdInfo>> {
    let mut reader = ByteReader::new(block);
    let mut slots = Vec::with_capacity(block.len() / CMD_INFO_SLOT_SIZE);
    while !reader.is_empty() {
        slots.push(CmdInfo::decode(&mut reader)?);
    }
    Ok(slots)
}

/// Writes a neutralized copy of a command info block.
pub fn write_neutralized_block(block: &[u8], out: &mut ByteWriter) -> CursorResult<()> {
    for mut slot in decode_cmd_info_block(block)? {
        slot.neutralize();
        slot.encode(out);
    }
    Ok(())
}
