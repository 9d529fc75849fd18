//! Per-tick input records recovered from user command frames.

use std::collections::BTreeMap;

use wire::{frame_stream, FrameDescriptor, FrameKind, FrameStream, Limits};

use crate::error::{CodecError, CodecResult, InputReason};
use crate::limits::CodecLimits;
use crate::usercmd::{decode_user_cmd, Buttons, UserCmd};

/// Player input at one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputRecord {
    pub tick: u32,
    /// Split-screen slot; always 0 in protocol 3.
    pub player_slot: u8,
    pub buttons: Buttons,
    pub forward_move: f32,
    pub side_move: f32,
    pub up_move: f32,
    pub view_angles: [f32; 3],
    pub mouse_dx: i16,
    pub mouse_dy: i16,
}

impl InputRecord {
    fn new(tick: u32, player_slot: u8, cmd: &UserCmd) -> Self {
        Self {
            tick,
            player_slot,
            buttons: cmd.buttons,
            forward_move: cmd.forward_move,
            side_move: cmd.side_move,
            up_move: cmd.up_move,
            view_angles: cmd.view_angles,
            mouse_dx: cmd.mouse_dx,
            mouse_dy: cmd.mouse_dy,
        }
    }
}

/// Extracts per-tick player input with default limits.
pub fn extract_buttons(bytes: &[u8]) -> CodecResult<Vec<InputRecord>> {
    extract_buttons_with_limits(bytes, &Limits::default(), &CodecLimits::default())
}

/// Extracts per-tick player input from every user command frame.
///
/// Demos without user commands yield an empty list.
pub fn extract_buttons_with_limits(
    bytes: &[u8],
    wire_limits: &Limits,
    limits: &CodecLimits,
) -> CodecResult<Vec<InputRecord>> {
    let (_, frames) = frame_stream(bytes, wire_limits)?;
    collect_inputs(bytes, frames, limits)
}

/// Decodes every user command in `frames` into input records.
///
/// Each command is decoded against a null command, independent of the
/// commands before it. Records are keyed by `(tick, slot)`; a later command
/// for the same key replaces an earlier one. The result is in ascending tick
/// order.
pub(crate) fn collect_inputs(
    buf: &[u8],
    frames: FrameStream<'_>,
    limits: &CodecLimits,
) -> CodecResult<Vec<InputRecord>> {
    let mut records: BTreeMap<(u32, u8), InputRecord> = BTreeMap::new();

    for frame in frames {
        let frame = frame?;
        if frame.kind != FrameKind::UserCmd {
            continue;
        }
        let slot = frame.player_slot.unwrap_or(0);
        let cmd = decode_frame(buf, &frame, limits)?;
        records.insert((frame.tick.raw(), slot), InputRecord::new(frame.tick.raw(), slot, &cmd));
    }

    tracing::debug!(records = records.len(), "extracted input records");
    Ok(records.into_values().collect())
}

fn decode_frame(
    buf: &[u8],
    frame: &FrameDescriptor,
    limits: &CodecLimits,
) -> CodecResult<UserCmd> {
    let Some(data) = frame.data else {
        return Ok(UserCmd::default());
    };
    if data.len > limits.max_user_cmd_bytes {
        return Err(CodecError::MalformedInput {
            offset: frame.offset,
            reason: InputReason::TooLong {
                len: data.len,
                max: limits.max_user_cmd_bytes,
            },
        });
    }
    let payload = data.slice(buf)?;
    decode_user_cmd(payload, &UserCmd::default()).map_err(|reason| CodecError::MalformedInput {
        offset: frame.offset,
        reason,
    })
}
