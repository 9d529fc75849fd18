//! Locating the server info message inside the signon section.
//!
//! Signon packets carry a sequence of net messages, each a 6-bit type
//! followed by a type-specific body. Only the leading simple messages are
//! understood; the walk of a packet ends at the first unknown type.

use bitstream::{BitReader, CursorResult};
use wire::{FrameKind, Limits, RawDemo};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;

const MESSAGE_TYPE_BITS: u8 = 6;

const NET_NOP: u32 = 0;
const NET_DISCONNECT: u32 = 1;
const NET_FILE: u32 = 2;
const NET_TICK: u32 = 3;
const NET_STRING_CMD: u32 = 4;
const NET_SET_CONVAR: u32 = 5;
const NET_SIGNON_STATE: u32 = 6;
const SVC_PRINT: u32 = 7;
const SVC_SERVER_INFO: u32 = 8;

/// Server info protocols from here on carry a map MD5 instead of a CRC.
const MAP_MD5_PROTOCOL: u16 = 18;

/// The fixed prefix of the server info message, up to the player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerInfo {
    pub protocol: u16,
    pub server_count: u32,
    /// Set for spectator (SourceTV) recordings, which play back with a free camera.
    pub is_hltv: bool,
    pub is_dedicated: bool,
    pub client_crc: u32,
    pub max_classes: u16,
    /// Slot of the recording player; playback binds the local view to it.
    pub player_slot: u8,
    /// Absolute LSB-first bit position of `is_hltv` in the demo buffer.
    pub hltv_bit: usize,
    /// Absolute LSB-first bit position of the first bit of `player_slot`.
    pub player_slot_bit: usize,
}

/// Finds the first server info message in the signon section.
///
/// Returns `None` when no signon packet carries one, which includes every
/// protocol 4 demo.
pub fn find_server_info(
    demo: &RawDemo<'_>,
    wire_limits: &Limits,
    limits: &CodecLimits,
) -> CodecResult<Option<ServerInfo>> {
    if demo.layout.has_player_slot() {
        return Ok(None);
    }
    let buf = demo.bytes();
    for frame in demo.signon_frames(wire_limits) {
        let frame = frame?;
        if !matches!(frame.kind, FrameKind::Signon | FrameKind::Packet) {
            continue;
        }
        let Some(data) = frame.data else { continue };
        let payload = data.slice(buf)?;
        if let Some(info) = scan_packet(payload, data.start * 8, limits)? {
            return Ok(Some(info));
        }
    }
    Ok(None)
}

fn scan_packet(
    payload: &[u8],
    base_bit: usize,
    limits: &CodecLimits,
) -> CodecResult<Option<ServerInfo>> {
    let mut reader = BitReader::new(payload);
    let mut messages = 0usize;

    while reader.bits_remaining() >= usize::from(MESSAGE_TYPE_BITS) {
        if messages >= limits.max_signon_messages {
            return Err(CodecError::LimitsExceeded {
                kind: LimitKind::SignonMessages,
                limit: limits.max_signon_messages,
                actual: messages + 1,
            });
        }
        messages += 1;

        let Ok(kind) = reader.read_bits(MESSAGE_TYPE_BITS) else {
            break;
        };
        let step = match kind {
            SVC_SERVER_INFO => {
                return Ok(read_server_info(&mut reader, base_bit).ok());
            }
            NET_NOP => Ok(()),
            NET_DISCONNECT | NET_STRING_CMD | SVC_PRINT => {
                skip_string(&mut reader, limits.max_string_bytes)
            }
            NET_FILE => skip_file(&mut reader, limits.max_string_bytes),
            NET_TICK => reader.skip_bits(32 + 16 + 16),
            NET_SET_CONVAR => skip_convars(&mut reader, limits.max_string_bytes),
            NET_SIGNON_STATE => reader.skip_bits(8 + 32),
            _ => {
                tracing::trace!(kind, "unknown net message ends signon scan");
                break;
            }
        };
        if step.is_err() {
            tracing::trace!(kind, "net message ran past packet end");
            break;
        }
    }
    Ok(None)
}

fn read_server_info(reader: &mut BitReader<'_>, base_bit: usize) -> CursorResult<ServerInfo> {
    let protocol = reader.read_u16()?;
    let server_count = reader.read_u32()?;
    let hltv_bit = base_bit + reader.bit_position();
    let is_hltv = reader.read_bit()?;
    let is_dedicated = reader.read_bit()?;
    let client_crc = reader.read_u32()?;
    let max_classes = reader.read_u16()?;
    // map MD5, or map CRC on older servers
    if protocol >= MAP_MD5_PROTOCOL {
        reader.skip_bits(16 * 8)?;
    } else {
        reader.skip_bits(32)?;
    }
    let player_slot_bit = base_bit + reader.bit_position();
    let player_slot = reader.read_u8()?;
    Ok(ServerInfo {
        protocol,
        server_count,
        is_hltv,
        is_dedicated,
        client_crc,
        max_classes,
        player_slot,
        hltv_bit,
        player_slot_bit,
    })
}

fn skip_string(reader: &mut BitReader<'_>, max_len: usize) -> CursorResult<()> {
    reader.read_cstring(max_len).map(drop)
}

fn skip_file(reader: &mut BitReader<'_>, max_len: usize) -> CursorResult<()> {
    // transfer id, file name, requested flag
    reader.skip_bits(32)?;
    skip_string(reader, max_len)?;
    reader.skip_bits(1)
}

fn skip_convars(reader: &mut BitReader<'_>, max_len: usize) -> CursorResult<()> {
    let count = reader.read_u8()?;
    for _ in 0..count {
        skip_string(reader, max_len)?;
        skip_string(reader, max_len)?;
    }
    Ok(())
}
