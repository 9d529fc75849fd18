//! Command-line tooling for the demedit demo engine.
//!
//! This crate provides the pieces behind the `demedit` binary:
//!
//! - Summarize a demo's header, frame kinds and camera lock state
//! - Render extracted player input as a table
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what the editor will touch.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use codec::{
    decode_cmd_info_block, find_server_info, CodecLimits, CodecResult, InputRecord, WireLimits,
};
use serde::Serialize;
use wire::{decode_demo, FrameKind};

/// Everything `demedit inspect` reports about one demo.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub demo_protocol: i32,
    pub network_protocol: i32,
    pub server_name: String,
    pub client_name: String,
    pub map_name: String,
    pub game_directory: String,
    pub playback_time: f32,
    /// Tick count as declared by the header.
    pub declared_ticks: i32,
    pub declared_frames: i32,
    pub signon_bytes: usize,
    pub signon_frames: usize,
    /// Highest tick in the frame stream.
    pub ticks: u32,
    pub frames: usize,
    pub has_stop: bool,
    pub trailer_bytes: usize,
    pub kinds: Vec<KindSummary>,
    /// Packets whose command info pins the camera.
    pub locked_packets: usize,
    pub server_info: Option<ServerInfoSummary>,
}

/// Per-kind frame totals.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: &'static str,
    pub count: usize,
    /// Frame bytes including the tag, tick and slot prefix.
    pub bytes: usize,
    pub first_tick: u32,
    pub last_tick: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ServerInfoSummary {
    pub protocol: u16,
    pub server_count: u32,
    pub is_hltv: bool,
    pub is_dedicated: bool,
    pub max_classes: u16,
    pub player_slot: u8,
}

/// Builds an [`InspectReport`] for a demo buffer.
pub fn inspect_demo(
    bytes: &[u8],
    wire_limits: &WireLimits,
    limits: &CodecLimits,
) -> CodecResult<InspectReport> {
    let demo = decode_demo(bytes, wire_limits)?;

    let mut signon_frames = 0;
    for frame in demo.signon_frames(wire_limits) {
        frame?;
        signon_frames += 1;
    }

    let mut kinds: BTreeMap<FrameKind, KindSummary> = BTreeMap::new();
    let mut locked_packets = 0;
    for frame in &demo.frames {
        let tick = frame.tick.raw();
        let entry = kinds.entry(frame.kind).or_insert(KindSummary {
            kind: frame.kind.name(),
            count: 0,
            bytes: 0,
            first_tick: tick,
            last_tick: tick,
        });
        entry.count += 1;
        entry.bytes += frame.span().len;
        entry.first_tick = entry.first_tick.min(tick);
        entry.last_tick = entry.last_tick.max(tick);

        if frame.kind == FrameKind::Packet {
            if let Some(info) = frame.cmd_info {
                let slots = decode_cmd_info_block(info.slice(bytes)?)?;
                if slots.iter().any(|slot| slot.flags.locks_view()) {
                    locked_packets += 1;
                }
            }
        }
    }

    let server_info = find_server_info(&demo, wire_limits, limits)?.map(|info| ServerInfoSummary {
        protocol: info.protocol,
        server_count: info.server_count,
        is_hltv: info.is_hltv,
        is_dedicated: info.is_dedicated,
        max_classes: info.max_classes,
        player_slot: info.player_slot,
    });

    let header = demo.header;
    Ok(InspectReport {
        demo_protocol: header.demo_protocol,
        network_protocol: header.network_protocol,
        server_name: header.server_name_str(),
        client_name: header.client_name_str(),
        map_name: header.map_name_str(),
        game_directory: header.game_directory_str(),
        playback_time: header.playback_time,
        declared_ticks: header.playback_ticks,
        declared_frames: header.playback_frames,
        signon_bytes: demo.signon.len,
        signon_frames,
        ticks: demo.max_tick().raw(),
        frames: demo.frames.len(),
        has_stop: demo.has_stop(),
        trailer_bytes: demo.trailer.len,
        kinds: kinds.into_values().collect(),
        locked_packets,
        server_info,
    })
}

/// Renders input records as an aligned text table, one row per record.
pub fn format_buttons_pretty(records: &[InputRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>8} {:>4} {:>9} {:>9} {:>9} {:>8} {:>8} {:>6} {:>6}  buttons",
        "tick", "slot", "forward", "side", "up", "pitch", "yaw", "mdx", "mdy"
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:>8} {:>4} {:>9.1} {:>9.1} {:>9.1} {:>8.2} {:>8.2} {:>6} {:>6}  {}",
            record.tick,
            record.player_slot,
            record.forward_move,
            record.side_move,
            record.up_move,
            record.view_angles[0],
            record.view_angles[1],
            record.mouse_dx,
            record.mouse_dy,
            record.buttons,
        );
    }
    out
}
