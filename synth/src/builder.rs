//! Frame-by-frame demo construction.

use bitstream::{BitWriter, ByteWriter};
use wire::{
    encode_header, text_field, write_frame, write_payload, DemoHeader, DemoTick, EncodeError,
    FrameKind, FrameLayout, WireResult,
};

use crate::cmd::CmdFields;

/// Seconds per tick written into headers.
pub const TICK_INTERVAL: f64 = 0.015;

/// Player slot the synthetic recorder occupies in its server info.
pub const RECORDER_SLOT: u8 = 3;

const NET_TICK: u32 = 3;
const SVC_SERVER_INFO: u32 = 8;

const CMD_INFO_LOCKED: i32 = 0b11;

/// Builds a demo one frame at a time.
///
/// Frames go into the post-signon stream in call order; `signon_*` methods
/// append to the signon section instead. The header's signon length, tick
/// count, duration and frame count are filled in by [`finish`](Self::finish).
#[derive(Debug)]
pub struct DemoBuilder {
    layout: FrameLayout,
    header: DemoHeader,
    signon: ByteWriter,
    frames: ByteWriter,
    frame_count: usize,
    max_tick: u32,
    declared_ticks: Option<u32>,
    user_cmd_sequence: i32,
    trailer: Vec<u8>,
    error: Option<EncodeError>,
}

impl DemoBuilder {
    /// Starts a demo for `protocol`, which must be 3 or 4.
    pub fn new(protocol: i32) -> WireResult<Self> {
        let layout = FrameLayout::for_protocol(protocol)?;
        let network_protocol = if layout.has_player_slot() { 13_000 } else { 24 };
        let mut header = DemoHeader::new(protocol, network_protocol);
        header.server_name = text_field("synth server");
        header.client_name = text_field("demedit");
        header.map_name = text_field("de_synth");
        header.game_directory = text_field("cstrike");
        Ok(Self {
            layout,
            header,
            signon: ByteWriter::new(),
            frames: ByteWriter::with_capacity(4096),
            frame_count: 0,
            max_tick: 0,
            declared_ticks: None,
            user_cmd_sequence: 0,
            trailer: Vec::new(),
            error: None,
        })
    }

    #[must_use]
    pub const fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Header fields written as-is apart from the lengths and counts.
    pub fn header_mut(&mut self) -> &mut DemoHeader {
        &mut self.header
    }

    /// Overrides the declared tick count, which is otherwise the highest tick.
    pub fn declared_ticks(&mut self, ticks: u32) -> &mut Self {
        self.declared_ticks = Some(ticks);
        self
    }

    /// Appends a signon packet that carries a net tick and a server info message.
    pub fn signon_server_info(&mut self, is_hltv: bool) -> &mut Self {
        let mut bits = BitWriter::with_capacity(64);
        let _ = bits.write_bits(NET_TICK, 6);
        bits.write_u32(0);
        bits.write_u16(15);
        bits.write_u16(1);
        let _ = bits.write_bits(SVC_SERVER_INFO, 6);
        bits.write_u16(self.header.network_protocol as u16);
        bits.write_u32(1);
        bits.write_bit(is_hltv);
        bits.write_bit(true);
        bits.write_u32(0x5EED_C0DE);
        bits.write_u16(280);
        if self.header.network_protocol >= 18 {
            for byte in 0..16u8 {
                bits.write_u8(byte.wrapping_mul(17));
            }
        } else {
            bits.write_u32(0x0DE5_C0DE);
        }
        bits.write_u8(RECORDER_SLOT);
        // max clients, tick interval, OS, names
        bits.write_u8(12);
        bits.write_f32(TICK_INTERVAL as f32);
        bits.write_u8(b'L');
        bits.write_cstring(b"cstrike");
        bits.write_cstring(b"de_synth");
        self.signon_packet(&bits.finish())
    }

    /// Appends a signon packet with an opaque payload.
    pub fn signon_packet(&mut self, payload: &[u8]) -> &mut Self {
        let result = self.packet_body(false, payload).and_then(|body| {
            write_frame(
                &mut self.signon,
                self.layout,
                FrameKind::Signon,
                DemoTick::default(),
                Some(0),
                &body,
            )
        });
        self.record(result);
        self
    }

    /// Appends a network packet; `locked` pins playback to the recorded view.
    pub fn packet(&mut self, tick: u32, slot: u8, locked: bool, payload: &[u8]) -> &mut Self {
        match self.packet_body(locked, payload) {
            Ok(body) => self.push(FrameKind::Packet, tick, slot, &body),
            Err(err) => {
                self.record(Err(err));
                self
            }
        }
    }

    pub fn sync_tick(&mut self, tick: u32) -> &mut Self {
        self.push(FrameKind::SyncTick, tick, 0, &[])
    }

    pub fn console_cmd(&mut self, tick: u32, command: &str) -> &mut Self {
        let mut text = command.as_bytes().to_vec();
        text.push(0);
        self.push_payload(FrameKind::ConsoleCmd, tick, 0, None, &text)
    }

    /// Appends a user command with the next outgoing sequence number.
    pub fn user_cmd(&mut self, tick: u32, slot: u8, cmd: &CmdFields) -> &mut Self {
        self.user_cmd_raw(tick, slot, &cmd.encode())
    }

    /// Appends a user command frame with an arbitrary payload.
    pub fn user_cmd_raw(&mut self, tick: u32, slot: u8, payload: &[u8]) -> &mut Self {
        self.user_cmd_sequence += 1;
        let sequence = self.user_cmd_sequence;
        self.push_payload(FrameKind::UserCmd, tick, slot, Some(sequence), payload)
    }

    pub fn data_tables(&mut self, tick: u32, data: &[u8]) -> &mut Self {
        self.push_payload(FrameKind::DataTables, tick, 0, None, data)
    }

    pub fn string_tables(&mut self, tick: u32, data: &[u8]) -> &mut Self {
        self.push_payload(FrameKind::StringTables, tick, 0, None, data)
    }

    /// Protocol 4 only; fails at [`finish`](Self::finish) otherwise.
    pub fn custom_data(&mut self, tick: u32, callback: i32, data: &[u8]) -> &mut Self {
        self.push_payload(FrameKind::CustomData, tick, 0, Some(callback), data)
    }

    pub fn stop(&mut self, tick: u32) -> &mut Self {
        self.push(FrameKind::Stop, tick, 0, &[])
    }

    /// Bytes written after the frame stream.
    pub fn trailer(&mut self, bytes: &[u8]) -> &mut Self {
        self.trailer.extend_from_slice(bytes);
        self
    }

    /// Assembles the demo, reporting the first frame that could not be encoded.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let signon = self.signon.finish();
        let frames = self.frames.finish();
        let ticks = self.declared_ticks.unwrap_or(self.max_tick);

        self.header.signon_length =
            i32::try_from(signon.len()).map_err(|_| EncodeError::LengthOverflow {
                length: signon.len(),
            })?;
        self.header.set_ticks(ticks);
        self.header
            .set_playback_time((f64::from(ticks) * TICK_INTERVAL) as f32);
        self.header.set_frames(self.frame_count);

        let mut out = ByteWriter::with_capacity(
            wire::HEADER_SIZE + signon.len() + frames.len() + self.trailer.len(),
        );
        encode_header(&self.header, &mut out);
        out.write_bytes(&signon);
        out.write_bytes(&frames);
        out.write_bytes(&self.trailer);
        Ok(out.finish())
    }

    fn packet_body(&self, locked: bool, payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
        let mut body = ByteWriter::with_capacity(self.layout.cmd_info_size() + 12 + payload.len());
        for slot in 0..self.layout.cmd_info_slots() {
            write_cmd_info(&mut body, locked, slot as f32);
        }
        // sequence in, sequence out
        body.write_i32(0);
        body.write_i32(0);
        write_payload(&mut body, payload)?;
        Ok(body.finish())
    }

    fn push_payload(
        &mut self,
        kind: FrameKind,
        tick: u32,
        slot: u8,
        prefix: Option<i32>,
        payload: &[u8],
    ) -> &mut Self {
        let mut body = ByteWriter::with_capacity(8 + payload.len());
        if let Some(prefix) = prefix {
            body.write_i32(prefix);
        }
        if let Err(err) = write_payload(&mut body, payload) {
            self.record(Err(err));
            return self;
        }
        self.push(kind, tick, slot, &body.finish())
    }

    fn push(&mut self, kind: FrameKind, tick: u32, slot: u8, body: &[u8]) -> &mut Self {
        let result = write_frame(
            &mut self.frames,
            self.layout,
            kind,
            DemoTick::new(tick),
            Some(slot),
            body,
        );
        if result.is_ok() {
            self.frame_count += 1;
            self.max_tick = self.max_tick.max(tick);
        }
        self.record(result);
        self
    }

    fn record(&mut self, result: Result<(), EncodeError>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }
}

fn write_cmd_info(out: &mut ByteWriter, locked: bool, seed: f32) {
    if !locked {
        out.write_bytes(&[0; wire::CMD_INFO_SLOT_SIZE]);
        return;
    }
    out.write_i32(CMD_INFO_LOCKED);
    for vector in 0..6u8 {
        let base = f32::from(vector) * 10.0 + seed;
        for component in 0..3u8 {
            out.write_f32(base + f32::from(component));
        }
    }
}
