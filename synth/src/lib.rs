//! Deterministic synthetic demos for the demedit demo engine.
//!
//! [`DemoBuilder`] writes exactly the frames it is told to, which suits
//! targeted tests. [`synth_demo`] drives a builder from a seed to produce a
//! plausible recording: setup frames, locked-camera packets, bit-packed user
//! commands per player slot, occasional console commands and a Stop frame.

mod builder;
mod cmd;
mod rng;

use std::fmt;

pub use builder::{DemoBuilder, RECORDER_SLOT, TICK_INTERVAL};
pub use cmd::CmdFields;

use rng::Rng;

/// Parameters for [`synth_demo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthConfig {
    /// Demo protocol, 3 or 4. Protocol 4 records two player slots.
    pub protocol: i32,
    /// Tick of the final Stop frame.
    pub ticks: u32,
    pub seed: u64,
    /// Whether the signon section carries a server info message.
    pub server_info: bool,
    /// Ticks between console commands; 0 disables them.
    pub console_every: u32,
    /// Bytes after the Stop frame.
    pub trailer: Vec<u8>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            protocol: 3,
            ticks: 300,
            seed: 1,
            server_info: true,
            console_every: 64,
            trailer: Vec::new(),
        }
    }
}

/// Errors from [`synth_demo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthError {
    Wire(wire::DecodeError),
    Encode(wire::EncodeError),
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
        }
    }
}

impl std::error::Error for SynthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Encode(e) => Some(e),
        }
    }
}

impl From<wire::DecodeError> for SynthError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<wire::EncodeError> for SynthError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err)
    }
}

/// Generates a demo from `config`. The same config always yields the same bytes.
pub fn synth_demo(config: &SynthConfig) -> Result<Vec<u8>, SynthError> {
    let mut rng = Rng::new(config.seed);
    let mut builder = DemoBuilder::new(config.protocol)?;
    let slots: u8 = if builder.layout().has_player_slot() { 2 } else { 1 };

    if config.server_info {
        builder.signon_server_info(false);
    }
    builder.signon_packet(&noise(&mut rng, 24));

    builder
        .data_tables(0, &noise(&mut rng, 96))
        .string_tables(0, &noise(&mut rng, 48));
    if slots > 1 {
        builder.custom_data(0, 0, &noise(&mut rng, 8));
    }
    builder.sync_tick(0);

    let mut command_number = 0u32;
    for tick in 1..config.ticks {
        if tick == config.ticks / 2 {
            builder.string_tables(tick, &noise(&mut rng, 16));
        }
        if config.console_every > 0 && tick % config.console_every == 0 {
            let command = if (tick / config.console_every) % 2 == 0 {
                "+duck"
            } else {
                "-duck"
            };
            builder.console_cmd(tick, command);
        }
        for slot in 0..slots {
            let len = rng.range_i64(4, 40) as usize;
            builder.packet(tick, slot, true, &noise(&mut rng, len));
            command_number += 1;
            let cmd = random_cmd(&mut rng, command_number, tick);
            builder.user_cmd(tick, slot, &cmd);
        }
    }

    builder.stop(config.ticks).trailer(&config.trailer);
    Ok(builder.finish()?)
}

fn random_cmd(rng: &mut Rng, command_number: u32, tick: u32) -> CmdFields {
    let mut cmd = CmdFields {
        command_number: Some(command_number),
        tick_count: Some(tick),
        ..CmdFields::default()
    };
    if rng.one_in(3) {
        cmd.view_angles = [Some(rng.angle(89)), Some(rng.angle(180)), None];
    }
    if rng.one_in(4) {
        cmd.forward_move = Some(rng.range_i64(-450, 450) as f32);
        cmd.side_move = Some(rng.range_i64(-450, 450) as f32);
    }
    if rng.one_in(5) {
        // attack, jump, duck, forward, back, use, reload
        const PICKS: [u32; 7] = [1 << 0, 1 << 1, 1 << 2, 1 << 3, 1 << 4, 1 << 5, 1 << 13];
        let first = PICKS[rng.next_u32() as usize % PICKS.len()];
        let second = if rng.one_in(2) {
            PICKS[rng.next_u32() as usize % PICKS.len()]
        } else {
            0
        };
        cmd.buttons = Some(first | second);
    }
    if rng.one_in(40) {
        cmd.weapon = Some(((rng.next_u32() % 2048) as u16, rng.one_in(2).then_some(3)));
    }
    if rng.one_in(2) {
        cmd.mouse_dx = Some(rng.range_i64(-30, 30) as i16);
        cmd.mouse_dy = Some(rng.range_i64(-30, 30) as i16);
    }
    cmd
}

fn noise(rng: &mut Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.next_u32() as u8).collect()
}
