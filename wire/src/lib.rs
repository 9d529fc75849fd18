//! Demo container layout for the demedit demo engine.
//!
//! This crate handles the binary container: the fixed header, the signon
//! section, and the tagged frame stream. It knows how frames are delimited
//! but not what their payloads mean.
//!
//! # Design Principles
//!
//! - **Fixed layout** - Field widths, offsets and command tags follow the files the game writes.
//! - **Bounded decoding** - All length fields are validated against the buffer and limits.
//! - **Zero-copy** - Frames are described by offsets into the caller's buffer.
//!
//! See `DEMO_FORMAT.md` for the byte layout.

mod demo;
mod error;
mod frame;
mod header;
mod limits;
mod types;

pub use demo::{decode_demo, frame_stream, RawDemo};
pub use error::{DecodeError, EncodeError, FrameReason, LimitKind, WireResult};
pub use frame::{
    write_frame, write_payload, FrameDescriptor, FrameKind, FrameLayout, FrameStream, Span,
    CMD_INFO_SLOT_SIZE,
};
pub use header::{
    decode_header, encode_header, text_field, DemoHeader, HEADER_SIZE, MAGIC, MAX_OS_PATH,
    PLAYBACK_FRAMES_OFFSET, PLAYBACK_TICKS_OFFSET, PLAYBACK_TIME_OFFSET, SIGNON_LENGTH_OFFSET,
    SUPPORTED_PROTOCOLS,
};
pub use limits::Limits;
pub use types::DemoTick;
