//! Error types for demo container operations.

use std::fmt;

use bitstream::CursorError;

/// Result type for demo container decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Decode errors for the demo header and frame stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The leading signature is not `HL2DEMO\0`.
    BadMagic {
        /// The first bytes of the input, zero-padded.
        found: [u8; 8],
    },

    /// The demo protocol is not in the supported allow-list.
    UnsupportedProtocol { found: i32 },

    /// A read crossed the end of the buffer.
    TruncatedInput { requested: usize, available: usize },

    /// A length field is negative or exceeds the available capacity.
    Overflow { requested: usize, capacity: usize },

    /// A frame is structurally inconsistent.
    MalformedFrame {
        /// Byte offset of the frame's command tag.
        offset: usize,
        reason: FrameReason,
    },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Cursor misuse that has no container-level meaning.
    Cursor(CursorError),
}

/// Why a frame was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReason {
    /// The command tag is not defined for the demo protocol.
    UnknownTag { tag: u8 },
    /// A payload length runs past the end of the frame stream.
    LengthPastEnd { len: usize, available: usize },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FrameCount,
    PayloadBytes,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The frame kind has no command tag in the target protocol.
    UnsupportedKind { kind: &'static str, protocol: i32 },
    /// A payload is too long for its `i32` length prefix.
    LengthOverflow { length: usize },
}

impl From<CursorError> for DecodeError {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::TruncatedInput {
                requested,
                available,
            } => Self::TruncatedInput {
                requested,
                available,
            },
            CursorError::Overflow {
                requested,
                capacity,
            } => Self::Overflow {
                requested,
                capacity,
            },
            other => Self::Cursor(other),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic { found } => {
                write!(f, "bad magic: found {}", found.escape_ascii())
            }
            Self::UnsupportedProtocol { found } => {
                write!(f, "unsupported demo protocol: {found}")
            }
            Self::TruncatedInput {
                requested,
                available,
            } => {
                write!(
                    f,
                    "truncated input: need {requested} bytes, have {available}"
                )
            }
            Self::Overflow {
                requested,
                capacity,
            } => {
                write!(f, "length overflow: {requested} exceeds capacity {capacity}")
            }
            Self::MalformedFrame { offset, reason } => {
                write!(f, "malformed frame at offset {offset}: {reason}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Cursor(err) => write!(f, "cursor error: {err}"),
        }
    }
}

impl fmt::Display for FrameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTag { tag } => write!(f, "unknown command tag {tag}"),
            Self::LengthPastEnd { len, available } => {
                write!(f, "payload length {len} exceeds the {available} bytes left")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FrameCount => "frame count",
            Self::PayloadBytes => "payload bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedKind { kind, protocol } => {
                write!(f, "{kind} frames cannot be written in demo protocol {protocol}")
            }
            Self::LengthOverflow { length } => {
                write!(f, "length overflow: {length}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Cursor(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {}
