//! Error types for codec operations.

use std::fmt;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while editing or decoding a demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Container-level error from the header or frame stream.
    Wire(wire::DecodeError),

    /// Cursor error while reading a payload.
    Bitstream(bitstream::CursorError),

    /// Frame re-serialization failed.
    Encode(wire::EncodeError),

    /// A user command payload is inconsistent with its declared kind.
    MalformedInput {
        /// Byte offset of the frame carrying the payload.
        offset: usize,
        reason: InputReason,
    },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Caller-facing error classification.
///
/// Every [`CodecError`] maps onto exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadMagic,
    UnsupportedProtocol,
    TruncatedInput,
    Overflow,
    MalformedFrame,
    MalformedInput,
    LimitsExceeded,
}

/// Details for malformed user command payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputReason {
    /// Declared payload length is above the user command limit.
    TooLong { len: usize, max: usize },
    /// The bit stream ended before the named field.
    OutOfBits { field: &'static str },
}

/// Specific codec limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    SignonMessages,
}

impl CodecError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Wire(err) => match err {
                wire::DecodeError::BadMagic { .. } => ErrorKind::BadMagic,
                wire::DecodeError::UnsupportedProtocol { .. } => ErrorKind::UnsupportedProtocol,
                wire::DecodeError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
                wire::DecodeError::Overflow { .. } => ErrorKind::Overflow,
                wire::DecodeError::LimitsExceeded { .. } => ErrorKind::LimitsExceeded,
                _ => ErrorKind::MalformedFrame,
            },
            Self::Bitstream(err) => match err {
                bitstream::CursorError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
                bitstream::CursorError::Overflow { .. } => ErrorKind::Overflow,
                _ => ErrorKind::MalformedInput,
            },
            Self::Encode(_) => ErrorKind::Overflow,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
            Self::LimitsExceeded { .. } => ErrorKind::LimitsExceeded,
        }
    }
}

impl From<wire::DecodeError> for CodecError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Wire(err)
    }
}

impl From<bitstream::CursorError> for CodecError {
    fn from(err: bitstream::CursorError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<wire::EncodeError> for CodecError {
    fn from(err: wire::EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
            Self::MalformedInput { offset, reason } => {
                write!(f, "malformed user command at offset {offset}: {reason}")
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BadMagic => "bad magic",
            Self::UnsupportedProtocol => "unsupported protocol",
            Self::TruncatedInput => "truncated input",
            Self::Overflow => "overflow",
            Self::MalformedFrame => "malformed frame",
            Self::MalformedInput => "malformed input",
            Self::LimitsExceeded => "limits exceeded",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for InputReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { len, max } => {
                write!(f, "payload length {len} exceeds max {max}")
            }
            Self::OutOfBits { field } => {
                write!(f, "ran out of bits reading {field}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SignonMessages => "signon messages",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Bitstream(e) => Some(e),
            Self::Encode(e) => Some(e),
            _ => None,
        }
    }
}
