//! Error types for cursor operations.

use std::fmt;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while reading or writing through a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// A read would cross the end of the buffer.
    TruncatedInput {
        /// Number of units requested (bytes for byte cursors, bits for bit cursors).
        requested: usize,
        /// Number of units available.
        available: usize,
    },

    /// A computed length is negative or exceeds the remaining capacity.
    Overflow {
        /// The offending length (negative lengths are reported as their magnitude).
        requested: usize,
        /// The capacity it was checked against.
        capacity: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u8,
        /// Maximum allowed bits for this operation.
        max_bits: u8,
    },

    /// Value exceeds the range representable by the specified number of bits.
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u8,
    },
}

impl fmt::Display for CursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedInput {
                requested,
                available,
            } => {
                write!(
                    f,
                    "truncated input: attempted to read {requested} but only {available} available"
                )
            }
            Self::Overflow {
                requested,
                capacity,
            } => {
                write!(f, "length overflow: {requested} exceeds capacity {capacity}")
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
        }
    }
}

impl std::error::Error for CursorError {}
