//! Limits for codec-level payload decoding.

/// Codec-specific limits enforced while decoding frame payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum declared length of one user command payload.
    pub max_user_cmd_bytes: usize,
    /// Maximum number of net messages scanned per signon packet while
    /// looking for server info.
    pub max_signon_messages: usize,
    /// Maximum length of a string inside a net message.
    pub max_string_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            // The engine caps a single user command at 256 bytes
            max_user_cmd_bytes: 256,
            max_signon_messages: 64,
            max_string_bytes: 1024,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_user_cmd_bytes: 128,
            max_signon_messages: 16,
            max_string_bytes: 256,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_user_cmd_bytes: usize::MAX,
            max_signon_messages: usize::MAX,
            max_string_bytes: usize::MAX,
        }
    }
}
