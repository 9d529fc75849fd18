//! Configurable limits for bounded decoding.

/// Container-level limits for frame stream decoding.
///
/// These limits are enforced while walking the frame stream to bound the
/// work done on adversarial input. Payload contents are bounded by the
/// codec layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of frames in one stream (signon or main).
    pub max_frames: usize,

    /// Maximum length of a single length-prefixed frame payload.
    pub max_payload_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // An hour at 66 ticks/s with several frames per tick
            max_frames: 4 * 1024 * 1024,

            // Data tables and string tables are the largest payloads
            max_payload_bytes: 64 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_frames: 4096,
            max_payload_bytes: 64 * 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_frames: usize::MAX,
            max_payload_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_allow_long_demos() {
        let limits = Limits::default();
        assert!(limits.max_frames >= 1_000_000);
        assert!(limits.max_payload_bytes >= 1024 * 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_frames < default_limits.max_frames);
        assert!(test_limits.max_payload_bytes < default_limits.max_payload_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_frames, usize::MAX);
        assert_eq!(limits.max_payload_bytes, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_frames, 4096);
    }
}
