//! Edit options.

/// A half-open tick range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickRange {
    pub from: u32,
    pub to: u32,
}

impl TickRange {
    #[must_use]
    pub const fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    /// Returns `true` if the range selects no ticks.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.from >= self.to
    }

    #[must_use]
    pub const fn contains(self, tick: u32) -> bool {
        self.from <= tick && tick < self.to
    }
}

/// What an edit should do to a demo.
///
/// The default options describe a no-op edit that reproduces its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EditOptions {
    /// Let playback move the camera freely.
    pub unlock_pov: bool,
    /// Keep only the frames in this tick range.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cut: Option<TickRange>,
    /// Drop console command and user command frames.
    #[cfg_attr(feature = "serde", serde(default))]
    pub strip_commands: bool,
}

impl EditOptions {
    /// Options that only unlock the point of view.
    #[must_use]
    pub const fn unlock() -> Self {
        Self {
            unlock_pov: true,
            cut: None,
            strip_commands: false,
        }
    }

    /// Returns these options with a cut applied.
    #[must_use]
    pub const fn with_cut(mut self, from: u32, to: u32) -> Self {
        self.cut = Some(TickRange::new(from, to));
        self
    }

    /// Returns these options with command stripping toggled.
    #[must_use]
    pub const fn with_strip_commands(mut self, strip: bool) -> Self {
        self.strip_commands = strip;
        self
    }

    /// Returns `true` if the edit leaves the demo untouched.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.unlock_pov && self.cut.is_none() && !self.strip_commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_membership_is_half_open() {
        let range = TickRange::new(10, 20);
        assert!(range.contains(10));
        assert!(range.contains(19));
        assert!(!range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.is_empty());
        assert!(TickRange::new(5, 5).is_empty());
        assert!(TickRange::new(6, 5).is_empty());
    }

    #[test]
    fn default_is_noop() {
        assert!(EditOptions::default().is_noop());
        assert!(!EditOptions::unlock().is_noop());
        assert!(!EditOptions::default().with_cut(0, 1).is_noop());
        assert!(!EditOptions::default().with_strip_commands(true).is_noop());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn options_from_json() {
        let options: EditOptions =
            serde_json::from_str(r#"{"unlock_pov": true, "cut": {"from": 100, "to": 200}}"#)
                .unwrap();
        assert_eq!(options, EditOptions::unlock().with_cut(100, 200));

        let minimal: EditOptions = serde_json::from_str(r#"{"unlock_pov": false}"#).unwrap();
        assert!(minimal.is_noop());
    }
}
