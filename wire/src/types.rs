//! Core types for the demo container.

/// A simulation tick number as recorded in a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DemoTick(u32);

impl DemoTick {
    /// Creates a new demo tick.
    #[must_use]
    pub const fn new(tick: u32) -> Self {
        Self(tick)
    }

    /// Returns the raw tick value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns this tick renumbered relative to `origin`, clamped at zero.
    #[must_use]
    pub const fn rebase(self, origin: u32) -> Self {
        Self(self.0.saturating_sub(origin))
    }
}

impl From<u32> for DemoTick {
    fn from(tick: u32) -> Self {
        Self(tick)
    }
}

impl From<DemoTick> for u32 {
    fn from(tick: DemoTick) -> Self {
        tick.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_tick_roundtrip() {
        let tick = DemoTick::new(66);
        assert_eq!(tick.raw(), 66);
        assert_eq!(u32::from(tick), 66);
        assert_eq!(DemoTick::from(66), tick);
    }

    #[test]
    fn demo_tick_ordering() {
        assert!(DemoTick::new(1) < DemoTick::new(2));
        assert_eq!(DemoTick::default().raw(), 0);
    }

    #[test]
    fn rebase_clamps_at_zero() {
        assert_eq!(DemoTick::new(150).rebase(100).raw(), 50);
        assert_eq!(DemoTick::new(10).rebase(100).raw(), 0);
    }
}
