/// Small LCG; the same seed always yields the same demo.
#[derive(Debug, Clone)]
pub(crate) struct Rng {
    state: u64,
}

impl Rng {
    pub(crate) const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub(crate) fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform-ish value in `[min, max]`.
    pub(crate) fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min).unsigned_abs().max(1) + 1;
        let value = u64::from(self.next_u32()) % span;
        min + value as i64
    }

    /// Returns `true` roughly once every `every` calls.
    pub(crate) fn one_in(&mut self, every: u32) -> bool {
        every > 0 && self.next_u32() % every == 0
    }

    pub(crate) fn angle(&mut self, limit: i64) -> f32 {
        self.range_i64(-limit * 4, limit * 4) as f32 / 4.0
    }
}
