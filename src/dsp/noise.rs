/// Xorshift32 white-noise source.
///
/// Deterministic for a given seed, allocation-free, and cheap enough to fill
/// a whole delay line inside the audio callback.
#[derive(Debug, Clone, Copy)]
pub struct Noise {
    state: u32,
}

/// Xorshift has a fixed point at zero, so a zero seed is replaced by this.
const FALLBACK_SEED: u32 = 0x9E37_79B9;

impl Noise {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Next uniformly distributed sample in [-1, 1).
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        // Top 24 bits give an exact f32 in [0, 1)
        (x >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new(FALLBACK_SEED)
    }
}
