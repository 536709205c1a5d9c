//! Random suffix candidates for sibling names.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws `base.DIGITS` candidates from an owned pseudo-random source.
///
/// Not suitable where unpredictability matters; seeded sources make runs
/// reproducible.
#[derive(Debug, Clone)]
pub struct SuffixGenerator<R = StdRng> {
    rng: R,
}

impl SuffixGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SuffixGenerator<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// `width` uniformly drawn decimal digits, leading zeros kept.
    pub fn digits(&mut self, width: u32) -> String {
        (0..width.max(1))
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect()
    }

    pub fn candidate(&mut self, base: &str, width: u32) -> String {
        format!("{}.{}", base, self.digits(width))
    }
}
