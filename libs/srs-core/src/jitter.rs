//! Random sources for interval fuzz.
//!
//! The calculator asks a [`JitterSource`] for a relative offset and multiplies
//! the interval by `1 + offset`. Tests swap in [`NoJitter`] or [`FixedJitter`]
//! to make scheduling fully deterministic.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies the relative offset applied to long intervals.
pub trait JitterSource: Send {
    /// Offset in `[-spread, spread]`.
    fn offset(&mut self, spread: f64) -> f64;
}

/// Never perturbs intervals.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn offset(&mut self, _spread: f64) -> f64 {
        0.0
    }
}

/// Always returns the same offset, clamped to the requested spread.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn offset(&mut self, spread: f64) -> f64 {
        let spread = spread.abs();
        self.0.clamp(-spread, spread)
    }
}

/// Uniform offsets from a real RNG.
#[derive(Debug, Clone)]
pub struct RandomJitter<R = StdRng> {
    rng: R,
}

impl RandomJitter<StdRng> {
    /// Seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomJitter<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> JitterSource for RandomJitter<R> {
    fn offset(&mut self, spread: f64) -> f64 {
        let spread = spread.abs();
        if spread == 0.0 || !spread.is_finite() {
            return 0.0;
        }
        self.rng.random_range(-spread..=spread)
    }
}
