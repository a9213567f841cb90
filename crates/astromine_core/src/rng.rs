//! Seeded randomness behind an injectable source.
//!
//! All "random" behavior in the engine (world generation, yield rolls,
//! bonus procs) draws from a [`RandomSource`] supplied by the caller,
//! never from ambient global state. Identical seeds reproduce identical
//! worlds and yields, which reward-balance tests rely on.

/// A deterministic source of pseudo-random values.
///
/// Implementations must be pure functions of their internal state so
/// that a fixed seed replays the exact same sequence.
pub trait RandomSource {
    /// Next raw 64-bit value.
    fn next_u64(&mut self) -> u64;

    /// Uniform value in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() % 10_000) as f32 / 10_000.0
    }

    /// Uniform float in `[min, max)`.
    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform integer in `[min, max)`. Returns `min` when the range is empty.
    fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        let range = max.saturating_sub(min);
        if range <= 0 {
            return min;
        }
        min + (self.next_u64() % range as u64) as i32
    }

    /// Uniform integer in `[min, max]` inclusive.
    fn range_u32_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % u64::from(max - min + 1)) as u32
    }

    /// Bernoulli trial with the given success probability.
    fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}

/// Linear-congruential generator used throughout the engine.
///
/// Not cryptographic; chosen for speed and cross-platform determinism.
#[derive(Debug, Clone)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    /// Create a generator from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }
}

impl RandomSource for Lcg64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }
}
