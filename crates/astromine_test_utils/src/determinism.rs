//! Determinism testing utilities.
//!
//! Harness for verifying that seeded engine runs produce identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Worlds and yields must replay exactly from a seed. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Engine registries iterate in operation-id order instead.
//!
//! - **System randomness**: no ambient `rand()` calls. All random
//!   behavior draws from an explicitly seeded
//!   [`astromine_core::rng::RandomSource`].
//!
//! - **Wall-clock time**: engine time only advances through explicit
//!   tick deltas, never `Instant::now()`.
//!
//! Run a scenario several times through [`check_determinism`] and
//! assert on the result; outputs are fingerprinted through their RON
//! serialization so float fields compare bit-exactly.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical fingerprints.
    pub is_deterministic: bool,
    /// Fingerprints from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// All unique fingerprints (should be 1 for a deterministic scenario).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert the scenario was deterministic, with a detailed message.
    ///
    /// # Panics
    ///
    /// Panics if runs produced different fingerprints.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Scenario is non-deterministic!\n\
                 Runs: {}\n\
                 Unique fingerprints: {} (expected 1)\n\
                 All fingerprints: {:?}",
                self.hashes.len(),
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Fingerprint any serializable value through its RON text.
///
/// Serializing first sidesteps `f32` not being `Hash`: two values only
/// fingerprint equally when every field, floats included, matches
/// exactly.
///
/// # Panics
///
/// Panics if the value fails to serialize (test-only code path).
#[must_use]
pub fn fingerprint<T: Serialize>(value: &T) -> u64 {
    let text = ron::to_string(value).expect("fixture value must serialize");
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Run a scenario `runs` times and compare fingerprints.
///
/// The closure receives the run index and must return the scenario's
/// complete observable output.
pub fn check_determinism<T, F>(runs: usize, scenario: F) -> DeterminismResult
where
    T: Serialize,
    F: Fn(usize) -> T,
{
    let hashes: Vec<u64> = (0..runs).map(|i| fingerprint(&scenario(i))).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    tracing::debug!(runs, is_deterministic, "determinism check finished");
    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Property-testing strategies.
///
/// Random but reproducible inputs for property-based testing of
/// engine determinism and invariants.
pub mod strategies {
    use astromine_core::math::Vec3;
    use astromine_core::worldgen::SectorConfig;
    use proptest::prelude::*;

    /// Generate a world seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a small sector configuration (kept small so property
    /// runs stay fast).
    pub fn arb_sector_config() -> impl Strategy<Value = SectorConfig> {
        (10.0f32..200.0, 0u32..30, 0u32..15, 0u32..5, any::<u64>()).prop_map(
            |(size, extraction_count, deposit_count, station_count, seed)| SectorConfig {
                size,
                extraction_count,
                deposit_count,
                station_count,
                seed,
            },
        )
    }

    /// Generate a position within a typical sector.
    pub fn arb_position() -> impl Strategy<Value = Vec3> {
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
            .prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    /// Generate a single bonus multiplier in a sane gameplay range.
    pub fn arb_multiplier() -> impl Strategy<Value = f32> {
        0.5f32..4.0
    }

    /// Generate a list of bonus multipliers.
    pub fn arb_multipliers(max_len: usize) -> impl Strategy<Value = Vec<f32>> {
        proptest::collection::vec(arb_multiplier(), 0..max_len)
    }

    /// Generate a tick delta in milliseconds.
    pub fn arb_delta_ms() -> impl Strategy<Value = u64> {
        1u64..20_000
    }
}
