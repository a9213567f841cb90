//! # Astromine Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture builders (entities, recipes, sector configs)
//! - Recording collaborator for orchestrator scenarios
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod recording;

/// Re-export proptest for convenience.
pub use proptest;
