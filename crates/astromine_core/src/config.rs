//! Engine configuration.
//!
//! All balance constants live here so they can be loaded from a RON
//! file and tweaked without recompiling. Defaults match live balance.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Tunable constants for the operation and discovery engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base mining duration in milliseconds before target factors and efficiency.
    pub base_mining_duration_ms: u64,
    /// Duration factor for extraction bodies (faster than base).
    pub extraction_body_duration_factor: f32,
    /// Duration factor for deposits (slower, richer).
    pub deposit_duration_factor: f32,
    /// Base mining experience, scaled by efficiency at completion.
    pub mining_base_experience: u32,
    /// Maximum concurrent operations per actor, shared across mining and crafting.
    pub max_concurrent_operations: usize,
    /// Upper bound on the combined efficiency fed into start().
    pub max_efficiency: f32,
    /// Radius within which an entity counts as discovered.
    pub discovery_radius: f32,
    /// Minimum separation between visited locations.
    pub location_radius: f32,
    /// Experience for discovering an entity, before the kind bonus.
    pub discovery_base_experience: u32,
    /// Experience for visiting a novel location.
    pub location_experience: u32,
    /// Window during which discovery messages are suppressed.
    pub notification_cooldown_ms: u64,
    /// Efficiency above which the crafting recycling bonus can proc.
    pub recycling_threshold: f32,
    /// Probability of the recycling bonus per eligible completion.
    pub recycling_chance: f32,
    /// Fraction of the first required resource returned by recycling.
    pub recycling_fraction: f32,
    /// Engine time between statistics snapshots.
    pub stats_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_mining_duration_ms: 5_000,
            extraction_body_duration_factor: 0.8,
            deposit_duration_factor: 1.5,
            mining_base_experience: 25,
            max_concurrent_operations: 3,
            max_efficiency: 3.0,
            discovery_radius: 5.0,
            location_radius: 15.0,
            discovery_base_experience: 20,
            location_experience: 15,
            notification_cooldown_ms: 2_000,
            recycling_threshold: 1.5,
            recycling_chance: 0.3,
            recycling_fraction: 0.2,
            stats_interval_ms: 30_000,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| EngineError::DataParse {
            what: "engine config".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are in usable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.base_mining_duration_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "base_mining_duration_ms must be positive".to_string(),
            ));
        }
        if self.max_concurrent_operations == 0 {
            return Err(EngineError::InvalidConfig(
                "max_concurrent_operations must be positive".to_string(),
            ));
        }
        if self.max_efficiency <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "max_efficiency must be positive".to_string(),
            ));
        }
        if self.discovery_radius <= 0.0 || self.location_radius <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "discovery and location radii must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.recycling_chance)
            || !(0.0..=1.0).contains(&self.recycling_fraction)
        {
            return Err(EngineError::InvalidConfig(
                "recycling chance and fraction must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
