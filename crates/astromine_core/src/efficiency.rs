//! Efficiency composition.
//!
//! Operation efficiency starts from the product of an actor's trait
//! and equipment multipliers, then temporary item effects and the
//! loyalty multiplier are folded in *additively* as `(multiplier - 1)`
//! terms, and the total is capped. Multiplying every bonus instead
//! would compound exponentially and break yield balance.

use serde::{Deserialize, Serialize};

/// Per-actor efficiency bonus sources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EfficiencyBonuses {
    /// Permanent trait multipliers (multiplied together into the base).
    pub trait_multipliers: Vec<f32>,
    /// Equipment multipliers (multiplied together into the base).
    pub equipment_multipliers: Vec<f32>,
    /// Active temporary item effects (each contributes `m - 1` additively).
    pub item_effects: Vec<f32>,
}

impl EfficiencyBonuses {
    /// Bonuses for an unmodified actor (efficiency 1.0 before loyalty).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Base efficiency: product of trait and equipment multipliers.
    #[must_use]
    pub fn base(&self) -> f32 {
        let traits: f32 = self.trait_multipliers.iter().product();
        let equipment: f32 = self.equipment_multipliers.iter().product();
        traits * equipment
    }

    /// Combined efficiency including item effects and the loyalty
    /// multiplier, capped at `max`.
    #[must_use]
    pub fn combined(&self, loyalty_multiplier: f32, max: f32) -> f32 {
        let item_bonus: f32 = self.item_effects.iter().map(|m| m - 1.0).sum();
        let total = self.base() + item_bonus + (loyalty_multiplier - 1.0);
        total.min(max)
    }
}
