//! Test fixtures and helpers.
//!
//! Pre-built entities, recipes and sector configurations for
//! consistent testing across crates.

use astromine_core::crafting::{OutputSpec, Recipe, RecipeCatalog, Requirement};
use astromine_core::entity::{EntityId, EntityKind, Rarity, Resource, ResourceKind, SpaceEntity};
use astromine_core::math::Vec3;
use astromine_core::operation::ActorId;
use astromine_core::rng::RandomSource;
use astromine_core::worldgen::SectorConfig;
use std::collections::HashMap;

/// Actor id used by most single-actor scenarios.
#[must_use]
pub fn pilot() -> ActorId {
    ActorId::new("test-pilot")
}

/// A healthy extraction body at the given position.
#[must_use]
pub fn extraction_body(id: u64, position: Vec3) -> SpaceEntity {
    SpaceEntity::new(EntityId::new(id), EntityKind::ExtractionBody, position)
        .with_scale(1.0)
        .with_health(100)
}

/// A deposit carrying a single metal resource pool.
#[must_use]
pub fn metal_deposit(id: u64, position: Vec3) -> SpaceEntity {
    SpaceEntity::new(EntityId::new(id), EntityKind::Deposit, position)
        .with_scale(1.0)
        .with_health(200)
        .with_resources(vec![Resource::new(
            format!("res-metal-{id}"),
            ResourceKind::Metal,
            30,
            Rarity::Rare,
        )])
}

/// A station (not minable, high discovery bonus).
#[must_use]
pub fn station(id: u64, position: Vec3) -> SpaceEntity {
    SpaceEntity::new(EntityId::new(id), EntityKind::Station, position)
        .with_scale(3.0)
        .with_health(1_500)
}

/// A basic level-1 recipe: 2 energy into one common power cell.
#[must_use]
pub fn power_cell_recipe() -> Recipe {
    Recipe {
        id: "power-cell".to_string(),
        name: "Power Cell".to_string(),
        required: vec![Requirement {
            kind: ResourceKind::Energy,
            quantity: 2,
        }],
        output: OutputSpec {
            id: "power-cell-item".to_string(),
            name: "Power Cell".to_string(),
            kind: ResourceKind::Energy,
            rarity: Rarity::Common,
            quantity: 1,
        },
        base_duration_ms: 4_000,
        min_level: 1,
    }
}

/// A level-3 recipe with two ingredients and a rare output.
#[must_use]
pub fn hull_plating_recipe() -> Recipe {
    Recipe {
        id: "hull-plating".to_string(),
        name: "Hull Plating".to_string(),
        required: vec![
            Requirement {
                kind: ResourceKind::Metal,
                quantity: 5,
            },
            Requirement {
                kind: ResourceKind::Crystal,
                quantity: 2,
            },
        ],
        output: OutputSpec {
            id: "hull-plating-item".to_string(),
            name: "Hull Plating".to_string(),
            kind: ResourceKind::Metal,
            rarity: Rarity::Rare,
            quantity: 1,
        },
        base_duration_ms: 8_000,
        min_level: 3,
    }
}

/// Catalog holding both fixture recipes.
#[must_use]
pub fn sample_catalog() -> RecipeCatalog {
    let mut catalog = RecipeCatalog::new();
    catalog
        .register(power_cell_recipe())
        .expect("fixture recipe is valid");
    catalog
        .register(hull_plating_recipe())
        .expect("fixture recipe is valid");
    catalog
}

/// Inventory covering every fixture recipe comfortably.
#[must_use]
pub fn rich_inventory() -> HashMap<ResourceKind, u32> {
    HashMap::from([
        (ResourceKind::Crystal, 50),
        (ResourceKind::Metal, 50),
        (ResourceKind::Energy, 50),
    ])
}

/// The standard test sector: 40-unit cube, 15 extraction bodies,
/// 8 deposits, 2 stations, seed 12345.
#[must_use]
pub fn test_sector_config() -> SectorConfig {
    SectorConfig::default()
}

/// A random source replaying a scripted sequence of raw values.
///
/// Cycles when exhausted so callers never have to count draws exactly.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<u64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Create a scripted source.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn new(values: Vec<u64>) -> Self {
        assert!(!values.is_empty(), "scripted source needs at least one value");
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_u64(&mut self) -> u64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
