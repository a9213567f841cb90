//! # Astromine Core
//!
//! Deterministic operation and discovery engine for a 3D space mining
//! game.
//!
//! This crate contains **only** deterministic engine logic:
//! - No rendering
//! - No IO (recipe and config data arrive as RON text)
//! - No system randomness (seeded generators injected everywhere)
//! - No wall clock (time advances through explicit tick deltas)
//!
//! This separation enables headless hosts, reproducible worlds from a
//! seed, and exhaustive engine testing without a frontend.
//!
//! ## Crate Structure
//!
//! - [`worldgen`] - Seeded sector and field generation
//! - [`mining`] / [`crafting`] - Timed operation engines
//! - [`discovery`] - Proximity discovery and exploration tracking
//! - [`orchestrator`] - Facade composing the engines for a host
//! - [`efficiency`] - Actor efficiency composition
//! - [`operation`] - Shared timed-operation machinery
//! - [`math`] / [`rng`] - Vector math and seeded randomness

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod crafting;
pub mod discovery;
pub mod efficiency;
pub mod entity;
pub mod error;
pub mod math;
pub mod mining;
pub mod operation;
pub mod orchestrator;
pub mod rng;
pub mod worldgen;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::crafting::{
        can_craft, CraftCheck, CraftingEngine, CraftingResult, OutputSpec, Recipe, RecipeCatalog,
        Requirement,
    };
    pub use crate::discovery::{
        DiscoveryKind, DiscoveryStats, DiscoverySystem, ExplorationResult,
    };
    pub use crate::efficiency::EfficiencyBonuses;
    pub use crate::entity::{
        EntityId, EntityKind, Health, Rarity, Resource, ResourceKind, SpaceEntity,
    };
    pub use crate::error::{EngineError, Result};
    pub use crate::math::Vec3;
    pub use crate::mining::{MiningEngine, MiningResult};
    pub use crate::operation::{
        ActorId, ActorSlots, MissingResource, Operation, OperationId, StartDenied,
    };
    pub use crate::orchestrator::{Collaborator, EngineStats, Orchestrator};
    pub use crate::rng::{Lcg64, RandomSource};
    pub use crate::worldgen::{
        generate_field, generate_sector, BoundingBox, Sector, SectorConfig,
    };
}
