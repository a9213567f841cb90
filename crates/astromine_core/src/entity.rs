//! World entities and resources.
//!
//! Entities are placed objects produced in batches by the world
//! generator and replaced wholesale when a sector regenerates. The
//! engine never deletes individual entities; depletion is a health
//! reading, enforced elsewhere.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;
use crate::rng::RandomSource;

/// Unique identifier for world entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// The kind of a placed world object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Minable rocky body.
    ExtractionBody,
    /// Rich resource deposit, slower to mine but better yield.
    Deposit,
    /// Trading/docking station. Never carries resources.
    Station,
    /// Drifting wreckage.
    Debris,
    /// Rare spatial anomaly.
    Anomaly,
}

impl EntityKind {
    /// Experience bonus granted when an entity of this kind is first discovered.
    #[must_use]
    pub const fn discovery_bonus(self) -> u32 {
        match self {
            Self::ExtractionBody => 10,
            Self::Station => 50,
            Self::Deposit => 25,
            Self::Debris => 5,
            Self::Anomaly => 100,
        }
    }

    /// Whether operations can target this kind for mining.
    #[must_use]
    pub const fn is_minable(self) -> bool {
        matches!(self, Self::ExtractionBody | Self::Deposit)
    }
}

/// Health state for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: i32,
    /// Maximum health points.
    pub max: i32,
}

impl Health {
    /// Create a health component at full health.
    #[must_use]
    pub const fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Check whether the entity is depleted/destroyed.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

/// Kind of a gatherable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Crystalline material.
    Crystal,
    /// Metallic ore.
    Metal,
    /// Stored energy.
    Energy,
}

impl ResourceKind {
    /// All resource kinds, in canonical order.
    pub const ALL: [Self; 3] = [Self::Crystal, Self::Metal, Self::Energy];

    /// Base display name for this kind.
    #[must_use]
    pub const fn base_name(self) -> &'static str {
        match self {
            Self::Crystal => "Crystal",
            Self::Metal => "Metal Ore",
            Self::Energy => "Energy Cell",
        }
    }

    /// Stable lowercase key used in mission-progress activity keys.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Crystal => "crystal",
            Self::Metal => "metal",
            Self::Energy => "energy",
        }
    }
}

/// Resource rarity tier.
///
/// Each tier carries a fixed selection weight and governs quantity
/// ranges and experience tables. The weight table is shared between
/// deposit generation and the fallback random-resource generator so
/// the two stay balanced against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    /// 60% selection weight.
    Common,
    /// 25% selection weight.
    Rare,
    /// 12% selection weight.
    Epic,
    /// 3% selection weight.
    Legendary,
}

impl Rarity {
    /// Selection weight out of 100.
    #[must_use]
    pub const fn weight(self) -> u32 {
        match self {
            Self::Common => 60,
            Self::Rare => 25,
            Self::Epic => 12,
            Self::Legendary => 3,
        }
    }

    /// Quantity range (inclusive) for randomly generated resources.
    #[must_use]
    pub const fn quantity_range(self) -> (u32, u32) {
        match self {
            Self::Common => (5, 20),
            Self::Rare => (3, 12),
            Self::Epic => (2, 8),
            Self::Legendary => (1, 5),
        }
    }

    /// Number of resource stacks a deposit of this rarity carries.
    #[must_use]
    pub const fn deposit_resource_count(self) -> u32 {
        match self {
            Self::Common => 1,
            Self::Rare => 2,
            Self::Epic => 3,
            Self::Legendary => 5,
        }
    }

    /// Base crafting experience for an output of this rarity.
    #[must_use]
    pub const fn craft_experience(self) -> u32 {
        match self {
            Self::Common => 50,
            Self::Rare => 100,
            Self::Epic => 200,
            Self::Legendary => 400,
        }
    }

    /// Display prefix for generated resource names.
    #[must_use]
    pub const fn display_prefix(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }

    /// Draw a rarity from the shared weight table (60/25/12/3).
    pub fn roll(rng: &mut dyn RandomSource) -> Self {
        let pick = rng.next_u64() % 100;
        let mut cumulative = 0;
        for rarity in [Self::Common, Self::Rare, Self::Epic, Self::Legendary] {
            cumulative += u64::from(rarity.weight());
            if pick < cumulative {
                return rarity;
            }
        }
        Self::Common
    }
}

/// A gatherable resource stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Stack quantity (positive).
    pub quantity: u32,
    /// Rarity tier.
    pub rarity: Rarity,
}

impl Resource {
    /// Create a resource with a generated display name.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ResourceKind, quantity: u32, rarity: Rarity) -> Self {
        Self {
            id: id.into(),
            name: format!("{} {}", rarity.display_prefix(), kind.base_name()),
            kind,
            quantity,
            rarity,
        }
    }

    /// Draw a random resource using the shared rarity weight table.
    ///
    /// Used as the fallback when a mining target carries no resource
    /// pool of its own, and for the occasional stack seeded into
    /// generated extraction bodies.
    pub fn random(rng: &mut dyn RandomSource) -> Self {
        let kind = ResourceKind::ALL[(rng.next_u64() % 3) as usize];
        let rarity = Rarity::roll(rng);
        let (min, max) = rarity.quantity_range();
        let quantity = rng.range_u32_inclusive(min, max);
        let id = format!("res-{:016x}", rng.next_u64());
        Self::new(id, kind, quantity, rarity)
    }
}

/// A placed object in the generated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceEntity {
    /// Unique identifier.
    pub id: EntityId,
    /// Entity kind.
    pub kind: EntityKind,
    /// World position.
    pub position: Vec3,
    /// Rotation (euler angles, radians).
    pub rotation: Vec3,
    /// Scale per axis (uniform for generated entities).
    pub scale: Vec3,
    /// Health, present for stations, deposits and extraction bodies.
    pub health: Option<Health>,
    /// Resource contents, possibly empty.
    pub resources: Vec<Resource>,
}

impl SpaceEntity {
    /// Create an entity with no health and no resources.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::splat(1.0),
            health: None,
            resources: Vec::new(),
        }
    }

    /// Set rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set uniform scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Set health to full at the given maximum.
    #[must_use]
    pub const fn with_health(mut self, max: i32) -> Self {
        self.health = Some(Health::full(max));
        self
    }

    /// Set resource contents.
    #[must_use]
    pub fn with_resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = resources;
        self
    }

    /// Whether the entity's health (if any) is depleted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.health.is_some_and(|h| h.is_depleted())
    }
}
