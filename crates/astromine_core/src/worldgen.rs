//! Procedural sector generation.
//!
//! Places extraction bodies, deposits and stations inside a seeded
//! sector volume. Identical `(seed, config)` pairs reproduce identical
//! worlds, which reward-balance tests and composed call sites (main
//! sector plus secondary asteroid fields) depend on.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityKind, Rarity, Resource, ResourceKind, SpaceEntity};
use crate::math::Vec3;
use crate::rng::{Lcg64, RandomSource};

/// Fixed pool of sector base names; the seed picks one and appends a suffix.
const SECTOR_NAMES: [&str; 8] = [
    "Kepler Reach",
    "Tycho Expanse",
    "Cassini Drift",
    "Halley Verge",
    "Oort Margin",
    "Lagrange Deep",
    "Vesta Span",
    "Ceres Shelf",
];

/// Configuration for sector generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Side length of the sector cube, centered at the origin.
    pub size: f32,
    /// Number of extraction bodies to place.
    pub extraction_count: u32,
    /// Number of deposits to place.
    pub deposit_count: u32,
    /// Number of stations to place (clustered toward the center).
    pub station_count: u32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            size: 40.0,
            extraction_count: 15,
            deposit_count: 8,
            station_count: 2,
            seed: 12345,
        }
    }
}

impl SectorConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the sector size.
    #[must_use]
    pub const fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Axis-aligned bounding box of a generated sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl BoundingBox {
    /// Cube of the given side length centered at the origin.
    #[must_use]
    pub fn centered_cube(size: f32) -> Self {
        let half = size / 2.0;
        Self {
            min: Vec3::splat(-half),
            max: Vec3::splat(half),
        }
    }

    /// Whether a point lies inside (inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// A generated sector: named entity batch plus its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Display name, seed-derived.
    pub name: String,
    /// Configuration used for generation.
    pub config: SectorConfig,
    /// All placed entities.
    pub entities: Vec<SpaceEntity>,
    /// Sector bounding box.
    pub bounds: BoundingBox,
}

/// Generate a sector from the given configuration.
#[must_use]
pub fn generate_sector(config: &SectorConfig) -> Sector {
    let mut rng = Lcg64::new(config.seed);
    let mut entities = Vec::with_capacity(
        (config.extraction_count + config.deposit_count + config.station_count) as usize,
    );
    let mut index = 0u64;

    let half = config.size / 2.0;
    // Stations cluster toward the center: inner third of the cube
    let inner = config.size / 6.0;

    for _ in 0..config.extraction_count {
        let position = random_in_cube(&mut rng, half);
        entities.push(generate_extraction_body(
            entity_id(config.seed, index),
            position,
            &mut rng,
        ));
        index += 1;
    }

    for _ in 0..config.deposit_count {
        let position = random_in_cube(&mut rng, half);
        entities.push(generate_deposit(
            entity_id(config.seed, index),
            position,
            &mut rng,
        ));
        index += 1;
    }

    for _ in 0..config.station_count {
        let position = random_in_cube(&mut rng, inner);
        entities.push(generate_station(
            entity_id(config.seed, index),
            position,
            &mut rng,
        ));
        index += 1;
    }

    Sector {
        name: sector_name(config.seed),
        config: config.clone(),
        entities,
        bounds: BoundingBox::centered_cube(config.size),
    }
}

/// Generate a dense secondary cluster of small extraction bodies.
///
/// Placement is uniform inside a sphere (not a cube) of `radius`
/// around `center`.
#[must_use]
pub fn generate_field(center: Vec3, radius: f32, count: u32, seed: u64) -> Vec<SpaceEntity> {
    let mut rng = Lcg64::new(seed);
    let mut entities = Vec::with_capacity(count as usize);

    for index in 0..u64::from(count) {
        let position = center + random_in_sphere(&mut rng, radius);
        let scale = rng.range_f32(0.2, 0.8);
        let health = (50.0 * scale).floor() as i32;

        let mut entity = SpaceEntity::new(
            entity_id(seed.rotate_left(32), index),
            EntityKind::ExtractionBody,
            position,
        )
        .with_rotation(random_rotation(&mut rng))
        .with_scale(scale)
        .with_health(health);

        if rng.chance(0.2) {
            entity.resources.push(Resource::random(&mut rng));
        }
        entities.push(entity);
    }

    entities
}

fn sector_name(seed: u64) -> String {
    let base = SECTOR_NAMES[(seed % SECTOR_NAMES.len() as u64) as usize];
    format!("{base} {:03}", seed % 1000)
}

fn entity_id(seed: u64, index: u64) -> EntityId {
    // Mix the seed into the high bits so composed call sites
    // (sector plus fields) do not collide
    EntityId::new(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ index)
}

fn random_in_cube(rng: &mut dyn RandomSource, half: f32) -> Vec3 {
    Vec3::new(
        rng.range_f32(-half, half),
        rng.range_f32(-half, half),
        rng.range_f32(-half, half),
    )
}

fn random_in_sphere(rng: &mut dyn RandomSource, radius: f32) -> Vec3 {
    // Uniform over the ball: random direction, cube-root radial falloff
    let theta = rng.range_f32(0.0, std::f32::consts::TAU);
    let cos_phi = rng.range_f32(-1.0, 1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let r = radius * rng.next_f32().cbrt();
    Vec3::new(
        r * sin_phi * theta.cos(),
        r * sin_phi * theta.sin(),
        r * cos_phi,
    )
}

fn random_rotation(rng: &mut dyn RandomSource) -> Vec3 {
    Vec3::new(
        rng.range_f32(0.0, std::f32::consts::TAU),
        rng.range_f32(0.0, std::f32::consts::TAU),
        rng.range_f32(0.0, std::f32::consts::TAU),
    )
}

fn generate_extraction_body(
    id: EntityId,
    position: Vec3,
    rng: &mut dyn RandomSource,
) -> SpaceEntity {
    let scale = rng.range_f32(0.3, 1.2);
    let health = (100.0 * scale).floor() as i32;

    let mut entity = SpaceEntity::new(id, EntityKind::ExtractionBody, position)
        .with_rotation(random_rotation(rng))
        .with_scale(scale)
        .with_health(health);

    if rng.chance(0.3) {
        entity.resources.push(Resource::random(rng));
    }
    entity
}

fn generate_deposit(id: EntityId, position: Vec3, rng: &mut dyn RandomSource) -> SpaceEntity {
    let scale = rng.range_f32(0.8, 1.5);
    let health = (200.0 * scale).floor() as i32;
    let rarity = Rarity::roll(rng);

    let mut resources = Vec::new();
    for _ in 0..rarity.deposit_resource_count() {
        let kind = ResourceKind::ALL[(rng.next_u64() % 3) as usize];
        let quantity = rng.range_u32_inclusive(10, 50);
        let res_id = format!("res-{:016x}", rng.next_u64());
        resources.push(Resource::new(res_id, kind, quantity, rarity));
    }

    SpaceEntity::new(id, EntityKind::Deposit, position)
        .with_rotation(random_rotation(rng))
        .with_scale(scale)
        .with_health(health)
        .with_resources(resources)
}

fn generate_station(id: EntityId, position: Vec3, rng: &mut dyn RandomSource) -> SpaceEntity {
    let scale = rng.range_f32(2.0, 4.0);
    let health = (500.0 * scale).floor() as i32;

    SpaceEntity::new(id, EntityKind::Station, position)
        .with_rotation(random_rotation(rng))
        .with_scale(scale)
        .with_health(health)
}
