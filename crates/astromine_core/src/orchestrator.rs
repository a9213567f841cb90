//! Orchestration layer.
//!
//! Composes the mining engine, crafting engine and discovery system,
//! applies actor-level efficiency, drives the per-tick update, and
//! fans completion batches out to the host's collaborator. The world
//! entity list is owned here and replaced wholesale on regeneration;
//! the engines only ever read it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::crafting::{CraftingEngine, CraftingResult, RecipeCatalog};
use crate::discovery::{DiscoveryKind, DiscoveryStats, DiscoverySystem, ExplorationResult};
use crate::efficiency::EfficiencyBonuses;
use crate::entity::{EntityId, Resource, ResourceKind, SpaceEntity};
use crate::math::Vec3;
use crate::mining::{MiningEngine, MiningResult};
use crate::operation::{ActorId, ActorSlots, OperationId, StartDenied};
use crate::rng::Lcg64;
use crate::worldgen::Sector;

/// Host-side collaborator receiving engine events.
///
/// Push callbacks fire once per relevant event during `update` or a
/// position update; `loyalty_multiplier` is pulled once per start
/// call. All methods have no-op defaults so hosts implement only what
/// they consume.
pub trait Collaborator {
    /// A resource or item was granted to the actor's inventory.
    fn on_resource_added(&mut self, _resource: &Resource) {}

    /// Experience was gained.
    fn on_experience_gained(&mut self, _amount: u32) {}

    /// A mining operation finished (successfully or degraded).
    fn on_mining_complete(&mut self, _result: &MiningResult) {}

    /// A crafting operation finished (successfully or degraded).
    fn on_crafting_complete(&mut self, _result: &CraftingResult) {}

    /// A discovery fired for a position update.
    fn on_exploration_complete(&mut self, _result: &ExplorationResult) {}

    /// A mission-progress counter should be incremented.
    fn on_mission_progress(&mut self, _activity: &str, _increment: u32) {}

    /// Periodic engine statistics snapshot.
    fn on_stats_snapshot(&mut self, _stats: &EngineStats) {}

    /// External loyalty provider; multiplies into efficiency.
    fn loyalty_multiplier(&mut self, _actor: &ActorId) -> f32 {
        1.0
    }
}

/// Engine-level counters, periodically snapshotted to the collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineStats {
    /// Successful mining completions.
    pub mining_completed: u64,
    /// Successful crafting completions.
    pub crafting_completed: u64,
    /// Completions degraded by a vanished target or recipe.
    pub failed_completions: u64,
    /// Explicit cancellations.
    pub cancellations: u64,
    /// Entity discoveries across all actors.
    pub entities_discovered: u64,
    /// Novel locations visited across all actors.
    pub locations_visited: u64,
    /// Total experience pushed to the collaborator.
    pub experience_awarded: u64,
    /// Distance travelled summed across all actors.
    pub total_distance: f32,
}

/// Per-actor profile the orchestrator maintains for efficiency and
/// recipe gating.
#[derive(Debug, Clone, Default)]
struct ActorProfile {
    bonuses: EfficiencyBonuses,
    level: u32,
}

/// Top-level engine facade driven by the host's update loop.
pub struct Orchestrator<C: Collaborator> {
    config: EngineConfig,
    mining: MiningEngine,
    crafting: CraftingEngine,
    discovery: DiscoverySystem,
    catalog: RecipeCatalog,
    entities: Vec<SpaceEntity>,
    slots: ActorSlots,
    profiles: HashMap<ActorId, ActorProfile>,
    collaborator: C,
    rng: Lcg64,
    stats: EngineStats,
    now_ms: u64,
    last_snapshot_ms: u64,
}

impl<C: Collaborator> Orchestrator<C> {
    /// Create an orchestrator.
    ///
    /// `seed` drives yield rolls and bonus procs; world generation is
    /// seeded separately through [`crate::worldgen`].
    #[must_use]
    pub fn new(config: EngineConfig, catalog: RecipeCatalog, collaborator: C, seed: u64) -> Self {
        Self {
            mining: MiningEngine::new(config.clone()),
            crafting: CraftingEngine::new(config.clone()),
            discovery: DiscoverySystem::new(config.clone()),
            config,
            catalog,
            entities: Vec::new(),
            slots: ActorSlots::new(),
            profiles: HashMap::new(),
            collaborator,
            rng: Lcg64::new(seed),
            stats: EngineStats::default(),
            now_ms: 0,
            last_snapshot_ms: 0,
        }
    }

    /// Replace the shared world entity list.
    ///
    /// Must be called whenever the visible sector changes; mining and
    /// discovery both read this list.
    pub fn update_space_objects(&mut self, entities: Vec<SpaceEntity>) {
        tracing::debug!(count = entities.len(), "world entities replaced");
        self.entities = entities;
    }

    /// Load a generated sector as the current world.
    pub fn load_sector(&mut self, sector: &Sector) {
        self.update_space_objects(sector.entities.clone());
    }

    /// Current world entities.
    #[must_use]
    pub fn space_objects(&self) -> &[SpaceEntity] {
        &self.entities
    }

    /// Set an actor's efficiency bonus sources.
    pub fn set_actor_bonuses(&mut self, actor: &ActorId, bonuses: EfficiencyBonuses) {
        self.profiles.entry(actor.clone()).or_default().bonuses = bonuses;
    }

    /// Set an actor's level (gates recipes with a minimum level).
    pub fn set_actor_level(&mut self, actor: &ActorId, level: u32) {
        self.profiles.entry(actor.clone()).or_default().level = level;
    }

    /// Combined efficiency for an actor, loyalty included, capped.
    fn efficiency_for(&mut self, actor: &ActorId) -> f32 {
        let loyalty = self.collaborator.loyalty_multiplier(actor);
        let bonuses = self
            .profiles
            .get(actor)
            .map_or_else(EfficiencyBonuses::none, |p| p.bonuses.clone());
        bonuses.combined(loyalty, self.config.max_efficiency)
    }

    /// Precondition query for mining, without mutating anything.
    pub fn can_start_mining(&self, actor: &ActorId, target: EntityId) -> Result<(), StartDenied> {
        let entity = self.entities.iter().find(|e| e.id == target);
        self.mining.can_start(actor, entity, &self.slots)
    }

    /// Start a mining operation against a world entity.
    pub fn start_mining(
        &mut self,
        actor: &ActorId,
        target: EntityId,
    ) -> Result<OperationId, StartDenied> {
        let efficiency = self.efficiency_for(actor);
        let entity = self
            .entities
            .iter()
            .find(|e| e.id == target)
            .ok_or(StartDenied::UnknownTarget)?
            .clone();
        self.mining
            .start(actor, &entity, efficiency, &mut self.slots)
    }

    /// Cancel an active mining operation. No partial yield.
    pub fn cancel_mining(&mut self, id: OperationId) -> bool {
        let cancelled = self.mining.cancel(id, &mut self.slots);
        if cancelled {
            self.stats.cancellations += 1;
        }
        cancelled
    }

    /// Start a crafting operation from the catalog.
    ///
    /// `inventory` is the host's view of the actor's resources; the
    /// engine validates against it but deduction stays with the
    /// inventory collaborator.
    pub fn start_crafting(
        &mut self,
        actor: &ActorId,
        recipe_id: &str,
        inventory: &HashMap<ResourceKind, u32>,
    ) -> Result<OperationId, StartDenied> {
        let efficiency = self.efficiency_for(actor);
        let level = self.profiles.get(actor).map_or(1, |p| p.level.max(1));
        let recipe = self
            .catalog
            .get(recipe_id)
            .ok_or(StartDenied::UnknownRecipe)?
            .clone();
        self.crafting
            .start(actor, &recipe, level, inventory, efficiency, &mut self.slots)
    }

    /// Cancel an active crafting operation.
    pub fn cancel_crafting(&mut self, id: OperationId) -> bool {
        let cancelled = self.crafting.cancel(id, &mut self.slots);
        if cancelled {
            self.stats.cancellations += 1;
        }
        cancelled
    }

    /// Process an actor position update and dispatch any discovery.
    pub fn update_position(&mut self, actor: &ActorId, position: Vec3) {
        let result =
            self.discovery
                .update_position(actor, position, self.now_ms, &self.entities);
        if let Some(result) = result {
            self.dispatch_exploration(&result);
        }
    }

    /// Drive one engine tick: mining first, then crafting, fixed order.
    ///
    /// Every operation whose deadline passed is completed, dispatched
    /// and evicted before this returns.
    pub fn update(&mut self, delta_ms: u64) {
        self.now_ms += delta_ms;

        let mining_results =
            self.mining
                .tick(delta_ms, &self.entities, &mut self.rng, &mut self.slots);
        for result in &mining_results {
            self.dispatch_mining(result);
        }

        let crafting_results =
            self.crafting
                .tick(delta_ms, &self.catalog, &mut self.rng, &mut self.slots);
        for result in &crafting_results {
            self.dispatch_crafting(result);
        }

        if self.now_ms.saturating_sub(self.last_snapshot_ms) >= self.config.stats_interval_ms {
            self.last_snapshot_ms = self.now_ms;
            self.stats.total_distance = self.discovery.total_distance();
            self.collaborator.on_stats_snapshot(&self.stats);
        }
    }

    /// Engine-level counters.
    #[must_use]
    pub const fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Discovery statistics for an actor.
    #[must_use]
    pub fn discovery_stats(&self, actor: &ActorId) -> Option<DiscoveryStats> {
        self.discovery.stats(actor, self.now_ms)
    }

    /// Current engine time.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Borrow the collaborator (tests inspect recorded events here).
    #[must_use]
    pub const fn collaborator(&self) -> &C {
        &self.collaborator
    }

    fn grant_experience(&mut self, amount: u32) {
        if amount > 0 {
            self.collaborator.on_experience_gained(amount);
            self.stats.experience_awarded += u64::from(amount);
        }
    }

    fn dispatch_mining(&mut self, result: &MiningResult) {
        if result.success {
            self.stats.mining_completed += 1;
            for resource in &result.resources {
                self.collaborator.on_resource_added(resource);
            }
        } else {
            self.stats.failed_completions += 1;
        }
        self.grant_experience(result.experience);
        self.collaborator.on_mining_complete(result);

        if result.success {
            self.collaborator.on_mission_progress("mining", 1);
            let mut kinds: Vec<ResourceKind> =
                result.resources.iter().map(|r| r.kind).collect();
            kinds.sort_unstable_by_key(|k| k.key());
            kinds.dedup();
            for kind in kinds {
                self.collaborator
                    .on_mission_progress(&format!("mining_{}", kind.key()), 1);
            }
        }
    }

    fn dispatch_crafting(&mut self, result: &CraftingResult) {
        if result.success {
            self.stats.crafting_completed += 1;
            if let Some(item) = &result.item {
                self.collaborator.on_resource_added(item);
            }
            if let Some(bonus) = &result.bonus {
                self.collaborator.on_resource_added(bonus);
            }
        } else {
            self.stats.failed_completions += 1;
        }
        self.grant_experience(result.experience);
        self.collaborator.on_crafting_complete(result);

        if result.success {
            self.collaborator.on_mission_progress("crafting", 1);
        }
    }

    fn dispatch_exploration(&mut self, result: &ExplorationResult) {
        let branch_key = match result.kind {
            DiscoveryKind::Object { .. } => {
                self.stats.entities_discovered += 1;
                "object_discovery"
            }
            DiscoveryKind::Location { .. } => {
                self.stats.locations_visited += 1;
                "location_discovery"
            }
        };
        self.grant_experience(result.experience);
        self.collaborator.on_exploration_complete(result);
        self.collaborator.on_mission_progress("exploration", 1);
        self.collaborator.on_mission_progress(branch_key, 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Rarity};

    /// Collaborator that records everything it is told.
    #[derive(Debug, Default)]
    struct Recorder {
        resources: Vec<Resource>,
        experience: u32,
        mining_results: Vec<MiningResult>,
        crafting_results: Vec<CraftingResult>,
        exploration_results: Vec<ExplorationResult>,
        mission_progress: Vec<(String, u32)>,
        snapshots: Vec<EngineStats>,
        loyalty: f32,
    }

    impl Recorder {
        fn with_loyalty(loyalty: f32) -> Self {
            Self {
                loyalty,
                ..Self::default()
            }
        }

        fn mission_count(&self, key: &str) -> u32 {
            self.mission_progress
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, n)| n)
                .sum()
        }
    }

    impl Collaborator for Recorder {
        fn on_resource_added(&mut self, resource: &Resource) {
            self.resources.push(resource.clone());
        }
        fn on_experience_gained(&mut self, amount: u32) {
            self.experience += amount;
        }
        fn on_mining_complete(&mut self, result: &MiningResult) {
            self.mining_results.push(result.clone());
        }
        fn on_crafting_complete(&mut self, result: &CraftingResult) {
            self.crafting_results.push(result.clone());
        }
        fn on_exploration_complete(&mut self, result: &ExplorationResult) {
            self.exploration_results.push(result.clone());
        }
        fn on_mission_progress(&mut self, activity: &str, increment: u32) {
            self.mission_progress
                .push((activity.to_string(), increment));
        }
        fn on_stats_snapshot(&mut self, stats: &EngineStats) {
            self.snapshots.push(*stats);
        }
        fn loyalty_multiplier(&mut self, _actor: &ActorId) -> f32 {
            self.loyalty
        }
    }

    fn test_recipe() -> crate::crafting::Recipe {
        crate::crafting::Recipe {
            id: "cell".to_string(),
            name: "Power Cell".to_string(),
            required: vec![crate::crafting::Requirement {
                kind: ResourceKind::Energy,
                quantity: 2,
            }],
            output: crate::crafting::OutputSpec {
                id: "cell-item".to_string(),
                name: "Power Cell".to_string(),
                kind: ResourceKind::Energy,
                rarity: Rarity::Common,
                quantity: 1,
            },
            base_duration_ms: 4_000,
            min_level: 1,
        }
    }

    fn orchestrator_with(recorder: Recorder) -> Orchestrator<Recorder> {
        let mut catalog = RecipeCatalog::new();
        catalog.register(test_recipe()).unwrap();
        Orchestrator::new(EngineConfig::default(), catalog, recorder, 42)
    }

    fn world_with_body() -> Vec<SpaceEntity> {
        vec![SpaceEntity::new(
            EntityId::new(1),
            EntityKind::ExtractionBody,
            Vec3::ZERO,
        )
        .with_scale(1.0)
        .with_health(100)]
    }

    #[test]
    fn test_mining_flow_dispatches_events() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");

        orch.start_mining(&a, EntityId::new(1)).unwrap();
        orch.update(10_000);

        let recorder = orch.collaborator();
        assert_eq!(recorder.mining_results.len(), 1);
        assert!(recorder.mining_results[0].success);
        assert!(!recorder.resources.is_empty());
        assert_eq!(recorder.experience, 25);
        assert_eq!(recorder.mission_count("mining"), 1);
        // Per-resource-kind key fired at least once
        assert!(recorder
            .mission_progress
            .iter()
            .any(|(k, _)| k.starts_with("mining_")));
        assert_eq!(orch.stats().mining_completed, 1);
    }

    #[test]
    fn test_loyalty_raises_efficiency() {
        // Loyalty 1.5 -> efficiency 1.5 -> duration 4000/1.5 = 2666ms
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.5));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");

        orch.start_mining(&a, EntityId::new(1)).unwrap();
        orch.update(2_500);
        assert!(orch.collaborator().mining_results.is_empty());
        orch.update(200);
        assert_eq!(orch.collaborator().mining_results.len(), 1);
    }

    #[test]
    fn test_efficiency_capped_before_start() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(3.0));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");
        orch.set_actor_bonuses(
            &a,
            EfficiencyBonuses {
                trait_multipliers: vec![5.0],
                equipment_multipliers: vec![2.0],
                item_effects: vec![3.0, 3.0],
            },
        );

        orch.start_mining(&a, EntityId::new(1)).unwrap();
        // Capped at 3.0: duration = 4000 / 3.0 = 1333ms, never shorter
        orch.update(1_000);
        assert!(orch.collaborator().mining_results.is_empty());
        orch.update(400);
        assert_eq!(orch.collaborator().mining_results.len(), 1);
        // Experience floor(25 * 3.0) = 75 confirms the capped value
        assert_eq!(orch.collaborator().experience, 75);
    }

    #[test]
    fn test_shared_cap_across_mining_and_crafting() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        let mut world = world_with_body();
        world.push(
            SpaceEntity::new(EntityId::new(2), EntityKind::ExtractionBody, Vec3::ZERO)
                .with_health(100),
        );
        orch.update_space_objects(world);
        let a = ActorId::new("pilot");
        let inventory = HashMap::from([(ResourceKind::Energy, 50)]);

        orch.start_mining(&a, EntityId::new(1)).unwrap();
        orch.start_mining(&a, EntityId::new(2)).unwrap();
        orch.start_crafting(&a, "cell", &inventory).unwrap();

        // Third slot used by crafting: the fourth operation is denied
        // no matter which engine it targets
        assert_eq!(
            orch.start_crafting(&a, "cell", &inventory),
            Err(StartDenied::ActorAtCapacity)
        );
    }

    #[test]
    fn test_cancel_frees_shared_slot() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");
        let inventory = HashMap::from([(ResourceKind::Energy, 50)]);

        let ids: Vec<OperationId> = (0..3)
            .map(|_| orch.start_crafting(&a, "cell", &inventory).unwrap())
            .collect();
        assert_eq!(
            orch.start_mining(&a, EntityId::new(1)),
            Err(StartDenied::ActorAtCapacity)
        );

        assert!(orch.cancel_crafting(ids[0]));
        assert!(orch.start_mining(&a, EntityId::new(1)).is_ok());
        assert_eq!(orch.stats().cancellations, 1);
    }

    #[test]
    fn test_crafting_flow_dispatches_events() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        let a = ActorId::new("pilot");
        let inventory = HashMap::from([(ResourceKind::Energy, 5)]);

        orch.start_crafting(&a, "cell", &inventory).unwrap();
        orch.update(4_000);

        let recorder = orch.collaborator();
        assert_eq!(recorder.crafting_results.len(), 1);
        assert!(recorder.crafting_results[0].success);
        assert_eq!(recorder.resources.len(), 1);
        assert_eq!(recorder.resources[0].id, "cell-item");
        // Common output: floor(50 * 1.0)
        assert_eq!(recorder.experience, 50);
        assert_eq!(recorder.mission_count("crafting"), 1);
        assert_eq!(orch.stats().crafting_completed, 1);
    }

    #[test]
    fn test_unknown_recipe_denied() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        let a = ActorId::new("pilot");
        assert_eq!(
            orch.start_crafting(&a, "no-such-recipe", &HashMap::new()),
            Err(StartDenied::UnknownRecipe)
        );
    }

    #[test]
    fn test_exploration_dispatch_keys() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");

        // Near the body: object discovery
        orch.update_position(&a, Vec3::new(1.0, 0.0, 0.0));
        // Far from everything: location discovery
        orch.update_position(&a, Vec3::new(500.0, 0.0, 0.0));

        let recorder = orch.collaborator();
        assert_eq!(recorder.exploration_results.len(), 2);
        assert_eq!(recorder.mission_count("exploration"), 2);
        assert_eq!(recorder.mission_count("object_discovery"), 1);
        assert_eq!(recorder.mission_count("location_discovery"), 1);
        // 30 (20 + extraction-body bonus 10) + 15
        assert_eq!(recorder.experience, 45);
        assert_eq!(orch.stats().entities_discovered, 1);
        assert_eq!(orch.stats().locations_visited, 1);
    }

    #[test]
    fn test_world_replacement_degrades_inflight_mining() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");

        orch.start_mining(&a, EntityId::new(1)).unwrap();
        // Sector regenerates mid-operation
        orch.update_space_objects(Vec::new());
        orch.update(100_000);

        let recorder = orch.collaborator();
        assert_eq!(recorder.mining_results.len(), 1);
        assert!(!recorder.mining_results[0].success);
        assert!(recorder.resources.is_empty());
        assert_eq!(recorder.mission_count("mining"), 0);
        assert_eq!(orch.stats().failed_completions, 1);
    }

    #[test]
    fn test_stats_snapshot_on_interval() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));

        orch.update(29_000);
        assert!(orch.collaborator().snapshots.is_empty());
        orch.update(1_000);
        assert_eq!(orch.collaborator().snapshots.len(), 1);

        // Next snapshot a full interval later
        orch.update(29_999);
        assert_eq!(orch.collaborator().snapshots.len(), 1);
        orch.update(1);
        assert_eq!(orch.collaborator().snapshots.len(), 2);
    }

    #[test]
    fn test_can_start_mining_is_pure() {
        let mut orch = orchestrator_with(Recorder::with_loyalty(1.0));
        orch.update_space_objects(world_with_body());
        let a = ActorId::new("pilot");

        assert!(orch.can_start_mining(&a, EntityId::new(1)).is_ok());
        assert_eq!(
            orch.can_start_mining(&a, EntityId::new(99)),
            Err(StartDenied::UnknownTarget)
        );
        // Query did not consume a slot
        assert!(orch.start_mining(&a, EntityId::new(1)).is_ok());
    }
}
