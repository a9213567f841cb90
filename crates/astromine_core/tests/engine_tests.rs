//! End-to-end engine scenarios and property tests.
//!
//! Unit behavior lives next to each module; these tests exercise the
//! engines together through the orchestrator and pin the invariants
//! hosts rely on: reproducible worlds, monotonic progress, exactly-once
//! completion, discovery-set growth and location separation.

use std::collections::HashMap;

use astromine_core::prelude::*;
use astromine_test_utils::determinism::{check_determinism, strategies};
use astromine_test_utils::fixtures;
use astromine_test_utils::proptest::prelude::*;
use astromine_test_utils::recording::RecordingCollaborator;

fn orchestrator() -> Orchestrator<RecordingCollaborator> {
    Orchestrator::new(
        EngineConfig::default(),
        fixtures::sample_catalog(),
        RecordingCollaborator::new(),
        42,
    )
}

// =============================================================================
// World generation
// =============================================================================

#[test]
fn test_sector_generation_reproducible() {
    let result = check_determinism(3, |_| {
        generate_sector(&fixtures::test_sector_config()).entities
    });
    result.assert_deterministic();
}

#[test]
fn test_sector_entity_counts_and_bounds() {
    let config = fixtures::test_sector_config();
    let sector = generate_sector(&config);

    assert_eq!(sector.entities.len(), 25);
    for entity in &sector.entities {
        assert!(
            sector.bounds.contains(entity.position),
            "{:?} generated outside the sector bounds",
            entity.id
        );
    }
}

#[test]
fn test_field_composes_with_sector_without_id_collisions() {
    let config = fixtures::test_sector_config();
    let sector = generate_sector(&config);
    let field = generate_field(Vec3::new(500.0, 0.0, 0.0), 30.0, 25, config.seed);

    let mut ids: Vec<EntityId> = sector
        .entities
        .iter()
        .chain(field.iter())
        .map(|e| e.id)
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total, "entity ids must be unique across calls");
}

// =============================================================================
// Timed operations
// =============================================================================

#[test]
fn test_duration_scales_with_efficiency() {
    // base 5000ms, extraction factor 0.8 -> 4000ms, efficiency 2.0 -> 2000ms
    let mut engine = MiningEngine::new(EngineConfig::default());
    let mut slots = ActorSlots::new();
    let body = fixtures::extraction_body(1, Vec3::ZERO);

    let id = engine
        .start(&fixtures::pilot(), &body, 2.0, &mut slots)
        .unwrap();
    assert_eq!(engine.operation(id).unwrap().duration_ms, 2_000);
}

#[test]
fn test_simultaneous_completions_drain_in_one_tick() {
    let mut orch = orchestrator();
    let world: Vec<SpaceEntity> = (1..=3)
        .map(|id| fixtures::extraction_body(id, Vec3::ZERO))
        .collect();
    orch.update_space_objects(world);
    let pilot = fixtures::pilot();

    let mut started = Vec::new();
    for id in 1..=3 {
        started.push(orch.start_mining(&pilot, EntityId::new(id)).unwrap());
    }

    // All three share the same deadline; one late tick must complete
    // the whole batch in start order, exactly once
    orch.update(3_600_000);
    let completed: Vec<OperationId> = orch
        .collaborator()
        .mining_results
        .iter()
        .map(|r| r.operation_id)
        .collect();
    assert_eq!(completed, started);

    // Nothing left to complete
    orch.update(3_600_000);
    assert_eq!(orch.collaborator().mining_results.len(), 3);
}

#[test]
fn test_mining_denied_on_depleted_target() {
    let mut orch = orchestrator();
    let mut body = fixtures::extraction_body(1, Vec3::ZERO);
    body.health.as_mut().unwrap().current = 0;
    orch.update_space_objects(vec![body]);

    assert_eq!(
        orch.start_mining(&fixtures::pilot(), EntityId::new(1)),
        Err(StartDenied::TargetDepleted)
    );
}

#[test]
fn test_missing_resources_reported_in_full() {
    let recipe = fixtures::hull_plating_recipe();
    let inventory = HashMap::from([(ResourceKind::Metal, 3)]);

    let check = can_craft(&recipe, &inventory);
    assert!(!check.can_craft);
    assert_eq!(
        check.missing,
        vec![
            MissingResource {
                kind: ResourceKind::Metal,
                needed: 5,
                have: 3,
            },
            MissingResource {
                kind: ResourceKind::Crystal,
                needed: 2,
                have: 0,
            },
        ]
    );
}

#[test]
fn test_mixed_mining_and_crafting_session() {
    let mut orch = orchestrator();
    orch.update_space_objects(vec![
        fixtures::extraction_body(1, Vec3::ZERO),
        fixtures::metal_deposit(2, Vec3::new(20.0, 0.0, 0.0)),
    ]);
    let pilot = fixtures::pilot();
    orch.set_actor_level(&pilot, 5);

    orch.start_mining(&pilot, EntityId::new(1)).unwrap();
    orch.start_crafting(&pilot, "power-cell", &fixtures::rich_inventory())
        .unwrap();
    orch.start_mining(&pilot, EntityId::new(2)).unwrap();
    assert_eq!(
        orch.start_crafting(&pilot, "hull-plating", &fixtures::rich_inventory()),
        Err(StartDenied::ActorAtCapacity)
    );

    // Mining at 4000/7500ms, crafting at 4000ms: all done by 8000
    orch.update(8_000);
    let recorder = orch.collaborator();
    assert_eq!(recorder.mining_results.len(), 2);
    assert_eq!(recorder.crafting_results.len(), 1);
    assert!(recorder.mining_results.iter().all(|r| r.success));
    assert!(recorder.crafting_results[0].success);
    assert_eq!(recorder.mission_count("mining"), 2);
    assert_eq!(recorder.mission_count("crafting"), 1);

    // Every slot released again
    orch.start_crafting(&pilot, "hull-plating", &fixtures::rich_inventory())
        .unwrap();
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_discovered_set_grows_without_duplicates() {
    let config = EngineConfig::default();
    let mut system = DiscoverySystem::new(config);
    let pilot = fixtures::pilot();
    let entities = vec![
        fixtures::station(1, Vec3::ZERO),
        fixtures::extraction_body(2, Vec3::new(2.0, 0.0, 0.0)),
    ];

    let mut previous = 0;
    for step in 0u64..6 {
        system.update_position(&pilot, Vec3::ZERO, step * 3_000, &entities);
        let stats = system.stats(&pilot, step * 3_000).unwrap();
        assert!(stats.discovered_entities >= previous);
        assert!(stats.discovered_entities <= entities.len());
        previous = stats.discovered_entities;
    }
    assert_eq!(previous, 2);
}

#[test]
fn test_visited_locations_pairwise_separated() {
    let mut orch = orchestrator();
    let pilot = fixtures::pilot();

    let mut visited = Vec::new();
    // Walk a line in 8-unit steps; only some stops are novel
    for step in 0..10 {
        let position = Vec3::new(step as f32 * 8.0, 0.0, 0.0);
        orch.update_position(&pilot, position);
        orch.update(1_000);
        visited.push(position);
    }

    let recorded: Vec<Vec3> = orch
        .collaborator()
        .exploration_results
        .iter()
        .filter_map(|r| match r.kind {
            DiscoveryKind::Location { position } => Some(position),
            DiscoveryKind::Object { .. } => None,
        })
        .collect();
    assert!(!recorded.is_empty());
    for (i, a) in recorded.iter().enumerate() {
        for b in &recorded[i + 1..] {
            assert!(
                a.distance(*b) > 15.0,
                "recorded locations {a:?} and {b:?} violate separation"
            );
        }
    }
}

#[test]
fn test_rapid_double_discovery_second_is_silent() {
    let mut orch = orchestrator();
    orch.update_space_objects(vec![
        fixtures::extraction_body(1, Vec3::ZERO),
        fixtures::extraction_body(2, Vec3::new(1.0, 0.0, 0.0)),
    ]);
    let pilot = fixtures::pilot();

    orch.update_position(&pilot, Vec3::ZERO);
    orch.update(500);
    orch.update_position(&pilot, Vec3::ZERO);

    let recorder = orch.collaborator();
    assert_eq!(recorder.exploration_results.len(), 2);
    assert!(!recorder.exploration_results[0].message.is_empty());
    assert!(recorder.exploration_results[1].message.is_empty());
    // Both still counted and rewarded
    assert_eq!(orch.stats().entities_discovered, 2);
    assert_eq!(recorder.experience, 60);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_sector_generation_deterministic(config in strategies::arb_sector_config()) {
        let a = generate_sector(&config);
        let b = generate_sector(&config);
        prop_assert_eq!(a.entities, b.entities);
    }

    #[test]
    fn prop_generated_entities_inside_bounds(config in strategies::arb_sector_config()) {
        let sector = generate_sector(&config);
        for entity in &sector.entities {
            prop_assert!(sector.bounds.contains(entity.position));
        }
    }

    #[test]
    fn prop_progress_monotonic_and_bounded(
        efficiency in 0.1f32..3.0,
        deltas in proptest::collection::vec(strategies::arb_delta_ms(), 1..20),
    ) {
        let mut engine = MiningEngine::new(EngineConfig::default());
        let mut slots = ActorSlots::new();
        let mut rng = Lcg64::new(7);
        let body = fixtures::extraction_body(1, Vec3::ZERO);
        let id = engine
            .start(&fixtures::pilot(), &body, efficiency, &mut slots)
            .unwrap();

        let entities = vec![body];
        let mut last_progress = 0.0f32;
        let mut completions = 0usize;
        for delta in deltas {
            if let Some(op) = engine.operation(id) {
                let progress = op.progress_at(engine.now_ms());
                prop_assert!(progress >= last_progress);
                prop_assert!(progress <= 1.0);
                last_progress = progress;
            }
            completions += engine.tick(delta, &entities, &mut rng, &mut slots).len();
        }
        // Never more than one completion for a single operation
        prop_assert!(completions <= 1);
    }

    #[test]
    fn prop_efficiency_never_exceeds_cap(
        traits in strategies::arb_multipliers(4),
        equipment in strategies::arb_multipliers(4),
        items in strategies::arb_multipliers(4),
        loyalty in strategies::arb_multiplier(),
    ) {
        let bonuses = EfficiencyBonuses {
            trait_multipliers: traits,
            equipment_multipliers: equipment,
            item_effects: items,
        };
        let combined = bonuses.combined(loyalty, 3.0);
        prop_assert!(combined <= 3.0);
    }

    #[test]
    fn prop_discovery_state_consistent(positions in proptest::collection::vec(strategies::arb_position(), 1..40)) {
        let mut system = DiscoverySystem::new(EngineConfig::default());
        let pilot = fixtures::pilot();
        let entities = vec![
            fixtures::station(1, Vec3::ZERO),
            fixtures::extraction_body(2, Vec3::new(50.0, 0.0, 0.0)),
        ];

        let mut previous = 0;
        for (step, position) in positions.iter().enumerate() {
            system.update_position(&pilot, *position, step as u64 * 100, &entities);
            let stats = system.stats(&pilot, step as u64 * 100).unwrap();
            prop_assert!(stats.discovered_entities >= previous);
            prop_assert!(stats.discovered_entities <= entities.len());
            prop_assert!(stats.total_distance >= 0.0);
            previous = stats.discovered_entities;
        }
    }
}
