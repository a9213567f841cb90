//! Discovery tracking.
//!
//! Per-actor spatial state: which entities have been discovered, which
//! locations visited, and how far the actor has travelled. One
//! discovery check runs per position update, entity discovery taking
//! priority over location discovery.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::entity::{EntityId, EntityKind, SpaceEntity};
use crate::math::Vec3;
use crate::operation::ActorId;

/// Which discovery branch fired for a position update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DiscoveryKind {
    /// An entity entered the discovery radius for the first time.
    Object {
        /// The discovered entity.
        entity: EntityId,
        /// Its kind (drives the experience bonus).
        entity_kind: EntityKind,
    },
    /// The position is novel relative to all previously visited locations.
    Location {
        /// The recorded location.
        position: Vec3,
    },
}

/// Outcome of a position update that triggered a discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationResult {
    /// The exploring actor.
    pub actor: ActorId,
    /// Which branch fired.
    pub kind: DiscoveryKind,
    /// Experience gained.
    pub experience: u32,
    /// User-facing message; empty while the notification cooldown is
    /// active (the discovery itself is still recorded).
    pub message: String,
}

/// Aggregate discovery statistics for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    /// Number of distinct entities discovered.
    pub discovered_entities: usize,
    /// Number of novel locations visited.
    pub visited_locations: usize,
    /// Total distance travelled.
    pub total_distance: f32,
    /// Engine time elapsed since the session started.
    pub session_ms: u64,
}

/// Per-actor discovery state, created lazily on first position update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DiscoveryProgress {
    discovered: BTreeSet<EntityId>,
    visited: Vec<Vec3>,
    total_distance: f32,
    started_at_ms: u64,
    last_position: Option<Vec3>,
    last_notified_ms: Option<u64>,
}

impl DiscoveryProgress {
    fn new(started_at_ms: u64) -> Self {
        Self {
            discovered: BTreeSet::new(),
            visited: Vec::new(),
            total_distance: 0.0,
            started_at_ms,
            last_position: None,
            last_notified_ms: None,
        }
    }
}

/// Tracks entity discovery and novel-location visitation per actor.
#[derive(Debug, Clone, Default)]
pub struct DiscoverySystem {
    config: EngineConfig,
    actors: HashMap<ActorId, DiscoveryProgress>,
}

impl DiscoverySystem {
    /// Create a discovery system with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            actors: HashMap::new(),
        }
    }

    /// Process an actor position update against the current world.
    ///
    /// Accumulates travelled distance, then attempts exactly one
    /// discovery check: first entity discovery (first undiscovered
    /// entity in list order within the discovery radius), then, only
    /// if no entity was found, location discovery. Discoveries inside
    /// the notification cooldown are still recorded but carry an empty
    /// message.
    pub fn update_position(
        &mut self,
        actor: &ActorId,
        position: Vec3,
        now_ms: u64,
        entities: &[SpaceEntity],
    ) -> Option<ExplorationResult> {
        let progress = self
            .actors
            .entry(actor.clone())
            .or_insert_with(|| DiscoveryProgress::new(now_ms));

        if let Some(last) = progress.last_position {
            progress.total_distance += last.distance(position);
        }
        progress.last_position = Some(position);

        // Entity discovery: first in list order within radius, not nearest
        let found = entities.iter().find(|e| {
            !progress.discovered.contains(&e.id)
                && e.position.distance(position) <= self.config.discovery_radius
        });

        let (kind, experience) = if let Some(entity) = found {
            progress.discovered.insert(entity.id);
            (
                DiscoveryKind::Object {
                    entity: entity.id,
                    entity_kind: entity.kind,
                },
                self.config.discovery_base_experience + entity.kind.discovery_bonus(),
            )
        } else {
            // Location discovery: novel only if far from every visited location
            let novel = progress
                .visited
                .iter()
                .all(|v| v.distance(position) > self.config.location_radius);
            if !novel {
                return None;
            }
            progress.visited.push(position);
            (
                DiscoveryKind::Location { position },
                self.config.location_experience,
            )
        };

        let in_cooldown = progress
            .last_notified_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.config.notification_cooldown_ms);

        let message = if in_cooldown {
            String::new()
        } else {
            progress.last_notified_ms = Some(now_ms);
            match kind {
                DiscoveryKind::Object { entity_kind, .. } => {
                    format!("Discovered {}", kind_label(entity_kind))
                }
                DiscoveryKind::Location { .. } => "Charted a new location".to_string(),
            }
        };

        tracing::trace!(%actor, ?kind, experience, "discovery");
        Some(ExplorationResult {
            actor: actor.clone(),
            kind,
            experience,
            message,
        })
    }

    /// Discovery statistics for an actor, `None` before any update.
    #[must_use]
    pub fn stats(&self, actor: &ActorId, now_ms: u64) -> Option<DiscoveryStats> {
        self.actors.get(actor).map(|p| DiscoveryStats {
            discovered_entities: p.discovered.len(),
            visited_locations: p.visited.len(),
            total_distance: p.total_distance,
            session_ms: now_ms.saturating_sub(p.started_at_ms),
        })
    }

    /// Distance travelled summed across all actors.
    #[must_use]
    pub fn total_distance(&self) -> f32 {
        self.actors.values().map(|p| p.total_distance).sum()
    }

    /// Whether an actor has discovered a given entity.
    #[must_use]
    pub fn has_discovered(&self, actor: &ActorId, entity: EntityId) -> bool {
        self.actors
            .get(actor)
            .is_some_and(|p| p.discovered.contains(&entity))
    }
}

fn kind_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::ExtractionBody => "an extraction body",
        EntityKind::Deposit => "a resource deposit",
        EntityKind::Station => "a station",
        EntityKind::Debris => "drifting debris",
        EntityKind::Anomaly => "an anomaly",
    }
}
