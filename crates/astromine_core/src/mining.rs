//! Mining engine.
//!
//! Tracks per-actor extraction operations against world entities.
//! State machine per operation: Idle (no record) -> Active (start) ->
//! Completed (progress reaches 1.0, yields once, evicted) or Cancelled
//! (explicit cancel, no yield, evicted).

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::entity::{EntityId, EntityKind, Resource, SpaceEntity};
use crate::operation::{ActorId, ActorSlots, Operation, OperationId, OperationRegistry, StartDenied};
use crate::rng::RandomSource;

/// Outcome of a completed (or degraded) mining operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningResult {
    /// The operation that completed.
    pub operation_id: OperationId,
    /// Owning actor.
    pub actor: ActorId,
    /// Mined entity.
    pub target: EntityId,
    /// False when the target disappeared before completion.
    pub success: bool,
    /// Yielded resources (empty on failure).
    pub resources: Vec<Resource>,
    /// Experience gained.
    pub experience: u32,
    /// User-facing message.
    pub message: String,
}

/// Scheduler for time-bounded mining operations.
#[derive(Debug, Clone)]
pub struct MiningEngine {
    config: EngineConfig,
    registry: OperationRegistry<EntityId>,
    now_ms: u64,
}

impl MiningEngine {
    /// Create a mining engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: OperationRegistry::new(),
            now_ms: 0,
        }
    }

    /// Current engine time in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of active operations.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// Look up an active operation.
    #[must_use]
    pub fn operation(&self, id: OperationId) -> Option<&Operation<EntityId>> {
        self.registry.get(id)
    }

    /// Precondition query. Never panics, never mutates.
    ///
    /// Fails for non-minable kinds, depleted targets, a duplicate
    /// active operation on the same (actor, target) pair, or an actor
    /// at the shared concurrency cap.
    pub fn can_start(
        &self,
        actor: &ActorId,
        target: Option<&SpaceEntity>,
        slots: &ActorSlots,
    ) -> Result<(), StartDenied> {
        let Some(target) = target else {
            return Err(StartDenied::UnknownTarget);
        };
        if !target.kind.is_minable() {
            return Err(StartDenied::TargetNotOperable);
        }
        if target.is_depleted() {
            return Err(StartDenied::TargetDepleted);
        }
        if self.registry.has_active_for(actor, &target.id) {
            return Err(StartDenied::DuplicateOperation);
        }
        if slots.count(actor) >= self.config.max_concurrent_operations {
            return Err(StartDenied::ActorAtCapacity);
        }
        Ok(())
    }

    /// Start a mining operation.
    ///
    /// Re-validates via [`Self::can_start`]; duration is the target's
    /// base duration divided by `efficiency`.
    pub fn start(
        &mut self,
        actor: &ActorId,
        target: &SpaceEntity,
        efficiency: f32,
        slots: &mut ActorSlots,
    ) -> Result<OperationId, StartDenied> {
        if efficiency <= 0.0 {
            return Err(StartDenied::InvalidEfficiency);
        }
        self.can_start(actor, Some(target), slots)?;

        let base = self.base_duration_ms(target.kind);
        let duration = (base as f32 / efficiency) as u64;
        let id = self.registry.allocate_id();
        self.registry.insert(Operation::new(
            id,
            actor.clone(),
            target.id,
            self.now_ms,
            duration,
            efficiency,
        ));
        slots.reserve(actor);
        tracing::debug!(%actor, target = target.id.0, duration_ms = duration, "mining started");
        Ok(id)
    }

    /// Cancel an active operation.
    ///
    /// Returns `false` for unknown or already-completed ids. No yield
    /// is produced and no completion is delivered later.
    pub fn cancel(&mut self, id: OperationId, slots: &mut ActorSlots) -> bool {
        match self.registry.remove(id) {
            Some(op) => {
                slots.release(&op.actor);
                tracing::debug!(%op.actor, operation = id.0, "mining cancelled");
                true
            }
            None => false,
        }
    }

    /// Advance the engine clock, update every active operation's
    /// progress and complete the due ones.
    ///
    /// All operations reaching full progress within this call are
    /// completed, yield computed, and evicted before it returns, in
    /// start order. Operations still in flight keep their stored
    /// progress current for hosts polling [`Self::operation`].
    pub fn tick(
        &mut self,
        delta_ms: u64,
        entities: &[SpaceEntity],
        rng: &mut dyn RandomSource,
        slots: &mut ActorSlots,
    ) -> Vec<MiningResult> {
        self.now_ms += delta_ms;
        let mut results = Vec::new();

        for id in self.registry.advance_all(self.now_ms) {
            let Some(op) = self.registry.remove(id) else {
                continue;
            };
            slots.release(&op.actor);

            let result = match entities.iter().find(|e| e.id == op.target) {
                Some(target) => self.complete(&op, target, rng),
                None => MiningResult {
                    operation_id: op.id,
                    actor: op.actor.clone(),
                    target: op.target,
                    success: false,
                    resources: Vec::new(),
                    experience: 0,
                    message: "Target no longer exists".to_string(),
                },
            };
            tracing::debug!(
                operation = id.0,
                success = result.success,
                yielded = result.resources.len(),
                "mining completed"
            );
            results.push(result);
        }

        results
    }

    /// Base duration for a target kind before efficiency scaling.
    #[must_use]
    pub fn base_duration_ms(&self, kind: EntityKind) -> u64 {
        let base = self.config.base_mining_duration_ms as f32;
        let factor = match kind {
            EntityKind::Deposit => self.config.deposit_duration_factor,
            _ => self.config.extraction_body_duration_factor,
        };
        (base * factor) as u64
    }

    fn complete(
        &self,
        op: &Operation<EntityId>,
        target: &SpaceEntity,
        rng: &mut dyn RandomSource,
    ) -> MiningResult {
        // Base count: small random roll scaled by the target's richness
        let yield_factor = match target.kind {
            EntityKind::Deposit => 2,
            _ => 1,
        };
        let base_count = rng.range_i32(1, 4) * yield_factor;
        let count = (base_count as f32 * op.efficiency).floor() as u32;

        let mut resources = Vec::with_capacity(count as usize);
        for _ in 0..count {
            if target.resources.is_empty() {
                resources.push(Resource::random(rng));
            } else {
                // Draw from the target's own pool: same type/name/rarity,
                // fresh small quantity
                let template =
                    &target.resources[(rng.next_u64() % target.resources.len() as u64) as usize];
                let mut unit = template.clone();
                unit.quantity = rng.range_u32_inclusive(1, 5);
                resources.push(unit);
            }
        }

        let experience =
            (self.config.mining_base_experience as f32 * op.efficiency).floor() as u32;

        MiningResult {
            operation_id: op.id,
            actor: op.actor.clone(),
            target: target.id,
            success: true,
            resources,
            experience,
            message: format!("Extracted {count} resource unit(s)"),
        }
    }
}
