//! Generic time-bounded operation tracking.
//!
//! Mining and crafting share this machinery: an operation is started
//! for an actor against a target, advances with the engine clock, and
//! completes exactly once when its deadline passes. The registry
//! preserves start order so simultaneous completions within one tick
//! are deterministic.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::entity::ResourceKind;

/// Identifier of the actor (player) that owns operations and progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    /// Create an actor ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for an operation, monotonic within an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u64);

/// A missing crafting ingredient, reported by precondition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingResource {
    /// Which resource kind is short.
    pub kind: ResourceKind,
    /// Quantity the recipe needs.
    pub needed: u32,
    /// Quantity the actor has.
    pub have: u32,
}

/// Why an operation could not be started.
///
/// These are ordinary return values, never panics or errors; callers
/// surface them to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartDenied {
    /// Target entity id is not in the current world.
    UnknownTarget,
    /// Target kind cannot be operated on (mining non-minable kinds).
    TargetNotOperable,
    /// Target health is depleted.
    TargetDepleted,
    /// An operation for this (actor, target) pair is already active.
    DuplicateOperation,
    /// The actor is at the shared concurrent-operation cap.
    ActorAtCapacity,
    /// The recipe id is not in the catalog.
    UnknownRecipe,
    /// The actor's level is below the recipe minimum.
    LevelTooLow {
        /// Level the recipe requires.
        required: u32,
    },
    /// The actor lacks required crafting ingredients.
    InsufficientResources {
        /// Shortfall per resource kind.
        missing: Vec<MissingResource>,
    },
    /// Efficiency must be strictly positive.
    InvalidEfficiency,
}

impl std::fmt::Display for StartDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTarget => write!(f, "Target not found"),
            Self::TargetNotOperable => write!(f, "Target cannot be operated on"),
            Self::TargetDepleted => write!(f, "Target is depleted"),
            Self::DuplicateOperation => write!(f, "Operation already active for this target"),
            Self::ActorAtCapacity => write!(f, "Too many concurrent operations"),
            Self::UnknownRecipe => write!(f, "Recipe not found"),
            Self::LevelTooLow { required } => write!(f, "Requires level {required}"),
            Self::InsufficientResources { missing } => {
                write!(f, "Missing {} resource kind(s)", missing.len())
            }
            Self::InvalidEfficiency => write!(f, "Efficiency must be positive"),
        }
    }
}

/// A time-bounded operation owned by an actor.
///
/// `T` is the target reference: an entity id for mining, a recipe id
/// for crafting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation<T> {
    /// Operation identifier.
    pub id: OperationId,
    /// Owning actor.
    pub actor: ActorId,
    /// Target reference.
    pub target: T,
    /// Engine-clock timestamp when the operation started.
    pub started_at_ms: u64,
    /// Efficiency-adjusted duration.
    pub duration_ms: u64,
    /// Progress in [0, 1], monotonic non-decreasing.
    pub progress: f32,
    /// Set once, when progress reaches 1.0. Irreversible.
    pub completed: bool,
    /// Efficiency applied at start (> 0).
    pub efficiency: f32,
}

impl<T> Operation<T> {
    /// Create a new active operation.
    #[must_use]
    pub fn new(
        id: OperationId,
        actor: ActorId,
        target: T,
        started_at_ms: u64,
        duration_ms: u64,
        efficiency: f32,
    ) -> Self {
        Self {
            id,
            actor,
            target,
            started_at_ms,
            duration_ms,
            progress: 0.0,
            completed: false,
            efficiency,
        }
    }

    /// Progress this operation would have at the given engine time.
    #[must_use]
    pub fn progress_at(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_at_ms) as f32;
        (elapsed / self.duration_ms as f32).min(1.0)
    }

    /// Advance progress to the given engine time.
    ///
    /// Progress never decreases; returns `true` exactly once, on the
    /// tick where the operation transitions to completed.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        if self.completed {
            return false;
        }
        self.progress = self.progress.max(self.progress_at(now_ms));
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.completed = true;
            return true;
        }
        false
    }
}

/// Per-actor count of active operations, shared across mining and
/// crafting so the concurrency cap applies to the sum of both.
///
/// Owned by the orchestrator; the engines borrow it for cap checks and
/// bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorSlots {
    counts: HashMap<ActorId, usize>,
}

impl ActorSlots {
    /// Create an empty slot tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active operation count for an actor.
    #[must_use]
    pub fn count(&self, actor: &ActorId) -> usize {
        self.counts.get(actor).copied().unwrap_or(0)
    }

    /// Record one more active operation for the actor.
    pub fn reserve(&mut self, actor: &ActorId) {
        *self.counts.entry(actor.clone()).or_insert(0) += 1;
    }

    /// Release one active operation for the actor.
    pub fn release(&mut self, actor: &ActorId) {
        if let Some(count) = self.counts.get_mut(actor) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(actor);
            }
        }
    }
}

/// Order-preserving registry of active operations.
///
/// Keyed by monotonic [`OperationId`], so iteration order equals start
/// order and simultaneous completions resolve deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRegistry<T> {
    active: BTreeMap<OperationId, Operation<T>>,
    next_id: u64,
}

impl<T> Default for OperationRegistry<T> {
    fn default() -> Self {
        Self {
            active: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> OperationRegistry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next operation id.
    pub fn allocate_id(&mut self) -> OperationId {
        let id = OperationId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an active operation.
    pub fn insert(&mut self, operation: Operation<T>) {
        self.active.insert(operation.id, operation);
    }

    /// Remove an operation by id.
    pub fn remove(&mut self, id: OperationId) -> Option<Operation<T>> {
        self.active.remove(&id)
    }

    /// Get an operation by id.
    #[must_use]
    pub fn get(&self, id: OperationId) -> Option<&Operation<T>> {
        self.active.get(&id)
    }

    /// Number of active operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate active operations in start order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation<T>> {
        self.active.values()
    }

    /// Advance every active operation to `now_ms`.
    ///
    /// Updates the stored `progress` of in-flight operations so hosts
    /// polling [`OperationRegistry::get`] see current values. Returns
    /// the ids of operations that completed on this call, in start
    /// order.
    pub fn advance_all(&mut self, now_ms: u64) -> Vec<OperationId> {
        self.active
            .values_mut()
            .filter_map(|op| op.advance(now_ms).then_some(op.id))
            .collect()
    }

    /// Whether an active operation exists for the given actor/target pair.
    #[must_use]
    pub fn has_active_for(&self, actor: &ActorId, target: &T) -> bool
    where
        T: PartialEq,
    {
        self.active
            .values()
            .any(|op| &op.actor == actor && &op.target == target)
    }
}
