//! Crafting engine and recipe catalog.
//!
//! Recipes are static data (RON-loadable) mapping required resources
//! to a single output item. Crafting operations share the timed
//! operation machinery and the per-actor concurrency cap with mining.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::entity::{Rarity, Resource, ResourceKind};
use crate::error::EngineError;
use crate::operation::{
    ActorId, ActorSlots, MissingResource, Operation, OperationId, OperationRegistry, StartDenied,
};
use crate::rng::RandomSource;

/// One required ingredient of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Resource kind consumed.
    pub kind: ResourceKind,
    /// Quantity consumed.
    pub quantity: u32,
}

/// The single output item of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Item identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Resource kind of the output.
    pub kind: ResourceKind,
    /// Rarity of the output (drives experience).
    pub rarity: Rarity,
    /// Quantity produced per completion.
    pub quantity: u32,
}

/// A crafting template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Required ingredients.
    pub required: Vec<Requirement>,
    /// Output item descriptor.
    pub output: OutputSpec,
    /// Base crafting time before efficiency scaling.
    pub base_duration_ms: u64,
    /// Minimum actor level to start this recipe.
    pub min_level: u32,
}

/// Result of a craftability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftCheck {
    /// Whether the inventory covers every requirement.
    pub can_craft: bool,
    /// Shortfalls per resource kind (empty when craftable).
    pub missing: Vec<MissingResource>,
}

/// Static catalog of crafting recipes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeCatalog {
    recipes: HashMap<String, Recipe>,
}

impl RecipeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe, validating it first.
    pub fn register(&mut self, recipe: Recipe) -> Result<(), EngineError> {
        if recipe.required.is_empty() {
            return Err(EngineError::InvalidRecipe {
                id: recipe.id.clone(),
                message: "must require at least one resource".to_string(),
            });
        }
        if recipe.output.quantity == 0 {
            return Err(EngineError::InvalidRecipe {
                id: recipe.id.clone(),
                message: "output quantity must be positive".to_string(),
            });
        }
        if recipe.base_duration_ms == 0 {
            return Err(EngineError::InvalidRecipe {
                id: recipe.id.clone(),
                message: "base duration must be positive".to_string(),
            });
        }
        self.recipes.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    /// Parse a catalog from RON text (a list of recipes).
    pub fn from_ron(text: &str) -> Result<Self, EngineError> {
        let recipes: Vec<Recipe> = ron::from_str(text).map_err(|e| EngineError::DataParse {
            what: "recipe catalog".to_string(),
            message: e.to_string(),
        })?;
        let mut catalog = Self::new();
        for recipe in recipes {
            catalog.register(recipe)?;
        }
        Ok(catalog)
    }

    /// Get a recipe by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    /// Number of registered recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Iterate all recipes.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }
}

/// Check a recipe's requirements against an inventory snapshot.
///
/// Reports every shortfall, not just the first, so the UI can show a
/// complete missing-resource list.
#[must_use]
pub fn can_craft(recipe: &Recipe, inventory: &HashMap<ResourceKind, u32>) -> CraftCheck {
    let mut missing = Vec::new();
    for req in &recipe.required {
        let have = inventory.get(&req.kind).copied().unwrap_or(0);
        if have < req.quantity {
            missing.push(MissingResource {
                kind: req.kind,
                needed: req.quantity,
                have,
            });
        }
    }
    CraftCheck {
        can_craft: missing.is_empty(),
        missing,
    }
}

/// Outcome of a completed (or degraded) crafting operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftingResult {
    /// The operation that completed.
    pub operation_id: OperationId,
    /// Owning actor.
    pub actor: ActorId,
    /// Recipe that was crafted.
    pub recipe_id: String,
    /// False when the recipe disappeared from the catalog mid-craft.
    pub success: bool,
    /// The crafted item (None on failure).
    pub item: Option<Resource>,
    /// Optional recycling bonus item.
    pub bonus: Option<Resource>,
    /// Experience gained.
    pub experience: u32,
    /// User-facing message.
    pub message: String,
}

/// Scheduler for time-bounded crafting operations.
#[derive(Debug, Clone)]
pub struct CraftingEngine {
    config: EngineConfig,
    registry: OperationRegistry<String>,
    now_ms: u64,
}

impl CraftingEngine {
    /// Create a crafting engine with the given configuration.
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
    pub fn operation(&self, id: OperationId) -> Option<&Operation<String>> {
        self.registry.get(id)
    }

    /// Precondition query. Never panics, never mutates.
    ///
    /// Unlike mining there is no per-target exclusivity: the same
    /// recipe may be crafted concurrently, bounded only by the shared
    /// actor cap.
    pub fn can_start(
        &self,
        actor: &ActorId,
        recipe: Option<&Recipe>,
        actor_level: u32,
        inventory: &HashMap<ResourceKind, u32>,
        slots: &ActorSlots,
    ) -> Result<(), StartDenied> {
        let Some(recipe) = recipe else {
            return Err(StartDenied::UnknownRecipe);
        };
        if actor_level < recipe.min_level {
            return Err(StartDenied::LevelTooLow {
                required: recipe.min_level,
            });
        }
        let check = can_craft(recipe, inventory);
        if !check.can_craft {
            return Err(StartDenied::InsufficientResources {
                missing: check.missing,
            });
        }
        if slots.count(actor) >= self.config.max_concurrent_operations {
            return Err(StartDenied::ActorAtCapacity);
        }
        Ok(())
    }

    /// Start a crafting operation.
    ///
    /// Ingredient deduction is the inventory collaborator's job; the
    /// engine only validates against the snapshot it is given.
    pub fn start(
        &mut self,
        actor: &ActorId,
        recipe: &Recipe,
        actor_level: u32,
        inventory: &HashMap<ResourceKind, u32>,
        efficiency: f32,
        slots: &mut ActorSlots,
    ) -> Result<OperationId, StartDenied> {
        if efficiency <= 0.0 {
            return Err(StartDenied::InvalidEfficiency);
        }
        self.can_start(actor, Some(recipe), actor_level, inventory, slots)?;

        let duration = (recipe.base_duration_ms as f32 / efficiency) as u64;
        let id = self.registry.allocate_id();
        self.registry.insert(Operation::new(
            id,
            actor.clone(),
            recipe.id.clone(),
            self.now_ms,
            duration,
            efficiency,
        ));
        slots.reserve(actor);
        tracing::debug!(%actor, recipe = %recipe.id, duration_ms = duration, "crafting started");
        Ok(id)
    }

    /// Cancel an active operation.
    ///
    /// Returns `false` for unknown or already-completed ids.
    pub fn cancel(&mut self, id: OperationId, slots: &mut ActorSlots) -> bool {
        match self.registry.remove(id) {
            Some(op) => {
                slots.release(&op.actor);
                tracing::debug!(%op.actor, operation = id.0, "crafting cancelled");
                true
            }
            None => false,
        }
    }

    /// Advance the engine clock, update every active operation's
    /// progress and complete the due ones.
    pub fn tick(
        &mut self,
        delta_ms: u64,
        catalog: &RecipeCatalog,
        rng: &mut dyn RandomSource,
        slots: &mut ActorSlots,
    ) -> Vec<CraftingResult> {
        self.now_ms += delta_ms;
        let mut results = Vec::new();

        for id in self.registry.advance_all(self.now_ms) {
            let Some(op) = self.registry.remove(id) else {
                continue;
            };
            slots.release(&op.actor);

            let result = match catalog.get(&op.target) {
                Some(recipe) => self.complete(&op, recipe, rng),
                None => CraftingResult {
                    operation_id: op.id,
                    actor: op.actor.clone(),
                    recipe_id: op.target.clone(),
                    success: false,
                    item: None,
                    bonus: None,
                    experience: 0,
                    message: "Recipe no longer exists".to_string(),
                },
            };
            tracing::debug!(
                operation = id.0,
                success = result.success,
                "crafting completed"
            );
            results.push(result);
        }

        results
    }

    fn complete(
        &self,
        op: &Operation<String>,
        recipe: &Recipe,
        rng: &mut dyn RandomSource,
    ) -> CraftingResult {
        let output = &recipe.output;
        let item = Resource {
            id: output.id.clone(),
            name: output.name.clone(),
            kind: output.kind,
            quantity: output.quantity,
            rarity: output.rarity,
        };

        let experience =
            (output.rarity.craft_experience() as f32 * op.efficiency).floor() as u32;

        // Recycling: high efficiency sometimes returns part of the
        // first ingredient
        let bonus = if op.efficiency > self.config.recycling_threshold
            && rng.chance(self.config.recycling_chance)
        {
            recipe.required.first().and_then(|first| {
                let quantity =
                    (first.quantity as f32 * self.config.recycling_fraction).floor() as u32;
                (quantity > 0).then(|| {
                    Resource::new(
                        format!("{}-recycled", recipe.id),
                        first.kind,
                        quantity,
                        Rarity::Common,
                    )
                })
            })
        } else {
            None
        };

        CraftingResult {
            operation_id: op.id,
            actor: op.actor.clone(),
            recipe_id: recipe.id.clone(),
            success: true,
            item: Some(item),
            bonus,
            experience,
            message: format!("Crafted {}", output.name),
        }
    }
}
