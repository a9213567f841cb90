//! Recording collaborator for orchestrator scenarios.

use astromine_core::crafting::CraftingResult;
use astromine_core::discovery::ExplorationResult;
use astromine_core::entity::Resource;
use astromine_core::mining::MiningResult;
use astromine_core::operation::ActorId;
use astromine_core::orchestrator::{Collaborator, EngineStats};

/// Collaborator that records every event it receives.
///
/// Tests drive the orchestrator, then assert on the recorded event
/// streams. Loyalty is a fixed value per recorder.
#[derive(Debug, Clone)]
pub struct RecordingCollaborator {
    /// Every resource granted, in dispatch order.
    pub resources: Vec<Resource>,
    /// Total experience granted.
    pub experience: u32,
    /// Completed mining results.
    pub mining_results: Vec<MiningResult>,
    /// Completed crafting results.
    pub crafting_results: Vec<CraftingResult>,
    /// Dispatched exploration results.
    pub exploration_results: Vec<ExplorationResult>,
    /// Mission progress events as `(activity, increment)` pairs.
    pub mission_progress: Vec<(String, u32)>,
    /// Periodic statistics snapshots.
    pub snapshots: Vec<EngineStats>,
    /// Loyalty multiplier reported for every actor.
    pub loyalty: f32,
}

impl Default for RecordingCollaborator {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            experience: 0,
            mining_results: Vec::new(),
            crafting_results: Vec::new(),
            exploration_results: Vec::new(),
            mission_progress: Vec::new(),
            snapshots: Vec::new(),
            loyalty: 1.0,
        }
    }
}

impl RecordingCollaborator {
    /// Recorder reporting neutral loyalty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder reporting a fixed loyalty multiplier.
    #[must_use]
    pub fn with_loyalty(loyalty: f32) -> Self {
        Self {
            loyalty,
            ..Self::default()
        }
    }

    /// Total increments recorded for one mission activity key.
    #[must_use]
    pub fn mission_count(&self, activity: &str) -> u32 {
        self.mission_progress
            .iter()
            .filter(|(key, _)| key == activity)
            .map(|(_, increment)| increment)
            .sum()
    }

    /// Total quantity granted across all recorded resources.
    #[must_use]
    pub fn total_resource_quantity(&self) -> u64 {
        self.resources.iter().map(|r| u64::from(r.quantity)).sum()
    }
}

impl Collaborator for RecordingCollaborator {
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
        self.mission_progress.push((activity.to_string(), increment));
    }

    fn on_stats_snapshot(&mut self, stats: &EngineStats) {
        self.snapshots.push(*stats);
    }

    fn loyalty_multiplier(&mut self, _actor: &ActorId) -> f32 {
        self.loyalty
    }
}
