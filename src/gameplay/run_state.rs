//! Run-scoped counters shared by every gameplay domain.

use bevy::prelude::*;

use crate::screens::GameState;

// === Constants ===

/// Energy available when a run starts.
pub const STARTING_ENERGY: u32 = 150;

/// Nexus health when a run starts.
pub const STARTING_NEXUS_HEALTH: f32 = 20.0;

// === Resources ===

/// Scalars mutated by waves, towers and the player ability, and read by the HUD.
///
/// Owned by the app; re-initialised on every entry into `GameState::InGame`.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct RunState {
    pub nexus_health: f32,
    pub energy: u32,
    pub current_wave: usize,
    /// Non-decreasing within a wave; zeroed by [`RunState::begin_wave`].
    pub enemies_spawned: u32,
    pub enemies_remaining: u32,
    pub max_enemies: u32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            nexus_health: STARTING_NEXUS_HEALTH,
            energy: STARTING_ENERGY,
            current_wave: 0,
            enemies_spawned: 0,
            enemies_remaining: 0,
            max_enemies: 0,
        }
    }
}

impl RunState {
    /// Deduct `cost` if affordable. Leaves energy untouched otherwise.
    pub const fn try_spend(&mut self, cost: u32) -> bool {
        if self.energy < cost {
            return false;
        }
        self.energy -= cost;
        true
    }

    pub const fn earn(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount);
    }

    /// Reset per-wave counters for a wave of `total` enemies.
    pub const fn begin_wave(&mut self, total: u32) {
        self.enemies_spawned = 0;
        self.max_enemies = total;
        self.enemies_remaining += total;
    }

    /// One tracked enemy left play (killed or breached).
    pub const fn enemy_gone(&mut self) {
        self.enemies_remaining = self.enemies_remaining.saturating_sub(1);
    }

    /// A wave is complete iff everything was spawned and nothing is left.
    #[must_use]
    pub const fn wave_complete(&self) -> bool {
        self.enemies_spawned >= self.max_enemies && self.enemies_remaining == 0
    }

    /// Subtract breach damage from the nexus, clamping at zero.
    pub fn damage_nexus(&mut self, amount: f32) {
        self.nexus_health = (self.nexus_health - amount).max(0.0);
    }

    #[must_use]
    pub fn nexus_destroyed(&self) -> bool {
        self.nexus_health <= 0.0
    }
}

// === Messages ===

/// Short user-facing notice (insufficient energy, ability on cooldown).
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct Alert(pub String);

impl Alert {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

// === Systems ===

fn reset_run_state(mut run: ResMut<RunState>) {
    *run = RunState::default();
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<RunState>()
        .init_resource::<RunState>()
        .add_message::<Alert>();

    app.add_systems(OnEnter(GameState::InGame), reset_run_state);
}
