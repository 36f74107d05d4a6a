//! Resonance Defense: a tower-defense game built on Bevy and avian2d.
//!
//! Gameplay is split into domain plugins under [`gameplay`]. Every frame runs
//! the [`GameSet`] chain once, so cross-entity effects (damage, slows, wave
//! bookkeeping) settle within a single frame boundary.

pub mod gameplay;
pub mod hud;
pub mod prelude;
pub mod screens;
#[cfg(test)]
pub mod testing;
pub mod theme;
pub mod third_party;

#[cfg(feature = "dev")]
pub mod dev_tools;

use bevy::prelude::*;

pub use screens::{GameState, InGameState};

// === Z Layers ===

/// Z depth of path lanes drawn under everything else.
pub const Z_PATH: f32 = 0.0;

/// Z depth of towers.
pub const Z_TOWER: f32 = 2.0;

/// Z depth of enemies walking the lanes.
pub const Z_ENEMY: f32 = 3.0;

/// Z depth of the player and companion.
pub const Z_PLAYER: f32 = 4.0;

/// Z depth of projectiles in flight.
pub const Z_PROJECTILE: f32 = 5.0;

// === System Ordering ===

/// Per-frame ordering of gameplay systems. Configured as a chain, so each
/// set observes everything the previous sets wrote this frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Keyboard/mouse input turned into requests.
    Input,
    /// Wave timers fire and new actors appear.
    Spawn,
    /// Target acquisition, nearest-tower lookups, aura scans.
    Ai,
    /// Path following and player movement.
    Movement,
    /// Attack resolvers fire; overlap handlers route hits into damage.
    Combat,
    /// Damage requests are applied to `Health`.
    Damage,
    /// Deaths, path-end arrivals, tower deactivation and revival.
    Death,
    /// Wave accounting, completion and the game-over check.
    Progress,
    /// Presentation reacts to notifications.
    Ui,
}

/// Run condition: gameplay simulation is live (in game, not paused or frozen).
#[must_use]
pub fn gameplay_running(phase: Option<Res<State<InGameState>>>) -> bool {
    phase.is_some_and(|phase| *phase.get() == InGameState::Playing)
}

/// Core game plugin: states, set ordering, gameplay and presentation.
///
/// Physics ([`third_party::plugin`]) and the dev tools are added separately by
/// the binary so the simulation can be driven headless under `MinimalPlugins`.
pub fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameSet::Input,
            GameSet::Spawn,
            GameSet::Ai,
            GameSet::Movement,
            GameSet::Combat,
            GameSet::Damage,
            GameSet::Death,
            GameSet::Progress,
            GameSet::Ui,
        )
            .chain(),
    );

    app.add_plugins((screens::plugin, gameplay::plugin, hud::plugin));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use pretty_assertions::assert_eq;

    #[test]
    fn game_state_default_is_title() {
        assert_eq!(GameState::default(), GameState::Title);
    }

    #[test]
    fn in_game_state_default_is_playing() {
        assert_eq!(InGameState::default(), InGameState::Playing);
    }

    #[allow(clippy::assertions_on_constants)]
    #[test]
    fn z_layers_are_ordered() {
        assert!(Z_PATH < Z_TOWER);
        assert!(Z_TOWER < Z_ENEMY);
        assert!(Z_ENEMY < Z_PLAYER);
        assert!(Z_PLAYER < Z_PROJECTILE);
    }

    #[test]
    fn gameplay_not_running_outside_ingame() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        app.init_state::<GameState>();
        app.add_sub_state::<InGameState>();
        app.update();

        let running = app
            .world_mut()
            .run_system_cached(gameplay_running)
            .unwrap_or(true);
        assert!(!running);
    }

    #[test]
    fn gameplay_running_once_ingame() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        app.init_state::<GameState>();
        app.add_sub_state::<InGameState>();
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::InGame);
        app.update();

        let running = app
            .world_mut()
            .run_system_cached(gameplay_running)
            .unwrap_or(false);
        assert!(running);
    }
}
