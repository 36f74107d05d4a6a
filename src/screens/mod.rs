//! Screen states and their plugins.

mod in_game;
mod outcome;
mod title;

use bevy::prelude::*;

/// Primary game states.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[states(scoped_entities)]
pub enum GameState {
    /// Title screen, waiting for the player to start a run.
    #[default]
    Title,
    /// Active gameplay.
    InGame,
    /// Every wave of the level was cleared.
    LevelComplete,
    /// The nexus fell.
    GameOver,
}

/// Sub-states within `InGame`. Only exists while `GameState::InGame` is active.
#[derive(SubStates, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum InGameState {
    /// Normal gameplay.
    #[default]
    Playing,
    /// Player paused the game (overlay on gameplay).
    Paused,
    /// Run is decided; simulation is frozen until the outcome screen shows.
    Frozen,
}

pub fn plugin(app: &mut App) {
    app.init_state::<GameState>()
        .add_sub_state::<InGameState>()
        .add_systems(Startup, setup_camera);

    app.add_plugins((title::plugin, in_game::plugin, outcome::plugin));
}

/// Spawns the global 2D camera. Persists across all states (do NOT add `DespawnOnExit`).
fn setup_camera(mut commands: Commands) {
    commands.spawn((Name::new("Camera"), Camera2d));
}
