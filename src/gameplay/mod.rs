//! Gameplay domain plugins: actors and their behaviours, combat, towers,
//! enemies, the player, and wave progression.

pub mod aura;
pub mod combat;
pub mod enemies;
pub mod health;
pub mod movement;
pub mod player;
pub mod run_state;
pub mod runtime;
pub mod targeting;
pub mod towers;
pub mod waves;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        runtime::plugin,
        run_state::plugin,
        health::plugin,
        targeting::plugin,
        movement::plugin,
        aura::plugin,
        combat::plugin,
        towers::plugin,
        enemies::plugin,
        player::plugin,
        waves::plugin,
    ));
}
