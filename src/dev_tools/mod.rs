//! Development tools, only included with `cargo run --features dev`.
//!
//! World inspector and debug keys. This module is stripped from release builds.

use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::gameplay::enemies::{Species, SpawnEnemy, species_stats};
use crate::gameplay::run_state::RunState;
use crate::gameplay::waves::{WaveManager, scaled_health};
use crate::{GameSet, gameplay_running};

/// Energy granted per G key press.
const ENERGY_GRANT: u32 = 100;

/// Whether the world inspector window is shown. Toggled with F1.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InspectorVisible(bool);

fn toggle_inspector(keyboard: Res<ButtonInput<KeyCode>>, mut visible: ResMut<InspectorVisible>) {
    if keyboard.just_pressed(KeyCode::F1) {
        visible.0 = !visible.0;
    }
}

/// E spawns a grunt, R a phantom, both scaled to the current wave.
fn debug_spawn_enemies(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut run: ResMut<RunState>,
    mut spawns: MessageWriter<SpawnEnemy>,
) {
    let species = if keyboard.just_pressed(KeyCode::KeyE) {
        Species::Grunt
    } else if keyboard.just_pressed(KeyCode::KeyR) {
        Species::Phantom
    } else {
        return;
    };
    let stats = species_stats(species);
    // Counted so the wave still waits for it.
    run.enemies_remaining += 1;
    spawns.write(SpawnEnemy {
        species,
        health: scaled_health(stats.health, run.current_wave),
        speed: stats.speed,
        reward: stats.reward,
    });
    debug!("Debug spawn: {species:?}");
}

fn debug_grant_energy(keyboard: Res<ButtonInput<KeyCode>>, mut run: ResMut<RunState>) {
    if keyboard.just_pressed(KeyCode::KeyG) {
        run.earn(ENERGY_GRANT);
    }
}

/// P stops or resumes every path follower.
fn debug_toggle_paths(keyboard: Res<ButtonInput<KeyCode>>, mut waves: ResMut<WaveManager>) {
    if keyboard.just_pressed(KeyCode::KeyP) {
        waves.enabled = !waves.enabled;
        info!("Path following {}", if waves.enabled { "resumed" } else { "stopped" });
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<InspectorVisible>();
    app.add_plugins((
        EguiPlugin::default(),
        WorldInspectorPlugin::new().run_if(resource_equals(InspectorVisible(true))),
    ));

    app.add_systems(Update, toggle_inspector);
    app.add_systems(
        Update,
        (debug_spawn_enemies, debug_grant_energy, debug_toggle_paths)
            .in_set(GameSet::Input)
            .run_if(gameplay_running),
    );
}
