//! In-game screen: pause toggle, pause overlay, and virtual-time control.
//!
//! Pausing and freezing both stop `Time<Virtual>`, which halts every
//! timer-driven system (fire cooldowns, wave schedules, physics).

use bevy::prelude::*;

use super::{GameState, InGameState};
use crate::theme::{palette, widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(InGameState::Paused), (spawn_pause_overlay, pause_virtual_time))
        .add_systems(OnExit(InGameState::Paused), unpause_virtual_time)
        .add_systems(OnEnter(InGameState::Frozen), pause_virtual_time)
        .add_systems(OnExit(GameState::InGame), unpause_virtual_time)
        .add_systems(
            Update,
            handle_pause_input.run_if(in_state(GameState::InGame)),
        );
}

fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current: Res<State<InGameState>>,
    mut next_phase: ResMut<NextState<InGameState>>,
    mut next_game: ResMut<NextState<GameState>>,
) {
    match current.get() {
        InGameState::Playing => {
            if keyboard.just_pressed(KeyCode::Escape) {
                next_phase.set(InGameState::Paused);
            }
        }
        InGameState::Paused => {
            if keyboard.just_pressed(KeyCode::Escape) {
                next_phase.set(InGameState::Playing);
            }
            if keyboard.just_pressed(KeyCode::KeyQ) {
                next_game.set(GameState::Title);
            }
        }
        InGameState::Frozen => {}
    }
}

fn spawn_pause_overlay(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Pause Overlay"),
        BackgroundColor(palette::OVERLAY_BACKGROUND),
        DespawnOnExit(InGameState::Paused),
        children![
            widget::header("PAUSED", palette::HEADER_TEXT),
            widget::prompt("Press ESC to Resume | Q to Quit"),
        ],
    ));
}

fn pause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn unpause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}
