//! Title screen: waits for ENTER to start a run.

use bevy::prelude::*;

use super::GameState;
use crate::theme::{palette, widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Title), spawn_title_screen)
        .add_systems(
            Update,
            start_run_on_enter.run_if(in_state(GameState::Title)),
        );
}

fn spawn_title_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Title Screen"),
        DespawnOnExit(GameState::Title),
        children![
            widget::header("Resonance Defense", palette::HEADER_TEXT),
            widget::prompt("Press ENTER to start"),
        ],
    ));
}

fn start_run_on_enter(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        next_state.set(GameState::InGame);
    }
}
