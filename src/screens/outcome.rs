//! Outcome banners for level completion and game over.

use bevy::prelude::*;

use super::GameState;
use crate::theme::{palette, widget};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::LevelComplete), spawn_victory_banner)
        .add_systems(OnEnter(GameState::GameOver), spawn_defeat_banner)
        .add_systems(
            Update,
            return_to_title.run_if(
                in_state(GameState::LevelComplete).or(in_state(GameState::GameOver)),
            ),
        );
}

fn spawn_victory_banner(mut commands: Commands) {
    spawn_banner(
        &mut commands,
        "LEVEL COMPLETE",
        palette::VICTORY,
        GameState::LevelComplete,
    );
}

fn spawn_defeat_banner(mut commands: Commands) {
    spawn_banner(&mut commands, "GAME OVER", palette::DEFEAT, GameState::GameOver);
}

/// Shared banner spawning for both outcomes.
fn spawn_banner(commands: &mut Commands, title: &str, color: Color, state: GameState) {
    commands.spawn((
        widget::ui_root("Outcome Banner"),
        BackgroundColor(palette::OVERLAY_BACKGROUND),
        DespawnOnExit(state),
        children![
            widget::header(title, color),
            widget::prompt("Press ENTER to return to the title screen"),
        ],
    ));
}

fn return_to_title(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keyboard.just_pressed(KeyCode::Enter) {
        next_state.set(GameState::Title);
    }
}
