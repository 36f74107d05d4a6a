//! Tests for game state transitions.

use bevy::prelude::*;
use pretty_assertions::assert_eq;
use resonance_defense::gameplay::player::Player;
use resonance_defense::gameplay::waves::LevelRoot;
use resonance_defense::hud::Readout;
use resonance_defense::{GameState, InGameState};

use crate::{count, create_game_app, enter_game};

#[test]
fn game_initializes_on_title_screen() {
    let app = create_game_app();
    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::Title);
}

#[test]
fn entering_game_builds_the_level() {
    let mut app = create_game_app();
    enter_game(&mut app);

    let phase = app.world().resource::<State<InGameState>>();
    assert_eq!(*phase.get(), InGameState::Playing);
    assert_eq!(count::<With<LevelRoot>>(&mut app), 1);
    assert_eq!(count::<With<Player>>(&mut app), 1);
    assert_eq!(count::<With<Readout>>(&mut app), 4);
}

#[test]
fn leaving_game_tears_everything_down() {
    let mut app = create_game_app();
    enter_game(&mut app);

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Title);
    app.update();

    assert_eq!(count::<With<LevelRoot>>(&mut app), 0);
    assert_eq!(count::<With<Player>>(&mut app), 0);
    assert_eq!(count::<With<Readout>>(&mut app), 0);
}
