//! A run from level entry through waves, placement and the outcome screen.

use bevy::prelude::*;
use pretty_assertions::assert_eq;
use resonance_defense::gameplay::enemies::Enemy;
use resonance_defense::gameplay::player::Player;
use resonance_defense::gameplay::run_state::{RunState, STARTING_ENERGY};
use resonance_defense::gameplay::towers::{PlaceTower, Tower, TowerKind, tower_stats};
use resonance_defense::gameplay::waves::{
    FIRST_WAVE_DELAY, OUTCOME_DELAY, WaveManager, WavePhase, WaveTable,
};
use resonance_defense::{GameState, InGameState};

use crate::{STEP, advance, count, create_game_app, enter_game};

#[test]
fn first_wave_starts_after_delay_and_spawns_enemies() {
    let mut app = create_game_app();
    enter_game(&mut app);
    assert_eq!(count::<With<Enemy>>(&mut app), 0);

    advance(&mut app, FIRST_WAVE_DELAY + STEP);
    assert_eq!(
        app.world().resource::<WaveManager>().phase,
        WavePhase::Spawning
    );

    let first_batch = app.world().resource::<WaveTable>().wave(0).unwrap()[0].clone();
    advance(&mut app, first_batch.delay + STEP);

    assert!(count::<With<Enemy>>(&mut app) >= 1);
    let run = app.world().resource::<RunState>();
    assert!(run.enemies_spawned >= 1);
    assert!(run.enemies_remaining >= 1);
}

#[test]
fn placing_a_tower_charges_its_cost() {
    let mut app = create_game_app();
    enter_game(&mut app);

    app.world_mut().write_message(PlaceTower {
        kind: TowerKind::Laser,
        position: Vec2::new(0.0, 120.0),
    });
    app.update();

    assert_eq!(count::<With<Tower>>(&mut app), 1);
    assert_eq!(
        app.world().resource::<RunState>().energy,
        STARTING_ENERGY - tower_stats(TowerKind::Laser).cost
    );
}

#[test]
fn destroyed_nexus_freezes_then_shows_game_over() {
    let mut app = create_game_app();
    enter_game(&mut app);

    app.world_mut().resource_mut::<RunState>().nexus_health = 0.0;
    app.update();
    app.update();
    let phase = app.world().resource::<State<InGameState>>();
    assert_eq!(*phase.get(), InGameState::Frozen);

    advance(&mut app, OUTCOME_DELAY + STEP * 2);

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(*state.get(), GameState::GameOver);
    assert_eq!(count::<With<Player>>(&mut app), 0);
}

#[test]
fn new_run_resets_run_state() {
    let mut app = create_game_app();
    enter_game(&mut app);
    app.world_mut().resource_mut::<RunState>().energy = 3;

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Title);
    app.update();
    enter_game(&mut app);

    assert_eq!(app.world().resource::<RunState>().energy, STARTING_ENERGY);
}
