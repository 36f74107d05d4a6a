//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::screens::{GameState, InGameState};

/// Creates a minimal app for testing with essential plugins.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app
}

/// Creates a test app with states, keyboard input, and the `InGame` sub-state.
///
/// Keyboard input is a bare resource (no `InputPlugin`), so a key pressed by a
/// test stays "just pressed" until the test resets it.
pub fn create_base_test_app() -> App {
    let mut app = create_test_app();
    app.add_plugins(StatesPlugin);
    app.init_resource::<ButtonInput<KeyCode>>();
    app.init_state::<GameState>();
    app.add_sub_state::<InGameState>();
    app
}

/// Transition to `GameState::InGame` and run one frame so `OnEnter` systems fire.
pub fn transition_to_ingame(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
}

/// Make every following `app.update()` advance time by exactly `step`.
///
/// The first update after switching only initializes the clock, so this runs
/// it immediately. Keep `step` at or below 250ms (the virtual-time clamp).
pub fn use_manual_time(app: &mut App, step: Duration) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    app.update();
}

/// Change the step of an app already on manual time.
pub fn set_time_step(app: &mut App, step: Duration) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
}

/// Helper to advance the app by multiple frames.
pub fn tick_multiple(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}

/// Assert the number of entities matching a query filter.
pub fn assert_entity_count<F: QueryFilter>(app: &mut App, expected: usize) {
    let mut query = app.world_mut().query_filtered::<Entity, F>();
    let actual = query.iter(app.world()).count();
    assert_eq!(
        actual, expected,
        "expected {expected} matching entities, found {actual}"
    );
}

/// Everything a test app observed of message `M`, in delivery order.
#[derive(Resource, Debug)]
pub struct MessageLog<M: Message + Clone>(pub Vec<M>);

impl<M: Message + Clone> Default for MessageLog<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn record_messages<M: Message + Clone>(
    mut reader: MessageReader<M>,
    mut log: ResMut<MessageLog<M>>,
) {
    log.0.extend(reader.read().cloned());
}

/// Register message `M` (if needed) and record every instance into a
/// [`MessageLog<M>`]. Recording runs in `Last`, after all gameplay sets.
pub fn record<M: Message + Clone>(app: &mut App) {
    app.add_message::<M>();
    app.init_resource::<MessageLog<M>>();
    app.add_systems(Last, record_messages::<M>);
}

/// Borrow the recorded instances of message `M`.
pub fn recorded<M: Message + Clone>(app: &App) -> &[M] {
    &app.world().resource::<MessageLog<M>>().0
}
