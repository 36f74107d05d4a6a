//! Cross-plugin tests driving the full game plugin headless.

mod run_flow;
mod state_transitions;

use std::time::Duration;

use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

/// Frame step used by every integration test. Below the virtual-time clamp.
pub const STEP: Duration = Duration::from_millis(200);

pub fn create_game_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(InputPlugin);
    app.add_plugins(resonance_defense::plugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    app.update();
    app
}

pub fn enter_game(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<resonance_defense::GameState>>()
        .set(resonance_defense::GameState::InGame);
    app.update();
}

/// Run frames until `elapsed` of simulated time has passed.
pub fn advance(app: &mut App, elapsed: Duration) {
    let frames = elapsed.as_millis().div_ceil(STEP.as_millis());
    for _ in 0..frames {
        app.update();
    }
}

pub fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<Entity, F>();
    query.iter(app.world()).count()
}
