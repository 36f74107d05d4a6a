//! In-game HUD: run readouts along the top edge and short-lived alert text.

use std::time::Duration;

use bevy::prelude::*;

use crate::GameSet;
use crate::gameplay::run_state::{Alert, RunState};
use crate::gameplay::towers::{SelectedTower, tower_stats};
use crate::gameplay::waves::WaveTable;
use crate::screens::GameState;
use crate::theme::palette;

/// How long an alert stays on screen.
pub const ALERT_LIFETIME: Duration = Duration::from_secs(2);

// === Components ===

/// Which run scalar a HUD text shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum Readout {
    Energy,
    Nexus,
    Wave,
    Selection,
}

/// Alert text, despawned when its timer runs out.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AlertText {
    pub lifetime: Timer,
}

// === Formatting ===

fn readout_text(
    readout: Readout,
    run: &RunState,
    waves: &WaveTable,
    selected: SelectedTower,
) -> String {
    match readout {
        Readout::Energy => format!("Energy: {}", run.energy),
        Readout::Nexus => format!("Nexus: {:.0}", run.nexus_health),
        Readout::Wave => format!(
            "Wave {}/{} ({} left)",
            (run.current_wave + 1).min(waves.len()),
            waves.len(),
            run.enemies_remaining
        ),
        Readout::Selection => format!(
            "[1-3] {} ({})",
            selected.0.display_name(),
            tower_stats(selected.0).cost
        ),
    }
}

// === Systems ===

fn spawn_hud(mut commands: Commands) {
    commands
        .spawn((
            Name::new("HUD"),
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                padding: UiRect::all(Val::Px(12.0)),
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            DespawnOnExit(GameState::InGame),
        ))
        .with_children(|bar| {
            for (readout, color) in [
                (Readout::Energy, palette::ENERGY_TEXT),
                (Readout::Nexus, palette::NEXUS),
                (Readout::Wave, palette::HEADER_TEXT),
                (Readout::Selection, palette::BODY_TEXT),
            ] {
                bar.spawn((
                    readout,
                    Text::new(""),
                    TextFont {
                        font_size: palette::FONT_SIZE_HUD,
                        ..default()
                    },
                    TextColor(color),
                ));
            }
        });
}

fn update_readouts(
    run: Res<RunState>,
    waves: Res<WaveTable>,
    selected: Res<SelectedTower>,
    mut texts: Query<(&Readout, &mut Text)>,
    added: Query<(), Added<Readout>>,
) {
    if !run.is_changed() && !selected.is_changed() && added.is_empty() {
        return;
    }
    for (readout, mut text) in &mut texts {
        **text = readout_text(*readout, &run, &waves, *selected);
    }
}

/// A new alert replaces whatever alert is showing.
fn show_alerts(
    mut alerts: MessageReader<Alert>,
    shown: Query<Entity, With<AlertText>>,
    mut commands: Commands,
) {
    let Some(alert) = alerts.read().last() else {
        return;
    };
    for entity in &shown {
        commands.entity(entity).despawn();
    }
    commands.spawn((
        Name::new("Alert"),
        AlertText {
            lifetime: Timer::new(ALERT_LIFETIME, TimerMode::Once),
        },
        Text::new(alert.0.clone()),
        TextFont {
            font_size: palette::FONT_SIZE_PROMPT,
            ..default()
        },
        TextColor(palette::ALERT_TEXT),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            left: Val::Px(24.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
}

fn expire_alerts(
    time: Res<Time<Real>>,
    mut alerts: Query<(Entity, &mut AlertText)>,
    mut commands: Commands,
) {
    for (entity, mut alert) in &mut alerts {
        if alert.lifetime.tick(time.delta()).just_finished() {
            commands.entity(entity).despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Readout>().register_type::<AlertText>();

    app.add_systems(OnEnter(GameState::InGame), spawn_hud);
    app.add_systems(
        Update,
        (update_readouts, show_alerts, expire_alerts)
            .in_set(GameSet::Ui)
            .run_if(in_state(GameState::InGame)),
    );
}
