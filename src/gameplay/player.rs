//! The player avatar, its companion, and the resonance wave ability.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::gameplay::combat::projectile::PlayBounds;
use crate::gameplay::health::{Damage, DamageSource, Health, is_alive};
use crate::gameplay::run_state::{Alert, RunState};
use crate::gameplay::runtime::{Behaviour, Roster};
use crate::gameplay::targeting::{FindNearestTower, TowerFilter};
use crate::gameplay::towers::{ReviveTower, Tower, needs_revival, tower_stats};
use crate::gameplay::waves::LevelLayout;
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::CollisionLayer;
use crate::{GameSet, Z_PLAYER, gameplay_running};

// === Constants ===

/// Player movement speed (pixels per second).
pub const PLAYER_SPEED: f32 = 220.0;

/// Player sprite and collider radius (pixels).
pub const PLAYER_RADIUS: f32 = 10.0;

/// Resonance wave cooldown.
pub const RESONANCE_COOLDOWN: Duration = Duration::from_secs(3);

/// Energy paid for every resonance wave.
pub const RESONANCE_COST: u32 = 10;

/// Reach of the resonance wave (pixels).
pub const RESONANCE_RANGE: f32 = 140.0;

/// Damage dealt to each phantom in reach.
pub const RESONANCE_DAMAGE: f32 = 45.0;

/// Genie orbit radius around the player (pixels).
const GENIE_ORBIT: f32 = 22.0;

/// Genie orbit angular speed (radians per second).
const GENIE_ORBIT_SPEED: f32 = 2.5;

// === Components ===

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Keyboard-driven movement.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlayerController {
    pub speed: f32,
    pub enabled: bool,
}

impl PlayerController {
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self {
            speed,
            enabled: true,
        }
    }
}

impl Behaviour for PlayerController {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Cosmetic companion orbiting the player. Despawned with it.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Genie;

/// The resonance wave: revives the nearest tower and hurts phantoms in reach.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct WaveAmplifier {
    pub cooldown: Duration,
    last_activated: Option<Duration>,
    pub base_cost: u32,
    pub range: f32,
    pub damage: f32,
    pub enabled: bool,
}

impl Default for WaveAmplifier {
    fn default() -> Self {
        Self {
            cooldown: RESONANCE_COOLDOWN,
            last_activated: None,
            base_cost: RESONANCE_COST,
            range: RESONANCE_RANGE,
            damage: RESONANCE_DAMAGE,
            enabled: true,
        }
    }
}

impl Behaviour for WaveAmplifier {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl WaveAmplifier {
    /// Scene-clock cooldown check.
    #[must_use]
    pub fn ready(&self, now: Duration) -> bool {
        self.last_activated
            .is_none_or(|last| now >= last + self.cooldown)
    }

    /// Re-arm the cooldown. Only called after a successful activation.
    pub const fn activated(&mut self, now: Duration) {
        self.last_activated = Some(now);
    }
}

// === Messages ===

/// Edge-triggered request to fire the resonance wave.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateResonance;

// === Systems ===

fn spawn_player(layout: Res<LevelLayout>, mut commands: Commands) {
    let spawn = layout.player_spawn;
    commands.spawn((
        Name::new("Player"),
        Player,
        Roster::Player,
        PlayerController::new(PLAYER_SPEED),
        WaveAmplifier::default(),
        FindNearestTower::new(RESONANCE_RANGE, TowerFilter::Any),
        Sprite::from_color(palette::PLAYER, Vec2::splat(PLAYER_RADIUS * 2.0)),
        Transform::from_xyz(spawn.x, spawn.y, Z_PLAYER),
        DespawnOnExit(GameState::InGame),
        RigidBody::Kinematic,
        Collider::circle(PLAYER_RADIUS),
        CollisionLayer::body(),
        children![(
            Name::new("Genie"),
            Genie,
            Sprite::from_color(palette::GENIE, Vec2::splat(PLAYER_RADIUS)),
            Transform::from_xyz(GENIE_ORBIT, 0.0, 0.1),
        )],
    ));
}

fn read_direction(keyboard: &ButtonInput<KeyCode>) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        direction.y += 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        direction.y -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction.x -= 1.0;
    }
    if keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction.x += 1.0;
    }
    direction.normalize_or_zero()
}

fn move_player(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    bounds: Res<PlayBounds>,
    mut players: Query<(&PlayerController, &mut Transform)>,
) {
    let direction = read_direction(&keyboard);
    if direction == Vec2::ZERO {
        return;
    }
    for (controller, mut transform) in &mut players {
        if !controller.is_enabled() {
            continue;
        }
        let step = direction * controller.speed * time.delta_secs();
        let next = transform.translation.truncate() + step;
        let clamped = next.clamp(bounds.0.min, bounds.0.max);
        transform.translation.x = clamped.x;
        transform.translation.y = clamped.y;
    }
}

fn request_resonance(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<ActivateResonance>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        requests.write(ActivateResonance);
    }
}

/// Runs the resonance wave: gates, the revival branch, then the phantom
/// burst. The burst runs whether or not a revival was attempted.
fn resolve_resonance(
    time: Res<Time>,
    mut requests: MessageReader<ActivateResonance>,
    mut players: Query<(&Transform, &mut WaveAmplifier, &FindNearestTower), With<Player>>,
    towers: Query<(&Tower, &Health)>,
    phantoms: Query<(Entity, &Transform, &Roster, Option<&Health>)>,
    mut run: ResMut<RunState>,
    mut revive: MessageWriter<ReviveTower>,
    mut damage: MessageWriter<Damage>,
    mut alerts: MessageWriter<Alert>,
) {
    let now = time.elapsed();
    for _ in requests.read() {
        let Ok((transform, mut amplifier, finder)) = players.single_mut() else {
            continue;
        };
        if !amplifier.is_enabled() {
            continue;
        }
        if !amplifier.ready(now) {
            alerts.write(Alert::new("Resonance wave recharging"));
            continue;
        }
        if !run.try_spend(amplifier.base_cost) {
            alerts.write(Alert::new(format!(
                "Not enough energy: resonance needs {}",
                amplifier.base_cost
            )));
            continue;
        }

        let eligible = finder.nearest.and_then(|entity| {
            let (tower, health) = towers.get(entity).ok()?;
            needs_revival(tower, health).then_some((entity, tower.kind))
        });
        if let Some((tower, kind)) = eligible {
            let revive_cost = tower_stats(kind).revive_cost;
            if !run.try_spend(revive_cost) {
                run.earn(amplifier.base_cost);
                alerts.write(Alert::new(format!(
                    "Not enough energy: revival needs {revive_cost}"
                )));
                continue;
            }
            revive.write(ReviveTower { tower });
        }

        let origin = transform.translation.truncate();
        for (phantom, position, roster, health) in &phantoms {
            if *roster != Roster::Phantom || !is_alive(health) {
                continue;
            }
            if origin.distance(position.translation.truncate()) <= amplifier.range {
                damage.write(Damage {
                    target: phantom,
                    amount: amplifier.damage,
                    source: DamageSource::Player,
                });
            }
        }

        amplifier.activated(now);
        debug!("Resonance wave fired");
    }
}

fn orbit_genie(time: Res<Time>, mut genies: Query<&mut Transform, With<Genie>>) {
    let angle = time.elapsed_secs() * GENIE_ORBIT_SPEED;
    for mut transform in &mut genies {
        let offset = Vec2::from_angle(angle) * GENIE_ORBIT;
        transform.translation.x = offset.x;
        transform.translation.y = offset.y;
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Player>()
        .register_type::<PlayerController>()
        .register_type::<Genie>()
        .register_type::<WaveAmplifier>()
        .add_message::<ActivateResonance>();

    app.add_systems(OnEnter(GameState::InGame), spawn_player);

    app.add_systems(
        Update,
        (
            request_resonance.in_set(GameSet::Input),
            move_player.in_set(GameSet::Movement),
            resolve_resonance.in_set(GameSet::Combat),
            orbit_genie.in_set(GameSet::Ui),
        )
            .run_if(gameplay_running),
    );
}
