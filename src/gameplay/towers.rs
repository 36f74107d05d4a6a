//! Tower lifecycle: energy-gated placement, deactivation, the three-step
//! revival protocol, and the cosmetic pulse of active towers.

use std::f32::consts::TAU;
use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::component::Mutable;
use bevy::prelude::*;

use crate::gameplay::aura::SlowingAura;
use crate::gameplay::combat::attack::{BombAttack, LaserAttack};
use crate::gameplay::health::{Died, Health};
use crate::gameplay::run_state::{Alert, RunState};
use crate::gameplay::runtime::{ActorCommandsExt, Behaviour, Roster};
use crate::gameplay::targeting::Targeting;
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::CollisionLayer;
use crate::{GameSet, Z_TOWER, gameplay_running};

// === Constants ===

/// Revival pulses needed to bring a tower back.
pub const REVIVE_THRESHOLD: u8 = 3;

/// Opacity of a deactivated tower with no revival progress.
pub const DEACTIVATED_ALPHA: f32 = 0.5;

/// Tower sprite and collider edge length (pixels).
pub const TOWER_SIZE: f32 = 28.0;

/// Period of the active-tower pulse (seconds).
const PULSE_PERIOD: f32 = 1.6;

// === Tower Kinds ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum TowerKind {
    /// Single-target bullets.
    #[default]
    Laser,
    /// Area bombs hitting enemies and phantoms.
    Mortar,
    /// Slowing aura.
    Frost,
}

impl TowerKind {
    pub const ALL: &[Self] = &[Self::Laser, Self::Mortar, Self::Frost];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Laser => "Laser",
            Self::Mortar => "Mortar",
            Self::Frost => "Frost",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TowerStats {
    pub cost: u32,
    /// Extra energy a resonance wave costs to advance this tower's revival.
    pub revive_cost: u32,
    pub health: f32,
    pub range: f32,
    pub fire_rate_ms: u64,
    pub damage: f32,
    pub projectile_speed: f32,
    pub explosion_radius: f32,
    pub slow_multiplier: f32,
    pub color: Color,
}

#[must_use]
pub const fn tower_stats(kind: TowerKind) -> TowerStats {
    match kind {
        TowerKind::Laser => TowerStats {
            cost: 100,
            revive_cost: 20,
            health: 150.0,
            range: 160.0,
            fire_rate_ms: 200,
            damage: 12.0,
            projectile_speed: 480.0,
            explosion_radius: 0.0,
            slow_multiplier: 1.0,
            color: palette::LASER_TOWER,
        },
        TowerKind::Mortar => TowerStats {
            cost: 140,
            revive_cost: 30,
            health: 200.0,
            range: 220.0,
            fire_rate_ms: 1_500,
            damage: 40.0,
            projectile_speed: 260.0,
            explosion_radius: 60.0,
            slow_multiplier: 1.0,
            color: palette::MORTAR_TOWER,
        },
        TowerKind::Frost => TowerStats {
            cost: 80,
            revive_cost: 15,
            health: 120.0,
            range: 110.0,
            fire_rate_ms: 0,
            damage: 0.0,
            projectile_speed: 0.0,
            explosion_radius: 0.0,
            slow_multiplier: 0.5,
            color: palette::FROST_TOWER,
        },
    }
}

// === Components ===

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Tower {
    pub kind: TowerKind,
    /// `0..REVIVE_THRESHOLD`; only meaningful while damaged or deactivated.
    pub revive_progress: u8,
    pub active: bool,
    /// Colour restored on revival.
    pub base_color: Color,
}

impl Tower {
    #[must_use]
    pub const fn new(kind: TowerKind) -> Self {
        Self {
            kind,
            revive_progress: 0,
            active: true,
            base_color: tower_stats(kind).color,
        }
    }
}

/// Cosmetic alpha oscillation in `color`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct VisualPulse {
    pub color: Color,
    pub period: f32,
    pub enabled: bool,
}

impl VisualPulse {
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            period: PULSE_PERIOD,
            enabled: true,
        }
    }
}

impl Behaviour for VisualPulse {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// === Resources ===

/// Tower kind placed by the next click.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct SelectedTower(pub TowerKind);

// === Messages ===

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PlaceTower {
    pub kind: TowerKind,
    pub position: Vec2,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerPlaced {
    pub tower: Entity,
    pub kind: TowerKind,
}

/// External request to shut a tower down (phantom deactivators).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivateTower {
    pub tower: Entity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerDeactivated {
    pub tower: Entity,
}

/// One revival pulse against a tower (from the resonance wave).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviveTower {
    pub tower: Entity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TowerRevived {
    pub tower: Entity,
}

// === Revival Protocol ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevivalStep {
    /// Partial progress; nothing restored yet.
    Progress(u8),
    /// Threshold reached: full health, active, progress reset.
    Revived,
}

/// Advance revival by one pulse.
pub fn revive_step(tower: &mut Tower, health: &mut Health) -> RevivalStep {
    tower.revive_progress += 1;
    if tower.revive_progress < REVIVE_THRESHOLD {
        return RevivalStep::Progress(tower.revive_progress);
    }
    health.restore();
    tower.active = true;
    tower.revive_progress = 0;
    RevivalStep::Revived
}

/// Opacity for a tower with `progress` revival pulses.
#[must_use]
pub fn revival_alpha(progress: u8) -> f32 {
    (f32::from(progress) / f32::from(REVIVE_THRESHOLD))
        .mul_add(1.0 - DEACTIVATED_ALPHA, DEACTIVATED_ALPHA)
}

/// A tower a revival pulse can act on.
#[must_use]
pub fn needs_revival(tower: &Tower, health: &Health) -> bool {
    !tower.active || health.is_damaged()
}

// === Bundles ===

fn tower_bundle(kind: TowerKind, position: Vec2) -> impl Bundle {
    let stats = tower_stats(kind);
    (
        Name::new(format!("{} Tower", kind.display_name())),
        Tower::new(kind),
        Roster::Tower,
        Health::new(stats.health),
        Sprite::from_color(stats.color, Vec2::splat(TOWER_SIZE)),
        Transform::from_xyz(position.x, position.y, Z_TOWER),
        DespawnOnExit(GameState::InGame),
        RigidBody::Static,
        Collider::rectangle(TOWER_SIZE, TOWER_SIZE),
        CollisionLayer::body(),
    )
}

/// Attach the armament for `kind` to a freshly spawned tower.
fn arm(tower: &mut EntityCommands, kind: TowerKind) {
    let stats = tower_stats(kind);
    let fire_rate = Duration::from_millis(stats.fire_rate_ms);
    match kind {
        TowerKind::Laser => {
            tower.insert((
                Targeting::new(stats.range, Roster::Enemy),
                LaserAttack::new(fire_rate, stats.damage, stats.projectile_speed),
            ));
        }
        TowerKind::Mortar => {
            tower.insert((
                Targeting::new(stats.range, Roster::Enemy),
                BombAttack::new(
                    fire_rate,
                    stats.damage,
                    stats.projectile_speed,
                    stats.explosion_radius,
                    vec![Roster::Enemy, Roster::Phantom],
                ),
            ));
        }
        TowerKind::Frost => {
            tower.attach(SlowingAura::new(stats.range, stats.slow_multiplier));
        }
    }
    tower.attach(VisualPulse::new(stats.color));
}

// === Systems ===

fn select_tower(keyboard: Res<ButtonInput<KeyCode>>, mut selected: ResMut<SelectedTower>) {
    let keys = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];
    for (key, &kind) in keys.iter().zip(TowerKind::ALL) {
        if keyboard.just_pressed(*key) {
            selected.0 = kind;
        }
    }
}

/// Left click requests the selected tower under the cursor.
fn request_placement(
    mouse: Res<ButtonInput<MouseButton>>,
    selected: Res<SelectedTower>,
    window: Single<&Window>,
    camera: Single<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut requests: MessageWriter<PlaceTower>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let (camera, camera_global) = *camera;
    let Some(position) = window
        .cursor_position()
        .and_then(|screen| camera.viewport_to_world_2d(camera_global, screen).ok())
    else {
        return;
    };
    requests.write(PlaceTower {
        kind: selected.0,
        position,
    });
}

/// Validates, charges and spawns in one step: nothing is deducted unless
/// the tower is actually built.
fn place_towers(
    mut requests: MessageReader<PlaceTower>,
    existing: Query<&Transform, With<Tower>>,
    mut run: ResMut<RunState>,
    mut placed: MessageWriter<TowerPlaced>,
    mut alerts: MessageWriter<Alert>,
    mut commands: Commands,
) {
    let mut built: Vec<Vec2> = Vec::new();
    for request in requests.read() {
        let crowded = existing
            .iter()
            .map(|transform| transform.translation.truncate())
            .chain(built.iter().copied())
            .any(|other| other.distance(request.position) < TOWER_SIZE);
        if crowded {
            alerts.write(Alert::new("Too close to another tower"));
            continue;
        }

        let cost = tower_stats(request.kind).cost;
        if !run.try_spend(cost) {
            alerts.write(Alert::new(format!(
                "Not enough energy: {} needs {cost}",
                request.kind.display_name()
            )));
            continue;
        }

        let mut tower = commands.spawn(tower_bundle(request.kind, request.position));
        arm(&mut tower, request.kind);
        let tower = tower.id();
        built.push(request.position);

        placed.write(TowerPlaced {
            tower,
            kind: request.kind,
        });
        info!(
            "Placed {} tower for {cost} energy",
            request.kind.display_name()
        );
    }
}

/// Zero health (combat) or a deactivation request shuts an active tower down.
fn deactivate_towers(
    mut deaths: MessageReader<Died>,
    mut requests: MessageReader<DeactivateTower>,
    mut towers: Query<(&mut Tower, &mut Health, &mut Sprite)>,
    mut deactivated: MessageWriter<TowerDeactivated>,
    mut commands: Commands,
) {
    let targets = deaths
        .read()
        .map(|death| death.entity)
        .chain(requests.read().map(|request| request.tower));
    for entity in targets {
        let Ok((mut tower, mut health, mut sprite)) = towers.get_mut(entity) else {
            continue;
        };
        if !tower.active {
            continue;
        }
        health.deplete();
        tower.active = false;
        tower.revive_progress = 0;
        sprite.color = tower.base_color.with_alpha(DEACTIVATED_ALPHA);
        commands.entity(entity).remove::<VisualPulse>();

        deactivated.write(TowerDeactivated { tower: entity });
        info!("{} tower {entity} deactivated", tower.kind.display_name());
    }
}

fn revive_towers(
    mut requests: MessageReader<ReviveTower>,
    mut towers: Query<(&mut Tower, &mut Health, &mut Sprite)>,
    mut revived: MessageWriter<TowerRevived>,
    mut commands: Commands,
) {
    for request in requests.read() {
        let Ok((mut tower, mut health, mut sprite)) = towers.get_mut(request.tower) else {
            continue;
        };
        if !needs_revival(&tower, &health) {
            continue;
        }
        match revive_step(&mut tower, &mut health) {
            RevivalStep::Progress(progress) => {
                let alpha = if tower.active {
                    1.0
                } else {
                    revival_alpha(progress)
                };
                sprite.color = tower.base_color.with_alpha(alpha);
            }
            RevivalStep::Revived => {
                sprite.color = tower.base_color;
                commands
                    .entity(request.tower)
                    .attach_overriding(VisualPulse::new(tower.base_color));
                revived.write(TowerRevived {
                    tower: request.tower,
                });
                info!("{} tower {} revived", tower.kind.display_name(), request.tower);
            }
        }
    }
}

/// Keeps a tower's armament `T` enabled exactly while the tower is active.
fn sync_armaments<T: Behaviour + Component<Mutability = Mutable>>(
    mut towers: Query<(&Tower, &mut T), Changed<Tower>>,
) {
    for (tower, mut armament) in &mut towers {
        if armament.is_enabled() != tower.active {
            armament.set_enabled(tower.active);
        }
    }
}

fn animate_pulses(time: Res<Time>, mut pulses: Query<(&VisualPulse, &mut Sprite)>) {
    let t = time.elapsed_secs();
    for (pulse, mut sprite) in &mut pulses {
        if !pulse.is_enabled() {
            continue;
        }
        let wave = (t * TAU / pulse.period).sin();
        sprite.color = pulse.color.with_alpha(0.15f32.mul_add(wave, 0.85));
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Tower>()
        .register_type::<VisualPulse>()
        .register_type::<SelectedTower>()
        .init_resource::<SelectedTower>()
        .add_message::<PlaceTower>()
        .add_message::<TowerPlaced>()
        .add_message::<DeactivateTower>()
        .add_message::<TowerDeactivated>()
        .add_message::<ReviveTower>()
        .add_message::<TowerRevived>();

    app.add_systems(
        Update,
        (
            (select_tower, request_placement).in_set(GameSet::Input),
            place_towers.in_set(GameSet::Spawn),
            (
                deactivate_towers,
                revive_towers,
                (
                    sync_armaments::<Targeting>,
                    sync_armaments::<LaserAttack>,
                    sync_armaments::<BombAttack>,
                    sync_armaments::<SlowingAura>,
                ),
            )
                .chain()
                .in_set(GameSet::Death),
            animate_pulses.in_set(GameSet::Ui),
        )
            .run_if(gameplay_running),
    );
}
