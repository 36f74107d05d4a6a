//! Attack resolvers: fire-rate gated projectile spawning toward the current target.

use std::time::Duration;

use bevy::prelude::*;

use crate::gameplay::combat::projectile::{self, Bomb, Bullet};
use crate::gameplay::health::{Health, is_alive};
use crate::gameplay::runtime::{Behaviour, Roster, SetupError, TickError, isolate};
use crate::gameplay::targeting::Targeting;
use crate::{GameSet, gameplay_running};

// === Components ===

/// Cooldown gate shared by both resolvers. Only a shot actually fired
/// consumes the cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Reflect)]
pub struct FireControl {
    pub fire_rate: Duration,
    last_fired: Option<Duration>,
}

impl FireControl {
    #[must_use]
    pub const fn new(fire_rate: Duration) -> Self {
        Self {
            fire_rate,
            last_fired: None,
        }
    }

    #[must_use]
    pub fn ready(&self, now: Duration) -> bool {
        self.last_fired
            .is_none_or(|last| now >= last + self.fire_rate)
    }

    pub const fn fired(&mut self, now: Duration) {
        self.last_fired = Some(now);
    }
}

/// Fires a [`Bullet`] at the current target.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LaserAttack {
    pub control: FireControl,
    pub damage: f32,
    pub projectile_speed: f32,
    pub enabled: bool,
}

impl LaserAttack {
    #[must_use]
    pub const fn new(fire_rate: Duration, damage: f32, projectile_speed: f32) -> Self {
        Self {
            control: FireControl::new(fire_rate),
            damage,
            projectile_speed,
            enabled: true,
        }
    }
}

/// Fires a [`Bomb`] at the current target.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct BombAttack {
    pub control: FireControl,
    pub damage: f32,
    pub projectile_speed: f32,
    pub explosion_radius: f32,
    pub victims: Vec<Roster>,
    pub enabled: bool,
}

impl BombAttack {
    #[must_use]
    pub const fn new(
        fire_rate: Duration,
        damage: f32,
        projectile_speed: f32,
        explosion_radius: f32,
        victims: Vec<Roster>,
    ) -> Self {
        Self {
            control: FireControl::new(fire_rate),
            damage,
            projectile_speed,
            explosion_radius,
            victims,
            enabled: true,
        }
    }
}

impl Behaviour for LaserAttack {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Behaviour for BombAttack {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// === Helpers ===

/// Unit vector from `from` toward the target's current position.
fn aim(from: Vec2, to: Vec2, target: Entity) -> Result<Vec2, TickError> {
    (to - from)
        .try_normalize()
        .ok_or(TickError::DegenerateAim { target })
}

/// The shot a resolver would take this frame, if any.
fn select_shot(
    now: Duration,
    control: &FireControl,
    attacker_health: Option<&Health>,
    targeting: &Targeting,
    targets: &Query<(&Transform, Option<&Health>)>,
) -> Option<(Entity, Vec2)> {
    if !is_alive(attacker_health) || !control.ready(now) {
        return None;
    }
    let target = targeting.target?;
    let (transform, health) = targets.get(target).ok()?;
    is_alive(health).then(|| (target, transform.translation.truncate()))
}

// === Systems ===

fn fire_lasers(
    time: Res<Time>,
    mut attackers: Query<(Entity, &Transform, &Targeting, &mut LaserAttack, Option<&Health>)>,
    targets: Query<(&Transform, Option<&Health>)>,
    mut commands: Commands,
) {
    let now = time.elapsed();
    for (entity, transform, targeting, mut laser, health) in &mut attackers {
        if !laser.is_enabled() {
            continue;
        }
        let Some((target, target_position)) =
            select_shot(now, &laser.control, health, targeting, &targets)
        else {
            continue;
        };
        let origin = transform.translation.truncate();
        let direction = match aim(origin, target_position, target) {
            Ok(direction) => direction,
            Err(error) => {
                isolate(entity, "LaserAttack", Err(error));
                continue;
            }
        };

        commands.spawn(projectile::bullet(
            Bullet {
                damage: laser.damage,
                source: entity,
            },
            origin,
            direction * laser.projectile_speed,
        ));
        laser.control.fired(now);
        debug!("{entity} fired a bullet at {target}");
    }
}

fn fire_bombs(
    time: Res<Time>,
    mut attackers: Query<(Entity, &Transform, &Targeting, &mut BombAttack, Option<&Health>)>,
    targets: Query<(&Transform, Option<&Health>)>,
    mut commands: Commands,
) {
    let now = time.elapsed();
    for (entity, transform, targeting, mut mortar, health) in &mut attackers {
        if !mortar.is_enabled() {
            continue;
        }
        let Some((target, target_position)) =
            select_shot(now, &mortar.control, health, targeting, &targets)
        else {
            continue;
        };
        let origin = transform.translation.truncate();
        let direction = match aim(origin, target_position, target) {
            Ok(direction) => direction,
            Err(error) => {
                isolate(entity, "BombAttack", Err(error));
                continue;
            }
        };

        commands.spawn(projectile::bomb(
            Bomb {
                damage: mortar.damage,
                radius: mortar.explosion_radius,
                victims: mortar.victims.clone(),
                source: entity,
            },
            origin,
            direction * mortar.projectile_speed,
        ));
        mortar.control.fired(now);
        debug!("{entity} lobbed a bomb at {target}");
    }
}

// === Observers ===

/// Attack resolvers cannot work without a [`Targeting`] on the same entity.
fn require_targeting<A: Component>(
    add: On<Add, A>,
    targeting: Query<(), With<Targeting>>,
) -> Result {
    if targeting.contains(add.entity) {
        return Ok(());
    }
    let component = std::any::type_name::<A>()
        .rsplit("::")
        .next()
        .unwrap_or("attack");
    Err(SetupError::MissingCollaborator {
        entity: add.entity,
        component,
        collaborator: "Targeting",
    }
    .into())
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<LaserAttack>()
        .register_type::<BombAttack>();

    app.add_observer(require_targeting::<LaserAttack>);
    app.add_observer(require_targeting::<BombAttack>);

    app.add_systems(
        Update,
        (fire_lasers, fire_bombs)
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
