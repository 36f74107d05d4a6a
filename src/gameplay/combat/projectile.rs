//! Bullets and bombs: straight-line sensors that leave play when out of bounds.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::gameplay::runtime::Roster;
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::CollisionLayer;
use crate::{GameSet, Z_PROJECTILE, gameplay_running};

// === Constants ===

/// Bullet sensor radius (pixels).
pub const BULLET_RADIUS: f32 = 3.0;

/// Bomb sensor radius (pixels).
pub const BOMB_RADIUS: f32 = 5.0;

// === Components ===

/// Single-target projectile. Damages the first valid body it overlaps.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Bullet {
    pub damage: f32,
    /// Tower that fired it. Never damaged by its own bullet.
    pub source: Entity,
}

/// Area projectile. Explodes on touching any member of `victims`, hitting
/// every member of every victim roster within `radius` for full damage.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Bomb {
    pub damage: f32,
    pub radius: f32,
    pub victims: Vec<Roster>,
    pub source: Entity,
}

// === Resources ===

/// Playable area. Projectiles outside it are despawned.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct PlayBounds(pub Rect);

impl Default for PlayBounds {
    fn default() -> Self {
        Self(Rect::from_center_half_size(Vec2::ZERO, Vec2::new(640.0, 360.0)))
    }
}

// === Bundles ===

/// Everything a projectile needs besides its payload.
fn projectile_body(origin: Vec2, velocity: Vec2, radius: f32, color: Color) -> impl Bundle {
    (
        Sprite::from_color(color, Vec2::splat(radius * 2.0)),
        Transform::from_xyz(origin.x, origin.y, Z_PROJECTILE),
        DespawnOnExit(GameState::InGame),
        RigidBody::Kinematic,
        LinearVelocity(velocity),
        Collider::circle(radius),
        Sensor,
        CollisionLayer::projectile(),
        CollisionEventsEnabled,
        CollidingEntities::default(),
    )
}

#[must_use]
pub fn bullet(bullet: Bullet, origin: Vec2, velocity: Vec2) -> impl Bundle {
    (
        Name::new("Bullet"),
        bullet,
        projectile_body(origin, velocity, BULLET_RADIUS, palette::BULLET),
    )
}

#[must_use]
pub fn bomb(bomb: Bomb, origin: Vec2, velocity: Vec2) -> impl Bundle {
    (
        Name::new("Bomb"),
        bomb,
        projectile_body(origin, velocity, BOMB_RADIUS, palette::BOMB),
    )
}

// === Helpers ===

/// Every candidate within `radius` of `center` (inclusive). No falloff.
#[must_use]
pub fn explosion_victims(
    center: Vec2,
    radius: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Vec<Entity> {
    candidates
        .into_iter()
        .filter(|(_, position)| center.distance(*position) <= radius)
        .map(|(entity, _)| entity)
        .collect()
}

// === Systems ===

fn despawn_out_of_bounds(
    bounds: Res<PlayBounds>,
    projectiles: Query<(Entity, &Transform), Or<(With<Bullet>, With<Bomb>)>>,
    mut commands: Commands,
) {
    for (entity, transform) in &projectiles {
        if !bounds.0.contains(transform.translation.truncate()) {
            commands.entity(entity).despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bullet>()
        .register_type::<Bomb>()
        .register_type::<PlayBounds>()
        .init_resource::<PlayBounds>();

    app.add_systems(
        Update,
        despawn_out_of_bounds
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
