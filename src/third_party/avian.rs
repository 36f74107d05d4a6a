//! Avian2d physics configuration for top-down gameplay.
//!
//! Physics is only used for overlap detection: bodies are kinematic or
//! static, projectiles are sensors, and gravity is off.

use avian2d::prelude::*;
use bevy::prelude::*;

// === Constants ===

/// Typical actor size in pixels, used as avian's length unit.
pub const LENGTH_UNIT: f32 = 20.0;

// === Collision Layers ===

/// Physics collision layers.
///
/// - **Body**: anything a projectile can touch (enemies, towers, player).
/// - **Projectile**: bullet and bomb sensors.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum CollisionLayer {
    #[default]
    Default,
    Body,
    Projectile,
}

impl CollisionLayer {
    /// Layers for an actor that projectiles may overlap.
    #[must_use]
    pub fn body() -> CollisionLayers {
        CollisionLayers::new(Self::Body, Self::Projectile)
    }

    /// Layers for a projectile sensor.
    #[must_use]
    pub fn projectile() -> CollisionLayers {
        CollisionLayers::new(Self::Projectile, Self::Body)
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(PhysicsPlugins::default().with_length_unit(LENGTH_UNIT));
    app.insert_resource(Gravity::ZERO);
}
