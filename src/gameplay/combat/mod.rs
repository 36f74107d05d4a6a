//! Combat: attack resolvers, projectiles and overlap routing.

pub mod attack;
pub mod collision;
pub mod projectile;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((attack::plugin, projectile::plugin, collision::plugin));
}
