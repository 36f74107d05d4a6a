//! Slowing auras: stationary sources that re-scan nearby movers every frame.

use bevy::prelude::*;

use crate::gameplay::movement::PathFollower;
use crate::gameplay::runtime::{ActorId, Behaviour, Roster};
use crate::{GameSet, gameplay_running};

// === Components ===

/// Applies `multiplier` to every mover within `radius`, keyed by the owner's
/// [`ActorId`]. Movers that leave the radius lose the modifier next frame.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SlowingAura {
    pub radius: f32,
    pub multiplier: f32,
    pub enabled: bool,
    /// Movers slowed as of the last scan.
    affected: Vec<Entity>,
}

impl SlowingAura {
    #[must_use]
    pub const fn new(radius: f32, multiplier: f32) -> Self {
        Self {
            radius,
            multiplier,
            enabled: true,
            affected: Vec::new(),
        }
    }

    #[must_use]
    pub fn affected(&self) -> &[Entity] {
        &self.affected
    }
}

impl Behaviour for SlowingAura {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// === Systems ===

/// Full recompute-and-diff of every aura against every mover.
fn pulse_auras(
    mut auras: Query<(&ActorId, &Transform, &mut SlowingAura)>,
    mut movers: Query<(Entity, &Transform, &Roster, &mut PathFollower)>,
) {
    for (&source, aura_transform, mut aura) in &mut auras {
        let mut in_range = Vec::new();
        if aura.enabled {
            let center = aura_transform.translation.truncate();
            for (entity, transform, roster, mut follower) in &mut movers {
                if !Roster::MOVERS.contains(roster) {
                    continue;
                }
                if center.distance(transform.translation.truncate()) <= aura.radius {
                    follower.apply_modifier(source, aura.multiplier);
                    in_range.push(entity);
                }
            }
        }

        for left in aura.affected.iter().filter(|entity| !in_range.contains(*entity)) {
            if let Ok((.., mut follower)) = movers.get_mut(*left) {
                follower.remove_modifier(source);
            }
        }
        aura.affected = in_range;
    }
}

/// An aura going away (detached or despawned) takes its modifiers with it.
fn clear_aura_modifiers(
    remove: On<Remove, SlowingAura>,
    sources: Query<&ActorId>,
    mut movers: Query<&mut PathFollower>,
) {
    let Ok(&source) = sources.get(remove.entity) else {
        return;
    };
    for mut follower in &mut movers {
        follower.remove_modifier(source);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<SlowingAura>();

    app.add_observer(clear_aura_modifiers);
    app.add_systems(
        Update,
        pulse_auras.in_set(GameSet::Ai).run_if(gameplay_running),
    );
}
