//! Overlap routing: turns projectile contacts into damage requests.
//!
//! Each handler only routes. Damage math lives in `health`, explosion
//! victim selection in `projectile`.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::gameplay::combat::projectile::{Bomb, Bullet, explosion_victims};
use crate::gameplay::health::{Damage, DamageSource, Health, is_alive};
use crate::gameplay::runtime::Roster;
use crate::{GameSet, gameplay_running};

// === Routing Table ===

/// What a projectile does on touching one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Damage the body (bullets) or detonate (bombs), then despawn.
    Hit,
    /// Despawn without effect.
    Absorb,
    /// Keep flying.
    PassThrough,
}

/// Bullet routing: enemies and phantoms take damage, the player absorbs,
/// towers take damage unless they fired it.
#[must_use]
pub fn route_bullet(source: Entity, other: Entity, roster: Roster) -> Contact {
    match roster {
        Roster::Enemy | Roster::Phantom => Contact::Hit,
        Roster::Player => Contact::Absorb,
        Roster::Tower if other == source => Contact::PassThrough,
        Roster::Tower => Contact::Hit,
    }
}

/// Bomb routing: any member of a victim roster detonates it, the player
/// absorbs, everything else is passed through.
#[must_use]
pub fn route_bomb(victims: &[Roster], roster: Roster) -> Contact {
    if victims.contains(&roster) {
        Contact::Hit
    } else if roster == Roster::Player {
        Contact::Absorb
    } else {
        Contact::PassThrough
    }
}

// === Systems ===

fn resolve_bullet_hits(
    bullets: Query<(Entity, &Bullet, &CollidingEntities)>,
    bodies: Query<&Roster>,
    mut damage: MessageWriter<Damage>,
    mut commands: Commands,
) {
    for (entity, bullet, colliding) in &bullets {
        for &other in colliding.iter() {
            let Ok(&roster) = bodies.get(other) else {
                continue;
            };
            match route_bullet(bullet.source, other, roster) {
                Contact::PassThrough => continue,
                Contact::Hit => {
                    damage.write(Damage {
                        target: other,
                        amount: bullet.damage,
                        source: DamageSource::Tower(bullet.source),
                    });
                }
                Contact::Absorb => {}
            }
            commands.entity(entity).despawn();
            break;
        }
    }
}

fn resolve_bomb_hits(
    bombs: Query<(Entity, &Transform, &Bomb, &CollidingEntities)>,
    bodies: Query<(Entity, &Transform, &Roster, Option<&Health>)>,
    mut damage: MessageWriter<Damage>,
    mut commands: Commands,
) {
    for (entity, transform, bomb, colliding) in &bombs {
        let contact = colliding
            .iter()
            .filter_map(|&other| bodies.get(other).ok())
            .map(|(_, _, &roster, _)| route_bomb(&bomb.victims, roster))
            .find(|contact| *contact != Contact::PassThrough);

        match contact {
            None | Some(Contact::PassThrough) => continue,
            Some(Contact::Absorb) => {}
            Some(Contact::Hit) => {
                let victims = explosion_victims(
                    transform.translation.truncate(),
                    bomb.radius,
                    bodies
                        .iter()
                        .filter(|(_, _, roster, health)| {
                            bomb.victims.contains(roster) && is_alive(*health)
                        })
                        .map(|(victim, position, ..)| (victim, position.translation.truncate())),
                );
                debug!("{entity} exploded, hitting {} targets", victims.len());
                damage.write_batch(victims.into_iter().map(|target| Damage {
                    target,
                    amount: bomb.damage,
                    source: DamageSource::Tower(bomb.source),
                }));
            }
        }
        commands.entity(entity).despawn();
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (resolve_bullet_hits, resolve_bomb_hits)
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two() -> (Entity, Entity) {
        let mut world = World::new();
        (world.spawn_empty().id(), world.spawn_empty().id())
    }

    #[test]
    fn bullets_hit_enemies_and_phantoms() {
        let (tower, other) = two();
        assert_eq!(route_bullet(tower, other, Roster::Enemy), Contact::Hit);
        assert_eq!(route_bullet(tower, other, Roster::Phantom), Contact::Hit);
    }

    #[test]
    fn player_absorbs_bullets() {
        let (tower, player) = two();
        assert_eq!(route_bullet(tower, player, Roster::Player), Contact::Absorb);
    }

    #[test]
    fn bullet_spares_its_own_tower_only() {
        let (tower, other_tower) = two();
        assert_eq!(
            route_bullet(tower, tower, Roster::Tower),
            Contact::PassThrough
        );
        assert_eq!(route_bullet(tower, other_tower, Roster::Tower), Contact::Hit);
    }

    #[test]
    fn bombs_detonate_on_victims_only() {
        let victims = [Roster::Enemy, Roster::Phantom];
        assert_eq!(route_bomb(&victims, Roster::Enemy), Contact::Hit);
        assert_eq!(route_bomb(&victims, Roster::Phantom), Contact::Hit);
        assert_eq!(route_bomb(&victims, Roster::Tower), Contact::PassThrough);
        assert_eq!(route_bomb(&victims, Roster::Player), Contact::Absorb);
        assert_eq!(route_bomb(&[Roster::Enemy], Roster::Phantom), Contact::PassThrough);
    }
}
