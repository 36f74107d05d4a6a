//! Health, damage requests and the alive-to-dead transition.

use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

// === Components ===

/// Hit points. `0 <= current <= max` always holds; `max` never changes.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    current: f32,
    max: f32,
}

/// What a single [`Health::take_damage`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead, or a non-positive amount.
    Ignored,
    Damaged,
    /// This call took the entity from alive to dead.
    Died,
}

impl Health {
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.current < self.max
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_dead() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0.0);
        if self.is_dead() {
            DamageOutcome::Died
        } else {
            DamageOutcome::Damaged
        }
    }

    /// Force to zero without a death notification (tower deactivation).
    pub const fn deplete(&mut self) {
        self.current = 0.0;
    }

    pub const fn restore(&mut self) {
        self.current = self.max;
    }
}

/// Alive, or without health at all. Dead entities are not valid targets.
#[must_use]
pub fn is_alive(health: Option<&Health>) -> bool {
    health.is_none_or(|health| !health.is_dead())
}

// === Messages ===

/// Who dealt a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum DamageSource {
    /// A projectile fired by this tower.
    Tower(Entity),
    /// The player's resonance wave.
    Player,
}

/// Request to reduce `target`'s health.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct Damage {
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
}

/// Health went down; carries the new value.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: f32,
}

/// Sent exactly once per entity, on the frame its health reaches zero.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Died {
    pub entity: Entity,
    pub source: DamageSource,
}

// === Systems ===

/// Applies every queued [`Damage`] in order. Requests against despawned or
/// health-less entities are dropped.
fn apply_damage(
    mut requests: MessageReader<Damage>,
    mut healths: Query<&mut Health>,
    mut changed: MessageWriter<HealthChanged>,
    mut died: MessageWriter<Died>,
) {
    for damage in requests.read() {
        let Ok(mut health) = healths.get_mut(damage.target) else {
            continue;
        };
        match health.take_damage(damage.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged => {
                changed.write(HealthChanged {
                    entity: damage.target,
                    current: health.current(),
                });
            }
            DamageOutcome::Died => {
                changed.write(HealthChanged {
                    entity: damage.target,
                    current: 0.0,
                });
                died.write(Died {
                    entity: damage.target,
                    source: damage.source,
                });
                debug!("{} died", damage.target);
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Health>()
        .add_message::<Damage>()
        .add_message::<HealthChanged>()
        .add_message::<Died>();

    app.add_systems(
        Update,
        apply_damage
            .in_set(GameSet::Damage)
            .run_if(gameplay_running),
    );
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::testing::{record, recorded};
    use pretty_assertions::assert_eq;

    fn create_damage_test_app() -> App {
        let mut app = crate::testing::create_test_app();
        app.add_message::<Damage>();
        record::<HealthChanged>(&mut app);
        record::<Died>(&mut app);
        app.add_systems(Update, apply_damage);
        app
    }

    fn hit(app: &mut App, target: Entity, amount: f32) {
        app.world_mut().write_message(Damage {
            target,
            amount,
            source: DamageSource::Player,
        });
    }

    #[test]
    fn damage_emits_health_changed() {
        let mut app = create_damage_test_app();
        let target = app.world_mut().spawn(Health::new(100.0)).id();

        hit(&mut app, target, 25.0);
        app.update();

        assert_eq!(
            recorded::<HealthChanged>(&app),
            &[HealthChanged {
                entity: target,
                current: 75.0
            }]
        );
        assert!(recorded::<Died>(&app).is_empty());
    }

    #[test]
    fn died_fires_once_across_frames() {
        let mut app = create_damage_test_app();
        let target = app.world_mut().spawn(Health::new(20.0)).id();

        hit(&mut app, target, 15.0);
        hit(&mut app, target, 15.0);
        hit(&mut app, target, 15.0);
        app.update();
        hit(&mut app, target, 15.0);
        app.update();

        assert_eq!(
            recorded::<Died>(&app),
            &[Died {
                entity: target,
                source: DamageSource::Player
            }]
        );
        assert_eq!(recorded::<HealthChanged>(&app).len(), 2);
    }

    #[test]
    fn damage_to_missing_entity_is_dropped() {
        let mut app = create_damage_test_app();
        let target = app.world_mut().spawn(Health::new(20.0)).id();
        app.world_mut().despawn(target);

        hit(&mut app, target, 5.0);
        app.update();

        assert!(recorded::<HealthChanged>(&app).is_empty());
    }
}
