//! Enemy species, spawning onto lanes, phantom deactivators, and the
//! bookkeeping for kills and breaches.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::prelude::*;
use rand::seq::IndexedRandom;

use crate::gameplay::health::{DamageSource, Died, Health};
use crate::gameplay::movement::{Breach, PathFollower, ReachedEnd};
use crate::gameplay::run_state::RunState;
use crate::gameplay::runtime::schedule::{self, ScheduleExt};
use crate::gameplay::runtime::{ActorCommandsExt, Behaviour, Roster, TickError, isolate};
use crate::gameplay::targeting::{FindNearestTower, TowerFilter};
use crate::gameplay::towers::DeactivateTower;
use crate::gameplay::waves::LevelLayout;
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::CollisionLayer;
use crate::{GameSet, Z_ENEMY, gameplay_running};

// === Constants ===

/// How often a phantom tries to deactivate a tower.
pub const DEACTIVATOR_INTERVAL: Duration = Duration::from_secs(4);

/// How close a tower must be for a phantom to deactivate it (pixels).
pub const DEACTIVATOR_REACH: f32 = 90.0;

// === Species ===

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Species {
    Grunt,
    Runner,
    Brute,
    /// Special enemy: deactivates towers, hunted by the player's ability.
    Phantom,
}

impl Species {
    pub const ALL: &[Self] = &[Self::Grunt, Self::Runner, Self::Brute, Self::Phantom];

    #[must_use]
    pub const fn roster(self) -> Roster {
        match self {
            Self::Phantom => Roster::Phantom,
            Self::Grunt | Self::Runner | Self::Brute => Roster::Enemy,
        }
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Grunt => palette::GRUNT,
            Self::Runner => palette::RUNNER,
            Self::Brute => palette::BRUTE,
            Self::Phantom => palette::PHANTOM,
        }
    }
}

/// Base stats for a species. Waves may override health, speed and reward.
#[derive(Debug, Clone, Copy)]
pub struct SpeciesStats {
    pub health: f32,
    pub speed: f32,
    pub reward: u32,
    /// Nexus damage on reaching the path end.
    pub breach: f32,
    pub radius: f32,
}

#[must_use]
pub const fn species_stats(species: Species) -> SpeciesStats {
    match species {
        Species::Grunt => SpeciesStats {
            health: 60.0,
            speed: 60.0,
            reward: 10,
            breach: 1.0,
            radius: 9.0,
        },
        Species::Runner => SpeciesStats {
            health: 35.0,
            speed: 110.0,
            reward: 12,
            breach: 1.0,
            radius: 7.0,
        },
        Species::Brute => SpeciesStats {
            health: 220.0,
            speed: 35.0,
            reward: 30,
            breach: 3.0,
            radius: 13.0,
        },
        Species::Phantom => SpeciesStats {
            health: 120.0,
            speed: 45.0,
            reward: 40,
            breach: 2.0,
            radius: 10.0,
        },
    }
}

// === Components ===

/// A walking enemy and the energy it is worth.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Enemy {
    pub species: Species,
    pub reward: u32,
}

/// Periodically asks for the nearest active tower in reach to be deactivated.
/// Requires a [`FindNearestTower`] on the same entity.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Deactivator {
    pub interval: Duration,
    pub enabled: bool,
}

impl Deactivator {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            enabled: true,
        }
    }
}

impl Behaviour for Deactivator {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// === Messages ===

/// Spawn one enemy on a random lane.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SpawnEnemy {
    pub species: Species,
    pub health: f32,
    pub speed: f32,
    pub reward: u32,
}

/// Deactivator tick for one phantom.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivatorPulse {
    pub source: Entity,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDied {
    pub entity: Entity,
    pub reward: u32,
}

/// A phantom fell to the player's resonance wave.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialEnemyKilledByPlayer {
    pub entity: Entity,
    pub reward: u32,
}

// === Systems ===

fn spawn_enemies(
    mut requests: MessageReader<SpawnEnemy>,
    layout: Res<LevelLayout>,
    mut run: ResMut<RunState>,
    mut commands: Commands,
) {
    let mut rng = rand::rng();
    for request in requests.read() {
        let Some(lane) = layout.lanes.choose(&mut rng) else {
            warn!("No lanes to spawn {:?} on", request.species);
            continue;
        };
        let stats = species_stats(request.species);
        let start = lane.point_at(0.0);

        let mut enemy = commands.spawn((
            Name::new(format!("{:?}", request.species)),
            Enemy {
                species: request.species,
                reward: request.reward,
            },
            request.species,
            request.species.roster(),
            Health::new(request.health),
            PathFollower::new(lane.clone(), request.speed),
            Breach(stats.breach),
            Sprite::from_color(request.species.color(), Vec2::splat(stats.radius * 2.0)),
            Transform::from_xyz(start.x, start.y, Z_ENEMY),
            DespawnOnExit(GameState::InGame),
            RigidBody::Kinematic,
            Collider::circle(stats.radius),
            CollisionLayer::body(),
        ));
        if request.species == Species::Phantom {
            enemy
                .attach(FindNearestTower::new(DEACTIVATOR_REACH, TowerFilter::Active))
                .attach(Deactivator::new(DEACTIVATOR_INTERVAL));
        }

        run.enemies_spawned += 1;
        debug!("Spawned {:?} ({} hp)", request.species, request.health);
    }
}

/// Attaching a deactivator arms its repeating timer, owned by the phantom.
fn arm_deactivator(
    add: On<Add, Deactivator>,
    deactivators: Query<&Deactivator>,
    mut commands: Commands,
) {
    let Ok(deactivator) = deactivators.get(add.entity) else {
        return;
    };
    commands.schedule_repeating(
        add.entity,
        deactivator.interval,
        None,
        DeactivatorPulse { source: add.entity },
    );
}

/// A disabled deactivator keeps its timer but its pulses do nothing.
fn pulse_deactivators(
    mut pulses: MessageReader<DeactivatorPulse>,
    deactivators: Query<(&Deactivator, Option<&FindNearestTower>)>,
    mut deactivate: MessageWriter<DeactivateTower>,
) {
    for pulse in pulses.read() {
        let Ok((deactivator, finder)) = deactivators.get(pulse.source) else {
            continue;
        };
        if !deactivator.is_enabled() {
            continue;
        }
        let Some(finder) = finder else {
            isolate(
                pulse.source,
                "Deactivator",
                Err(TickError::MissingCapability {
                    entity: pulse.source,
                    capability: "FindNearestTower",
                }),
            );
            continue;
        };
        if let Some(tower) = finder.nearest {
            deactivate.write(DeactivateTower { tower });
        }
    }
}

/// Kills pay out and leave the wave; phantoms killed by the player are
/// reported separately.
fn handle_enemy_deaths(
    mut deaths: MessageReader<Died>,
    enemies: Query<&Enemy>,
    mut run: ResMut<RunState>,
    mut killed: MessageWriter<EnemyDied>,
    mut hunted: MessageWriter<SpecialEnemyKilledByPlayer>,
    mut commands: Commands,
) {
    for death in deaths.read() {
        let Ok(enemy) = enemies.get(death.entity) else {
            continue;
        };
        run.enemy_gone();
        run.earn(enemy.reward);
        if enemy.species == Species::Phantom && death.source == DamageSource::Player {
            hunted.write(SpecialEnemyKilledByPlayer {
                entity: death.entity,
                reward: enemy.reward,
            });
        } else {
            killed.write(EnemyDied {
                entity: death.entity,
                reward: enemy.reward,
            });
        }
        commands.entity(death.entity).despawn();
    }
}

fn handle_breaches(mut arrivals: MessageReader<ReachedEnd>, mut run: ResMut<RunState>) {
    for arrival in arrivals.read() {
        run.enemy_gone();
        run.damage_nexus(arrival.breach);
        debug!("{} breached the nexus", arrival.entity);
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Enemy>()
        .register_type::<Species>()
        .register_type::<Deactivator>()
        .add_message::<EnemyDied>()
        .add_message::<SpecialEnemyKilledByPlayer>();

    schedule::plugin::<SpawnEnemy>(app);
    schedule::plugin::<DeactivatorPulse>(app);

    app.add_observer(arm_deactivator);

    app.add_systems(
        Update,
        (
            spawn_enemies
                .in_set(GameSet::Spawn)
                .after(schedule::fire_delayed::<SpawnEnemy>),
            pulse_deactivators
                .in_set(GameSet::Ai)
                .after(schedule::fire_delayed::<DeactivatorPulse>),
            (handle_enemy_deaths, handle_breaches).in_set(GameSet::Death),
        )
            .run_if(gameplay_running),
    );
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::gameplay::runtime::schedule::Delayed;
    use crate::testing::{assert_entity_count, record, recorded, use_manual_time};
    use pretty_assertions::assert_eq;

    fn create_enemy_test_app() -> App {
        let mut app = crate::testing::create_test_app();
        app.init_resource::<RunState>();
        app.init_resource::<LevelLayout>();
        app.add_message::<SpawnEnemy>();
        app.add_message::<Died>();
        app.add_message::<ReachedEnd>();
        record::<EnemyDied>(&mut app);
        record::<SpecialEnemyKilledByPlayer>(&mut app);
        record::<DeactivateTower>(&mut app);
        app.add_observer(arm_deactivator);
        app.add_systems(
            Update,
            (
                schedule::fire_delayed::<DeactivatorPulse>,
                spawn_enemies,
                pulse_deactivators,
                handle_enemy_deaths,
                handle_breaches,
            )
                .chain(),
        );
        app.add_message::<DeactivatorPulse>();
        use_manual_time(&mut app, Duration::from_millis(250));
        app
    }

    fn spawn(app: &mut App, species: Species) -> Entity {
        app.world_mut().write_message(SpawnEnemy {
            species,
            health: 50.0,
            speed: 40.0,
            reward: 15,
        });
        app.update();
        let mut query = app.world_mut().query_filtered::<(Entity, &Species), With<Enemy>>();
        query
            .iter(app.world())
            .filter(|(_, spawned)| **spawned == species)
            .map(|(entity, _)| entity)
            .last()
            .unwrap()
    }

    fn kill(app: &mut App, entity: Entity, source: DamageSource) {
        app.world_mut().write_message(Died { entity, source });
        app.update();
    }

    #[test]
    fn spawned_enemy_starts_on_a_lane_with_requested_stats() {
        let mut app = create_enemy_test_app();
        let enemy = spawn(&mut app, Species::Grunt);

        let layout = app.world().resource::<LevelLayout>().clone();
        let position = app.world().get::<Transform>(enemy).unwrap().translation.truncate();
        assert!(layout.lanes.iter().any(|lane| lane.point_at(0.0) == position));

        let follower = app.world().get::<PathFollower>(enemy).unwrap();
        assert_eq!(follower.base_speed, 40.0);
        assert_eq!(app.world().get::<Health>(enemy).unwrap().max(), 50.0);
        assert_eq!(app.world().get::<Roster>(enemy), Some(&Roster::Enemy));
        assert_eq!(app.world().resource::<RunState>().enemies_spawned, 1);
    }

    #[test]
    fn phantoms_carry_a_deactivator() {
        let mut app = create_enemy_test_app();
        let phantom = spawn(&mut app, Species::Phantom);

        assert_eq!(app.world().get::<Roster>(phantom), Some(&Roster::Phantom));
        assert!(app.world().get::<Deactivator>(phantom).is_some());
        assert!(app.world().get::<FindNearestTower>(phantom).is_some());
        assert_entity_count::<With<Delayed<DeactivatorPulse>>>(&mut app, 1);
    }

    #[test]
    fn deactivator_targets_nearest_active_tower_periodically() {
        let mut app = create_enemy_test_app();
        let phantom = spawn(&mut app, Species::Phantom);
        let tower = app.world_mut().spawn_empty().id();
        app.world_mut()
            .get_mut::<FindNearestTower>(phantom)
            .unwrap()
            .nearest = Some(tower);

        // 4s interval at 250ms per frame.
        crate::testing::tick_multiple(&mut app, 16);

        assert_eq!(recorded::<DeactivateTower>(&app), &[DeactivateTower { tower }]);
    }

    #[test]
    fn disabled_deactivator_sends_nothing() {
        let mut app = create_enemy_test_app();
        let phantom = spawn(&mut app, Species::Phantom);
        let tower = app.world_mut().spawn_empty().id();
        app.world_mut()
            .get_mut::<FindNearestTower>(phantom)
            .unwrap()
            .nearest = Some(tower);
        app.world_mut()
            .get_mut::<Deactivator>(phantom)
            .unwrap()
            .set_enabled(false);

        crate::testing::tick_multiple(&mut app, 16);

        assert!(recorded::<DeactivateTower>(&app).is_empty());
        assert_entity_count::<With<Delayed<DeactivatorPulse>>>(&mut app, 1);
    }

    #[test]
    fn deactivator_without_finder_skips_its_pulse() {
        let mut app = create_enemy_test_app();
        let phantom = spawn(&mut app, Species::Phantom);
        app.world_mut()
            .entity_mut(phantom)
            .remove::<FindNearestTower>();

        app.world_mut()
            .write_message(DeactivatorPulse { source: phantom });
        app.update();

        assert!(recorded::<DeactivateTower>(&app).is_empty());
        assert!(app.world().get::<Deactivator>(phantom).is_some());
    }

    #[test]
    fn deactivator_stops_with_its_phantom() {
        let mut app = create_enemy_test_app();
        let phantom = spawn(&mut app, Species::Phantom);
        app.world_mut().despawn(phantom);

        assert_entity_count::<With<Delayed<DeactivatorPulse>>>(&mut app, 0);
    }

    #[test]
    fn killing_an_enemy_pays_reward_and_despawns() {
        let mut app = create_enemy_test_app();
        let enemy = spawn(&mut app, Species::Grunt);
        app.world_mut().resource_mut::<RunState>().enemies_remaining = 3;
        let energy = app.world().resource::<RunState>().energy;

        let tower = app.world_mut().spawn_empty().id();
        kill(&mut app, enemy, DamageSource::Tower(tower));

        let run = app.world().resource::<RunState>();
        assert_eq!(run.energy, energy + 15);
        assert_eq!(run.enemies_remaining, 2);
        assert_eq!(
            recorded::<EnemyDied>(&app),
            &[EnemyDied {
                entity: enemy,
                reward: 15
            }]
        );
        assert!(app.world().get_entity(enemy).is_err());
    }

    #[test]
    fn phantom_killed_by_player_is_reported_as_special() {
        let mut app = create_enemy_test_app();
        let phantom = spawn(&mut app, Species::Phantom);

        kill(&mut app, phantom, DamageSource::Player);

        assert_eq!(
            recorded::<SpecialEnemyKilledByPlayer>(&app),
            &[SpecialEnemyKilledByPlayer {
                entity: phantom,
                reward: 15
            }]
        );
        assert!(recorded::<EnemyDied>(&app).is_empty());
    }

    #[test]
    fn dead_towers_are_not_enemy_deaths() {
        let mut app = create_enemy_test_app();
        let tower = app.world_mut().spawn(Roster::Tower).id();

        kill(&mut app, tower, DamageSource::Player);

        assert!(recorded::<EnemyDied>(&app).is_empty());
        assert!(app.world().get_entity(tower).is_ok());
    }

    #[test]
    fn breach_damages_nexus_and_leaves_wave() {
        let mut app = create_enemy_test_app();
        {
            let mut run = app.world_mut().resource_mut::<RunState>();
            run.enemies_remaining = 1;
        }
        let before = app.world().resource::<RunState>().nexus_health;
        let gone = app.world_mut().spawn_empty().id();

        app.world_mut().write_message(ReachedEnd {
            entity: gone,
            breach: 3.0,
        });
        app.update();

        let run = app.world().resource::<RunState>();
        assert_eq!(run.nexus_health, before - 3.0);
        assert_eq!(run.enemies_remaining, 0);
    }
}
