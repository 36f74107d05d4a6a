//! Nearest-in-range acquisition for stationary attackers, and the
//! nearest-tower lookup used by phantoms and the player.

use bevy::prelude::*;

use crate::gameplay::health::{Health, is_alive};
use crate::gameplay::runtime::{Behaviour, Roster};
use crate::{GameSet, gameplay_running};

// === Components ===

/// Locks onto the nearest live member of `pool` within `range`.
/// Recomputed every frame; `target` may be a frame stale.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Targeting {
    pub range: f32,
    pub pool: Roster,
    pub target: Option<Entity>,
    pub enabled: bool,
}

impl Targeting {
    #[must_use]
    pub const fn new(range: f32, pool: Roster) -> Self {
        Self {
            range,
            pool,
            target: None,
            enabled: true,
        }
    }
}

impl Behaviour for Targeting {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Which towers a [`FindNearestTower`] considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum TowerFilter {
    /// Active or deactivated alike.
    Any,
    /// Only towers whose health is above zero.
    Active,
}

/// Tracks the nearest tower within `reach`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct FindNearestTower {
    pub reach: f32,
    pub filter: TowerFilter,
    pub nearest: Option<Entity>,
    pub enabled: bool,
}

impl FindNearestTower {
    #[must_use]
    pub const fn new(reach: f32, filter: TowerFilter) -> Self {
        Self {
            reach,
            filter,
            nearest: None,
            enabled: true,
        }
    }
}

impl Behaviour for FindNearestTower {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

// === Helpers ===

/// Nearest candidate within `range` of `origin` (inclusive).
/// Ties go to the first candidate encountered.
#[must_use]
pub fn nearest_in_range(
    origin: Vec2,
    range: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for (entity, position) in candidates {
        let distance = origin.distance(position);
        if distance > range {
            continue;
        }
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((entity, distance));
        }
    }
    best.map(|(entity, _)| entity)
}

// === Systems ===

/// Linear scan of every candidate for every seeker. A disabled seeker
/// drops its lock.
fn acquire_targets(
    mut seekers: Query<(&Transform, &mut Targeting)>,
    candidates: Query<(Entity, &Transform, &Roster, Option<&Health>)>,
) {
    for (transform, mut targeting) in &mut seekers {
        if !targeting.is_enabled() {
            if targeting.target.is_some() {
                targeting.target = None;
            }
            continue;
        }
        let origin = transform.translation.truncate();
        let pool = targeting.pool;
        let found = nearest_in_range(
            origin,
            targeting.range,
            candidates
                .iter()
                .filter(|(_, _, roster, health)| **roster == pool && is_alive(*health))
                .map(|(entity, position, ..)| (entity, position.translation.truncate())),
        );
        targeting.target = found;
    }
}

fn find_nearest_towers(
    mut seekers: Query<(&Transform, &mut FindNearestTower)>,
    towers: Query<(Entity, &Transform, &Roster, Option<&Health>)>,
) {
    for (transform, mut finder) in &mut seekers {
        if !finder.is_enabled() {
            if finder.nearest.is_some() {
                finder.nearest = None;
            }
            continue;
        }
        let origin = transform.translation.truncate();
        let filter = finder.filter;
        let found = nearest_in_range(
            origin,
            finder.reach,
            towers
                .iter()
                .filter(|(_, _, roster, health)| {
                    **roster == Roster::Tower
                        && (filter == TowerFilter::Any || is_alive(*health))
                })
                .map(|(entity, position, ..)| (entity, position.translation.truncate())),
        );
        finder.nearest = found;
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Targeting>()
        .register_type::<FindNearestTower>();

    app.add_systems(
        Update,
        (acquire_targets, find_nearest_towers)
            .in_set(GameSet::Ai)
            .run_if(gameplay_running),
    );
}
