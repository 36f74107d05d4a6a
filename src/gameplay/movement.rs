//! Parametric path following with per-source speed modifiers.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::gameplay::runtime::{ActorId, Behaviour, TickError, isolate};
use crate::gameplay::waves::WaveManager;
use crate::{GameSet, gameplay_running};

// === Path ===

/// A fixed polyline with precomputed arc length.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Polyline {
    points: Vec<Vec2>,
    length: f32,
}

impl Polyline {
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        let length = points.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
        Self { points, length }
    }

    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Position at fractional `progress` (clamped to `0..=1`) by arc length.
    #[must_use]
    pub fn point_at(&self, progress: f32) -> Vec2 {
        let Some(&first) = self.points.first() else {
            return Vec2::ZERO;
        };
        let mut remaining = progress.clamp(0.0, 1.0) * self.length;
        for pair in self.points.windows(2) {
            let segment = pair[0].distance(pair[1]);
            if remaining <= segment && segment > 0.0 {
                return pair[0].lerp(pair[1], remaining / segment);
            }
            remaining -= segment;
        }
        self.points.last().copied().unwrap_or(first)
    }
}

// === Components ===

/// Walks a [`Polyline`] at `base_speed` scaled by the strongest active slow.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PathFollower {
    pub path: Polyline,
    /// Fraction of the path covered, `0..=1`.
    pub progress: f32,
    pub base_speed: f32,
    /// Slow multipliers in `(0, 1]`, keyed by the actor applying them.
    modifiers: HashMap<ActorId, f32>,
    pub enabled: bool,
}

impl PathFollower {
    #[must_use]
    pub fn new(path: Polyline, base_speed: f32) -> Self {
        Self {
            path,
            progress: 0.0,
            base_speed,
            modifiers: HashMap::default(),
            enabled: true,
        }
    }

    pub fn apply_modifier(&mut self, source: ActorId, multiplier: f32) {
        self.modifiers
            .insert(source, multiplier.clamp(f32::EPSILON, 1.0));
    }

    pub fn remove_modifier(&mut self, source: ActorId) {
        self.modifiers.remove(&source);
    }

    #[must_use]
    pub fn has_modifier(&self, source: ActorId) -> bool {
        self.modifiers.contains_key(&source)
    }

    /// Strongest slow wins; slows never stack.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.modifiers.values().copied().fold(1.0, f32::min)
    }

    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier()
    }

    /// Advance by `delta_secs`. Returns `true` when the end is reached.
    pub fn advance(&mut self, delta_secs: f32) -> Result<bool, TickError> {
        if self.path.length() <= 0.0 {
            return Err(TickError::DegeneratePath);
        }
        self.progress += self.effective_speed() * delta_secs / self.path.length();
        if self.progress >= 1.0 {
            self.progress = 1.0;
            return Ok(true);
        }
        Ok(false)
    }
}

impl Behaviour for PathFollower {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Damage dealt to the nexus when this mover reaches its path end.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Breach(pub f32);

// === Messages ===

/// A mover finished its path. It is despawned the same frame.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ReachedEnd {
    pub entity: Entity,
    pub breach: f32,
}

// === Systems ===

/// Advances every enabled follower unless the wave manager is paused.
fn follow_paths(
    time: Res<Time>,
    manager: Res<WaveManager>,
    mut movers: Query<(Entity, &mut PathFollower, &mut Transform, Option<&Breach>)>,
    mut reached: MessageWriter<ReachedEnd>,
    mut commands: Commands,
) {
    if !manager.enabled {
        return;
    }
    let delta = time.delta_secs();
    for (entity, mut follower, mut transform, breach) in &mut movers {
        if !follower.is_enabled() {
            continue;
        }
        let finished = match follower.advance(delta) {
            Ok(finished) => finished,
            Err(error) => {
                isolate(entity, "PathFollower", Err(error));
                continue;
            }
        };
        let position = follower.path.point_at(follower.progress);
        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if finished {
            reached.write(ReachedEnd {
                entity,
                breach: breach.map_or(0.0, |breach| breach.0),
            });
            commands.entity(entity).despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<PathFollower>()
        .register_type::<Breach>()
        .add_message::<ReachedEnd>();

    app.add_systems(
        Update,
        follow_paths
            .in_set(GameSet::Movement)
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn straight(length: f32) -> Polyline {
        Polyline::new(vec![Vec2::ZERO, Vec2::new(length, 0.0)])
    }

    #[test]
    fn polyline_length_sums_segments() {
        let path = Polyline::new(vec![Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::new(3.0, 4.0)]);
        assert_eq!(path.length(), 7.0);
    }

    #[test]
    fn point_at_walks_by_arc_length() {
        let path = Polyline::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)]);
        assert_eq!(path.point_at(0.0), Vec2::ZERO);
        assert_eq!(path.point_at(0.25), Vec2::new(5.0, 0.0));
        assert_eq!(path.point_at(0.75), Vec2::new(10.0, 5.0));
        assert_eq!(path.point_at(1.0), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn strongest_modifier_wins() {
        let mut follower = PathFollower::new(straight(100.0), 10.0);
        follower.apply_modifier(ActorId(1), 0.5);
        follower.apply_modifier(ActorId(2), 0.3);
        assert_eq!(follower.speed_multiplier(), 0.3);

        follower.remove_modifier(ActorId(2));
        assert_eq!(follower.speed_multiplier(), 0.5);

        follower.remove_modifier(ActorId(1));
        assert_eq!(follower.speed_multiplier(), 1.0);
    }

    #[test]
    fn modifiers_above_one_do_not_speed_up() {
        let mut follower = PathFollower::new(straight(100.0), 10.0);
        follower.apply_modifier(ActorId(1), 2.0);
        assert_eq!(follower.effective_speed(), 10.0);
    }

    #[test]
    fn reapplying_same_source_overwrites() {
        let mut follower = PathFollower::new(straight(100.0), 10.0);
        follower.apply_modifier(ActorId(1), 0.2);
        follower.apply_modifier(ActorId(1), 0.6);
        assert_eq!(follower.speed_multiplier(), 0.6);
    }

    #[test]
    fn advance_clamps_at_end() {
        let mut follower = PathFollower::new(straight(10.0), 10.0);
        assert_eq!(follower.advance(2.0), Ok(true));
        assert_eq!(follower.progress, 1.0);
    }

    #[test]
    fn zero_length_path_is_a_tick_error() {
        let mut follower = PathFollower::new(Polyline::new(vec![Vec2::ONE]), 10.0);
        assert_eq!(follower.advance(0.1), Err(TickError::DegeneratePath));
    }
}

#[cfg(test)]
mod integration_tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{assert_entity_count, record, recorded, tick_multiple, use_manual_time};

    fn create_movement_test_app() -> App {
        let mut app = crate::testing::create_test_app();
        app.init_resource::<WaveManager>();
        record::<ReachedEnd>(&mut app);
        app.add_systems(Update, follow_paths);
        use_manual_time(&mut app, Duration::from_millis(100));
        app
    }

    fn spawn_follower(app: &mut App, length: f32, speed: f32) -> Entity {
        let path = Polyline::new(vec![Vec2::ZERO, Vec2::new(length, 0.0)]);
        app.world_mut()
            .spawn((
                PathFollower::new(path, speed),
                Transform::default(),
                Breach(2.0),
            ))
            .id()
    }

    fn progress(app: &App, entity: Entity) -> f32 {
        app.world().get::<PathFollower>(entity).unwrap().progress
    }

    #[test]
    fn one_second_at_speed_ten_covers_a_tenth_of_a_hundred_unit_path() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 100.0, 10.0);

        tick_multiple(&mut app, 10);

        assert!((progress(&app, enemy) - 0.1).abs() < 1e-4);
        assert!(recorded::<ReachedEnd>(&app).is_empty());
    }

    #[test]
    fn one_second_at_speed_one_covers_a_tenth_of_a_ten_unit_path() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 10.0, 1.0);

        tick_multiple(&mut app, 10);

        assert!((progress(&app, enemy) - 0.1).abs() < 1e-4);
        assert!(recorded::<ReachedEnd>(&app).is_empty());
    }

    #[test]
    fn transform_tracks_progress() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 100.0, 50.0);

        tick_multiple(&mut app, 2);

        let x = app.world().get::<Transform>(enemy).unwrap().translation.x;
        assert!((x - 10.0).abs() < 1e-3);
    }

    #[test]
    fn slowed_follower_moves_at_strongest_slow() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 100.0, 10.0);
        {
            let mut follower = app.world_mut().get_mut::<PathFollower>(enemy).unwrap();
            follower.apply_modifier(ActorId(1), 0.5);
            follower.apply_modifier(ActorId(2), 0.3);
        }

        tick_multiple(&mut app, 10);

        assert!((progress(&app, enemy) - 0.03).abs() < 1e-4);
    }

    #[test]
    fn reaching_the_end_emits_and_despawns() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 10.0, 100.0);

        app.update();

        assert_eq!(
            recorded::<ReachedEnd>(&app),
            &[ReachedEnd {
                entity: enemy,
                breach: 2.0
            }]
        );
        assert_entity_count::<With<PathFollower>>(&mut app, 0);
    }

    #[test]
    fn paused_wave_manager_freezes_progress() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 100.0, 10.0);
        app.world_mut().resource_mut::<WaveManager>().enabled = false;

        tick_multiple(&mut app, 5);
        assert_eq!(progress(&app, enemy), 0.0);

        app.world_mut().resource_mut::<WaveManager>().enabled = true;
        tick_multiple(&mut app, 5);
        assert!(progress(&app, enemy) > 0.0);
    }

    #[test]
    fn disabled_follower_stays_put() {
        let mut app = create_movement_test_app();
        let enemy = spawn_follower(&mut app, 100.0, 10.0);
        app.world_mut()
            .get_mut::<PathFollower>(enemy)
            .unwrap()
            .set_enabled(false);

        tick_multiple(&mut app, 5);

        assert_eq!(progress(&app, enemy), 0.0);
    }

    #[test]
    fn degenerate_path_does_not_stop_other_followers() {
        let mut app = create_movement_test_app();
        app.world_mut().spawn((
            PathFollower::new(Polyline::new(vec![Vec2::ONE, Vec2::ONE]), 10.0),
            Transform::default(),
        ));
        let healthy = spawn_follower(&mut app, 100.0, 10.0);

        tick_multiple(&mut app, 3);

        assert!(progress(&app, healthy) > 0.0);
    }
}
