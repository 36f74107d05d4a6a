//! Wave lifecycle: declarative spawn batches, progress accounting,
//! completion, level outcome and game over.

use std::time::Duration;

use bevy::prelude::*;

use crate::gameplay::enemies::{SpawnEnemy, Species, species_stats};
use crate::gameplay::movement::Polyline;
use crate::gameplay::run_state::RunState;
use crate::gameplay::runtime::schedule::{self, ScheduleExt};
use crate::screens::{GameState, InGameState};
use crate::theme::palette;
use crate::{GameSet, Z_PATH, gameplay_running};

// === Constants ===

/// Delay between entering the level and the first wave.
pub const FIRST_WAVE_DELAY: Duration = Duration::from_secs(3);

/// Pause between a completed wave and the next one.
pub const INTERMISSION: Duration = Duration::from_secs(5);

/// Real-time delay between a terminal outcome and the outcome screen.
pub const OUTCOME_DELAY: Duration = Duration::from_secs(2);

/// Extra spawned health per wave index (wave 0 is unscaled).
pub const HEALTH_GROWTH_PER_WAVE: f32 = 0.15;

/// Drawn width of a path lane (pixels).
const LANE_WIDTH: f32 = 28.0;

/// Drawn size of the nexus (pixels).
const NEXUS_SIZE: f32 = 48.0;

// === Configuration ===

/// `count` spawns of one species, one every `delay`.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct SpawnBatch {
    pub species: Species,
    pub count: u32,
    pub delay: Duration,
    pub health: f32,
    pub speed: f32,
    pub reward: u32,
}

impl SpawnBatch {
    /// A batch using the species' base stats.
    #[must_use]
    pub const fn of(species: Species, count: u32, delay: Duration) -> Self {
        let stats = species_stats(species);
        Self {
            species,
            count,
            delay,
            health: stats.health,
            speed: stats.speed,
            reward: stats.reward,
        }
    }
}

/// Ordered waves of the current level. An empty or missing wave ends it.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct WaveTable(pub Vec<Vec<SpawnBatch>>);

impl WaveTable {
    /// The batches of wave `index`, if that wave has any.
    #[must_use]
    pub fn wave(&self, index: usize) -> Option<&[SpawnBatch]> {
        self.0
            .get(index)
            .map(Vec::as_slice)
            .filter(|batches| batches.iter().any(|batch| batch.count > 0))
    }

    /// Number of waves in the level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for WaveTable {
    fn default() -> Self {
        let secs = Duration::from_secs_f32;
        Self(vec![
            vec![SpawnBatch::of(Species::Grunt, 6, secs(1.2))],
            vec![
                SpawnBatch::of(Species::Grunt, 8, secs(1.0)),
                SpawnBatch::of(Species::Runner, 4, secs(2.0)),
            ],
            vec![
                SpawnBatch::of(Species::Runner, 6, secs(0.8)),
                SpawnBatch::of(Species::Phantom, 1, secs(6.0)),
            ],
            vec![
                SpawnBatch::of(Species::Brute, 4, secs(2.5)),
                SpawnBatch::of(Species::Grunt, 10, secs(0.9)),
                SpawnBatch::of(Species::Phantom, 2, secs(7.0)),
            ],
        ])
    }
}

/// Geometry of the current level.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct LevelLayout {
    /// Enemy lanes; each ends at the nexus.
    pub lanes: Vec<Polyline>,
    pub nexus: Vec2,
    pub player_spawn: Vec2,
}

impl Default for LevelLayout {
    fn default() -> Self {
        let nexus = Vec2::new(560.0, 0.0);
        Self {
            lanes: vec![
                Polyline::new(vec![
                    Vec2::new(-640.0, 220.0),
                    Vec2::new(-240.0, 220.0),
                    Vec2::new(-240.0, 60.0),
                    Vec2::new(300.0, 60.0),
                    nexus,
                ]),
                Polyline::new(vec![
                    Vec2::new(-640.0, -220.0),
                    Vec2::new(0.0, -220.0),
                    Vec2::new(0.0, -60.0),
                    Vec2::new(300.0, -60.0),
                    nexus,
                ]),
            ],
            nexus,
            player_spawn: Vec2::new(-120.0, 0.0),
        }
    }
}

// === Resources ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum WavePhase {
    /// Waiting for the first wave.
    #[default]
    Idle,
    Spawning,
    Intermission,
    /// Level complete or lost; nothing more is scheduled.
    Finished,
}

/// Wave bookkeeping that is not part of [`RunState`].
#[derive(Resource, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct WaveManager {
    /// Cleared to pause every path follower without touching progress.
    pub enabled: bool,
    pub phase: WavePhase,
    /// Handle of the scheduled [`StartWave`], if one is pending.
    pub next_start: Option<Entity>,
}

impl Default for WaveManager {
    fn default() -> Self {
        Self {
            enabled: true,
            phase: WavePhase::Idle,
            next_start: None,
        }
    }
}

/// Outcome screen to show once the real-time delay elapses.
#[derive(Resource, Debug, Clone)]
pub struct PendingOutcome {
    pub timer: Timer,
    pub outcome: GameState,
}

// === Components ===

/// Root of the level's world entities and owner of wave timers.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LevelRoot;

// === Messages ===

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartWave {
    pub index: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveCompleted {
    pub index: usize,
}

// === Helpers ===

/// Spawned health for a batch in wave `index`.
#[must_use]
pub fn scaled_health(base: f32, index: usize) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let index = index as f32;
    base * HEALTH_GROWTH_PER_WAVE.mul_add(index, 1.0)
}

fn lane_segment(from: Vec2, to: Vec2) -> impl Bundle {
    let delta = to - from;
    let midpoint = from.midpoint(to);
    (
        Name::new("Lane Segment"),
        Sprite::from_color(
            palette::PATH_LANE,
            Vec2::new(delta.length() + LANE_WIDTH, LANE_WIDTH),
        ),
        Transform::from_xyz(midpoint.x, midpoint.y, Z_PATH)
            .with_rotation(Quat::from_rotation_z(delta.to_angle())),
    )
}

// === Systems ===

fn setup_level(
    layout: Res<LevelLayout>,
    mut manager: ResMut<WaveManager>,
    mut commands: Commands,
) {
    *manager = WaveManager::default();
    commands.remove_resource::<PendingOutcome>();

    let level = commands
        .spawn((
            Name::new("Level"),
            LevelRoot,
            Transform::default(),
            Visibility::default(),
            DespawnOnExit(GameState::InGame),
        ))
        .with_children(|parent| {
            for lane in &layout.lanes {
                for pair in lane.points().windows(2) {
                    parent.spawn(lane_segment(pair[0], pair[1]));
                }
            }
            parent.spawn((
                Name::new("Nexus"),
                Sprite::from_color(palette::NEXUS, Vec2::splat(NEXUS_SIZE)),
                Transform::from_xyz(layout.nexus.x, layout.nexus.y, Z_PATH + 0.5),
            ));
        })
        .id();

    let first = commands.schedule(level, FIRST_WAVE_DELAY, StartWave { index: 0 });
    manager.next_start = Some(first);
}

/// Starts a wave: resets per-wave counters and schedules every spawn.
/// Unit `i` of a batch spawns `(i + 1) * delay` after the start.
fn start_wave(
    mut requests: MessageReader<StartWave>,
    table: Res<WaveTable>,
    level: Single<Entity, With<LevelRoot>>,
    mut run: ResMut<RunState>,
    mut manager: ResMut<WaveManager>,
    mut commands: Commands,
) {
    for request in requests.read() {
        if manager.phase == WavePhase::Finished {
            continue;
        }
        let Some(batches) = table.wave(request.index) else {
            continue;
        };

        let total = batches.iter().map(|batch| batch.count).sum();
        run.current_wave = request.index;
        run.begin_wave(total);
        manager.phase = WavePhase::Spawning;
        manager.next_start = None;

        for batch in batches {
            for unit in 1..=batch.count {
                commands.schedule(
                    *level,
                    batch.delay * unit,
                    SpawnEnemy {
                        species: batch.species,
                        health: scaled_health(batch.health, request.index),
                        speed: batch.speed,
                        reward: batch.reward,
                    },
                );
            }
        }
        info!("Wave {} started: {total} enemies", request.index + 1);
    }
}

fn check_game_over(
    run: Res<RunState>,
    mut manager: ResMut<WaveManager>,
    mut phase: ResMut<NextState<InGameState>>,
    mut commands: Commands,
) {
    if manager.phase == WavePhase::Finished || !run.nexus_destroyed() {
        return;
    }
    manager.phase = WavePhase::Finished;
    if let Some(pending) = manager.next_start.take() {
        commands.cancel(pending);
    }
    phase.set(InGameState::Frozen);
    commands.insert_resource(PendingOutcome {
        timer: Timer::new(OUTCOME_DELAY, TimerMode::Once),
        outcome: GameState::GameOver,
    });
    info!("Nexus destroyed on wave {}", run.current_wave + 1);
}

fn check_wave_progress(
    run: Res<RunState>,
    table: Res<WaveTable>,
    level: Single<Entity, With<LevelRoot>>,
    mut manager: ResMut<WaveManager>,
    mut completed: MessageWriter<WaveCompleted>,
    mut phase: ResMut<NextState<InGameState>>,
    mut commands: Commands,
) {
    if manager.phase != WavePhase::Spawning || !run.wave_complete() {
        return;
    }
    let index = run.current_wave;
    completed.write(WaveCompleted { index });
    info!("Wave {} completed", index + 1);

    let next = index + 1;
    if table.wave(next).is_none() {
        manager.phase = WavePhase::Finished;
        phase.set(InGameState::Frozen);
        commands.insert_resource(PendingOutcome {
            timer: Timer::new(OUTCOME_DELAY, TimerMode::Once),
            outcome: GameState::LevelComplete,
        });
        info!("Level complete");
        return;
    }
    manager.phase = WavePhase::Intermission;
    let pending = commands.schedule(*level, INTERMISSION, StartWave { index: next });
    manager.next_start = Some(pending);
}

/// Runs while frozen, on real time, since virtual time is paused.
fn count_down_outcome(
    time: Res<Time<Real>>,
    pending: Option<ResMut<PendingOutcome>>,
    mut state: ResMut<NextState<GameState>>,
    mut commands: Commands,
) {
    let Some(mut pending) = pending else {
        return;
    };
    pending.timer.tick(time.delta());
    if pending.timer.just_finished() {
        state.set(pending.outcome);
        commands.remove_resource::<PendingOutcome>();
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<WaveTable>()
        .register_type::<LevelLayout>()
        .register_type::<WaveManager>()
        .register_type::<LevelRoot>()
        .init_resource::<WaveTable>()
        .init_resource::<LevelLayout>()
        .init_resource::<WaveManager>()
        .add_message::<WaveCompleted>();

    schedule::plugin::<StartWave>(app);

    app.add_systems(OnEnter(GameState::InGame), setup_level);

    app.add_systems(
        Update,
        start_wave
            .in_set(GameSet::Spawn)
            .after(schedule::fire_delayed::<StartWave>)
            .run_if(gameplay_running),
    );
    app.add_systems(
        Update,
        (check_game_over, check_wave_progress)
            .chain()
            .in_set(GameSet::Progress)
            .run_if(gameplay_running),
    );
    app.add_systems(
        Update,
        count_down_outcome.run_if(in_state(InGameState::Frozen)),
    );
}
