//! Timed, optionally repeating message delivery tied to an owner's lifetime.
//!
//! Every scheduled item is a child entity of its owner carrying a
//! [`Delayed<M>`]. Despawning the owner despawns the item, so nothing fires
//! against torn-down state.

use std::time::Duration;

use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

// === Components ===

/// A pending message `M`, written when `timer` finishes.
#[derive(Component, Debug)]
pub struct Delayed<M: Message + Clone> {
    timer: Timer,
    /// Remaining deliveries. `None` repeats until cancelled.
    repeats_left: Option<u32>,
    message: M,
}

impl<M: Message + Clone> Delayed<M> {
    pub fn once(delay: Duration, message: M) -> Self {
        Self {
            timer: Timer::new(delay, TimerMode::Once),
            repeats_left: Some(1),
            message,
        }
    }

    pub fn repeating(interval: Duration, repeats: Option<u32>, message: M) -> Self {
        Self {
            timer: Timer::new(interval, TimerMode::Repeating),
            repeats_left: repeats,
            message,
        }
    }

    #[must_use]
    pub const fn exhausted(&self) -> bool {
        matches!(self.repeats_left, Some(0))
    }
}

// === Commands ===

pub trait ScheduleExt {
    /// Deliver `message` once after `delay`. Returns the cancellation handle.
    fn schedule<M: Message + Clone>(&mut self, owner: Entity, delay: Duration, message: M)
    -> Entity;

    /// Deliver `message` every `interval`, `repeats` times (`None` = until cancelled).
    fn schedule_repeating<M: Message + Clone>(
        &mut self,
        owner: Entity,
        interval: Duration,
        repeats: Option<u32>,
        message: M,
    ) -> Entity;

    /// Drop a pending item before it fires. Items are also torn down with
    /// their owner. Cancelling an already-fired handle is a no-op.
    fn cancel(&mut self, handle: Entity);
}

impl ScheduleExt for Commands<'_, '_> {
    fn schedule<M: Message + Clone>(
        &mut self,
        owner: Entity,
        delay: Duration,
        message: M,
    ) -> Entity {
        self.spawn((
            Name::new("Delayed"),
            Delayed::once(delay, message),
            ChildOf(owner),
        ))
        .id()
    }

    fn schedule_repeating<M: Message + Clone>(
        &mut self,
        owner: Entity,
        interval: Duration,
        repeats: Option<u32>,
        message: M,
    ) -> Entity {
        self.spawn((
            Name::new("Delayed (repeating)"),
            Delayed::repeating(interval, repeats, message),
            ChildOf(owner),
        ))
        .id()
    }

    fn cancel(&mut self, handle: Entity) {
        if let Ok(mut entity) = self.get_entity(handle) {
            entity.try_despawn();
        }
    }
}

// === Systems ===

/// Ticks every pending `Delayed<M>` and writes its message for each
/// completed period. A long frame can complete several periods at once.
pub fn fire_delayed<M: Message + Clone>(
    time: Res<Time>,
    mut pending: Query<(Entity, &mut Delayed<M>)>,
    mut writer: MessageWriter<M>,
    mut commands: Commands,
) {
    for (entity, mut item) in &mut pending {
        item.timer.tick(time.delta());

        for _ in 0..item.timer.times_finished_this_tick() {
            if item.exhausted() {
                break;
            }
            writer.write(item.message.clone());
            if let Some(left) = item.repeats_left.as_mut() {
                *left -= 1;
            }
        }

        if item.exhausted() {
            commands.entity(entity).despawn();
        }
    }
}

// === Plugin ===

/// Register scheduling for message type `M`.
pub fn plugin<M: Message + Clone>(app: &mut App) {
    app.add_message::<M>();
    app.add_systems(
        Update,
        fire_delayed::<M>
            .in_set(GameSet::Spawn)
            .run_if(gameplay_running),
    );
}
