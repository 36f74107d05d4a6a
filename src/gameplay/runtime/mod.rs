//! Actor runtime: identity, rosters, behaviour toggles and the per-tick
//! isolation boundary.
//!
//! An actor is any in-world entity carrying a [`Roster`] tag. Behaviours are
//! ordinary components; capability queries are plain `Query::get` lookups,
//! which fail closed when the capability is absent.

pub mod schedule;

use bevy::prelude::*;
use thiserror::Error;

// === Identity ===

/// Strictly unique, monotonically assigned actor identity.
///
/// Unlike `Entity`, an `ActorId` is never recycled, so it is safe to use as a
/// long-lived map key (e.g. the source of a speed modifier).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
#[reflect(Component)]
pub struct ActorId(pub u64);

/// Allocator for [`ActorId`]. Never reset, not even between runs.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct ActorIds {
    last: u64,
}

impl ActorIds {
    /// Hand out the next id.
    pub const fn allocate(&mut self) -> ActorId {
        self.last += 1;
        ActorId(self.last)
    }
}

/// The tracked collection an actor belongs to. Targeting pools, bomb victim
/// lists and overlap routing are all expressed in rosters.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Roster {
    /// Ordinary path-walking enemies.
    Enemy,
    /// Special enemies that deactivate towers.
    Phantom,
    /// Player-built towers.
    Tower,
    /// The player avatar.
    Player,
}

impl Roster {
    /// Rosters whose members walk the level paths.
    pub const MOVERS: &[Self] = &[Self::Enemy, Self::Phantom];
}

// === Behaviours ===

/// A behaviour component with an enabled flag. The per-frame tick of a
/// disabled behaviour is skipped.
pub trait Behaviour {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

/// Attach/hot-swap helpers for behaviours.
pub trait ActorCommandsExt {
    /// Attach `component` unless one of the same type is already attached.
    /// `On<Add, C>` observers act as the on-attach hook and run once.
    fn attach<C: Component>(&mut self, component: C) -> &mut Self;

    /// Replace any attached `C`: the old one is removed first (running its
    /// `On<Remove, C>` teardown), then `component` is attached.
    fn attach_overriding<C: Component>(&mut self, component: C) -> &mut Self;
}

impl ActorCommandsExt for EntityCommands<'_> {
    fn attach<C: Component>(&mut self, component: C) -> &mut Self {
        self.insert_if_new(component)
    }

    fn attach_overriding<C: Component>(&mut self, component: C) -> &mut Self {
        self.remove::<C>().insert(component)
    }
}

// === Errors ===

/// Failure of a single behaviour during a single frame. Never fatal: see [`isolate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickError {
    #[error("path has zero length")]
    DegeneratePath,
    #[error("target {target} sits exactly on the attacker, no aim direction")]
    DegenerateAim { target: Entity },
    #[error("{entity} lacks the `{capability}` capability")]
    MissingCapability {
        entity: Entity,
        capability: &'static str,
    },
}

/// Construction-order bug detected when a behaviour is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("{entity}: `{component}` requires `{collaborator}` on the same entity")]
    MissingCollaborator {
        entity: Entity,
        component: &'static str,
        collaborator: &'static str,
    },
}

/// Per-tick isolation boundary: a failed behaviour tick is logged and
/// discarded so sibling behaviours and other entities still run this frame.
pub fn isolate(entity: Entity, behaviour: &'static str, result: Result<(), TickError>) {
    if let Err(error) = result {
        warn!("{behaviour} on {entity} skipped this frame: {error}");
    }
}

// === Observers ===

/// Joining a roster makes an entity an actor: give it an id.
fn assign_actor_id(add: On<Add, Roster>, mut ids: ResMut<ActorIds>, mut commands: Commands) {
    let id = ids.allocate();
    commands.entity(add.entity).insert_if_new(id);
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ActorId>()
        .register_type::<ActorIds>()
        .register_type::<Roster>()
        .init_resource::<ActorIds>();

    app.add_observer(assign_actor_id);
}
