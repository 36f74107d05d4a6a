//! Common imports for the entire crate.

pub use bevy::prelude::*;

pub use crate::gameplay::health::{Damage, DamageSource, Health};
pub use crate::gameplay::run_state::{Alert, RunState};
pub use crate::gameplay::runtime::{ActorCommandsExt, ActorId, Behaviour, Roster};
pub use crate::{GameSet, GameState, InGameState};
