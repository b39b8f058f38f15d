//! Common imports for the entire crate.

pub use bevy::prelude::*;

pub use crate::gameplay::commands::{CommandRejection, SimCommand};
pub use crate::gameplay::events::SimEvent;
pub use crate::gameplay::level::{LevelCatalog, LevelConfig};
pub use crate::gameplay::snapshot::Snapshot;
pub use crate::gameplay::spells::SpellKind;
pub use crate::gameplay::units::{HeroKind, TowerKind, TroopOwner, UpgradeChoice};
pub use crate::gameplay::{Outcome, SimSpeed, SimulationState};
pub use crate::{SimSet, simulation_running};
