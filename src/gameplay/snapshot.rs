//! Read-only views of the simulation, and RON persistence of a whole level in flight.

use std::collections::BTreeSet;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::store::EntityStore;
use super::{Outcome, SimulationState};

/// What a renderer or HUD needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub now: f32,
    pub tick: u64,
    pub gold: u32,
    pub lives: u32,
    /// Waves completed so far.
    pub current_wave: u32,
    pub total_waves: u32,
    pub outcome: Outcome,
    /// Build slots that can no longer be built on.
    pub lost_slots: BTreeSet<usize>,
    pub store: EntityStore,
}

impl Snapshot {
    #[must_use]
    pub fn of(state: &SimulationState) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let total_waves = state.level.waves.len() as u32;
        Self {
            now: state.now,
            tick: state.tick,
            gold: state.economy.gold,
            lives: state.economy.lives,
            current_wave: state.waves.current_wave,
            total_waves,
            outcome: state.outcome,
            lost_slots: state.lost_slots.clone(),
            store: state.store.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write snapshot: {0}")]
    Serialize(#[from] ron::Error),
    #[error("failed to read snapshot: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

/// Serialize the full state, including pending spawns and the RNG position.
pub fn save_ron(state: &SimulationState) -> Result<String, SnapshotError> {
    Ok(ron::ser::to_string_pretty(state, PrettyConfig::default())?)
}

/// Restore a state written by [`save_ron`]. Ticking it reproduces the original run.
pub fn load_ron(text: &str) -> Result<SimulationState, SnapshotError> {
    Ok(ron::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::commands::place_tower;
    use crate::gameplay::level::LevelConfig;
    use crate::gameplay::spells::SpellKind;
    use crate::gameplay::tick::tick;
    use crate::gameplay::units::{HeroKind, TowerKind};
    use pretty_assertions::assert_eq;

    fn midgame() -> SimulationState {
        let mut state =
            SimulationState::start(LevelConfig::demo(), HeroKind::Ranger, &[SpellKind::Meteor]);
        let slot = state.level.build_slots[0].position;
        place_tower(&mut state, TowerKind::Archer, slot).unwrap();
        for _ in 0..250 {
            tick(&mut state, 0.1);
        }
        state
    }

    #[test]
    fn snapshot_mirrors_state() {
        let state = midgame();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.tick, 250);
        assert_eq!(snapshot.gold, state.economy.gold);
        assert_eq!(snapshot.total_waves, 4);
        assert_eq!(snapshot.store, state.store);
    }

    #[test]
    fn restored_state_replays_identically() {
        let mut original = midgame();
        let text = save_ron(&original).unwrap();
        let mut restored = load_ron(&text).unwrap();
        assert_eq!(restored, original);

        for _ in 0..100 {
            assert_eq!(tick(&mut restored, 0.1), tick(&mut original, 0.1));
        }
        assert_eq!(restored, original);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            load_ron("not a level"),
            Err(SnapshotError::Deserialize(_))
        ));
    }
}
