//! Endgame detection: lives exhausted means defeat, every wave cleared means victory.

use bevy::prelude::*;

use super::events::SimEvent;
use super::{Outcome, SimulationState};

/// Settle the outcome once per tick. Defeat is checked first; the first
/// terminal outcome sticks.
pub fn evaluate(state: &mut SimulationState) {
    if state.outcome != Outcome::InProgress {
        return;
    }

    if state.economy.lives == 0 {
        #[allow(clippy::cast_possible_truncation)]
        let total = state.level.waves.len() as u32;
        let wave_reached = (state.waves.current_wave + 1).min(total);
        state.waves.cancel();
        state.outcome = Outcome::Defeat;
        info!("Defeat on wave {wave_reached} after {:.1}s", state.now);
        state.emit(SimEvent::Defeat {
            wave_reached,
            time_spent: state.now,
        });
        return;
    }

    if state.waves.is_finished() && state.store.enemies.is_empty() {
        let stars = state.economy.stars();
        state.outcome = Outcome::Victory;
        info!("Victory with {stars} stars after {:.1}s", state.now);
        state.emit(SimEvent::Victory {
            stars,
            time_spent: state.now,
            lives_remaining: state.economy.lives,
        });
    }
}
