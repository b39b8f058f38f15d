//! Gold and life changes driven by the simulation: bounties, early calls, leaks.

use bevy::prelude::*;

use super::EARLY_CALL_GOLD_PER_SECOND;
use crate::gameplay::SimulationState;
use crate::gameplay::events::{LifeLossCause, SimEvent};

/// Pay the bounty for a kill.
pub fn award_bounty(state: &mut SimulationState, bounty: u32) {
    state.economy.earn(bounty);
}

/// Gold for skipping `remaining` seconds of the wave countdown.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn early_call_bonus(remaining: f32) -> u32 {
    (remaining.max(0.0) * EARLY_CALL_GOLD_PER_SECOND).floor() as u32
}

/// Remove lives, never going below zero. Nothing is reported when nothing is lost.
pub fn lose_lives(state: &mut SimulationState, amount: u32, cause: LifeLossCause) {
    let lost = amount.min(state.economy.lives);
    if lost == 0 {
        return;
    }
    state.economy.lives -= lost;
    info!(
        "Lost {lost} lives to {cause:?}, {} remaining",
        state.economy.lives
    );
    state.emit(SimEvent::LifeLost {
        amount: lost,
        remaining: state.economy.lives,
        cause,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::economy::Economy;
    use crate::gameplay::ids::EnemyId;
    use pretty_assertions::assert_eq;

    #[test]
    fn early_call_bonus_scales_with_time_left() {
        assert_eq!(early_call_bonus(10.0), 20);
        assert_eq!(early_call_bonus(2.4), 4);
        assert_eq!(early_call_bonus(-1.0), 0);
    }

    #[test]
    fn lives_never_go_negative() {
        let mut state = SimulationState {
            economy: Economy::new(0, 3),
            ..Default::default()
        };
        lose_lives(&mut state, 5, LifeLossCause::Leak(EnemyId(1)));
        assert_eq!(state.economy.lives, 0);
        assert_eq!(
            state.take_events(),
            vec![SimEvent::LifeLost {
                amount: 3,
                remaining: 0,
                cause: LifeLossCause::Leak(EnemyId(1)),
            }]
        );
    }

    #[test]
    fn no_event_once_lives_are_gone() {
        let mut state = SimulationState::default();
        lose_lives(&mut state, 2, LifeLossCause::Leak(EnemyId(4)));
        assert_eq!(state.economy.lives, 0);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn bounty_adds_gold() {
        let mut state = SimulationState::default();
        award_bounty(&mut state, 7);
        assert_eq!(state.economy.gold, 7);
    }
}
