//! Map hazards: ground zones that burn or slow enemies standing in them.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::SimulationState;

/// How long a hazard's effect lingers after an enemy leaves the zone.
const HAZARD_LINGER: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardEffect {
    Ignite { damage_per_second: f32 },
    Mire { slow: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardZone {
    pub center: Vec2,
    pub radius: f32,
    pub effect: HazardEffect,
}

impl HazardZone {
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

/// Refresh hazard effects on every ground enemy inside a zone.
pub fn apply(state: &mut SimulationState) {
    let now = state.now;
    let zones = &state.level.hazards;
    for enemy in state.store.enemies.values_mut() {
        if enemy.is_flying() {
            continue;
        }
        for zone in zones.iter().filter(|z| z.contains(enemy.position)) {
            match zone.effect {
                HazardEffect::Ignite { damage_per_second } => {
                    enemy.status.ignite(damage_per_second, HAZARD_LINGER, now);
                }
                HazardEffect::Mire { slow } => {
                    enemy.status.apply_slow(slow, HAZARD_LINGER, now);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::ids::EnemyId;
    use crate::gameplay::path::PathKey;
    use crate::gameplay::units::{Enemy, EnemyKind};

    fn state_with(kind: EnemyKind, at: Vec2, effect: HazardEffect) -> SimulationState {
        let mut state = SimulationState::default();
        state.level.hazards.push(HazardZone {
            center: Vec2::ZERO,
            radius: 10.0,
            effect,
        });
        state.store.enemies.insert(
            EnemyId(1),
            Enemy::new(EnemyId(1), kind, PathKey::new("main"), 0.0, at),
        );
        state
    }

    #[test]
    fn ignites_ground_enemies_inside() {
        let mut state = state_with(
            EnemyKind::Grunt,
            Vec2::new(5.0, 0.0),
            HazardEffect::Ignite {
                damage_per_second: 4.0,
            },
        );
        apply(&mut state);
        assert!(state.store.enemies.get(EnemyId(1)).unwrap().status.burn.is_some());
    }

    #[test]
    fn ignores_enemies_outside_and_fliers() {
        let mut outside = state_with(
            EnemyKind::Grunt,
            Vec2::new(50.0, 0.0),
            HazardEffect::Mire { slow: 0.5 },
        );
        apply(&mut outside);
        assert!(outside.store.enemies.get(EnemyId(1)).unwrap().status.slow.is_none());

        let mut flier = state_with(EnemyKind::Bat, Vec2::ZERO, HazardEffect::Mire { slow: 0.5 });
        apply(&mut flier);
        assert!(flier.store.enemies.get(EnemyId(1)).unwrap().status.slow.is_none());
    }
}
