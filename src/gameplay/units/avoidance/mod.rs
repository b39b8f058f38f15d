//! Separation: keep crowds of the same kind from stacking on one spot.
//!
//! Runs after movement. Walking enemies are spread sideways within their lane;
//! mobile troops are pushed apart in the plane and then pulled back inside
//! their leash. Pushes are computed from a snapshot and applied afterwards, so
//! the result does not depend on iteration order.

pub mod spatial_hash;

use bevy::math::Vec2;

use self::spatial_hash::SpatialHash;
use crate::gameplay::SimulationState;
use crate::gameplay::ids::{EnemyId, TroopId};
use crate::gameplay::units::{Enemy, EnemyState};
use crate::gameplay::waves::MAX_LANE_OFFSET;

// === Constants ===

/// Enemies closer than this push each other apart.
pub const ENEMY_SEPARATION: f32 = 12.0;
/// Troops closer than this push each other apart.
pub const TROOP_SEPARATION: f32 = 10.0;
/// Push speed, in world units per second, at a weight of 1.
const SEPARATION_SPEED: f32 = 20.0;
/// Caps the inverse-distance weight when two units nearly overlap.
const MAX_WEIGHT: f32 = 4.0;

pub fn separate(state: &mut SimulationState, dt: f32) {
    separate_enemies(state, dt);
    separate_troops(state, dt);
}

/// Sum of unit pushes away from each neighbor within `min_distance`, weighted
/// by `min_distance / d - 1`. Coincident neighbors contribute nothing.
#[must_use]
pub fn repulsion(
    position: Vec2,
    neighbors: impl IntoIterator<Item = Vec2>,
    min_distance: f32,
) -> Vec2 {
    neighbors.into_iter().fold(Vec2::ZERO, |acc, other| {
        let offset = position - other;
        let d = offset.length();
        if d >= min_distance || d <= f32::EPSILON {
            return acc;
        }
        acc + offset / d * (min_distance / d - 1.0).min(MAX_WEIGHT)
    })
}

/// Walking its lane, not halted and not on its way back from a taunt.
fn on_lane(enemy: &Enemy) -> bool {
    enemy.state == EnemyState::PathFollowing && !enemy.rejoining
}

fn separate_enemies(state: &mut SimulationState, dt: f32) {
    let mut hash = SpatialHash::new(ENEMY_SEPARATION * 2.0);
    for (id, enemy) in state.store.enemies.iter() {
        if on_lane(enemy) {
            hash.insert(id, enemy.position);
        }
    }

    let half_width = state.paths.lane_half_width.max(f32::EPSILON);
    let mut shifts: Vec<(EnemyId, f32)> = Vec::new();
    for (id, enemy) in state.store.enemies.iter() {
        if !on_lane(enemy) {
            continue;
        }
        let neighbors = hash
            .query_neighbors(enemy.position, ENEMY_SEPARATION)
            .into_iter()
            .filter(|other| *other != id)
            .filter_map(|other| state.store.enemies.get(other))
            .filter(|other| other.path == enemy.path && other.is_flying() == enemy.is_flying())
            .map(|other| other.position);
        let push = repulsion(enemy.position, neighbors, ENEMY_SEPARATION);
        if push == Vec2::ZERO {
            continue;
        }
        let Some(path) = state.paths.get(&enemy.path) else {
            continue;
        };
        let sideways = push.dot(path.direction(enemy.cursor).perp());
        shifts.push((id, sideways * SEPARATION_SPEED * dt / half_width));
    }

    for (id, shift) in shifts {
        let Some(enemy) = state.store.enemies.get_mut(id) else {
            continue;
        };
        enemy.lane_offset = (enemy.lane_offset + shift).clamp(-MAX_LANE_OFFSET, MAX_LANE_OFFSET);
        if let Some(position) = state
            .paths
            .resolve(&enemy.path, enemy.cursor, enemy.lane_offset)
        {
            enemy.position = position;
        }
    }
}

fn separate_troops(state: &mut SimulationState, dt: f32) {
    let mut hash = SpatialHash::new(TROOP_SEPARATION * 2.0);
    for (id, troop) in state.store.troops.iter() {
        hash.insert(id, troop.position);
    }

    let mut pushes: Vec<(TroopId, Vec2)> = Vec::new();
    for (id, troop) in state.store.troops.iter() {
        if troop.stats.stationary {
            continue;
        }
        let neighbors = hash
            .query_neighbors(troop.position, TROOP_SEPARATION)
            .into_iter()
            .filter(|other| *other != id)
            .filter_map(|other| state.store.troops.get(other))
            .map(|other| other.position);
        let push = repulsion(troop.position, neighbors, TROOP_SEPARATION);
        if push != Vec2::ZERO {
            pushes.push((id, push * SEPARATION_SPEED * dt));
        }
    }

    for (id, push) in pushes {
        if let Some(troop) = state.store.troops.get_mut(id) {
            troop.position = troop.leashed(troop.position + push);
        }
    }
}
