//! Target selection: path-progress ranking for towers, proximity for units.

use std::cmp::Ordering;

use bevy::math::Vec2;

use crate::gameplay::SimulationState;
use crate::gameplay::ids::EnemyId;
use crate::gameplay::units::Enemy;

/// How far along its path an enemy is, and how much is left.
fn progress(state: &SimulationState, enemy: &Enemy) -> (f32, f32) {
    state
        .paths
        .get(&enemy.path)
        .map_or((0.0, f32::INFINITY), |path| {
            (path.fraction(enemy.cursor), path.remaining(enemy.cursor))
        })
}

/// Up to `count` enemies within `range` of `origin`, most dangerous first.
///
/// Danger is progress along the path; equal progress goes to whoever has less
/// distance left, then to the older id.
#[must_use]
pub fn rank_targets(
    state: &SimulationState,
    origin: Vec2,
    range: f32,
    hits_flying: bool,
    count: usize,
) -> Vec<EnemyId> {
    let range_sq = range * range;
    let mut candidates: Vec<(EnemyId, f32, f32)> = state
        .store
        .enemies
        .iter()
        .filter(|(_, e)| hits_flying || !e.is_flying())
        .filter(|(_, e)| e.position.distance_squared(origin) <= range_sq)
        .map(|(id, e)| {
            let (fraction, remaining) = progress(state, e);
            (id, fraction, remaining)
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.2.total_cmp(&b.2))
            .then_with(|| a.0.cmp(&b.0))
    });
    candidates.into_iter().take(count).map(|(id, ..)| id).collect()
}

/// Closest enemy to `origin` within `radius` that passes `filter`.
#[must_use]
pub fn nearest_enemy(
    state: &SimulationState,
    origin: Vec2,
    radius: f32,
    filter: impl Fn(&Enemy) -> bool,
) -> Option<EnemyId> {
    let radius_sq = radius * radius;
    state
        .store
        .enemies
        .iter()
        .filter(|(_, e)| filter(e))
        .map(|(id, e)| (id, e.position.distance_squared(origin)))
        .filter(|(_, d)| *d <= radius_sq)
        .min_by(|a, b| match a.1.total_cmp(&b.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        })
        .map(|(id, _)| id)
}

/// Every enemy within `radius` of `center`, in id order.
#[must_use]
pub fn enemies_within(
    state: &SimulationState,
    center: Vec2,
    radius: f32,
    hits_flying: bool,
) -> Vec<EnemyId> {
    let radius_sq = radius * radius;
    state
        .store
        .enemies
        .iter()
        .filter(|(_, e)| hits_flying || !e.is_flying())
        .filter(|(_, e)| e.position.distance_squared(center) <= radius_sq)
        .map(|(id, _)| id)
        .collect()
}
