//! Enemy behavior: walk the path, stop to fight, break through at the end.
//!
//! Each tick an enemy re-decides its state in priority order: incapacitated,
//! taunted, assaulting an objective, engaging the hero, engaging the nearest
//! troop, and finally following its path. Path progress is only ever advanced
//! in `PathFollowing`, so leaving a fight resumes from the stored cursor. A
//! taunt can drag an enemy off its lane; it walks back to the cursor first.

use bevy::prelude::*;

use crate::gameplay::SimulationState;
use crate::gameplay::combat::projectile::{Payload, ProjectileTarget, launch};
use crate::gameplay::combat::{damage_hero, damage_troop};
use crate::gameplay::economy::income::lose_lives;
use crate::gameplay::events::LifeLossCause;
use crate::gameplay::ids::{EnemyId, ObjectiveId, TroopId};
use crate::gameplay::objectives::damage_objective;
use crate::gameplay::units::enemy::EngageTarget;
use crate::gameplay::units::{EnemyState, EnemyStats, cooldown_ready};
use super::{ARRIVAL_TOLERANCE, step_toward, stop_short};

/// Taunted enemies answer the hero from this far away.
pub const TAUNT_RANGE: f32 = 120.0;

/// Taunted melee enemies close to this fraction of their reach.
const STANDOFF: f32 = 0.8;

pub fn update(state: &mut SimulationState, dt: f32) {
    for id in state.store.enemies.ids() {
        let next = decide(state, id);
        let Some(enemy) = state.store.enemies.get_mut(id) else {
            continue;
        };
        enemy.state = next;
        match next {
            EnemyState::Incapacitated => {}
            EnemyState::PathFollowing => walk(state, id, dt),
            EnemyState::Engaging(EngageTarget::Hero) => attack_hero(state, id),
            EnemyState::TauntedEngaging => {
                close_on_hero(state, id, dt);
                attack_hero(state, id);
            }
            EnemyState::Engaging(EngageTarget::Troop(troop)) => attack_troop(state, id, troop),
            EnemyState::AssaultingObjective(objective) => attack_objective(state, id, objective),
        }
    }
}

/// Pick this tick's state for enemy `id`.
fn decide(state: &SimulationState, id: EnemyId) -> EnemyState {
    let now = state.now;
    let Some(enemy) = state.store.enemies.get(id) else {
        return EnemyState::PathFollowing;
    };
    if enemy.status.is_incapacitated(now) {
        return EnemyState::Incapacitated;
    }
    if enemy.stats.damage <= 0.0 {
        return EnemyState::PathFollowing;
    }
    let position = enemy.position;
    let hero = state
        .store
        .hero
        .as_ref()
        .filter(|h| h.is_alive())
        .map(|h| h.position.distance(position));

    if enemy.status.is_taunted(now) && hero.is_some_and(|d| d <= TAUNT_RANGE) {
        return EnemyState::TauntedEngaging;
    }
    let objective = state
        .store
        .objectives
        .iter()
        .filter_map(|(oid, o)| {
            o.assault_radius()
                .map(|radius| (oid, o.position.distance(position) - radius))
        })
        .filter(|(_, gap)| *gap <= reach(&enemy.stats))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    if let Some((objective, _)) = objective {
        return EnemyState::AssaultingObjective(objective);
    }
    if enemy.is_flying() {
        return EnemyState::PathFollowing;
    }
    if hero.is_some_and(|d| d <= enemy.stats.engage_range) {
        return EnemyState::Engaging(EngageTarget::Hero);
    }
    let troop = state
        .store
        .troops
        .iter()
        .map(|(tid, t)| (tid, t.position.distance(position)))
        .filter(|(_, d)| *d <= enemy.stats.engage_range)
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    match troop {
        Some((troop, _)) => EnemyState::Engaging(EngageTarget::Troop(troop)),
        None => EnemyState::PathFollowing,
    }
}

/// How far an enemy can hit from: its engage range, or its weapon range if that is longer.
fn reach(stats: &EnemyStats) -> f32 {
    stats.engage_range.max(stats.attack_range)
}

fn walk(state: &mut SimulationState, id: EnemyId, dt: f32) {
    let now = state.now;
    let Some(enemy) = state.store.enemies.get_mut(id) else {
        return;
    };
    let Some(path) = state.paths.get(&enemy.path) else {
        warn!("{id} walks unknown path {}", enemy.path);
        return;
    };
    let distance = enemy.stats.speed * enemy.status.speed_multiplier(now) * dt;
    if enemy.rejoining {
        let Some(lane) = state
            .paths
            .resolve(&enemy.path, enemy.cursor, enemy.lane_offset)
        else {
            return;
        };
        enemy.position = step_toward(enemy.position, lane, distance);
        if enemy.position.distance(lane) <= ARRIVAL_TOLERANCE {
            enemy.position = lane;
            enemy.rejoining = false;
        }
        return;
    }
    let finished = path.advance(&mut enemy.cursor, distance);
    if let Some(position) =
        state
            .paths
            .resolve(&enemy.path, enemy.cursor, enemy.lane_offset)
    {
        enemy.position = position;
    }
    if !finished {
        return;
    }

    let cost = enemy.stats.lives_cost;
    debug!("{} {id} broke through", enemy.kind.display_name());
    state.store.enemies.remove(id);
    lose_lives(state, cost, LifeLossCause::Leak(id));
}

/// Walk a taunted enemy toward the hero until it is within reach. The path
/// cursor stays where it was.
fn close_on_hero(state: &mut SimulationState, id: EnemyId, dt: f32) {
    let now = state.now;
    let Some(hero_position) = state
        .store
        .hero
        .as_ref()
        .filter(|h| h.is_alive())
        .map(|h| h.position)
    else {
        return;
    };
    let Some(enemy) = state.store.enemies.get_mut(id) else {
        return;
    };
    let within = reach(&enemy.stats);
    if enemy.position.distance(hero_position) <= within {
        return;
    }
    let goal = stop_short(enemy.position, hero_position, within * STANDOFF);
    let speed = enemy.stats.speed * enemy.status.speed_multiplier(now) * dt;
    enemy.position = step_toward(enemy.position, goal, speed);
    enemy.rejoining = true;
}

fn attack_hero(state: &mut SimulationState, id: EnemyId) {
    let now = state.now;
    let Some(hero_position) = state
        .store
        .hero
        .as_ref()
        .filter(|h| h.is_alive())
        .map(|h| h.position)
    else {
        return;
    };
    let Some(enemy) = state.store.enemies.get_mut(id) else {
        return;
    };
    if enemy.position.distance(hero_position) > reach(&enemy.stats)
        || !cooldown_ready(enemy.last_attack.hero, enemy.stats.attack_interval, now)
    {
        return;
    }
    enemy.last_attack.hero = Some(now);
    let (origin, damage, ranged) = (enemy.position, enemy.stats.damage, enemy.stats.ranged);
    if ranged {
        launch(
            state,
            origin,
            hero_position,
            ProjectileTarget::Hero,
            Payload::Damage(damage),
        );
    } else {
        damage_hero(state, damage);
    }
}

fn attack_troop(state: &mut SimulationState, id: EnemyId, troop: TroopId) {
    let now = state.now;
    let Some(troop_position) = state.store.troops.get(troop).map(|t| t.position) else {
        return;
    };
    let Some(enemy) = state.store.enemies.get_mut(id) else {
        return;
    };
    if enemy.position.distance(troop_position) > reach(&enemy.stats)
        || !cooldown_ready(enemy.last_attack.troop, enemy.stats.attack_interval, now)
    {
        return;
    }
    enemy.last_attack.troop = Some(now);
    let (origin, damage, ranged) = (enemy.position, enemy.stats.damage, enemy.stats.ranged);
    if ranged {
        launch(
            state,
            origin,
            troop_position,
            ProjectileTarget::Troop(troop),
            Payload::Damage(damage),
        );
    } else {
        damage_troop(state, troop, damage);
    }
}

fn attack_objective(state: &mut SimulationState, id: EnemyId, objective: ObjectiveId) {
    let now = state.now;
    let Some(enemy) = state.store.enemies.get_mut(id) else {
        return;
    };
    if !cooldown_ready(enemy.last_attack.objective, enemy.stats.attack_interval, now) {
        return;
    }
    enemy.last_attack.objective = Some(now);
    let damage = enemy.stats.damage;
    damage_objective(state, objective, damage);
}
