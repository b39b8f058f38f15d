//! Troop behavior: hold the rally point, chase within the leash, fight, heal when idle.

use crate::gameplay::SimulationState;
use crate::gameplay::combat::projectile::{Payload, ProjectileTarget, launch};
use crate::gameplay::combat::{DamageKind, damage_enemy, nearest_enemy};
use crate::gameplay::ids::{EnemyId, TroopId};
use crate::gameplay::units::cooldown_ready;
use super::{ARRIVAL_TOLERANCE, facing, step_toward, stop_short};

/// Melee troops close to this fraction of their attack range.
const STANDOFF: f32 = 0.8;

pub fn update(state: &mut SimulationState, dt: f32) {
    for id in state.store.troops.ids() {
        step(state, id, dt);
    }
}

fn step(state: &mut SimulationState, id: TroopId, dt: f32) {
    let now = state.now;
    let Some(troop) = state.store.troops.get_mut(id) else {
        return;
    };
    if troop.status.is_incapacitated(now) {
        return;
    }
    let speed = troop.stats.speed * troop.status.speed_multiplier(now) * dt;
    if let Some(target) = troop.move_target {
        troop.facing = facing(troop.position, target, troop.facing);
        troop.position = step_toward(troop.position, target, speed);
        if troop.position.distance(target) <= ARRIVAL_TOLERANCE {
            troop.move_target = None;
        }
        return;
    }

    match choose_target(state, id) {
        Some(target) => fight(state, id, target, speed),
        None => idle(state, id, speed, dt),
    }
}

/// Keep a still-visible engaged enemy, else take the nearest one in sight.
fn choose_target(state: &SimulationState, id: TroopId) -> Option<EnemyId> {
    let troop = state.store.troops.get(id)?;
    let (position, sight, ranged) = (troop.position, troop.stats.sight, troop.stats.ranged);
    let sticky = troop.engaged.filter(|enemy| {
        state
            .store
            .enemies
            .get(*enemy)
            .is_some_and(|e| (ranged || !e.is_flying()) && e.position.distance(position) <= sight)
    });
    sticky.or_else(|| nearest_enemy(state, position, sight, |e| ranged || !e.is_flying()))
}

fn fight(state: &mut SimulationState, id: TroopId, target: EnemyId, speed: f32) {
    let now = state.now;
    let Some(target_position) = state.store.enemies.get(target).map(|e| e.position) else {
        return;
    };
    let Some(troop) = state.store.troops.get_mut(id) else {
        return;
    };
    troop.engaged = Some(target);
    troop.facing = facing(troop.position, target_position, troop.facing);

    let range = troop.stats.attack_range;
    if troop.position.distance(target_position) > range {
        if !troop.stats.stationary {
            let goal = stop_short(troop.position, target_position, range * STANDOFF);
            let goal = troop.leashed(goal);
            troop.position = step_toward(troop.position, goal, speed);
        }
        return;
    }

    if !cooldown_ready(troop.last_attack, troop.stats.attack_interval, now) {
        return;
    }
    troop.last_attack = Some(now);
    let damage = troop.stats.damage * troop.status.damage_multiplier(now);
    let (origin, ranged) = (troop.position, troop.stats.ranged);
    if ranged {
        launch(
            state,
            origin,
            target_position,
            ProjectileTarget::Enemy(target),
            Payload::Visual,
        );
    }
    damage_enemy(state, target, damage, DamageKind::Physical);
}

fn idle(state: &mut SimulationState, id: TroopId, speed: f32, dt: f32) {
    let Some(troop) = state.store.troops.get_mut(id) else {
        return;
    };
    troop.engaged = None;
    let post = troop.post();
    if !troop.stats.stationary && troop.position.distance(post) > ARRIVAL_TOLERANCE {
        troop.facing = facing(troop.position, post, troop.facing);
        troop.position = step_toward(troop.position, post, speed);
        return;
    }
    let regen = troop.health.max * troop.stats.regen * dt;
    troop.health.heal(regen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::ids::TowerId;
    use crate::gameplay::path::PathKey;
    use crate::gameplay::units::{Enemy, EnemyKind, Troop, TroopKind, TroopOwner};
    use bevy::math::Vec2;
    use pretty_assertions::assert_eq;

    fn put_troop(state: &mut SimulationState, kind: TroopKind) -> TroopId {
        let id = state.ids.troop();
        state.store.troops.insert(
            id,
            Troop::new(id, kind, TroopOwner::Tower(TowerId(99)), Vec2::ZERO, 0, 1),
        );
        id
    }

    fn put_enemy(state: &mut SimulationState, kind: EnemyKind, at: Vec2) -> EnemyId {
        let id = state.ids.enemy();
        state
            .store
            .enemies
            .insert(id, Enemy::new(id, kind, PathKey::new("main"), 0.0, at));
        id
    }

    #[test]
    fn chase_stops_at_leash_boundary() {
        let mut state = SimulationState::default();
        let troop = put_troop(&mut state, TroopKind::Footman);
        put_enemy(&mut state, EnemyKind::Brute, Vec2::new(0.0, 59.0));
        state.store.troops.get_mut(troop).unwrap().stats.leash = 20.0;

        for _ in 0..10 {
            update(&mut state, 0.5);
        }
        let troop = state.store.troops.get(troop).unwrap();
        assert!((troop.position.y - 20.0).abs() < 1e-3);
        assert_eq!(troop.last_attack, None);
    }

    #[test]
    fn footman_closes_and_strikes() {
        let mut state = SimulationState::default();
        let troop = put_troop(&mut state, TroopKind::Footman);
        let enemy = put_enemy(&mut state, EnemyKind::Grunt, Vec2::new(40.0, 0.0));

        update(&mut state, 0.5);
        assert!(state.store.troops.get(troop).unwrap().position.x > 0.0);
        update(&mut state, 0.5);
        assert_eq!(state.store.enemies.get(enemy).unwrap().health.current, 92.0);
    }

    #[test]
    fn sentry_turns_but_never_walks() {
        let mut state = SimulationState::default();
        let troop = put_troop(&mut state, TroopKind::Sentry);
        put_enemy(&mut state, EnemyKind::Bat, Vec2::new(0.0, 150.0));
        let grunt = put_enemy(&mut state, EnemyKind::Grunt, Vec2::new(0.0, 80.0));

        update(&mut state, 1.0);
        let sentry = state.store.troops.get(troop).unwrap();
        assert_eq!(sentry.position, Vec2::ZERO);
        assert_eq!(sentry.facing, Vec2::Y);
        assert_eq!(sentry.engaged, Some(grunt));
        assert!(state.store.enemies.get(grunt).unwrap().health.current < 100.0);
    }

    #[test]
    fn melee_troops_ignore_fliers() {
        let mut state = SimulationState::default();
        let troop = put_troop(&mut state, TroopKind::Footman);
        put_enemy(&mut state, EnemyKind::Bat, Vec2::new(10.0, 0.0));

        update(&mut state, 0.5);
        assert_eq!(state.store.troops.get(troop).unwrap().engaged, None);
    }

    #[test]
    fn idle_troop_walks_home_then_heals() {
        let mut state = SimulationState::default();
        let id = put_troop(&mut state, TroopKind::Footman);
        {
            let troop = state.store.troops.get_mut(id).unwrap();
            troop.position = Vec2::new(30.0, 0.0);
            troop.health.current = 60.0;
        }

        update(&mut state, 0.5);
        let troop = state.store.troops.get(id).unwrap();
        assert_eq!(troop.position, Vec2::ZERO);
        assert_eq!(troop.health.current, 60.0);

        update(&mut state, 1.0);
        assert_eq!(state.store.troops.get(id).unwrap().health.current, 66.0);
    }

    #[test]
    fn move_order_walks_to_target_first() {
        let mut state = SimulationState::default();
        let id = put_troop(&mut state, TroopKind::Footman);
        put_enemy(&mut state, EnemyKind::Grunt, Vec2::new(10.0, 0.0));
        state.store.troops.get_mut(id).unwrap().move_target = Some(Vec2::new(0.0, -60.0));

        update(&mut state, 0.5);
        let troop = state.store.troops.get(id).unwrap();
        assert_eq!(troop.position, Vec2::new(0.0, -30.0));
        assert_eq!(troop.last_attack, None);
    }
}
