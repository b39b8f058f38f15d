//! The fixed-step orchestrator: one strictly ordered pass over every subsystem.

use bevy::prelude::*;

use super::combat::attack::towers_attack;
use super::combat::projectile::{advance_effects, advance_projectiles};
use super::combat::{DamageKind, damage_enemy, damage_troop, kill_enemy};
use super::events::SimEvent;
use super::units::avoidance;
use super::waves::MAX_LANE_OFFSET;
use super::{Outcome, SimulationState, ai, endgame, garrison, hazards, objectives, spells, waves};

/// Advance the simulation by `dt` seconds and return what happened, in order.
///
/// A finished or unstarted level does not advance; pending events are still returned.
pub fn tick(state: &mut SimulationState, dt: f32) -> Vec<SimEvent> {
    if state.outcome != Outcome::InProgress {
        return state.take_events();
    }
    let dt = dt.max(0.0);
    state.now += dt;
    state.tick += 1;

    objectives::recompute_tower_buffs(state);
    hazards::apply(state);
    objectives::update(state);
    garrison::update(state);
    waves::update(state);

    ai::enemy::update(state, dt);
    towers_attack(state);
    ai::hero::update(state, dt);
    ai::troop::update(state, dt);
    avoidance::separate(state, dt);

    advance_projectiles(state);
    decay_statuses(state);
    advance_effects(state);
    spells::update(state);

    repair_invariants(state);
    endgame::evaluate(state);
    state.take_events()
}

/// Settle burns and drop expired effects on every unit.
fn decay_statuses(state: &mut SimulationState) {
    let now = state.now;
    for id in state.store.enemies.ids() {
        let Some(enemy) = state.store.enemies.get_mut(id) else {
            continue;
        };
        let decay = enemy.status.decay(now);
        if decay.burn_damage > 0.0 {
            damage_enemy(state, id, decay.burn_damage, DamageKind::True);
        }
    }
    if let Some(hero) = state.store.hero.as_mut() {
        hero.status.decay(now);
    }
    for troop in state.store.troops.values_mut() {
        troop.status.decay(now);
    }
}

/// Catch states the resolvers should never leave behind and repair them in place.
fn repair_invariants(state: &mut SimulationState) {
    let dead: Vec<_> = state
        .store
        .enemies
        .iter()
        .filter(|(_, e)| e.health.is_dead())
        .map(|(id, _)| id)
        .collect();
    for id in dead {
        warn!("{id} outlived its death, removing");
        kill_enemy(state, id);
    }

    for enemy in state.store.enemies.values_mut() {
        if enemy.lane_offset.abs() > MAX_LANE_OFFSET {
            warn!("{} lane offset {} out of range, clamping", enemy.id, enemy.lane_offset);
            enemy.lane_offset = enemy.lane_offset.clamp(-MAX_LANE_OFFSET, MAX_LANE_OFFSET);
        }
    }

    let fallen: Vec<_> = state
        .store
        .troops
        .iter()
        .filter(|(_, t)| t.health.is_dead())
        .map(|(id, _)| id)
        .collect();
    for id in fallen {
        warn!("{id} outlived its death, removing");
        damage_troop(state, id, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::commands::place_tower;
    use crate::gameplay::level::LevelConfig;
    use crate::gameplay::path::{PathCursor, PathKey};
    use crate::gameplay::spells::SpellKind;
    use crate::gameplay::units::{Enemy, EnemyKind, HeroKind, TowerKind};
    use pretty_assertions::assert_eq;

    fn started() -> SimulationState {
        SimulationState::start(LevelConfig::demo(), HeroKind::Warden, &[SpellKind::Meteor])
    }

    #[test]
    fn unstarted_level_does_not_advance() {
        let mut state = SimulationState::default();
        assert!(tick(&mut state, 0.1).is_empty());
        assert_eq!(state.now, 0.0);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn clock_and_counter_advance_by_dt() {
        let mut state = started();
        let events = tick(&mut state, 0.25);
        assert_eq!(
            events,
            vec![SimEvent::LevelStarted {
                map_id: "demo".into()
            }]
        );
        tick(&mut state, 0.25);
        assert_eq!(state.now, 0.5);
        assert_eq!(state.tick, 2);
    }

    #[test]
    fn burn_kills_on_its_own() {
        let mut state = started();
        let id = state.ids.enemy();
        let mut enemy = Enemy::new(id, EnemyKind::Grunt, PathKey::new("north"), 0.0, Vec2::ZERO);
        enemy.cursor = PathCursor::default();
        enemy.health.current = 5.0;
        enemy.status.ignite(10.0, 5.0, 0.0);
        state.store.enemies.insert(id, enemy);
        state.take_events();

        let gold = state.economy.gold;
        tick(&mut state, 0.6);
        assert!(!state.store.enemies.contains(id));
        assert_eq!(state.economy.gold, gold + 5);
    }

    #[test]
    fn simultaneous_lethal_sources_pay_one_bounty() {
        let mut state = started();
        state.economy.gold = 10_000;
        for slot in [0, 1, 2] {
            let at = state.level.build_slots[slot].position;
            place_tower(&mut state, TowerKind::Archer, at).unwrap();
        }
        let id = state.ids.enemy();
        let position = state.level.build_slots[0].position + Vec2::new(0.0, 30.0);
        let mut enemy = Enemy::new(id, EnemyKind::Grunt, PathKey::new("north"), 0.0, position);
        enemy.health.current = 1.0;
        enemy.cursor = state
            .paths
            .get(&PathKey::new("north"))
            .unwrap()
            .nearest_cursor(position);
        state.store.enemies.insert(id, enemy);
        state.take_events();

        let gold = state.economy.gold;
        let events = tick(&mut state, 0.05);
        let kills = events
            .iter()
            .filter(|e| matches!(e, SimEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(state.economy.gold, gold + 5);
        assert!(!state.store.enemies.contains(id));
    }

    #[test]
    fn lingering_dead_enemy_is_removed() {
        let mut state = started();
        let id = state.ids.enemy();
        let mut enemy = Enemy::new(id, EnemyKind::Grunt, PathKey::new("north"), 0.0, Vec2::ZERO);
        enemy.health.current = 0.0;
        state.store.enemies.insert(id, enemy);

        repair_invariants(&mut state);
        assert!(!state.store.enemies.contains(id));
    }
}
