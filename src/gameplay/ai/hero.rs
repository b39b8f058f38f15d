//! Hero behavior: obey move orders, fight what comes near home, walk back.

use bevy::prelude::*;

use crate::gameplay::SimulationState;
use crate::gameplay::combat::projectile::{Payload, ProjectileTarget, launch};
use crate::gameplay::combat::{DamageKind, damage_enemy, nearest_enemy, rank_targets};
use crate::gameplay::events::SimEvent;
use crate::gameplay::ids::EnemyId;
use crate::gameplay::status::StatusEffects;
use crate::gameplay::units::hero::HeroAbility;
use crate::gameplay::units::{Enemy, HeroLife, HeroState, cooldown_ready};
use super::{ARRIVAL_TOLERANCE, ATTACK_ANIMATION, facing, step_toward, stop_short};

/// Heroes stop closing at this fraction of their attack range.
const STANDOFF: f32 = 0.8;

pub fn update(state: &mut SimulationState, dt: f32) {
    respawn(state);
    let now = state.now;
    let Some(hero) = state.store.hero.as_mut() else {
        return;
    };
    if !hero.is_alive() || hero.status.is_incapacitated(now) {
        return;
    }

    let speed = hero.stats.speed * hero.status.speed_multiplier(now) * dt;
    if let Some(target) = hero.move_target {
        hero.facing = facing(hero.position, target, hero.facing);
        hero.position = step_toward(hero.position, target, speed);
        if hero.position.distance(target) <= ARRIVAL_TOLERANCE {
            hero.home = target;
            hero.move_target = None;
            hero.state = HeroState::Idle;
        }
        return;
    }

    cast_ability(state);
    match choose_target(state) {
        Some(target) => engage(state, target, speed),
        None => go_home(state, speed, dt),
    }
}

/// Bring a dead hero back at the level's hero spawn once the timer runs out.
fn respawn(state: &mut SimulationState) {
    let now = state.now;
    let spawn = state.level.hero_spawn;
    let Some(hero) = state.store.hero.as_mut() else {
        return;
    };
    let HeroLife::Dead { respawn_at } = hero.life else {
        return;
    };
    if now < respawn_at {
        return;
    }
    hero.life = HeroLife::Alive;
    hero.health.refill();
    hero.position = spawn;
    hero.home = spawn;
    hero.state = HeroState::Idle;
    hero.aggro = None;
    hero.move_target = None;
    hero.status = StatusEffects::default();
    info!("{} respawned", hero.kind.display_name());
    state.emit(SimEvent::HeroRespawned);
}

fn cast_ability(state: &mut SimulationState) {
    let now = state.now;
    let Some(hero) = state.store.hero.as_ref() else {
        return;
    };
    if now < hero.ability_ready_at {
        return;
    }
    let (position, sight, ability) = (hero.position, hero.stats.sight, hero.stats.ability);
    let fired = match ability {
        HeroAbility::Taunt { radius, duration } => {
            let targets: Vec<EnemyId> = state
                .store
                .enemies
                .iter()
                .filter(|(_, e)| !e.is_flying() && e.position.distance(position) <= radius)
                .map(|(id, _)| id)
                .collect();
            for id in &targets {
                if let Some(enemy) = state.store.enemies.get_mut(*id) {
                    enemy.status.taunt(duration, now);
                }
            }
            !targets.is_empty()
        }
        HeroAbility::Volley { targets, damage } => {
            let targets = rank_targets(state, position, sight, true, targets);
            for id in &targets {
                let Some(at) = state.store.enemies.get(*id).map(|e| e.position) else {
                    continue;
                };
                launch(state, position, at, ProjectileTarget::Enemy(*id), Payload::Visual);
                damage_enemy(state, *id, damage, DamageKind::Physical);
            }
            !targets.is_empty()
        }
        HeroAbility::Shield {
            duration,
            threshold,
        } => match state.store.hero.as_mut() {
            Some(hero) if hero.health.fraction() < threshold => {
                hero.status.shield(duration, now);
                true
            }
            _ => false,
        },
    };

    if let Some(hero) = state.store.hero.as_mut().filter(|_| fired) {
        hero.ability_ready_at = now + hero.stats.ability_cooldown;
        debug!("{} used {ability:?}", hero.kind.display_name());
    }
}

/// Keep the current aggro target while it stays valid, else pick the nearest ground enemy.
fn choose_target(state: &SimulationState) -> Option<EnemyId> {
    let hero = state.store.hero.as_ref()?;
    let (position, home, sight, leash) = (
        hero.position,
        hero.home,
        hero.stats.sight,
        hero.stats.leash,
    );
    let valid = |e: &Enemy| {
        !e.is_flying() && e.position.distance(home) <= leash
    };
    let sticky = hero.aggro.filter(|id| {
        state
            .store
            .enemies
            .get(*id)
            .is_some_and(|e| valid(e) && e.position.distance(position) <= sight)
    });
    sticky.or_else(|| nearest_enemy(state, position, sight, valid))
}

fn engage(state: &mut SimulationState, target: EnemyId, speed: f32) {
    let now = state.now;
    let Some(target_position) = state.store.enemies.get(target).map(|e| e.position) else {
        return;
    };
    let Some(hero) = state.store.hero.as_mut() else {
        return;
    };
    hero.state = HeroState::Engaging(target);
    hero.aggro = Some(target);
    hero.facing = facing(hero.position, target_position, hero.facing);

    let range = hero.stats.attack_range;
    if hero.position.distance(target_position) > range {
        let goal = stop_short(hero.position, target_position, range * STANDOFF);
        let offset = goal - hero.home;
        let goal = if offset.length() > hero.stats.leash {
            hero.home + offset.normalize_or_zero() * hero.stats.leash
        } else {
            goal
        };
        hero.position = step_toward(hero.position, goal, speed);
        return;
    }

    if !cooldown_ready(hero.last_attack, hero.stats.attack_interval, now) {
        return;
    }
    hero.last_attack = Some(now);
    hero.attacking_until = Some(now + ATTACK_ANIMATION);
    let damage = hero.stats.damage * hero.status.damage_multiplier(now);
    let (origin, ranged) = (hero.position, hero.stats.ranged);
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

fn go_home(state: &mut SimulationState, speed: f32, dt: f32) {
    let Some(hero) = state.store.hero.as_mut() else {
        return;
    };
    hero.aggro = None;
    if hero.position.distance(hero.home) > ARRIVAL_TOLERANCE {
        hero.state = HeroState::Returning;
        hero.facing = facing(hero.position, hero.home, hero.facing);
        hero.position = step_toward(hero.position, hero.home, speed);
        return;
    }
    hero.state = HeroState::Idle;
    let regen = hero.health.max * hero.stats.regen * dt;
    hero.health.heal(regen);
}
