//! Tower attacks: cooldown gating, multi-target, chain, splash, and on-hit statuses.

use bevy::prelude::*;

use super::projectile::{
    ARC_EFFECT_DURATION, EXPLOSION_EFFECT_DURATION, EffectKind, Payload, ProjectileTarget, launch,
    spawn_effect,
};
use super::{DamageKind, damage_enemy, enemies_within, rank_targets};
use crate::gameplay::SimulationState;
use crate::gameplay::ids::{EnemyId, TowerId};
use crate::gameplay::units::{TowerKind, TowerStats, cooldown_ready};

/// Fire every tower whose cooldown has elapsed and that has something in range.
pub fn towers_attack(state: &mut SimulationState) {
    for id in state.store.towers.ids() {
        tower_attack(state, id);
    }
}

fn tower_attack(state: &mut SimulationState, id: TowerId) {
    let now = state.now;
    let Some(tower) = state.store.towers.get(id) else {
        return;
    };
    if tower.disabled || tower.stats.damage <= 0.0 {
        return;
    }
    if !cooldown_ready(tower.last_attack, tower.stats.attack_interval, now) {
        return;
    }
    let (kind, origin, stats, damage) = (tower.kind, tower.position, tower.stats, tower.damage());
    let targets = rank_targets(state, origin, tower.range(), stats.hits_flying, stats.targets);
    if targets.is_empty() {
        return;
    }
    if let Some(tower) = state.store.towers.get_mut(id) {
        tower.last_attack = Some(now);
    }

    let mut from = origin;
    for (index, target) in targets.into_iter().enumerate() {
        let Some(at) = state.store.enemies.get(target).map(|e| e.position) else {
            continue;
        };
        let amount = if index == 0 {
            damage
        } else {
            damage * stats.chain_falloff
        };

        if kind == TowerKind::Mage && index > 0 {
            spawn_effect(state, EffectKind::ChainArc { to: at }, from, ARC_EFFECT_DURATION);
        } else {
            launch(
                state,
                origin,
                at,
                ProjectileTarget::Enemy(target),
                Payload::Visual,
            );
        }
        from = at;

        if stats.splash_radius > 0.0 {
            for victim in enemies_within(state, at, stats.splash_radius, stats.hits_flying) {
                strike(state, victim, amount, &stats);
            }
            spawn_effect(
                state,
                EffectKind::Explosion {
                    radius: stats.splash_radius,
                },
                at,
                EXPLOSION_EFFECT_DURATION,
            );
        } else {
            strike(state, target, amount, &stats);
        }
    }
}

/// Apply on-hit statuses, then damage.
fn strike(state: &mut SimulationState, target: EnemyId, amount: f32, stats: &TowerStats) {
    let now = state.now;
    if let Some(enemy) = state.store.enemies.get_mut(target) {
        if stats.slow > 0.0 {
            enemy.status.apply_slow(stats.slow, stats.slow_duration, now);
        }
        if stats.freeze_duration > 0.0 {
            enemy.status.freeze(stats.freeze_duration, now);
        }
        if stats.stun_duration > 0.0 {
            enemy.status.stun(stats.stun_duration, now);
        }
    }
    damage_enemy(state, target, amount, DamageKind::Physical);
}
