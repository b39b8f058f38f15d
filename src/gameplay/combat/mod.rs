//! Combat resolution: damage, armor, shields, and the single kill path.
//!
//! Every lethal hit goes through [`damage_enemy`], which removes the enemy in the
//! same call that took its HP to zero. A second source hitting the same id later
//! in the tick finds nothing and does nothing, so each kill pays exactly one bounty.

pub mod attack;
pub mod projectile;
pub mod targeting;

use bevy::prelude::*;

use self::projectile::{DEATH_EFFECT_DURATION, DEFLECT_EFFECT_DURATION, EffectKind, spawn_effect};
use crate::gameplay::SimulationState;
use crate::gameplay::economy::income::award_bounty;
use crate::gameplay::events::SimEvent;
use crate::gameplay::ids::{EnemyId, TroopId};
use crate::gameplay::units::{HeroLife, HeroState, TroopOwner};

pub use targeting::{enemies_within, nearest_enemy, rank_targets};

// === Constants ===

/// Armor never absorbs more than this fraction.
pub const MAX_ARMOR: f32 = 0.9;

// === Types ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    /// Reduced by armor.
    Physical,
    /// Burns and other effects that ignore armor.
    True,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// The target was already gone.
    Missing,
    Hit { dealt: f32 },
    Killed { dealt: f32, bounty: u32 },
}

impl DamageOutcome {
    #[must_use]
    pub const fn killed(self) -> bool {
        matches!(self, Self::Killed { .. })
    }
}

// === Damage ===

/// Damage left after armor.
#[must_use]
pub fn mitigate(amount: f32, armor: f32) -> f32 {
    amount.max(0.0) * (1.0 - armor.clamp(0.0, MAX_ARMOR))
}

/// Hit an enemy. Lethal damage pays the bounty and removes the enemy immediately.
pub fn damage_enemy(
    state: &mut SimulationState,
    id: EnemyId,
    amount: f32,
    kind: DamageKind,
) -> DamageOutcome {
    let Some(enemy) = state.store.enemies.get_mut(id) else {
        debug!("Damage against missing {id} ignored");
        return DamageOutcome::Missing;
    };
    let amount = match kind {
        DamageKind::Physical => mitigate(amount, enemy.stats.armor),
        DamageKind::True => amount,
    };
    let dealt = enemy.health.take(amount);
    if !enemy.health.is_dead() {
        return DamageOutcome::Hit { dealt };
    }
    match kill_enemy(state, id) {
        Some(bounty) => DamageOutcome::Killed { dealt, bounty },
        None => DamageOutcome::Missing,
    }
}

/// Remove a dead enemy, pay its bounty, and mark the spot. Returns the bounty paid.
pub fn kill_enemy(state: &mut SimulationState, id: EnemyId) -> Option<u32> {
    let enemy = state.store.enemies.remove(id)?;
    let bounty = enemy.stats.bounty;
    award_bounty(state, bounty);
    spawn_effect(
        state,
        EffectKind::Death,
        enemy.position,
        DEATH_EFFECT_DURATION,
    );
    debug!("{} {id} killed, bounty {bounty}", enemy.kind.display_name());
    state.emit(SimEvent::EnemyKilled {
        enemy: id,
        kind: enemy.kind,
        bounty,
    });
    Some(bounty)
}

/// Hit the hero. A shield turns the hit into a deflect marker instead.
pub fn damage_hero(state: &mut SimulationState, amount: f32) {
    let now = state.now;
    let Some(hero) = state.store.hero.as_mut() else {
        return;
    };
    if !hero.is_alive() {
        return;
    }
    if hero.status.is_shielded(now) {
        let position = hero.position;
        spawn_effect(
            state,
            EffectKind::Deflect,
            position,
            DEFLECT_EFFECT_DURATION,
        );
        return;
    }
    hero.health.take(amount);
    if !hero.health.is_dead() {
        return;
    }

    let respawn_at = now + hero.stats.respawn_delay;
    hero.life = HeroLife::Dead { respawn_at };
    hero.state = HeroState::Idle;
    hero.aggro = None;
    hero.move_target = None;
    hero.status = Default::default();
    let position = hero.position;
    info!("Hero fell, respawning at {respawn_at:.1}");
    spawn_effect(state, EffectKind::Death, position, DEATH_EFFECT_DURATION);
    state.emit(SimEvent::HeroDied { respawn_at });
}

/// Hit a troop. A dead garrison troop queues its slot for respawn.
pub fn damage_troop(state: &mut SimulationState, id: TroopId, amount: f32) {
    let Some(troop) = state.store.troops.get_mut(id) else {
        debug!("Damage against missing {id} ignored");
        return;
    };
    troop.health.take(amount);
    if !troop.health.is_dead() {
        return;
    }
    let Some(troop) = state.store.troops.remove(id) else {
        return;
    };
    spawn_effect(
        state,
        EffectKind::Death,
        troop.position,
        DEATH_EFFECT_DURATION,
    );
    if let TroopOwner::Tower(tower_id) = troop.owner {
        let now = state.now;
        if let Some(tower) = state.store.towers.get_mut(tower_id) {
            let delay = tower.stats.respawn_delay;
            if let Some(garrison) = tower.garrison.as_mut() {
                garrison.respawns.schedule(now + delay, troop.slot);
            }
        }
    }
}
