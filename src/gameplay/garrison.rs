//! Troop-producing towers: mustering, respawn queues, and refits on upgrade.

use bevy::prelude::*;

use super::SimulationState;
use super::combat::projectile::{EffectKind, SPAWN_EFFECT_DURATION, spawn_effect};
use super::ids::{TowerId, TroopId};
use super::units::{Health, Troop, TroopOwner, troop_stats};

/// Fill every empty squad slot of a freshly built tower.
pub fn muster(state: &mut SimulationState, tower_id: TowerId) {
    let Some(size) = state
        .store
        .towers
        .get(tower_id)
        .filter(|t| t.garrison.is_some())
        .map(|t| t.stats.squad_size)
    else {
        return;
    };
    for slot in 0..size {
        spawn_member(state, tower_id, slot);
    }
}

/// Spawn one squad member into `slot`, unless the slot is filled or no longer
/// exists. Disabled towers field nobody.
pub fn spawn_member(
    state: &mut SimulationState,
    tower_id: TowerId,
    slot: usize,
) -> Option<TroopId> {
    let tower = state.store.towers.get(tower_id).filter(|t| !t.disabled)?;
    let garrison = tower.garrison.as_ref()?;
    let kind = tower.stats.troop_kind?;
    let (size, scale, rally) = (tower.stats.squad_size, tower.stats.troop_scale, garrison.rally);
    let owner = TroopOwner::Tower(tower_id);
    if slot >= size
        || state
            .store
            .troops
            .values()
            .any(|t| t.owner == owner && t.slot == slot)
    {
        return None;
    }

    let id = state.ids.troop();
    let mut troop = Troop::new(id, kind, owner, rally, slot, size);
    scale_troop(&mut troop, scale);
    let at = troop.position;
    state.store.troops.insert(id, troop);
    spawn_effect(state, EffectKind::Spawn, at, SPAWN_EFFECT_DURATION);
    debug!("{tower_id} mustered {id} into slot {slot}");
    Some(id)
}

/// Respawn fallen squad members whose delay has elapsed. A disabled tower's
/// queue is drained without spawning.
pub fn update(state: &mut SimulationState) {
    let now = state.now;
    for tower_id in state.store.towers.ids() {
        let Some(tower) = state.store.towers.get_mut(tower_id) else {
            continue;
        };
        let disabled = tower.disabled;
        let due = tower
            .garrison
            .as_mut()
            .map(|g| g.respawns.drain_due(now))
            .unwrap_or_default();
        if disabled {
            continue;
        }
        for slot in due {
            spawn_member(state, tower_id, slot);
        }
    }
}

/// Bring living squad members in line with the tower's current stats.
///
/// Health keeps its fraction of max. Members in slots the new squad size no
/// longer has are dismissed; new slots are filled at once.
pub fn refit(state: &mut SimulationState, tower_id: TowerId) {
    let Some(tower) = state.store.towers.get(tower_id) else {
        return;
    };
    let Some(kind) = tower.stats.troop_kind else {
        return;
    };
    let (size, scale) = (tower.stats.squad_size, tower.stats.troop_scale);
    let owner = TroopOwner::Tower(tower_id);

    state
        .store
        .troops
        .retain(|_, t| t.owner != owner || t.slot < size);
    for troop in state.store.troops.values_mut() {
        if troop.owner != owner {
            continue;
        }
        let fraction = troop.health.fraction();
        troop.kind = kind;
        troop.stats = troop_stats(kind);
        troop.squad_size = size;
        scale_troop(troop, scale);
        troop.health.current = troop.health.max * fraction;
        if troop.stats.stationary {
            troop.move_target = None;
            troop.position = troop.post();
        }
    }
    muster(state, tower_id);
}

fn scale_troop(troop: &mut Troop, scale: f32) {
    troop.stats.hp *= scale;
    troop.stats.damage *= scale;
    troop.health = Health::new(troop.stats.hp);
}
