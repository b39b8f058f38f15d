//! Map objectives: beacon, shrine, barracks, and vault controllers.
//!
//! Each kind is a small state machine keyed off its level definition and run
//! once per tick by [`update`]. Beacons act through [`recompute_tower_buffs`],
//! vaults through enemy attacks landing in [`damage_objective`].

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::SimulationState;
use super::combat::projectile::{
    EffectKind, PULSE_EFFECT_DURATION, SPAWN_EFFECT_DURATION, spawn_effect,
};
use super::economy::income::lose_lives;
use super::events::{LifeLossCause, SimEvent};
use super::ids::ObjectiveId;
use super::path::PathKey;
use super::spells::inspire_multiplier;
use super::units::formation::formation_offset;
use super::units::{Health, Troop, TroopKind, TroopOwner};

/// Objective as authored in a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveDef {
    Beacon {
        position: Vec2,
        radius: f32,
        range_multiplier: f32,
    },
    Shrine {
        position: Vec2,
        radius: f32,
        heal: f32,
        interval: f32,
    },
    Barracks {
        position: Vec2,
        cap: usize,
        interval: f32,
        patrol_path: PathKey,
    },
    Vault {
        position: Vec2,
        radius: f32,
        hp: f32,
        life_penalty: u32,
        defense_radius: f32,
    },
}

/// Live objective state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectiveKind {
    Beacon {
        radius: f32,
        range_multiplier: f32,
    },
    Shrine {
        radius: f32,
        heal: f32,
        interval: f32,
        next_pulse_at: f32,
    },
    Barracks {
        cap: usize,
        interval: f32,
        next_spawn_at: Option<f32>,
        patrol_path: PathKey,
    },
    Vault {
        radius: f32,
        health: Health,
        life_penalty: u32,
        defense_radius: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: ObjectiveId,
    pub position: Vec2,
    pub kind: ObjectiveKind,
}

impl Objective {
    #[must_use]
    pub fn from_def(id: ObjectiveId, def: &ObjectiveDef, now: f32) -> Self {
        let (position, kind) = match def.clone() {
            ObjectiveDef::Beacon {
                position,
                radius,
                range_multiplier,
            } => (
                position,
                ObjectiveKind::Beacon {
                    radius,
                    range_multiplier,
                },
            ),
            ObjectiveDef::Shrine {
                position,
                radius,
                heal,
                interval,
            } => (
                position,
                ObjectiveKind::Shrine {
                    radius,
                    heal,
                    interval,
                    next_pulse_at: now + interval,
                },
            ),
            ObjectiveDef::Barracks {
                position,
                cap,
                interval,
                patrol_path,
            } => (
                position,
                ObjectiveKind::Barracks {
                    cap,
                    interval,
                    next_spawn_at: Some(now),
                    patrol_path,
                },
            ),
            ObjectiveDef::Vault {
                position,
                radius,
                hp,
                life_penalty,
                defense_radius,
            } => (
                position,
                ObjectiveKind::Vault {
                    radius,
                    health: Health::new(hp),
                    life_penalty,
                    defense_radius,
                },
            ),
        };
        Self { id, position, kind }
    }

    /// Footprint enemies must reach to attack it, if it can be attacked.
    #[must_use]
    pub const fn assault_radius(&self) -> Option<f32> {
        match self.kind {
            ObjectiveKind::Vault { radius, .. } => Some(radius),
            _ => None,
        }
    }
}

/// Recompute tower range (beacons) and damage (Inspire) multipliers from scratch.
pub fn recompute_tower_buffs(state: &mut SimulationState) {
    let damage_multiplier = inspire_multiplier(state);
    let beacons: Vec<(Vec2, f32, f32)> = state
        .store
        .objectives
        .values()
        .filter_map(|o| match o.kind {
            ObjectiveKind::Beacon {
                radius,
                range_multiplier,
            } => Some((o.position, radius, range_multiplier)),
            _ => None,
        })
        .collect();

    for tower in state.store.towers.values_mut() {
        tower.range_multiplier = beacons
            .iter()
            .filter(|(at, radius, _)| at.distance(tower.position) <= *radius)
            .map(|(_, _, multiplier)| *multiplier)
            .fold(1.0, f32::max);
        tower.damage_multiplier = damage_multiplier;
    }
}

/// Run shrine pulses and barracks production.
pub fn update(state: &mut SimulationState) {
    for id in state.store.objectives.ids() {
        let Some(objective) = state.store.objectives.get(id) else {
            continue;
        };
        match objective.kind {
            ObjectiveKind::Shrine { .. } => pulse_shrine(state, id),
            ObjectiveKind::Barracks { .. } => run_barracks(state, id),
            ObjectiveKind::Beacon { .. } | ObjectiveKind::Vault { .. } => {}
        }
    }
}

fn pulse_shrine(state: &mut SimulationState, id: ObjectiveId) {
    let now = state.now;
    let Some(objective) = state.store.objectives.get_mut(id) else {
        return;
    };
    let position = objective.position;
    let ObjectiveKind::Shrine {
        radius,
        heal,
        interval,
        next_pulse_at,
    } = &mut objective.kind
    else {
        return;
    };
    if now < *next_pulse_at {
        return;
    }
    *next_pulse_at = now + *interval;
    let (radius, heal) = (*radius, *heal);

    if let Some(hero) = state.store.hero.as_mut() {
        if hero.is_alive() && hero.position.distance(position) <= radius {
            hero.health.heal(heal);
        }
    }
    for troop in state.store.troops.values_mut() {
        if troop.position.distance(position) <= radius {
            troop.health.heal(heal);
        }
    }
    spawn_effect(
        state,
        EffectKind::HealPulse { radius },
        position,
        PULSE_EFFECT_DURATION,
    );
}

fn run_barracks(state: &mut SimulationState, id: ObjectiveId) {
    let now = state.now;
    let owner = TroopOwner::Objective(id);
    let taken: Vec<usize> = state
        .store
        .troops
        .values()
        .filter(|t| t.owner == owner)
        .map(|t| t.slot)
        .collect();

    let Some(objective) = state.store.objectives.get_mut(id) else {
        return;
    };
    let position = objective.position;
    let ObjectiveKind::Barracks {
        cap,
        interval,
        next_spawn_at,
        patrol_path,
    } = &mut objective.kind
    else {
        return;
    };
    if taken.len() >= *cap {
        *next_spawn_at = None;
        return;
    }
    let due = *next_spawn_at.get_or_insert(now + *interval);
    if now < due {
        return;
    }
    *next_spawn_at = Some(now + *interval);
    let (cap, patrol_path) = (*cap, patrol_path.clone());
    let Some(slot) = (0..cap).find(|slot| !taken.contains(slot)) else {
        return;
    };

    let anchor = state
        .paths
        .get(&patrol_path)
        .and_then(|path| {
            let cursor = path.nearest_cursor(position);
            path.position(cursor, 0.0)
        })
        .unwrap_or(position);
    let troop_id = state.ids.troop();
    let troop = Troop::new(troop_id, TroopKind::Footman, owner, anchor, slot, cap);
    let at = anchor + formation_offset(slot, cap);
    state.store.troops.insert(troop_id, troop);
    spawn_effect(state, EffectKind::Spawn, at, SPAWN_EFFECT_DURATION);
}

/// Damage a destructible objective. Destroying it costs lives once. Every tower
/// and build slot within its defense radius is lost for the rest of the level,
/// and garrisons there are dismissed.
pub fn damage_objective(state: &mut SimulationState, id: ObjectiveId, amount: f32) {
    let Some(objective) = state.store.objectives.get_mut(id) else {
        debug!("Damage against missing {id} ignored");
        return;
    };
    let position = objective.position;
    let ObjectiveKind::Vault {
        health,
        life_penalty,
        defense_radius,
        ..
    } = &mut objective.kind
    else {
        return;
    };
    health.take(amount);
    if !health.is_dead() {
        return;
    }
    let (penalty, defense_radius) = (*life_penalty, *defense_radius);
    state.store.objectives.remove(id);

    let guarded = |at: Vec2| at.distance(position) <= defense_radius;
    let lost: Vec<usize> = state
        .level
        .build_slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| guarded(slot.position))
        .map(|(index, _)| index)
        .collect();
    state.lost_slots.extend(lost);
    let mut silenced = Vec::new();
    for tower in state.store.towers.values_mut() {
        if guarded(tower.position) {
            tower.disabled = true;
            silenced.push(TroopOwner::Tower(tower.id));
        }
    }
    state
        .store
        .troops
        .retain(|_, troop| !silenced.contains(&troop.owner));
    info!("Objective {id} destroyed");
    state.emit(SimEvent::ObjectiveDestroyed { objective: id });
    lose_lives(state, penalty, LifeLossCause::ObjectiveLost(id));
    spawn_effect(
        state,
        EffectKind::Explosion {
            radius: defense_radius,
        },
        position,
        PULSE_EFFECT_DURATION,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::economy::Economy;
    use crate::gameplay::garrison;
    use crate::gameplay::ids::TowerId;
    use crate::gameplay::level::BuildSlot;
    use crate::gameplay::path::Path;
    use crate::gameplay::units::{Hero, HeroKind, Tower, TowerKind};
    use pretty_assertions::assert_eq;

    fn add(state: &mut SimulationState, def: &ObjectiveDef) -> ObjectiveId {
        let id = state.ids.objective();
        state
            .store
            .objectives
            .insert(id, Objective::from_def(id, def, state.now));
        id
    }

    fn vault() -> ObjectiveDef {
        ObjectiveDef::Vault {
            position: Vec2::ZERO,
            radius: 20.0,
            hp: 100.0,
            life_penalty: 3,
            defense_radius: 50.0,
        }
    }

    #[test]
    fn beacon_extends_range_of_nearby_towers_only() {
        let mut state = SimulationState::default();
        add(
            &mut state,
            &ObjectiveDef::Beacon {
                position: Vec2::ZERO,
                radius: 50.0,
                range_multiplier: 1.25,
            },
        );
        state.store.towers.insert(
            TowerId(10),
            Tower::new(TowerId(10), TowerKind::Archer, Vec2::new(30.0, 0.0), 0, Vec2::ZERO),
        );
        state.store.towers.insert(
            TowerId(11),
            Tower::new(TowerId(11), TowerKind::Archer, Vec2::new(90.0, 0.0), 1, Vec2::ZERO),
        );

        recompute_tower_buffs(&mut state);
        assert_eq!(state.store.towers.get(TowerId(10)).unwrap().range_multiplier, 1.25);
        assert_eq!(state.store.towers.get(TowerId(11)).unwrap().range_multiplier, 1.0);
    }

    #[test]
    fn shrine_heals_on_interval_with_one_marker() {
        let mut state = SimulationState::default();
        add(
            &mut state,
            &ObjectiveDef::Shrine {
                position: Vec2::ZERO,
                radius: 50.0,
                heal: 30.0,
                interval: 5.0,
            },
        );
        let mut hero = Hero::new(HeroKind::Warden, Vec2::new(10.0, 0.0), 0.0);
        hero.health.take(100.0);
        state.store.hero = Some(hero);

        state.now = 4.9;
        update(&mut state);
        assert_eq!(state.store.hero.as_ref().unwrap().health.current, 400.0);

        state.now = 5.0;
        update(&mut state);
        assert_eq!(state.store.hero.as_ref().unwrap().health.current, 430.0);
        assert_eq!(state.store.effects.len(), 1);

        state.now = 5.1;
        update(&mut state);
        assert_eq!(state.store.hero.as_ref().unwrap().health.current, 430.0);
    }

    #[test]
    fn barracks_fills_to_cap_on_interval() {
        let mut state = SimulationState::default();
        state.paths.insert(
            PathKey::new("main"),
            Path::new(vec![Vec2::new(0.0, -50.0), Vec2::new(0.0, 50.0)]),
        );
        add(
            &mut state,
            &ObjectiveDef::Barracks {
                position: Vec2::new(40.0, 0.0),
                cap: 2,
                interval: 3.0,
                patrol_path: PathKey::new("main"),
            },
        );

        update(&mut state);
        assert_eq!(state.store.troops.len(), 1);
        let first = state.store.troops.values().next().unwrap();
        assert_eq!(first.anchor, Vec2::ZERO);

        state.now = 2.9;
        update(&mut state);
        assert_eq!(state.store.troops.len(), 1);
        state.now = 3.0;
        update(&mut state);
        assert_eq!(state.store.troops.len(), 2);

        state.now = 100.0;
        update(&mut state);
        update(&mut state);
        assert_eq!(state.store.troops.len(), 2);
    }

    #[test]
    fn vault_falls_after_exact_damage_and_penalizes_once() {
        let mut state = SimulationState {
            economy: Economy::new(0, 20),
            ..Default::default()
        };
        let id = add(&mut state, &vault());
        state.store.towers.insert(
            TowerId(10),
            Tower::new(TowerId(10), TowerKind::Archer, Vec2::new(30.0, 0.0), 0, Vec2::ZERO),
        );

        for _ in 0..3 {
            damage_objective(&mut state, id, 25.0);
        }
        assert!(state.store.objectives.contains(id));
        damage_objective(&mut state, id, 25.0);
        assert!(!state.store.objectives.contains(id));
        damage_objective(&mut state, id, 25.0);

        assert_eq!(state.economy.lives, 17);
        assert!(state.store.towers.get(TowerId(10)).unwrap().disabled);
        let destroyed = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::ObjectiveDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn fallen_vault_takes_its_slots_and_garrisons() {
        let mut state = SimulationState {
            economy: Economy::new(0, 20),
            ..Default::default()
        };
        state.level.build_slots = vec![
            BuildSlot {
                position: Vec2::new(0.0, 40.0),
                rally: Vec2::new(0.0, 20.0),
            },
            BuildSlot {
                position: Vec2::new(0.0, 200.0),
                rally: Vec2::new(0.0, 180.0),
            },
        ];
        let id = add(&mut state, &vault());
        let near = state.ids.tower();
        state.store.towers.insert(
            near,
            Tower::new(near, TowerKind::Garrison, Vec2::new(0.0, 40.0), 0, Vec2::new(0.0, 20.0)),
        );
        garrison::muster(&mut state, near);
        let far = state.ids.tower();
        state.store.towers.insert(
            far,
            Tower::new(far, TowerKind::Garrison, Vec2::new(0.0, 200.0), 1, Vec2::new(0.0, 180.0)),
        );
        garrison::muster(&mut state, far);
        assert_eq!(state.store.troops.len(), 6);

        damage_objective(&mut state, id, 100.0);

        assert_eq!(state.lost_slots.iter().copied().collect::<Vec<_>>(), vec![0]);
        assert!(state.store.towers.get(near).unwrap().disabled);
        assert!(!state.store.towers.get(far).unwrap().disabled);
        assert!(
            state
                .store
                .troops
                .values()
                .all(|t| t.owner == TroopOwner::Tower(far))
        );
        assert_eq!(state.store.troops.len(), 3);
    }
}
