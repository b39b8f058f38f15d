//! Inbound player commands and their validation.
//!
//! A command either mutates the simulation or is rejected without touching it.
//! Rejections are logged at debug level and surfaced as
//! [`SimEvent::CommandRejected`] so a UI can show a denial.

use bevy::prelude::*;
use thiserror::Error;

use super::events::SimEvent;
use super::garrison;
use super::ids::TowerId;
use super::level::LevelCatalog;
use super::spells::{self, SpellKind};
use super::units::tower::build_cost;
use super::units::{HeroKind, HeroState, Tower, TowerKind, TroopOwner, UpgradeChoice};
use super::waves;
use super::{Outcome, SimulationState};

/// How close a placement must land to a build slot to claim it.
pub const BUILD_SLOT_TOLERANCE: f32 = 16.0;

#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimCommand {
    StartLevel {
        map_id: String,
        hero: HeroKind,
        spells: Vec<SpellKind>,
    },
    AbandonLevel,
    PlaceTower {
        kind: TowerKind,
        position: Vec2,
    },
    UpgradeTower {
        tower: TowerId,
        choice: UpgradeChoice,
    },
    SellTower {
        tower: TowerId,
    },
    CastSpell {
        spell: SpellKind,
        target: Option<Vec2>,
    },
    MoveHero {
        target: Vec2,
    },
    MoveTroops {
        group: TroopOwner,
        target: Vec2,
    },
    CallNextWave,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandRejection {
    #[error("need {cost} gold, have {available}")]
    InsufficientGold { cost: u32, available: u32 },
    #[error("no build slot at {0}")]
    NoBuildSite(Vec2),
    #[error("build slot {0} is taken")]
    SiteOccupied(usize),
    #[error("build slot {0} was lost with its vault")]
    SiteLost(usize),
    #[error("no tower {0}")]
    UnknownTower(TowerId),
    #[error("{tower} cannot take {choice:?}")]
    InvalidUpgrade {
        tower: TowerId,
        choice: UpgradeChoice,
    },
    #[error("{0:?} is not in the loadout")]
    SpellNotInLoadout(SpellKind),
    #[error("{spell:?} ready in {remaining:.1}s")]
    SpellOnCooldown { spell: SpellKind, remaining: f32 },
    #[error("{0:?} needs a target point")]
    SpellNeedsTarget(SpellKind),
    #[error("the hero is dead")]
    HeroDead,
    #[error("no hero in this level")]
    NoHero,
    #[error("no troops answer to {0:?}")]
    UnknownTroopGroup(TroopOwner),
    #[error("rally point is out of range")]
    RallyOutOfRange,
    #[error("a wave is already in progress")]
    WaveInProgress,
    #[error("no waves left")]
    NoWavesLeft,
    #[error("no level is running")]
    LevelNotRunning,
    #[error("unknown map {0:?}")]
    UnknownMap(String),
}

/// Run `command`, turning a rejection into a logged event.
pub fn apply(state: &mut SimulationState, catalog: &LevelCatalog, command: SimCommand) {
    if let Err(reason) = execute(state, catalog, command) {
        debug!("Command rejected: {reason}");
        state.emit(SimEvent::CommandRejected { reason });
    }
}

/// Run `command`. On `Err` nothing was changed.
pub fn execute(
    state: &mut SimulationState,
    catalog: &LevelCatalog,
    command: SimCommand,
) -> Result<(), CommandRejection> {
    if let SimCommand::StartLevel {
        map_id,
        hero,
        spells,
    } = command
    {
        let config = catalog
            .get(&map_id)
            .ok_or(CommandRejection::UnknownMap(map_id))?;
        *state = SimulationState::start(config.clone(), hero, &spells);
        return Ok(());
    }
    if state.outcome != Outcome::InProgress {
        return Err(CommandRejection::LevelNotRunning);
    }

    match command {
        SimCommand::StartLevel { .. } => Ok(()),
        SimCommand::AbandonLevel => {
            info!("Level abandoned");
            state.reset();
            Ok(())
        }
        SimCommand::PlaceTower { kind, position } => place_tower(state, kind, position).map(|_| ()),
        SimCommand::UpgradeTower { tower, choice } => upgrade_tower(state, tower, choice),
        SimCommand::SellTower { tower } => sell_tower(state, tower).map(|_| ()),
        SimCommand::CastSpell { spell, target } => spells::cast(state, spell, target).map(|_| ()),
        SimCommand::MoveHero { target } => move_hero(state, target),
        SimCommand::MoveTroops { group, target } => move_troops(state, group, target),
        SimCommand::CallNextWave => waves::call_next_wave(state).map(|_| ()),
    }
}

/// Build on the slot nearest `position`.
pub fn place_tower(
    state: &mut SimulationState,
    kind: TowerKind,
    position: Vec2,
) -> Result<TowerId, CommandRejection> {
    let (slot, site) = state
        .level
        .build_slots
        .iter()
        .enumerate()
        .filter(|(_, s)| s.position.distance(position) <= BUILD_SLOT_TOLERANCE)
        .min_by(|a, b| {
            a.1.position
                .distance_squared(position)
                .total_cmp(&b.1.position.distance_squared(position))
        })
        .map(|(i, s)| (i, *s))
        .ok_or(CommandRejection::NoBuildSite(position))?;
    if state.lost_slots.contains(&slot) {
        return Err(CommandRejection::SiteLost(slot));
    }
    if state.store.towers.values().any(|t| t.slot == slot) {
        return Err(CommandRejection::SiteOccupied(slot));
    }
    state.economy.spend(build_cost(kind))?;

    let id = state.ids.tower();
    state
        .store
        .towers
        .insert(id, Tower::new(id, kind, site.position, slot, site.rally));
    garrison::muster(state, id);
    info!("Built {} {id} on slot {slot}", kind.display_name());
    Ok(id)
}

pub fn upgrade_tower(
    state: &mut SimulationState,
    id: TowerId,
    choice: UpgradeChoice,
) -> Result<(), CommandRejection> {
    let tower = state
        .store
        .towers
        .get(id)
        .ok_or(CommandRejection::UnknownTower(id))?;
    let cost = tower
        .upgrade_price(choice)
        .ok_or(CommandRejection::InvalidUpgrade { tower: id, choice })?;
    state.economy.spend(cost)?;
    if let Some(tower) = state.store.towers.get_mut(id) {
        tower.apply_upgrade(choice, cost);
        debug!("Upgraded {id} with {choice:?}, level {}", tower.level);
    }
    garrison::refit(state, id);
    Ok(())
}

/// Sell a tower for part of what was spent on it. Returns the refund.
pub fn sell_tower(state: &mut SimulationState, id: TowerId) -> Result<u32, CommandRejection> {
    let tower = state
        .store
        .towers
        .remove(id)
        .ok_or(CommandRejection::UnknownTower(id))?;
    let refund = tower.sell_value();
    state.economy.earn(refund);
    let owner = TroopOwner::Tower(id);
    state.store.troops.retain(|_, t| t.owner != owner);
    info!("Sold {id} for {refund}");
    Ok(refund)
}

pub fn move_hero(state: &mut SimulationState, target: Vec2) -> Result<(), CommandRejection> {
    let hero = state.store.hero.as_mut().ok_or(CommandRejection::NoHero)?;
    if !hero.is_alive() {
        return Err(CommandRejection::HeroDead);
    }
    hero.move_target = Some(target);
    hero.state = HeroState::Commanded;
    hero.aggro = None;
    Ok(())
}

/// Re-rally a squad. Tower squads must stay within their tower's range.
pub fn move_troops(
    state: &mut SimulationState,
    group: TroopOwner,
    target: Vec2,
) -> Result<(), CommandRejection> {
    if let TroopOwner::Tower(tower_id) = group {
        let tower = state
            .store
            .towers
            .get_mut(tower_id)
            .ok_or(CommandRejection::UnknownTower(tower_id))?;
        if tower.position.distance(target) > tower.range() {
            return Err(CommandRejection::RallyOutOfRange);
        }
        if let Some(garrison) = tower.garrison.as_mut() {
            garrison.rally = target;
        }
    }

    let mut moved = 0;
    for troop in state.store.troops.values_mut() {
        if troop.owner != group {
            continue;
        }
        moved += 1;
        troop.rally = Some(target);
        troop.engaged = None;
        if !troop.stats.stationary {
            troop.move_target = Some(troop.post());
        }
    }
    if moved == 0 && !matches!(group, TroopOwner::Tower(_)) {
        return Err(CommandRejection::UnknownTroopGroup(group));
    }
    Ok(())
}
