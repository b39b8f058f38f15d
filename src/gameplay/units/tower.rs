//! Player-built towers: kinds, upgrade tree, cost and stat tables.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::troop::TroopKind;
use crate::gameplay::ids::TowerId;
use crate::gameplay::schedule::EventSchedule;

// === Constants ===

/// Highest level reachable by plain upgrades. Specialization comes after.
pub const MAX_LEVEL: u8 = 3;

/// Percentage of invested gold returned on sale.
pub const SELL_REFUND_PERCENT: u32 = 60;

// === Kinds ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    Archer,
    Cannon,
    Mage,
    Frost,
    Garrison,
}

impl TowerKind {
    pub const ALL: &[Self] = &[
        Self::Archer,
        Self::Cannon,
        Self::Mage,
        Self::Frost,
        Self::Garrison,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Archer => "Archer Tower",
            Self::Cannon => "Cannon",
            Self::Mage => "Mage Tower",
            Self::Frost => "Frost Tower",
            Self::Garrison => "Garrison",
        }
    }
}

/// One-time specialization branch chosen after max level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TowerPath {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeChoice {
    Level,
    Specialize(TowerPath),
}

// === Costs ===

/// Gold cost to build a tower.
#[must_use]
pub const fn build_cost(kind: TowerKind) -> u32 {
    match kind {
        TowerKind::Archer => 70,
        TowerKind::Cannon => 120,
        TowerKind::Mage => 100,
        TowerKind::Frost => 90,
        TowerKind::Garrison => 80,
    }
}

/// Gold cost of `choice` for a tower currently at `level`.
#[must_use]
pub const fn upgrade_cost(kind: TowerKind, level: u8, choice: UpgradeChoice) -> u32 {
    match choice {
        UpgradeChoice::Level => build_cost(kind) * (level as u32 + 1) / 2,
        UpgradeChoice::Specialize(_) => build_cost(kind) * 2,
    }
}

// === Stats ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    pub range: f32,
    pub damage: f32,
    pub attack_interval: f32,
    /// Enemies hit per attack.
    pub targets: usize,
    /// Damage multiplier for every target after the first.
    pub chain_falloff: f32,
    pub splash_radius: f32,
    pub slow: f32,
    pub slow_duration: f32,
    pub freeze_duration: f32,
    pub stun_duration: f32,
    pub hits_flying: bool,
    pub troop_kind: Option<TroopKind>,
    pub squad_size: usize,
    pub respawn_delay: f32,
    /// Multiplier on garrison troop HP and damage.
    pub troop_scale: f32,
}

impl TowerStats {
    const BASE: Self = Self {
        range: 100.0,
        damage: 0.0,
        attack_interval: 1.0,
        targets: 1,
        chain_falloff: 1.0,
        splash_radius: 0.0,
        slow: 0.0,
        slow_duration: 0.0,
        freeze_duration: 0.0,
        stun_duration: 0.0,
        hits_flying: true,
        troop_kind: None,
        squad_size: 0,
        respawn_delay: 0.0,
        troop_scale: 1.0,
    };
}

/// Level-1 stats of each kind.
#[must_use]
pub const fn base_stats(kind: TowerKind) -> TowerStats {
    match kind {
        TowerKind::Archer => TowerStats {
            range: 120.0,
            damage: 12.0,
            attack_interval: 0.8,
            ..TowerStats::BASE
        },
        TowerKind::Cannon => TowerStats {
            range: 100.0,
            damage: 40.0,
            attack_interval: 2.0,
            splash_radius: 35.0,
            hits_flying: false,
            ..TowerStats::BASE
        },
        TowerKind::Mage => TowerStats {
            range: 110.0,
            damage: 30.0,
            attack_interval: 1.5,
            targets: 2,
            chain_falloff: 0.6,
            ..TowerStats::BASE
        },
        TowerKind::Frost => TowerStats {
            range: 100.0,
            damage: 6.0,
            attack_interval: 1.0,
            slow: 0.4,
            slow_duration: 2.0,
            ..TowerStats::BASE
        },
        TowerKind::Garrison => TowerStats {
            range: 90.0,
            troop_kind: Some(TroopKind::Footman),
            squad_size: 3,
            respawn_delay: 8.0,
            ..TowerStats::BASE
        },
    }
}

/// Stats for a tower of `kind` at `level`, with an optional specialization.
#[must_use]
pub fn tower_stats(kind: TowerKind, level: u8, path: Option<TowerPath>) -> TowerStats {
    let mut stats = base_stats(kind);
    let steps = f32::from(level.clamp(1, MAX_LEVEL) - 1);
    stats.damage *= 1.0 + 0.4 * steps;
    stats.range *= 1.0 + 0.1 * steps;
    stats.troop_scale *= 1.0 + 0.25 * steps;

    match (kind, path) {
        (_, None) => {}
        (TowerKind::Archer, Some(TowerPath::A)) => {
            stats.range *= 1.3;
            stats.damage *= 1.5;
        }
        (TowerKind::Archer, Some(TowerPath::B)) => stats.targets = 3,
        (TowerKind::Cannon, Some(TowerPath::A)) => {
            stats.splash_radius = 55.0;
            stats.damage *= 1.3;
        }
        (TowerKind::Cannon, Some(TowerPath::B)) => stats.stun_duration = 0.6,
        (TowerKind::Mage, Some(TowerPath::A)) => stats.targets = 4,
        (TowerKind::Mage, Some(TowerPath::B)) => stats.damage *= 1.8,
        (TowerKind::Frost, Some(TowerPath::A)) => {
            stats.slow = 0.6;
            stats.slow_duration = 3.0;
        }
        (TowerKind::Frost, Some(TowerPath::B)) => stats.freeze_duration = 1.0,
        (TowerKind::Garrison, Some(TowerPath::A)) => stats.troop_scale *= 1.5,
        (TowerKind::Garrison, Some(TowerPath::B)) => {
            stats.troop_kind = Some(TroopKind::Sentry);
            stats.squad_size = 2;
        }
    }
    stats
}

// === Tower ===

/// Troop-producing state of a garrison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Garrison {
    pub rally: Vec2,
    /// Squad slots waiting to respawn, keyed by due time.
    pub respawns: EventSchedule<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    pub id: TowerId,
    pub kind: TowerKind,
    pub position: Vec2,
    /// Index of the build slot it occupies.
    pub slot: usize,
    pub level: u8,
    pub path: Option<TowerPath>,
    pub stats: TowerStats,
    /// Gold spent on building and upgrades.
    pub invested: u32,
    pub last_attack: Option<f32>,
    /// Recomputed every tick from beacons.
    pub range_multiplier: f32,
    /// Recomputed every tick from active buffs.
    pub damage_multiplier: f32,
    /// Set for good when a vault it guards falls.
    pub disabled: bool,
    pub garrison: Option<Garrison>,
}

impl Tower {
    #[must_use]
    pub fn new(id: TowerId, kind: TowerKind, position: Vec2, slot: usize, rally: Vec2) -> Self {
        let stats = tower_stats(kind, 1, None);
        Self {
            id,
            kind,
            position,
            slot,
            level: 1,
            path: None,
            stats,
            invested: build_cost(kind),
            last_attack: None,
            range_multiplier: 1.0,
            damage_multiplier: 1.0,
            disabled: false,
            garrison: stats.troop_kind.map(|_| Garrison {
                rally,
                respawns: EventSchedule::default(),
            }),
        }
    }

    #[must_use]
    pub fn range(&self) -> f32 {
        self.stats.range * self.range_multiplier
    }

    #[must_use]
    pub fn damage(&self) -> f32 {
        self.stats.damage * self.damage_multiplier
    }

    /// Cost of `choice`, or `None` if the upgrade tree does not allow it.
    #[must_use]
    pub const fn upgrade_price(&self, choice: UpgradeChoice) -> Option<u32> {
        let allowed = match choice {
            UpgradeChoice::Level => self.level < MAX_LEVEL,
            UpgradeChoice::Specialize(_) => self.level == MAX_LEVEL && self.path.is_none(),
        };
        if allowed {
            Some(upgrade_cost(self.kind, self.level, choice))
        } else {
            None
        }
    }

    /// Apply an upgrade the caller already paid for.
    pub fn apply_upgrade(&mut self, choice: UpgradeChoice, cost: u32) {
        match choice {
            UpgradeChoice::Level => self.level += 1,
            UpgradeChoice::Specialize(path) => self.path = Some(path),
        }
        self.invested += cost;
        self.stats = tower_stats(self.kind, self.level, self.path);
    }

    #[must_use]
    pub const fn sell_value(&self) -> u32 {
        self.invested * SELL_REFUND_PERCENT / 100
    }
}
