//! Allied troops: record, kinds, and stat table.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::Health;
use super::formation::formation_offset;
use crate::gameplay::ids::{CastId, EnemyId, ObjectiveId, TowerId, TroopId};
use crate::gameplay::status::StatusEffects;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TroopKind {
    /// Melee infantry from garrisons and barracks.
    Footman,
    /// Stationary archer; turns to face targets but never walks.
    Sentry,
    /// Temporary spell-summoned fighter.
    Militia,
}

impl TroopKind {
    pub const ALL: &[Self] = &[Self::Footman, Self::Sentry, Self::Militia];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Footman => "Footman",
            Self::Sentry => "Sentry",
            Self::Militia => "Militia",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TroopStats {
    pub hp: f32,
    pub damage: f32,
    pub attack_interval: f32,
    pub attack_range: f32,
    pub sight: f32,
    /// Max distance from the rally anchor while chasing.
    pub leash: f32,
    pub speed: f32,
    pub ranged: bool,
    pub stationary: bool,
    /// Fraction of max HP restored per second while idle.
    pub regen: f32,
}

#[must_use]
pub const fn troop_stats(kind: TroopKind) -> TroopStats {
    match kind {
        TroopKind::Footman => TroopStats {
            hp: 120.0,
            damage: 8.0,
            attack_interval: 1.0,
            attack_range: 16.0,
            sight: 60.0,
            leash: 70.0,
            speed: 60.0,
            ranged: false,
            stationary: false,
            regen: 0.05,
        },
        TroopKind::Sentry => TroopStats {
            hp: 160.0,
            damage: 12.0,
            attack_interval: 1.2,
            attack_range: 100.0,
            sight: 100.0,
            leash: 0.0,
            speed: 0.0,
            ranged: true,
            stationary: true,
            regen: 0.03,
        },
        TroopKind::Militia => TroopStats {
            hp: 90.0,
            damage: 6.0,
            attack_interval: 1.0,
            attack_range: 16.0,
            sight: 70.0,
            leash: 80.0,
            speed: 70.0,
            ranged: false,
            stationary: false,
            regen: 0.0,
        },
    }
}

/// Who a troop belongs to. Also the group addressed by move-troop commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TroopOwner {
    Tower(TowerId),
    Cast(CastId),
    Objective(ObjectiveId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Troop {
    pub id: TroopId,
    pub kind: TroopKind,
    pub owner: TroopOwner,
    pub stats: TroopStats,
    pub position: Vec2,
    pub facing: Vec2,
    pub health: Health,
    /// Where the squad was spawned.
    pub anchor: Vec2,
    /// Player-set rally point; replaces `anchor` as the squad center when set.
    pub rally: Option<Vec2>,
    pub slot: usize,
    pub squad_size: usize,
    pub engaged: Option<EnemyId>,
    pub move_target: Option<Vec2>,
    pub last_attack: Option<f32>,
    pub status: StatusEffects,
    /// Spell troops vanish at this time.
    pub expires_at: Option<f32>,
}

impl Troop {
    #[must_use]
    pub fn new(
        id: TroopId,
        kind: TroopKind,
        owner: TroopOwner,
        anchor: Vec2,
        slot: usize,
        squad_size: usize,
    ) -> Self {
        let stats = troop_stats(kind);
        Self {
            id,
            kind,
            owner,
            stats,
            position: anchor + formation_offset(slot, squad_size),
            facing: Vec2::X,
            health: Health::new(stats.hp),
            anchor,
            rally: None,
            slot,
            squad_size,
            engaged: None,
            move_target: None,
            last_attack: None,
            status: StatusEffects::default(),
            expires_at: None,
        }
    }

    /// Center of the squad: the rally point if one was set, else the spawn anchor.
    #[must_use]
    pub fn rally_point(&self) -> Vec2 {
        self.rally.unwrap_or(self.anchor)
    }

    /// This member's resting spot in the squad formation.
    #[must_use]
    pub fn post(&self) -> Vec2 {
        self.rally_point() + formation_offset(self.slot, self.squad_size)
    }

    /// Clamp `point` to the leash circle around the rally point.
    #[must_use]
    pub fn leashed(&self, point: Vec2) -> Vec2 {
        let center = self.rally_point();
        let offset = point - center;
        let limit = self.stats.leash + self.slot_radius();
        if offset.length() > limit {
            center + offset.normalize_or_zero() * limit
        } else {
            point
        }
    }

    fn slot_radius(&self) -> f32 {
        formation_offset(self.slot, self.squad_size).length()
    }
}
