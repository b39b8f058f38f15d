//! The player's hero: record, kinds, and stat table.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::Health;
use crate::gameplay::ids::EnemyId;
use crate::gameplay::status::StatusEffects;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeroKind {
    Warden,
    Ranger,
    Paladin,
}

impl HeroKind {
    pub const ALL: &[Self] = &[Self::Warden, Self::Ranger, Self::Paladin];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Warden => "Warden",
            Self::Ranger => "Ranger",
            Self::Paladin => "Paladin",
        }
    }
}

/// Auto-cast hero ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeroAbility {
    /// Taunt every ground enemy within `radius`.
    Taunt { radius: f32, duration: f32 },
    /// Hit up to `targets` enemies in sight at once.
    Volley { targets: usize, damage: f32 },
    /// Shield the hero once HP falls below `threshold` of max.
    Shield { duration: f32, threshold: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroStats {
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub attack_interval: f32,
    pub attack_range: f32,
    /// Radius scanned for enemies.
    pub sight: f32,
    pub ranged: bool,
    /// Max distance from home while chasing.
    pub leash: f32,
    pub respawn_delay: f32,
    pub ability: HeroAbility,
    pub ability_cooldown: f32,
    /// Fraction of max HP restored per second while idle.
    pub regen: f32,
}

#[must_use]
pub const fn hero_stats(kind: HeroKind) -> HeroStats {
    match kind {
        HeroKind::Warden => HeroStats {
            hp: 500.0,
            speed: 70.0,
            damage: 22.0,
            attack_interval: 1.0,
            attack_range: 18.0,
            sight: 90.0,
            ranged: false,
            leash: 140.0,
            respawn_delay: 12.0,
            ability: HeroAbility::Taunt {
                radius: 80.0,
                duration: 4.0,
            },
            ability_cooldown: 14.0,
            regen: 0.02,
        },
        HeroKind::Ranger => HeroStats {
            hp: 320.0,
            speed: 80.0,
            damage: 16.0,
            attack_interval: 0.8,
            attack_range: 110.0,
            sight: 150.0,
            ranged: true,
            leash: 160.0,
            respawn_delay: 10.0,
            ability: HeroAbility::Volley {
                targets: 5,
                damage: 30.0,
            },
            ability_cooldown: 12.0,
            regen: 0.02,
        },
        HeroKind::Paladin => HeroStats {
            hp: 600.0,
            speed: 60.0,
            damage: 18.0,
            attack_interval: 1.1,
            attack_range: 18.0,
            sight: 90.0,
            ranged: false,
            leash: 140.0,
            respawn_delay: 14.0,
            ability: HeroAbility::Shield {
                duration: 4.0,
                threshold: 0.6,
            },
            ability_cooldown: 18.0,
            regen: 0.03,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeroLife {
    Alive,
    Dead { respawn_at: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeroState {
    #[default]
    Idle,
    /// Walking to a player-chosen point; ignores enemies.
    Commanded,
    Engaging(EnemyId),
    Returning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub kind: HeroKind,
    pub stats: HeroStats,
    pub position: Vec2,
    pub facing: Vec2,
    pub health: Health,
    pub life: HeroLife,
    pub state: HeroState,
    pub move_target: Option<Vec2>,
    /// Where the hero returns when nothing is in sight.
    pub home: Vec2,
    pub aggro: Option<EnemyId>,
    pub ability_ready_at: f32,
    pub last_attack: Option<f32>,
    /// Attack animation end, for renderers.
    pub attacking_until: Option<f32>,
    pub status: StatusEffects,
}

impl Hero {
    #[must_use]
    pub fn new(kind: HeroKind, position: Vec2, now: f32) -> Self {
        let stats = hero_stats(kind);
        Self {
            kind,
            stats,
            position,
            facing: Vec2::X,
            health: Health::new(stats.hp),
            life: HeroLife::Alive,
            state: HeroState::Idle,
            move_target: None,
            home: position,
            aggro: None,
            ability_ready_at: now + stats.ability_cooldown,
            last_attack: None,
            attacking_until: None,
            status: StatusEffects::default(),
        }
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.life, HeroLife::Alive)
    }

    /// Damage multiplier from active buffs.
    #[must_use]
    pub fn damage(&self, now: f32) -> f32 {
        self.stats.damage * self.status.damage_multiplier(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ranged_heroes_see_further() {
        let ranger = hero_stats(HeroKind::Ranger);
        for kind in [HeroKind::Warden, HeroKind::Paladin] {
            assert!(hero_stats(kind).sight < ranger.sight);
            assert!(!hero_stats(kind).ranged);
        }
        assert!(ranger.ranged);
    }

    #[test]
    fn new_hero_is_home_and_alive() {
        let hero = Hero::new(HeroKind::Warden, Vec2::new(10.0, 20.0), 0.0);
        assert!(hero.is_alive());
        assert_eq!(hero.home, Vec2::new(10.0, 20.0));
        assert_eq!(hero.health.current, 500.0);
        assert_eq!(hero.state, HeroState::Idle);
    }
}
