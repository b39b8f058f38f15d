//! Enemy record, kinds, and stat table.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::Health;
use crate::gameplay::ids::{EnemyId, ObjectiveId, TroopId};
use crate::gameplay::path::{PathCursor, PathKey};
use crate::gameplay::status::StatusEffects;

/// Types of enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Runner,
    Brute,
    Slinger,
    Bat,
    Warlord,
}

impl EnemyKind {
    pub const ALL: &[Self] = &[
        Self::Grunt,
        Self::Runner,
        Self::Brute,
        Self::Slinger,
        Self::Bat,
        Self::Warlord,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Grunt => "Grunt",
            Self::Runner => "Runner",
            Self::Brute => "Brute",
            Self::Slinger => "Slinger",
            Self::Bat => "Bat",
            Self::Warlord => "Warlord",
        }
    }

    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::Warlord)
    }
}

/// Stats for an enemy kind. Copied onto each enemy at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub hp: f32,
    /// World units per second along the path.
    pub speed: f32,
    /// Fraction of incoming damage absorbed, 0..1.
    pub armor: f32,
    pub bounty: u32,
    pub lives_cost: u32,
    pub damage: f32,
    pub attack_interval: f32,
    pub attack_range: f32,
    /// Distance at which the enemy stops to fight the hero or a troop.
    pub engage_range: f32,
    /// Ranged attackers lob projectiles instead of hitting instantly.
    pub ranged: bool,
    pub flying: bool,
}

/// Look up stats for an enemy kind.
#[must_use]
pub const fn enemy_stats(kind: EnemyKind) -> EnemyStats {
    match kind {
        EnemyKind::Grunt => EnemyStats {
            hp: 100.0,
            speed: 30.0,
            armor: 0.0,
            bounty: 5,
            lives_cost: 1,
            damage: 8.0,
            attack_interval: 1.0,
            attack_range: 16.0,
            engage_range: 24.0,
            ranged: false,
            flying: false,
        },
        EnemyKind::Runner => EnemyStats {
            hp: 70.0,
            speed: 55.0,
            armor: 0.0,
            bounty: 6,
            lives_cost: 1,
            damage: 5.0,
            attack_interval: 0.8,
            attack_range: 16.0,
            engage_range: 20.0,
            ranged: false,
            flying: false,
        },
        EnemyKind::Brute => EnemyStats {
            hp: 320.0,
            speed: 22.0,
            armor: 0.35,
            bounty: 15,
            lives_cost: 2,
            damage: 18.0,
            attack_interval: 1.4,
            attack_range: 18.0,
            engage_range: 24.0,
            ranged: false,
            flying: false,
        },
        EnemyKind::Slinger => EnemyStats {
            hp: 90.0,
            speed: 28.0,
            armor: 0.0,
            bounty: 8,
            lives_cost: 1,
            damage: 10.0,
            attack_interval: 1.5,
            attack_range: 90.0,
            engage_range: 90.0,
            ranged: true,
            flying: false,
        },
        EnemyKind::Bat => EnemyStats {
            hp: 60.0,
            speed: 60.0,
            armor: 0.0,
            bounty: 7,
            lives_cost: 1,
            damage: 0.0,
            attack_interval: 1.0,
            attack_range: 0.0,
            engage_range: 0.0,
            ranged: false,
            flying: true,
        },
        EnemyKind::Warlord => EnemyStats {
            hp: 1500.0,
            speed: 18.0,
            armor: 0.5,
            bounty: 100,
            lives_cost: 5,
            damage: 45.0,
            attack_interval: 2.0,
            attack_range: 20.0,
            engage_range: 28.0,
            ranged: false,
            flying: false,
        },
    }
}

/// What an enemy hits when it is not walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngageTarget {
    Hero,
    Troop(TroopId),
}

/// Enemy behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    PathFollowing,
    Engaging(EngageTarget),
    /// Forced onto the hero by a taunt.
    TauntedEngaging,
    AssaultingObjective(ObjectiveId),
    /// Stunned or frozen.
    Incapacitated,
}

impl EnemyState {
    /// `true` while the enemy's path progress is on hold.
    #[must_use]
    pub const fn in_combat(self) -> bool {
        matches!(
            self,
            Self::Engaging(_) | Self::TauntedEngaging | Self::AssaultingObjective(_)
        )
    }
}

/// Last attack time per target category, so switching targets does not reset the cooldown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackLog {
    pub hero: Option<f32>,
    pub troop: Option<f32>,
    pub objective: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub stats: EnemyStats,
    pub path: PathKey,
    pub cursor: PathCursor,
    /// Lateral spread, -1..=1 of the lane half-width.
    pub lane_offset: f32,
    /// World position, refreshed from the path after movement.
    pub position: Vec2,
    pub health: Health,
    pub status: StatusEffects,
    pub state: EnemyState,
    pub last_attack: AttackLog,
    /// Left the lane to answer a taunt; walks back to its cursor before moving on.
    pub rejoining: bool,
}

impl Enemy {
    #[must_use]
    pub fn new(
        id: EnemyId,
        kind: EnemyKind,
        path: PathKey,
        lane_offset: f32,
        position: Vec2,
    ) -> Self {
        let stats = enemy_stats(kind);
        Self {
            id,
            kind,
            stats,
            path,
            cursor: PathCursor::default(),
            lane_offset,
            position,
            health: Health::new(stats.hp),
            status: StatusEffects::default(),
            state: EnemyState::PathFollowing,
            last_attack: AttackLog::default(),
            rejoining: false,
        }
    }

    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.stats.flying
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_kind_has_positive_hp_and_speed() {
        for kind in EnemyKind::ALL {
            let stats = enemy_stats(*kind);
            assert!(stats.hp > 0.0, "{} has no hp", kind.display_name());
            assert!(stats.speed > 0.0, "{} cannot move", kind.display_name());
            assert!((0.0..1.0).contains(&stats.armor));
        }
    }

    #[test]
    fn only_bats_fly() {
        let fliers: Vec<_> = EnemyKind::ALL
            .iter()
            .filter(|k| enemy_stats(**k).flying)
            .collect();
        assert_eq!(fliers, vec![&EnemyKind::Bat]);
    }

    #[test]
    fn new_enemy_starts_walking_at_full_hp() {
        let enemy = Enemy::new(
            EnemyId(1),
            EnemyKind::Grunt,
            PathKey::new("main"),
            0.0,
            Vec2::ZERO,
        );
        assert_eq!(enemy.state, EnemyState::PathFollowing);
        assert_eq!(enemy.health.current, 100.0);
        assert!(!enemy.state.in_combat());
    }
}
