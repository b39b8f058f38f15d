//! Unit records and stat tables: enemies, the hero, allied troops, and towers.

pub mod avoidance;
pub mod enemy;
pub mod formation;
pub mod hero;
pub mod tower;
pub mod troop;

use serde::{Deserialize, Serialize};

pub use enemy::{Enemy, EnemyKind, EnemyState, EnemyStats, enemy_stats};
pub use hero::{Hero, HeroKind, HeroLife, HeroState, HeroStats, hero_stats};
pub use tower::{Tower, TowerKind, TowerPath, TowerStats, UpgradeChoice};
pub use troop::{Troop, TroopKind, TroopOwner, TroopStats, troop_stats};

// === Shared Types ===

/// Hit points. `current` never drops below zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount`, clamped at zero. Returns the damage actually taken.
    pub fn take(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Add `amount`, clamped at `max`. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }

    pub const fn refill(&mut self) {
        self.current = self.max;
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }
}

/// `true` when an attacker whose last swing was at `last` may swing again at `now`.
#[must_use]
pub fn cooldown_ready(last: Option<f32>, interval: f32, now: f32) -> bool {
    last.is_none_or(|last| now - last >= interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn health_new_sets_current_to_max() {
        let health = Health::new(100.0);
        assert_eq!(health.current, 100.0);
        assert_eq!(health.max, 100.0);
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut health = Health::new(50.0);
        assert_eq!(health.take(80.0), 50.0);
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn heal_clamps_at_max() {
        let mut health = Health::new(50.0);
        health.take(10.0);
        assert_eq!(health.heal(25.0), 10.0);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn cooldown_gates_on_interval() {
        assert!(cooldown_ready(None, 1.0, 0.0));
        assert!(!cooldown_ready(Some(1.0), 0.5, 1.49));
        assert!(cooldown_ready(Some(1.0), 0.5, 1.5));
    }
}
