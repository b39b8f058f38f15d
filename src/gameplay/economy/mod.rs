//! Economy: gold, lives, and the star rating earned on victory.

pub mod income;

use serde::{Deserialize, Serialize};

use super::commands::CommandRejection;

// === Constants ===

/// Gold paid per second of countdown skipped by calling a wave early.
pub const EARLY_CALL_GOLD_PER_SECOND: f32 = 2.0;

// === Types ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    pub gold: u32,
    pub lives: u32,
    pub starting_lives: u32,
}

impl Economy {
    #[must_use]
    pub const fn new(gold: u32, lives: u32) -> Self {
        Self {
            gold,
            lives,
            starting_lives: lives,
        }
    }

    /// Deduct `cost`, or reject without touching the balance.
    pub const fn spend(&mut self, cost: u32) -> Result<(), CommandRejection> {
        if self.gold < cost {
            return Err(CommandRejection::InsufficientGold {
                cost,
                available: self.gold,
            });
        }
        self.gold -= cost;
        Ok(())
    }

    pub const fn earn(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Stars for a victory with the current number of lives left.
    #[must_use]
    pub fn stars(&self) -> u8 {
        if self.starting_lives == 0 {
            return 1;
        }
        // Integer percent avoids float rounding at the thresholds.
        let kept = u64::from(self.lives) * 100 / u64::from(self.starting_lives);
        if kept >= 90 {
            3
        } else if kept >= 50 {
            2
        } else {
            1
        }
    }
}
