//! Outbound events emitted by the simulation for renderers, UI, and persistence.

use bevy::prelude::*;

use super::commands::CommandRejection;
use super::ids::{EnemyId, ObjectiveId};
use super::units::EnemyKind;

/// Why lives were lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeLossCause {
    Leak(EnemyId),
    ObjectiveLost(ObjectiveId),
}

/// Discrete things that happened during a tick, in the order they happened.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimEvent {
    LevelStarted {
        map_id: String,
    },
    /// `wave` is 1-based.
    WaveStarted {
        wave: u32,
        total: u32,
    },
    WaveCompleted {
        wave: u32,
    },
    EnemyKilled {
        enemy: EnemyId,
        kind: EnemyKind,
        bounty: u32,
    },
    LifeLost {
        amount: u32,
        remaining: u32,
        cause: LifeLossCause,
    },
    ObjectiveDestroyed {
        objective: ObjectiveId,
    },
    HeroDied {
        respawn_at: f32,
    },
    HeroRespawned,
    CommandRejected {
        reason: CommandRejection,
    },
    Victory {
        stars: u8,
        time_spent: f32,
        lives_remaining: u32,
    },
    Defeat {
        wave_reached: u32,
        time_spent: f32,
    },
}
