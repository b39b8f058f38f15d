//! Wave spawner: per-wave state machine driving timed group spawns.
//!
//! ```text
//! Idle ──(countdown or call)──▶ Spawning ──(timeout)──▶ Cooldown ──▶ Idle
//!                                   │
//!                                   └──(last wave)──▶ Exhausted
//! ```
//!
//! Every spawn and the wave's completion are entries in one [`EventSchedule`], so a
//! reset cancels them all at once.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::SimulationState;
use super::commands::CommandRejection;
use super::economy::income::early_call_bonus;
use super::events::SimEvent;
use super::path::{PathCursor, PathKey};
use super::schedule::EventSchedule;
use super::units::{Enemy, EnemyKind};

// === Constants ===

/// Lane offsets are clamped to this magnitude so nobody walks off the lane.
pub const MAX_LANE_OFFSET: f32 = 0.9;

/// Random lane jitter added to each spawn.
const SPAWN_JITTER: f32 = 0.08;

/// Groups at least this large march in staggered rows.
const LARGE_GROUP: u32 = 8;

// === Configuration ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDef {
    pub enemy: EnemyKind,
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub interval: f32,
    /// Seconds after wave start before the first spawn.
    #[serde(default)]
    pub delay: f32,
    /// Pin the group to one path instead of alternating.
    #[serde(default)]
    pub path: Option<PathKey>,
}

impl GroupDef {
    /// Seconds from wave start until this group is done spawning.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn spawn_duration(&self) -> f32 {
        self.delay + self.count as f32 * self.interval
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveDef {
    pub groups: Vec<GroupDef>,
}

impl WaveDef {
    /// Seconds from start until the wave counts as complete.
    #[must_use]
    pub fn timeout(&self, grace: f32) -> f32 {
        self.groups
            .iter()
            .map(GroupDef::spawn_duration)
            .fold(0.0, f32::max)
            + grace
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTimings {
    /// Countdown before the first wave.
    pub first_wave_delay: f32,
    /// Countdown before each later wave, during which it may be called early.
    pub countdown: f32,
    /// Lockout after a wave completes.
    pub cooldown: f32,
    /// Added to the longest group's spawn duration to get the wave timeout.
    pub completion_grace: f32,
}

impl Default for WaveTimings {
    fn default() -> Self {
        Self {
            first_wave_delay: 20.0,
            countdown: 15.0,
            cooldown: 3.0,
            completion_grace: 10.0,
        }
    }
}

// === Formation ===

/// Lane spread pattern for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationPattern {
    Wedge,
    Diamond,
    StaggeredRows,
}

impl FormationPattern {
    #[must_use]
    pub const fn for_group(kind: EnemyKind, count: u32) -> Self {
        if kind.is_boss() {
            Self::Wedge
        } else if matches!(kind, EnemyKind::Bat) {
            Self::Diamond
        } else if count >= LARGE_GROUP {
            Self::StaggeredRows
        } else {
            Self::Wedge
        }
    }

    /// Lane offset of the `index`th spawn, before jitter.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn lane_offset(self, index: u32) -> f32 {
        match self {
            Self::Wedge => [0.0, -0.35, 0.35, -0.7, 0.7][(index % 5) as usize],
            Self::Diamond => [0.0, -0.5, 0.5, 0.0][(index % 4) as usize],
            Self::StaggeredRows => {
                let column = (index % 3) as f32 - 1.0;
                let shift = if (index / 3) % 2 == 1 { 0.3 } else { 0.0 };
                column.mul_add(0.6, shift)
            }
        }
    }
}

// === State ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Waiting for the countdown; the next wave may be called early.
    Idle { starts_at: f32 },
    Spawning { wave: usize },
    Cooldown { until: f32 },
    Exhausted,
}

impl Default for WavePhase {
    fn default() -> Self {
        Self::Idle { starts_at: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveEvent {
    Spawn { wave: usize, group: usize, index: u32 },
    Complete { wave: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSpawner {
    pub phase: WavePhase,
    /// Waves completed so far.
    pub current_wave: u32,
    pub schedule: EventSchedule<WaveEvent>,
    /// Enemies spawned per group of the running wave.
    pub spawned: Vec<u32>,
}

impl WaveSpawner {
    #[must_use]
    pub fn new(first_wave_at: f32) -> Self {
        Self {
            phase: WavePhase::Idle {
                starts_at: first_wave_at,
            },
            ..Default::default()
        }
    }

    /// No waves left and nothing pending.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == WavePhase::Exhausted && self.schedule.is_empty()
    }

    /// Cancel every pending spawn and completion.
    pub fn cancel(&mut self) {
        self.schedule.clear();
        self.spawned.clear();
    }
}

// === Operations ===

/// Advance phase timers and drain due spawns.
pub fn update(state: &mut SimulationState) {
    let now = state.now;
    match state.waves.phase {
        WavePhase::Idle { starts_at } if now >= starts_at => match start_next_wave(state) {
            Ok(()) => {}
            // A wave that cannot start leaves the spawner exhausted.
            Err(reason) => debug!("Wave timer fired with nothing to start: {reason}"),
        },
        WavePhase::Cooldown { until } if now >= until => {
            state.waves.phase = WavePhase::Idle {
                starts_at: until + state.level.timings.countdown,
            };
        }
        _ => {}
    }

    for event in state.waves.schedule.drain_due(now) {
        match event {
            WaveEvent::Spawn { wave, group, index } => spawn_enemy(state, wave, group, index),
            WaveEvent::Complete { wave } => complete_wave(state, wave),
        }
    }
}

/// Begin the next wave now.
pub fn start_next_wave(state: &mut SimulationState) -> Result<(), CommandRejection> {
    match state.waves.phase {
        WavePhase::Spawning { .. } | WavePhase::Cooldown { .. } => {
            return Err(CommandRejection::WaveInProgress);
        }
        WavePhase::Exhausted => return Err(CommandRejection::NoWavesLeft),
        WavePhase::Idle { .. } => {}
    }
    let wave = state.waves.current_wave as usize;
    let Some(def) = state.level.waves.get(wave) else {
        state.waves.phase = WavePhase::Exhausted;
        return Err(CommandRejection::NoWavesLeft);
    };

    let now = state.now;
    let timeout = def.timeout(state.level.timings.completion_grace);
    let mut entries = Vec::new();
    for (group, g) in def.groups.iter().enumerate() {
        for index in 0..g.count {
            #[allow(clippy::cast_precision_loss)]
            let due = (index as f32).mul_add(g.interval, now + g.delay);
            entries.push((due, WaveEvent::Spawn { wave, group, index }));
        }
    }
    let groups = def.groups.len();

    for (due, event) in entries {
        state.waves.schedule.schedule(due, event);
    }
    state.waves.schedule.schedule(now + timeout, WaveEvent::Complete { wave });
    state.waves.spawned = vec![0; groups];
    state.waves.phase = WavePhase::Spawning { wave };

    #[allow(clippy::cast_possible_truncation)]
    let (number, total) = (wave as u32 + 1, state.level.waves.len() as u32);
    info!("Wave {number}/{total} started");
    state.emit(SimEvent::WaveStarted {
        wave: number,
        total,
    });
    Ok(())
}

/// Start the next wave ahead of its countdown and pay for the skipped time.
pub fn call_next_wave(state: &mut SimulationState) -> Result<u32, CommandRejection> {
    let WavePhase::Idle { starts_at } = state.waves.phase else {
        return Err(match state.waves.phase {
            WavePhase::Exhausted => CommandRejection::NoWavesLeft,
            _ => CommandRejection::WaveInProgress,
        });
    };
    let bonus = early_call_bonus(starts_at - state.now);
    start_next_wave(state)?;
    state.economy.earn(bonus);
    Ok(bonus)
}

fn complete_wave(state: &mut SimulationState, wave: usize) {
    if state.waves.phase != (WavePhase::Spawning { wave }) {
        return;
    }
    state.waves.current_wave += 1;
    let number = state.waves.current_wave;
    info!("Wave {number} complete");
    state.emit(SimEvent::WaveCompleted { wave: number });

    state.waves.phase = if number as usize >= state.level.waves.len() {
        WavePhase::Exhausted
    } else {
        WavePhase::Cooldown {
            until: state.now + state.level.timings.cooldown,
        }
    };
}

fn spawn_enemy(state: &mut SimulationState, wave: usize, group: usize, index: u32) {
    let Some(def) = state
        .level
        .waves
        .get(wave)
        .and_then(|w| w.groups.get(group))
        .cloned()
    else {
        return;
    };

    let path = def.path.clone().unwrap_or_else(|| {
        let order = state.paths.spawn_order(&state.level.default_path);
        if order.len() >= 2 {
            order[(index % 2) as usize].clone()
        } else {
            state.level.default_path.clone()
        }
    });

    let pattern = FormationPattern::for_group(def.enemy, def.count);
    let jitter = state.rng.range(-SPAWN_JITTER, SPAWN_JITTER);
    let lane_offset =
        (pattern.lane_offset(index) + jitter).clamp(-MAX_LANE_OFFSET, MAX_LANE_OFFSET);
    let position = state
        .paths
        .resolve(&path, PathCursor::default(), lane_offset)
        .unwrap_or_default();

    let id = state.ids.enemy();
    state
        .store
        .enemies
        .insert(id, Enemy::new(id, def.enemy, path, lane_offset, position));
    if let Some(count) = state.waves.spawned.get_mut(group) {
        *count += 1;
    }
}
