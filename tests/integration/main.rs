//! End-to-end scenarios driving the simulation through its public API.

mod app;
mod replay;
mod scenarios;

use std::collections::BTreeMap;

use bevy::math::Vec2;
use lane_defense::gameplay::SimulationState;
use lane_defense::gameplay::events::SimEvent;
use lane_defense::gameplay::level::{BuildSlot, LevelConfig};
use lane_defense::gameplay::path::PathKey;
use lane_defense::gameplay::tick::tick;
use lane_defense::gameplay::units::EnemyKind;
use lane_defense::gameplay::waves::{GroupDef, WaveDef, WaveTimings};

/// One straight 600-unit lane along the x axis, a single build slot above its
/// middle, and a hero parked well out of the way.
pub fn lane_level(waves: Vec<WaveDef>) -> LevelConfig {
    let mut paths = BTreeMap::new();
    paths.insert(
        PathKey::new("main"),
        vec![Vec2::ZERO, Vec2::new(600.0, 0.0)],
    );
    LevelConfig {
        map_id: "lane".into(),
        seed: 11,
        starting_gold: 500,
        starting_lives: 20,
        lane_half_width: 12.0,
        default_path: PathKey::new("main"),
        paths,
        build_slots: vec![BuildSlot {
            position: Vec2::new(300.0, 40.0),
            rally: Vec2::new(300.0, 10.0),
        }],
        hero_spawn: Vec2::new(300.0, 400.0),
        timings: WaveTimings {
            first_wave_delay: 1.0,
            countdown: 5.0,
            cooldown: 2.0,
            completion_grace: 10.0,
        },
        waves,
        objectives: Vec::new(),
        hazards: Vec::new(),
    }
}

pub fn grunts(count: u32, interval: f32) -> GroupDef {
    GroupDef {
        enemy: EnemyKind::Grunt,
        count,
        interval,
        delay: 0.0,
        path: None,
    }
}

/// Tick until the level is decided or `max_ticks` pass, collecting every event.
pub fn run(state: &mut SimulationState, dt: f32, max_ticks: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        events.extend(tick(state, dt));
        if !state.is_running() {
            break;
        }
    }
    events
}
