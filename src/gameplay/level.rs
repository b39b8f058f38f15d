//! Level configuration: map geometry, waves, objectives, and hazards.
//!
//! Read-only once a level starts. Levels are authored in RON and checked by
//! [`LevelConfig::validate`] before the simulation ever sees them.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hazards::{HazardEffect, HazardZone};
use super::objectives::ObjectiveDef;
use super::path::{Path, PathKey, PathTable};
use super::units::EnemyKind;
use super::waves::{GroupDef, WaveDef, WaveTimings};

/// Errors raised while loading or checking a level.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse level: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("level defines no paths")]
    NoPaths,
    #[error("path `{0}` needs at least two points")]
    DegeneratePath(PathKey),
    #[error("default path `{0}` is not defined")]
    UnknownDefaultPath(PathKey),
    #[error("level defines no waves")]
    NoWaves,
    #[error("wave {wave} group {group} spawns no enemies")]
    EmptyGroup { wave: usize, group: usize },
    #[error("wave {wave} group {group} has a non-positive spawn interval")]
    BadInterval { wave: usize, group: usize },
    #[error("wave {wave} group {group} references unknown path `{path}`")]
    UnknownGroupPath {
        wave: usize,
        group: usize,
        path: PathKey,
    },
    #[error("objective {index} references unknown path `{path}`")]
    UnknownObjectivePath { index: usize, path: PathKey },
    #[error("level starts with no lives")]
    NoLives,
}

/// A spot where a tower may be built, with the rally point its troops use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildSlot {
    pub position: Vec2,
    pub rally: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub map_id: String,
    #[serde(default)]
    pub seed: u64,
    pub starting_gold: u32,
    pub starting_lives: u32,
    /// World units a lane offset of 1.0 moves an enemy off the centerline.
    pub lane_half_width: f32,
    pub default_path: PathKey,
    pub paths: BTreeMap<PathKey, Vec<Vec2>>,
    pub build_slots: Vec<BuildSlot>,
    pub hero_spawn: Vec2,
    #[serde(default)]
    pub timings: WaveTimings,
    pub waves: Vec<WaveDef>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveDef>,
    #[serde(default)]
    pub hazards: Vec<HazardZone>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            map_id: String::new(),
            seed: 0,
            starting_gold: 0,
            starting_lives: 0,
            lane_half_width: 12.0,
            default_path: PathKey::new("main"),
            paths: BTreeMap::new(),
            build_slots: Vec::new(),
            hero_spawn: Vec2::ZERO,
            timings: WaveTimings::default(),
            waves: Vec::new(),
            objectives: Vec::new(),
            hazards: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Parse and validate a level from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        for (key, points) in &self.paths {
            if points.len() < 2 {
                return Err(ConfigError::DegeneratePath(key.clone()));
            }
        }
        if !self.paths.contains_key(&self.default_path) {
            return Err(ConfigError::UnknownDefaultPath(self.default_path.clone()));
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }
        for (wave, def) in self.waves.iter().enumerate() {
            for (group, g) in def.groups.iter().enumerate() {
                if g.count == 0 {
                    return Err(ConfigError::EmptyGroup { wave, group });
                }
                if g.interval <= 0.0 {
                    return Err(ConfigError::BadInterval { wave, group });
                }
                if let Some(path) = &g.path {
                    if !self.paths.contains_key(path) {
                        return Err(ConfigError::UnknownGroupPath {
                            wave,
                            group,
                            path: path.clone(),
                        });
                    }
                }
            }
        }
        for (index, objective) in self.objectives.iter().enumerate() {
            if let ObjectiveDef::Barracks { patrol_path, .. } = objective {
                if !self.paths.contains_key(patrol_path) {
                    return Err(ConfigError::UnknownObjectivePath {
                        index,
                        path: patrol_path.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the path table used by the resolver.
    #[must_use]
    pub fn path_table(&self) -> PathTable {
        let mut table = PathTable::new(self.lane_half_width);
        for (key, points) in &self.paths {
            table.insert(key.clone(), Path::new(points.clone()));
        }
        table
    }

    /// The built-in two-path demo level.
    #[must_use]
    pub fn demo() -> Self {
        let north = PathKey::new("north");
        let south = PathKey::new("south");
        let mut paths = BTreeMap::new();
        paths.insert(
            north.clone(),
            vec![
                Vec2::new(0.0, 300.0),
                Vec2::new(200.0, 300.0),
                Vec2::new(200.0, 100.0),
                Vec2::new(500.0, 100.0),
            ],
        );
        paths.insert(
            south.clone(),
            vec![
                Vec2::new(0.0, -100.0),
                Vec2::new(250.0, -100.0),
                Vec2::new(250.0, 100.0),
                Vec2::new(500.0, 100.0),
            ],
        );

        let slot = |x: f32, y: f32, rx: f32, ry: f32| BuildSlot {
            position: Vec2::new(x, y),
            rally: Vec2::new(rx, ry),
        };
        let group = |enemy: EnemyKind, count: u32, interval: f32, delay: f32| GroupDef {
            enemy,
            count,
            interval,
            delay,
            path: None,
        };

        Self {
            map_id: "demo".to_string(),
            seed: 0x5EED,
            starting_gold: 250,
            starting_lives: 20,
            lane_half_width: 12.0,
            default_path: north.clone(),
            paths,
            build_slots: vec![
                slot(150.0, 250.0, 200.0, 250.0),
                slot(250.0, 250.0, 200.0, 200.0),
                slot(150.0, 150.0, 200.0, 150.0),
                slot(300.0, 0.0, 250.0, 0.0),
                slot(200.0, -50.0, 250.0, -50.0),
                slot(350.0, 150.0, 350.0, 100.0),
                slot(400.0, 50.0, 400.0, 100.0),
            ],
            hero_spawn: Vec2::new(380.0, 120.0),
            timings: WaveTimings::default(),
            waves: vec![
                WaveDef {
                    groups: vec![group(EnemyKind::Grunt, 6, 1.2, 0.0)],
                },
                WaveDef {
                    groups: vec![
                        group(EnemyKind::Runner, 8, 0.8, 0.0),
                        group(EnemyKind::Slinger, 3, 2.0, 4.0),
                    ],
                },
                WaveDef {
                    groups: vec![
                        group(EnemyKind::Bat, 6, 1.0, 0.0),
                        group(EnemyKind::Brute, 3, 3.0, 2.0),
                    ],
                },
                WaveDef {
                    groups: vec![
                        group(EnemyKind::Grunt, 10, 0.7, 0.0),
                        GroupDef {
                            path: Some(north),
                            ..group(EnemyKind::Warlord, 1, 1.0, 6.0)
                        },
                    ],
                },
            ],
            objectives: vec![
                ObjectiveDef::Beacon {
                    position: Vec2::new(150.0, 200.0),
                    radius: 80.0,
                    range_multiplier: 1.25,
                },
                ObjectiveDef::Shrine {
                    position: Vec2::new(330.0, 150.0),
                    radius: 90.0,
                    heal: 30.0,
                    interval: 10.0,
                },
                ObjectiveDef::Barracks {
                    position: Vec2::new(100.0, 240.0),
                    cap: 2,
                    interval: 12.0,
                    patrol_path: south,
                },
                ObjectiveDef::Vault {
                    position: Vec2::new(460.0, 140.0),
                    radius: 20.0,
                    hp: 300.0,
                    life_penalty: 3,
                    defense_radius: 100.0,
                },
            ],
            hazards: vec![
                HazardZone {
                    center: Vec2::new(250.0, 0.0),
                    radius: 30.0,
                    effect: HazardEffect::Ignite {
                        damage_per_second: 6.0,
                    },
                },
                HazardZone {
                    center: Vec2::new(200.0, 200.0),
                    radius: 25.0,
                    effect: HazardEffect::Mire { slow: 0.3 },
                },
            ],
        }
    }
}

/// Every level the player may start, by map id.
#[derive(Resource, Debug, Clone)]
pub struct LevelCatalog {
    levels: BTreeMap<String, LevelConfig>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            levels: BTreeMap::new(),
        };
        catalog.insert(LevelConfig::demo());
        catalog
    }
}

impl LevelCatalog {
    /// Register a level under its own map id, replacing any previous one.
    pub fn insert(&mut self, config: LevelConfig) {
        self.levels.insert(config.map_id.clone(), config);
    }

    #[must_use]
    pub fn get(&self, map_id: &str) -> Option<&LevelConfig> {
        self.levels.get(map_id)
    }

    pub fn map_ids(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }
}
