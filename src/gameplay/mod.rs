//! Gameplay domain: the simulation state, its fixed-step tick, and the plugin
//! that drives it from commands to events.

pub mod ai;
pub mod combat;
pub mod commands;
pub mod economy;
pub mod endgame;
pub mod events;
pub mod garrison;
pub mod hazards;
pub mod ids;
pub mod level;
pub mod objectives;
pub mod path;
pub mod schedule;
pub mod snapshot;
pub mod spells;
pub mod status;
pub mod store;
pub mod tick;
pub mod units;
pub mod waves;

use std::collections::BTreeSet;

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use self::commands::SimCommand;
use self::economy::Economy;
use self::events::SimEvent;
use self::ids::IdAllocator;
use self::level::{LevelCatalog, LevelConfig};
use self::objectives::Objective;
use self::path::PathTable;
use self::snapshot::Snapshot;
use self::spells::{Spell, SpellKind};
use self::store::EntityStore;
use self::units::{Hero, HeroKind};
use self::waves::WaveSpawner;
use crate::{SimSet, simulation_running};

// === Types ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    NotStarted,
    InProgress,
    Victory,
    Defeat,
}

/// Seeded random source. Each draw reseeds from the seed and a draw counter,
/// so a restored snapshot continues the exact same sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimRng {
    pub seed: u64,
    pub draws: u64,
}

impl SimRng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    /// Uniform value in `lo..hi`; `lo` when the range is empty.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        let salt = self.draws.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut rng = StdRng::seed_from_u64(self.seed ^ salt);
        self.draws += 1;
        rng.random_range(lo..hi)
    }
}

/// Simulation speed multiplier applied to the fixed timestep.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimSpeed(pub f32);

impl Default for SimSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Everything one running level needs. The only mutable simulation state.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub level: LevelConfig,
    pub paths: PathTable,
    pub store: EntityStore,
    pub ids: IdAllocator,
    /// Seconds since the level started.
    pub now: f32,
    pub tick: u64,
    pub economy: Economy,
    pub waves: WaveSpawner,
    pub outcome: Outcome,
    pub rng: SimRng,
    /// Build slots whose guarding vault fell. Nothing can be built there again.
    pub lost_slots: BTreeSet<usize>,
    #[serde(skip)]
    events: Vec<SimEvent>,
}

impl SimulationState {
    /// Build a fresh level: paths, objectives, hero, spell loadout, and the wave timer.
    #[must_use]
    pub fn start(level: LevelConfig, hero: HeroKind, spells: &[SpellKind]) -> Self {
        let mut state = Self {
            paths: level.path_table(),
            economy: Economy::new(level.starting_gold, level.starting_lives),
            waves: WaveSpawner::new(level.timings.first_wave_delay),
            rng: SimRng::new(level.seed),
            outcome: Outcome::InProgress,
            ..Default::default()
        };

        for def in &level.objectives {
            let id = state.ids.objective();
            state.store.objectives.insert(id, Objective::from_def(id, def, 0.0));
        }
        state.store.hero = Some(Hero::new(hero, level.hero_spawn, 0.0));
        for kind in spells {
            if !state.store.spells.iter().any(|s| s.kind == *kind) {
                state.store.spells.push(Spell::new(*kind));
            }
        }

        info!(
            "Level {} started: {} waves, {} gold, {} lives",
            level.map_id,
            level.waves.len(),
            level.starting_gold,
            level.starting_lives
        );
        state.emit(SimEvent::LevelStarted {
            map_id: level.map_id.clone(),
        });
        state.level = level;
        state
    }

    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Drain every event emitted since the last call.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.outcome == Outcome::InProgress
    }

    /// Drop the level: pending spawns, every entity, the clock. Undrained events survive.
    pub fn reset(&mut self) {
        self.waves.cancel();
        let events = self.take_events();
        *self = Self {
            events,
            ..Self::default()
        };
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self)
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<SimulationState>()
        .init_resource::<SimSpeed>()
        .init_resource::<LevelCatalog>()
        .add_message::<SimCommand>()
        .add_message::<SimEvent>()
        .configure_sets(
            FixedUpdate,
            (SimSet::Commands, SimSet::Tick, SimSet::Events).chain(),
        )
        .add_systems(
            FixedUpdate,
            (
                drain_commands.in_set(SimSet::Commands),
                advance_simulation
                    .in_set(SimSet::Tick)
                    .run_if(simulation_running),
                publish_events.in_set(SimSet::Events),
            ),
        );
}

fn drain_commands(
    mut inbox: MessageReader<SimCommand>,
    catalog: Res<LevelCatalog>,
    mut state: ResMut<SimulationState>,
) {
    for command in inbox.read() {
        commands::apply(&mut state, &catalog, command.clone());
    }
}

fn advance_simulation(
    time: Res<Time<Fixed>>,
    speed: Res<SimSpeed>,
    mut state: ResMut<SimulationState>,
    mut events: MessageWriter<SimEvent>,
) {
    let dt = time.delta_secs() * speed.0.max(0.0);
    for event in tick::tick(&mut state, dt) {
        events.write(event);
    }
}

/// Forward events raised outside a tick, such as command rejections while no level runs.
fn publish_events(mut state: ResMut<SimulationState>, mut events: MessageWriter<SimEvent>) {
    for event in state.take_events() {
        events.write(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gameplay::objectives::ObjectiveKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn rng_is_reproducible_from_seed_and_draws() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        let first: Vec<f32> = (0..5).map(|_| a.range(-1.0, 1.0)).collect();
        let second: Vec<f32> = (0..5).map(|_| b.range(-1.0, 1.0)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|v| (-1.0..1.0).contains(v)));
        assert_eq!(a.draws, 5);

        let mut resumed = SimRng { seed: 7, draws: 3 };
        assert_eq!(resumed.range(-1.0, 1.0), first[3]);
    }

    #[test]
    fn empty_range_returns_low_without_drawing() {
        let mut rng = SimRng::new(1);
        assert_eq!(rng.range(2.0, 2.0), 2.0);
        assert_eq!(rng.draws, 0);
    }

    #[test]
    fn start_builds_the_level() {
        let mut state = SimulationState::start(
            LevelConfig::demo(),
            HeroKind::Paladin,
            &[SpellKind::Meteor, SpellKind::Meteor, SpellKind::Inspire],
        );
        assert_eq!(state.outcome, Outcome::InProgress);
        assert_eq!(state.economy.gold, 250);
        assert_eq!(state.economy.lives, 20);
        assert_eq!(state.store.objectives.len(), 4);
        assert!(
            state
                .store
                .objectives
                .values()
                .any(|o| matches!(o.kind, ObjectiveKind::Vault { .. }))
        );
        assert_eq!(state.store.spells.len(), 2);
        assert_eq!(
            state.store.hero.as_ref().map(|h| h.position),
            Some(state.level.hero_spawn)
        );
        assert_eq!(state.paths.keys().count(), 2);
        assert_eq!(
            state.take_events(),
            vec![SimEvent::LevelStarted {
                map_id: "demo".into()
            }]
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = SimulationState::start(LevelConfig::demo(), HeroKind::Warden, &[]);
        state.now = 30.0;
        state.reset();
        assert_eq!(state.outcome, Outcome::NotStarted);
        assert!(state.store.objectives.is_empty());
        assert!(state.store.hero.is_none());
        assert!(state.waves.schedule.is_empty());
        assert_eq!(state.now, 0.0);
        assert_eq!(state.take_events().len(), 1);
    }

    mod plugin {
        use super::*;
        use pretty_assertions::assert_eq;
        use crate::gameplay::commands::CommandRejection;
        use crate::testing::{create_test_app, drain_events, send, tick, tick_multiple};

        fn start_demo(app: &mut App) {
            send(
                app,
                SimCommand::StartLevel {
                    map_id: "demo".into(),
                    hero: HeroKind::Warden,
                    spells: vec![SpellKind::Meteor],
                },
            );
            tick(app);
        }

        #[test]
        fn start_command_begins_ticking() {
            let mut app = create_test_app();
            start_demo(&mut app);

            let state = app.world().resource::<SimulationState>();
            assert!(state.is_running());
            assert_eq!(state.tick, 1);
            assert_eq!(state.now, 1.0 / 64.0);
            assert_eq!(
                drain_events(&mut app),
                vec![SimEvent::LevelStarted {
                    map_id: "demo".into()
                }]
            );
        }

        #[test]
        fn rejection_without_a_level_is_published() {
            let mut app = create_test_app();
            send(&mut app, SimCommand::CallNextWave);
            tick(&mut app);

            assert_eq!(
                drain_events(&mut app),
                vec![SimEvent::CommandRejected {
                    reason: CommandRejection::LevelNotRunning
                }]
            );
            assert_eq!(app.world().resource::<SimulationState>().tick, 0);
        }

        #[test]
        fn speed_scales_the_step() {
            let mut app = create_test_app();
            app.insert_resource(SimSpeed(2.0));
            start_demo(&mut app);
            tick_multiple(&mut app, 3);

            let state = app.world().resource::<SimulationState>();
            assert_eq!(state.tick, 4);
            assert_eq!(state.now, 8.0 / 64.0);
        }

        #[test]
        fn abandon_stops_the_clock() {
            let mut app = create_test_app();
            start_demo(&mut app);
            send(&mut app, SimCommand::AbandonLevel);
            tick_multiple(&mut app, 2);

            let state = app.world().resource::<SimulationState>();
            assert_eq!(state.outcome, Outcome::NotStarted);
            assert_eq!(state.tick, 0);
        }
    }
}
