use bevy::math::Vec2;
use lane_defense::gameplay::SimulationState;
use lane_defense::gameplay::commands::{SimCommand, apply};
use lane_defense::gameplay::events::SimEvent;
use lane_defense::gameplay::level::{LevelCatalog, LevelConfig};
use lane_defense::gameplay::snapshot::{load_ron, save_ron};
use lane_defense::gameplay::spells::SpellKind;
use lane_defense::gameplay::tick::tick;
use lane_defense::gameplay::units::{HeroKind, TowerKind};
use pretty_assertions::assert_eq;

const DT: f32 = 0.1;

/// Player inputs keyed by the tick they are issued before.
fn inputs(at: u64) -> Vec<SimCommand> {
    let demo = LevelConfig::demo();
    match at {
        0 => vec![
            SimCommand::PlaceTower {
                kind: TowerKind::Archer,
                position: demo.build_slots[0].position,
            },
            SimCommand::PlaceTower {
                kind: TowerKind::Garrison,
                position: demo.build_slots[5].position,
            },
        ],
        250 => vec![SimCommand::CallNextWave],
        320 => vec![SimCommand::CastSpell {
            spell: SpellKind::Meteor,
            target: Some(Vec2::new(200.0, 250.0)),
        }],
        400 => vec![SimCommand::MoveHero {
            target: Vec2::new(300.0, 110.0),
        }],
        _ => Vec::new(),
    }
}

fn play(state: &mut SimulationState, catalog: &LevelCatalog, from: u64, to: u64) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for at in from..to {
        for command in inputs(at) {
            apply(state, catalog, command);
        }
        events.extend(tick(state, DT));
    }
    events
}

fn demo_start() -> SimulationState {
    let mut state = SimulationState::start(
        LevelConfig::demo(),
        HeroKind::Ranger,
        &[SpellKind::Meteor, SpellKind::Inspire],
    );
    state.economy.gold = 1_000;
    state
}

#[test]
fn same_seed_and_inputs_give_the_same_run() {
    let catalog = LevelCatalog::default();
    let mut a = demo_start();
    let mut b = demo_start();
    assert_eq!(play(&mut a, &catalog, 0, 600), play(&mut b, &catalog, 0, 600));
    assert_eq!(a, b);
}

#[test]
fn restored_snapshot_continues_like_uninterrupted_play() {
    let catalog = LevelCatalog::default();
    let mut uninterrupted = demo_start();
    play(&mut uninterrupted, &catalog, 0, 300);

    let saved = save_ron(&uninterrupted).unwrap();
    let mut restored = load_ron(&saved).unwrap();

    let expected = play(&mut uninterrupted, &catalog, 300, 700);
    let actual = play(&mut restored, &catalog, 300, 700);
    assert!(!expected.is_empty());
    assert_eq!(actual, expected);
    assert_eq!(restored, uninterrupted);
}
