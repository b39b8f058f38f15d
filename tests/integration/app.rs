use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use lane_defense::prelude::*;
use pretty_assertions::assert_eq;

fn create_game_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(lane_defense::plugin);
    let step = app.world().resource::<Time<Fixed>>().timestep();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    // The first update only starts the clock.
    app.update();
    app
}

#[test]
fn app_starts_without_a_level() {
    let mut app = create_game_app();
    app.update();
    let state = app.world().resource::<SimulationState>();
    assert_eq!(state.outcome, Outcome::NotStarted);
    assert_eq!(state.tick, 0);
}

#[test]
fn commands_drive_the_level() {
    let mut app = create_game_app();
    app.world_mut().write_message(SimCommand::StartLevel {
        map_id: "demo".into(),
        hero: HeroKind::Paladin,
        spells: vec![SpellKind::Reinforcements],
    });
    app.update();
    let slot = LevelConfig::demo().build_slots[2].position;
    app.world_mut().write_message(SimCommand::PlaceTower {
        kind: TowerKind::Cannon,
        position: slot,
    });
    app.update();

    let state = app.world().resource::<SimulationState>();
    assert!(state.is_running());
    assert_eq!(state.tick, 2);
    assert_eq!(state.store.towers.len(), 1);
    assert_eq!(state.economy.gold, 250 - 120);
}

#[test]
fn unknown_map_is_rejected_publicly() {
    let mut app = create_game_app();
    app.world_mut().write_message(SimCommand::StartLevel {
        map_id: "nowhere".into(),
        hero: HeroKind::Warden,
        spells: Vec::new(),
    });
    app.update();

    let events: Vec<SimEvent> = app
        .world_mut()
        .resource_mut::<Messages<SimEvent>>()
        .drain()
        .collect();
    assert_eq!(
        events,
        vec![SimEvent::CommandRejected {
            reason: CommandRejection::UnknownMap("nowhere".into())
        }]
    );
    assert!(!app.world().resource::<SimulationState>().is_running());
}
