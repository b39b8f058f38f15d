use bevy::math::Vec2;
use lane_defense::gameplay::combat::damage_hero;
use lane_defense::gameplay::combat::projectile::EffectKind;
use lane_defense::gameplay::commands::{CommandRejection, place_tower, sell_tower};
use lane_defense::gameplay::events::{LifeLossCause, SimEvent};
use lane_defense::gameplay::objectives::{ObjectiveDef, ObjectiveKind};
use lane_defense::gameplay::path::{PathCursor, PathKey};
use lane_defense::gameplay::tick::tick;
use lane_defense::gameplay::units::{Enemy, EnemyKind, Health, HeroKind, TowerKind, TroopOwner};
use lane_defense::gameplay::waves::{WaveDef, WavePhase};
use lane_defense::gameplay::{Outcome, SimulationState};
use pretty_assertions::assert_eq;

use crate::{grunts, lane_level, run};

fn put_grunt(state: &mut SimulationState, x: f32) -> lane_defense::gameplay::ids::EnemyId {
    let id = state.ids.enemy();
    let mut enemy = Enemy::new(
        id,
        EnemyKind::Grunt,
        PathKey::new("main"),
        0.0,
        Vec2::new(x, 0.0),
    );
    enemy.cursor = PathCursor::new(0, x / 600.0);
    state.store.enemies.insert(id, enemy);
    id
}

#[test]
fn one_tower_clears_a_wave_of_five() {
    let level = lane_level(vec![WaveDef {
        groups: vec![grunts(5, 1.0)],
    }]);
    let mut state = SimulationState::start(level, HeroKind::Warden, &[]);
    let tower = place_tower(&mut state, TowerKind::Archer, Vec2::new(300.0, 40.0)).unwrap();
    {
        let tower = state.store.towers.get_mut(tower).unwrap();
        tower.stats.damage = 150.0;
        tower.stats.attack_interval = 0.5;
        tower.stats.range = 200.0;
    }
    let gold = state.economy.gold;

    let events = run(&mut state, 0.05, 2_000);

    let kills: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, SimEvent::EnemyKilled { bounty: 5, .. }))
        .map(|(i, _)| i)
        .collect();
    let completions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, SimEvent::WaveCompleted { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(kills.len(), 5);
    assert_eq!(completions.len(), 1);
    assert!(kills.iter().all(|k| *k < completions[0]));
    assert_eq!(state.economy.gold, gold + 25);
    assert_eq!(state.waves.current_wave, 1);
    assert_eq!(state.waves.spawned, vec![5]);
    assert_eq!(state.economy.lives, 20);
    assert_eq!(state.outcome, Outcome::Victory);
}

#[test]
fn every_group_spawns_its_configured_count() {
    let mut second = grunts(4, 0.5);
    second.enemy = EnemyKind::Runner;
    second.delay = 2.0;
    let level = lane_level(vec![WaveDef {
        groups: vec![grunts(3, 1.0), second],
    }]);
    let mut state = SimulationState::start(level, HeroKind::Warden, &[]);

    let mut spawned_before_completion = None;
    for _ in 0..400 {
        let events = tick(&mut state, 0.05);
        if events
            .iter()
            .any(|e| matches!(e, SimEvent::WaveCompleted { .. }))
        {
            spawned_before_completion = Some(state.waves.spawned.clone());
            break;
        }
    }
    assert_eq!(spawned_before_completion, Some(vec![3, 4]));
}

#[test]
fn shield_turns_hits_into_deflections() {
    let mut state = SimulationState::start(lane_level(Vec::new()), HeroKind::Warden, &[]);
    state
        .store
        .hero
        .as_mut()
        .unwrap()
        .status
        .shield(5.0, state.now);

    for _ in 0..3 {
        damage_hero(&mut state, 20.0);
    }

    assert_eq!(state.store.hero.as_ref().unwrap().health.current, 500.0);
    let deflections = state
        .store
        .effects
        .values()
        .filter(|e| e.kind == EffectKind::Deflect)
        .count();
    assert_eq!(deflections, 3);
}

#[test]
fn vault_falls_on_the_fourth_hit_and_its_defenses_stay_down() {
    let mut level = lane_level(vec![WaveDef {
        groups: vec![grunts(1, 1.0)],
    }]);
    level.timings.first_wave_delay = 1_000.0;
    level.objectives = vec![ObjectiveDef::Vault {
        position: Vec2::new(300.0, 20.0),
        radius: 10.0,
        hp: 100.0,
        life_penalty: 3,
        defense_radius: 50.0,
    }];
    let mut state = SimulationState::start(level, HeroKind::Warden, &[]);
    let slot = Vec2::new(300.0, 40.0);
    let garrison = place_tower(&mut state, TowerKind::Garrison, slot).unwrap();
    let squad = TroopOwner::Tower(garrison);
    let grunt = put_grunt(&mut state, 300.0);
    {
        let grunt = state.store.enemies.get_mut(grunt).unwrap();
        grunt.stats.damage = 25.0;
        grunt.stats.attack_interval = 1.0;
        grunt.health = Health::new(100_000.0);
    }
    let squad_size = |state: &SimulationState| {
        state
            .store
            .troops
            .values()
            .filter(|t| t.owner == squad)
            .count()
    };
    assert_eq!(squad_size(&state), 3);

    let mut events = Vec::new();
    for _ in 0..12 {
        events.extend(tick(&mut state, 0.25));
    }
    let vault = state.store.objectives.values().next().unwrap();
    let ObjectiveKind::Vault { health, .. } = &vault.kind else {
        panic!("expected the vault, got {:?}", vault.kind);
    };
    assert_eq!(health.current, 25.0);
    assert_eq!(state.economy.lives, 20);

    for _ in 0..4 {
        events.extend(tick(&mut state, 0.25));
    }
    assert!(state.store.objectives.is_empty());
    assert_eq!(state.economy.lives, 17);
    assert!(state.store.towers.get(garrison).unwrap().disabled);
    assert_eq!(squad_size(&state), 0);

    for _ in 0..200 {
        events.extend(tick(&mut state, 0.25));
    }
    let penalties = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                SimEvent::LifeLost {
                    cause: LifeLossCause::ObjectiveLost(_),
                    ..
                }
            )
        })
        .count();
    assert_eq!(penalties, 1);
    assert_eq!(squad_size(&state), 0);
    assert!(state.store.towers.get(garrison).unwrap().disabled);

    sell_tower(&mut state, garrison).unwrap();
    let gold = state.economy.gold;
    assert_eq!(
        place_tower(&mut state, TowerKind::Archer, slot),
        Err(CommandRejection::SiteLost(0))
    );
    assert_eq!(state.economy.gold, gold);
    assert!(state.store.towers.is_empty());
}

#[test]
fn last_life_lost_means_one_defeat_and_no_victory() {
    let mut state = SimulationState::start(lane_level(Vec::new()), HeroKind::Warden, &[]);
    state.waves.phase = WavePhase::Exhausted;
    state.waves.schedule.clear();
    for _ in 0..20 {
        put_grunt(&mut state, 599.0);
    }
    state.take_events();

    let mut events = tick(&mut state, 0.1);
    for _ in 0..10 {
        events.extend(tick(&mut state, 0.1));
    }

    assert_eq!(state.economy.lives, 0);
    assert!(state.store.enemies.is_empty());
    assert_eq!(state.outcome, Outcome::Defeat);
    let defeats = events
        .iter()
        .filter(|e| matches!(e, SimEvent::Defeat { .. }))
        .count();
    assert_eq!(defeats, 1);
    assert!(!events.iter().any(|e| matches!(e, SimEvent::Victory { .. })));
}
