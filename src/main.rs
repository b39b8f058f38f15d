//! Headless lane defense runner: plays one level on the fixed timestep and logs what happens.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{Level, LogPlugin};
use clap::Parser;
use lane_defense::gameplay::level::ConfigError;
use lane_defense::prelude::*;
use thiserror::Error;

/// Run a lane defense level without a window.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON level file; the built-in demo level when omitted.
    #[arg(short, long)]
    level: Option<PathBuf>,
    #[arg(long, default_value = "warden", value_parser = parse_hero)]
    hero: HeroKind,
    /// Spells to bring, repeatable.
    #[arg(long = "spell", value_parser = parse_spell)]
    spells: Vec<SpellKind>,
    /// Override the level's RNG seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulation speed multiplier.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
    /// Stop after this many ticks even if the level is undecided.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum LoadError {
    #[error("cannot read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Resource)]
struct TickLimit(Option<u64>);

fn parse_hero(name: &str) -> Result<HeroKind, String> {
    HeroKind::ALL
        .iter()
        .copied()
        .find(|kind| kind.display_name().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("unknown hero `{name}`"))
}

fn parse_spell(name: &str) -> Result<SpellKind, String> {
    SpellKind::ALL
        .iter()
        .copied()
        .find(|kind| format!("{kind:?}").eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("unknown spell `{name}`"))
}

fn load_level(path: &Path) -> Result<LevelConfig, LoadError> {
    let text = std::fs::read_to_string(path)?;
    Ok(LevelConfig::from_ron(&text)?)
}

fn main() -> AppExit {
    let args = Args::parse();

    let mut level = match &args.level {
        Some(path) => match load_level(path) {
            Ok(level) => level,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                return AppExit::error();
            }
        },
        None => LevelConfig::demo(),
    };
    if let Some(seed) = args.seed {
        level.seed = seed;
    }
    let mut catalog = LevelCatalog::default();
    catalog.insert(level.clone());

    let state = SimulationState::start(level, args.hero, &args.spells);
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 64.0,
            ))),
            LogPlugin {
                level: log_level,
                ..default()
            },
        ))
        .add_plugins(lane_defense::plugin)
        .insert_resource(catalog)
        .insert_resource(state)
        .insert_resource(SimSpeed(args.speed))
        .insert_resource(TickLimit(args.max_ticks))
        .add_systems(Update, report_events)
        .run()
}

/// Log every published event and quit once the level is decided.
fn report_events(
    mut events: MessageReader<SimEvent>,
    state: Res<SimulationState>,
    limit: Res<TickLimit>,
    mut exit: MessageWriter<AppExit>,
) {
    for event in events.read() {
        match event {
            SimEvent::Victory { .. } | SimEvent::Defeat { .. } => {
                info!("{event:?}");
                exit.write(AppExit::Success);
            }
            _ => debug!("{event:?}"),
        }
    }
    if limit.0.is_some_and(|max| state.tick >= max) {
        warn!("Stopping after {} ticks with the level undecided", state.tick);
        exit.write(AppExit::Success);
    }
}
