//! Testing utilities for Bevy systems.

#![cfg(test)]

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::gameplay::commands::SimCommand;
use crate::gameplay::events::SimEvent;

/// Creates a minimal app with the simulation plugin, stepping the fixed
/// schedule exactly once per update.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(crate::plugin);
    let step = app.world().resource::<Time<Fixed>>().timestep();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));
    // The first update only starts the clock.
    app.update();
    app
}

/// Queue a command for the next fixed step.
pub fn send(app: &mut App, command: SimCommand) {
    app.world_mut().write_message(command);
}

/// Every event published so far that has not been read yet.
pub fn drain_events(app: &mut App) -> Vec<SimEvent> {
    app.world_mut()
        .resource_mut::<Messages<SimEvent>>()
        .drain()
        .collect()
}

/// Helper to advance the app by one frame.
pub fn tick(app: &mut App) {
    app.update();
}

/// Helper to advance the app by multiple frames.
pub fn tick_multiple(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}
