//! Lane defense simulation library.
//!
//! The whole game lives in [`gameplay::SimulationState`] and advances through
//! [`gameplay::tick::tick`]. [`plugin`] wires that into a Bevy app on the fixed
//! timestep: [`SimCommand`](gameplay::commands::SimCommand) messages in,
//! [`SimEvent`](gameplay::events::SimEvent) messages out.

pub mod gameplay;
pub mod prelude;
#[cfg(test)]
pub mod testing;

use bevy::prelude::*;

use crate::gameplay::SimulationState;

/// Fixed-step phases, chained in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Apply queued player commands.
    Commands,
    /// Advance the simulation one step.
    Tick,
    /// Publish whatever the step emitted.
    Events,
}

/// Run condition: a level is in progress.
#[must_use]
pub fn simulation_running(state: Res<SimulationState>) -> bool {
    state.is_running()
}

pub fn plugin(app: &mut App) {
    gameplay::plugin(app);
}
