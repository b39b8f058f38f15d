//! Per-unit behavior: enemy, hero, and troop state machines.
//!
//! Each `update` walks its units in id order and reads the world through
//! [`SimulationState`], so a unit that acts earlier in the tick is seen in its
//! new position by the units after it.

pub mod enemy;
pub mod hero;
pub mod troop;

use bevy::math::Vec2;

/// Units closer than this to their destination count as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 4.0;

/// Seconds an attack animation lasts, for renderers.
pub const ATTACK_ANIMATION: f32 = 0.3;

/// Move from `from` toward `to` by at most `max_step`. Never overshoots.
#[must_use]
pub fn step_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_step.max(0.0) || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * max_step.max(0.0)
    }
}

/// Unit vector from `from` to `to`, or `fallback` if they coincide.
#[must_use]
pub fn facing(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(fallback)
}

/// Point at `distance` short of `target` on the line from `from`.
#[must_use]
pub fn stop_short(from: Vec2, target: Vec2, distance: f32) -> Vec2 {
    let offset = from - target;
    if offset.length() <= distance {
        return from;
    }
    target + offset.normalize_or_zero() * distance
}
