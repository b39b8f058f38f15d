//! Projectiles and effect markers: short-lived, time-interpolated entities.
//!
//! Tower, hero, and troop attacks resolve damage the moment they fire and launch
//! a [`Payload::Visual`] projectile purely for drawing. Enemy ranged attacks and
//! meteors carry their damage and resolve it on arrival, against whatever is
//! still alive at that moment.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{DamageKind, damage_enemy, damage_hero, damage_troop, enemies_within};
use crate::gameplay::SimulationState;
use crate::gameplay::ids::{EffectId, EnemyId, ProjectileId, TroopId};

// === Constants ===

/// Travel speed of visual shots and enemy missiles (world units per second).
pub const PROJECTILE_SPEED: f32 = 240.0;

/// Shortest flight, so point-blank shots still show up for a frame or two.
const MIN_FLIGHT_TIME: f32 = 0.05;

pub const DEATH_EFFECT_DURATION: f32 = 0.6;
pub const DEFLECT_EFFECT_DURATION: f32 = 0.3;
pub const EXPLOSION_EFFECT_DURATION: f32 = 0.4;
pub const PULSE_EFFECT_DURATION: f32 = 0.8;
pub const ARC_EFFECT_DURATION: f32 = 0.2;
pub const SPAWN_EFFECT_DURATION: f32 = 0.5;

// === Types ===

/// What a projectile homes on. Stale ids are tolerated: the projectile keeps
/// flying to the last known position and resolves as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileTarget {
    Enemy(EnemyId),
    Hero,
    Troop(TroopId),
    /// Fixed ground point.
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Damage was already applied when the shot fired.
    Visual,
    Damage(f32),
    Area { damage: f32, radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub origin: Vec2,
    /// Last known target position.
    pub destination: Vec2,
    pub target: ProjectileTarget,
    pub launched_at: f32,
    pub flight_time: f32,
    pub progress: f32,
    pub payload: Payload,
}

impl Projectile {
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.origin.lerp(self.destination, self.progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Death,
    /// A hit absorbed by a shield.
    Deflect,
    Explosion { radius: f32 },
    HealPulse { radius: f32 },
    /// Chain lightning jump ending at `to`.
    ChainArc { to: Vec2 },
    Spawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub position: Vec2,
    pub started_at: f32,
    pub duration: f32,
    pub progress: f32,
}

// === Spawning ===

/// Launch a projectile from `origin` toward `destination`. Flight time follows distance.
pub fn launch(
    state: &mut SimulationState,
    origin: Vec2,
    destination: Vec2,
    target: ProjectileTarget,
    payload: Payload,
) -> ProjectileId {
    let flight_time = (origin.distance(destination) / PROJECTILE_SPEED).max(MIN_FLIGHT_TIME);
    launch_timed(state, origin, destination, target, payload, flight_time)
}

/// Launch a projectile with an explicit flight time.
pub fn launch_timed(
    state: &mut SimulationState,
    origin: Vec2,
    destination: Vec2,
    target: ProjectileTarget,
    payload: Payload,
    flight_time: f32,
) -> ProjectileId {
    let id = state.ids.projectile();
    state.store.projectiles.insert(
        id,
        Projectile {
            id,
            origin,
            destination,
            target,
            launched_at: state.now,
            flight_time: flight_time.max(MIN_FLIGHT_TIME),
            progress: 0.0,
            payload,
        },
    );
    id
}

/// Drop an effect marker at `position`.
pub fn spawn_effect(
    state: &mut SimulationState,
    kind: EffectKind,
    position: Vec2,
    duration: f32,
) -> EffectId {
    let id = state.ids.effect();
    state.store.effects.insert(
        id,
        Effect {
            id,
            kind,
            position,
            started_at: state.now,
            duration,
            progress: 0.0,
        },
    );
    id
}

// === Advancing ===

/// Move every projectile along its flight and resolve the ones that arrived.
pub fn advance_projectiles(state: &mut SimulationState) {
    let now = state.now;
    let mut arrived = Vec::new();

    for id in state.store.projectiles.ids() {
        let tracked = state
            .store
            .projectiles
            .get(id)
            .and_then(|p| target_position(state, p.target));
        let Some(projectile) = state.store.projectiles.get_mut(id) else {
            continue;
        };
        if let Some(position) = tracked {
            projectile.destination = position;
        }
        let elapsed = now - projectile.launched_at;
        projectile.progress = (elapsed / projectile.flight_time).clamp(0.0, 1.0);
        if projectile.progress >= 1.0 {
            arrived.push(id);
        }
    }

    for id in arrived {
        if let Some(projectile) = state.store.projectiles.remove(id) {
            resolve(state, &projectile);
        }
    }
}

fn target_position(state: &SimulationState, target: ProjectileTarget) -> Option<Vec2> {
    match target {
        ProjectileTarget::Enemy(id) => state.store.enemies.get(id).map(|e| e.position),
        ProjectileTarget::Troop(id) => state.store.troops.get(id).map(|t| t.position),
        ProjectileTarget::Hero => state
            .store
            .hero
            .as_ref()
            .filter(|h| h.is_alive())
            .map(|h| h.position),
        ProjectileTarget::Point => None,
    }
}

fn resolve(state: &mut SimulationState, projectile: &Projectile) {
    match projectile.payload {
        Payload::Visual => {}
        Payload::Damage(amount) => match projectile.target {
            ProjectileTarget::Enemy(id) => {
                damage_enemy(state, id, amount, DamageKind::Physical);
            }
            ProjectileTarget::Hero => damage_hero(state, amount),
            ProjectileTarget::Troop(id) => damage_troop(state, id, amount),
            ProjectileTarget::Point => {}
        },
        Payload::Area { damage, radius } => {
            let center = projectile.destination;
            for id in enemies_within(state, center, radius, true) {
                damage_enemy(state, id, damage, DamageKind::Physical);
            }
            spawn_effect(
                state,
                EffectKind::Explosion { radius },
                center,
                EXPLOSION_EFFECT_DURATION,
            );
        }
    }
}

/// Advance effect markers and drop the finished ones.
pub fn advance_effects(state: &mut SimulationState) {
    let now = state.now;
    state.store.effects.retain(|_, effect| {
        effect.progress = if effect.duration <= 0.0 {
            1.0
        } else {
            ((now - effect.started_at) / effect.duration).clamp(0.0, 1.0)
        };
        effect.progress < 1.0
    });
}
