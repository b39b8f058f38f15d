//! Player spells: loadout cooldowns, casting, and active-cast bookkeeping.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::SimulationState;
use super::combat::projectile::{
    EffectKind, Payload, ProjectileTarget, SPAWN_EFFECT_DURATION, launch_timed, spawn_effect,
};
use super::commands::CommandRejection;
use super::ids::CastId;
use super::units::{Troop, TroopKind, TroopOwner};

// === Constants ===

pub const METEOR_DAMAGE: f32 = 120.0;
pub const METEOR_RADIUS: f32 = 50.0;
/// Seconds between the cast and the impact.
pub const METEOR_DELAY: f32 = 1.0;
/// Height the meteor falls from, for drawing.
const METEOR_DROP_HEIGHT: f32 = 300.0;

pub const REINFORCEMENT_COUNT: usize = 2;
pub const REINFORCEMENT_LIFETIME: f32 = 20.0;

pub const INSPIRE_MULTIPLIER: f32 = 1.5;
pub const INSPIRE_DURATION: f32 = 8.0;

// === Types ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpellKind {
    Meteor,
    Reinforcements,
    Inspire,
}

impl SpellKind {
    pub const ALL: &[Self] = &[Self::Meteor, Self::Reinforcements, Self::Inspire];

    #[must_use]
    pub const fn cooldown(self) -> f32 {
        match self {
            Self::Meteor => 30.0,
            Self::Reinforcements => 25.0,
            Self::Inspire => 40.0,
        }
    }

    #[must_use]
    pub const fn needs_target(self) -> bool {
        match self {
            Self::Meteor | Self::Reinforcements => true,
            Self::Inspire => false,
        }
    }
}

/// A spell in the player's loadout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub kind: SpellKind,
    pub ready_at: f32,
    pub max_cooldown: f32,
}

impl Spell {
    #[must_use]
    pub const fn new(kind: SpellKind) -> Self {
        Self {
            kind,
            ready_at: 0.0,
            max_cooldown: kind.cooldown(),
        }
    }

    #[must_use]
    pub fn cooldown_remaining(&self, now: f32) -> f32 {
        (self.ready_at - now).max(0.0)
    }
}

/// A cast whose effect is still playing out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSpell {
    pub id: CastId,
    pub kind: SpellKind,
    pub position: Option<Vec2>,
    pub started_at: f32,
    pub until: f32,
}

// === Operations ===

/// Cast `kind` at `target`, if it is in the loadout and off cooldown.
pub fn cast(
    state: &mut SimulationState,
    kind: SpellKind,
    target: Option<Vec2>,
) -> Result<CastId, CommandRejection> {
    let now = state.now;
    let spell = state
        .store
        .spells
        .iter()
        .find(|s| s.kind == kind)
        .ok_or(CommandRejection::SpellNotInLoadout(kind))?;
    let remaining = spell.cooldown_remaining(now);
    if remaining > 0.0 {
        return Err(CommandRejection::SpellOnCooldown {
            spell: kind,
            remaining,
        });
    }
    let point = match (kind.needs_target(), target) {
        (true, None) => return Err(CommandRejection::SpellNeedsTarget(kind)),
        (_, point) => point,
    };

    let id = state.ids.cast();
    let until = match kind {
        SpellKind::Meteor => {
            let at = point.unwrap_or_default();
            launch_timed(
                state,
                at + Vec2::new(0.0, METEOR_DROP_HEIGHT),
                at,
                ProjectileTarget::Point,
                Payload::Area {
                    damage: METEOR_DAMAGE,
                    radius: METEOR_RADIUS,
                },
                METEOR_DELAY,
            );
            now + METEOR_DELAY
        }
        SpellKind::Reinforcements => {
            let at = point.unwrap_or_default();
            for slot in 0..REINFORCEMENT_COUNT {
                let troop_id = state.ids.troop();
                let mut troop = Troop::new(
                    troop_id,
                    TroopKind::Militia,
                    TroopOwner::Cast(id),
                    at,
                    slot,
                    REINFORCEMENT_COUNT,
                );
                troop.expires_at = Some(now + REINFORCEMENT_LIFETIME);
                state.store.troops.insert(troop_id, troop);
            }
            spawn_effect(state, EffectKind::Spawn, at, SPAWN_EFFECT_DURATION);
            now + REINFORCEMENT_LIFETIME
        }
        SpellKind::Inspire => {
            if let Some(hero) = state.store.hero.as_mut().filter(|h| h.is_alive()) {
                hero.status.buff(INSPIRE_MULTIPLIER, INSPIRE_DURATION, now);
            }
            for troop in state.store.troops.values_mut() {
                troop.status.buff(INSPIRE_MULTIPLIER, INSPIRE_DURATION, now);
            }
            now + INSPIRE_DURATION
        }
    };

    if let Some(spell) = state.store.spells.iter_mut().find(|s| s.kind == kind) {
        spell.ready_at = now + spell.max_cooldown;
    }
    state.store.active_spells.insert(
        id,
        ActiveSpell {
            id,
            kind,
            position: point,
            started_at: now,
            until,
        },
    );
    debug!("Cast {kind:?} as {id}");
    Ok(id)
}

/// Tower damage multiplier from active Inspire casts.
#[must_use]
pub fn inspire_multiplier(state: &SimulationState) -> f32 {
    let now = state.now;
    state
        .store
        .active_spells
        .values()
        .filter(|a| a.kind == SpellKind::Inspire && now < a.until)
        .map(|_| INSPIRE_MULTIPLIER)
        .fold(1.0, f32::max)
}

/// Drop finished casts and send summoned troops home.
pub fn update(state: &mut SimulationState) {
    let now = state.now;
    state.store.active_spells.retain(|_, a| now < a.until);

    let expired: Vec<_> = state
        .store
        .troops
        .iter()
        .filter(|(_, t)| t.expires_at.is_some_and(|at| now >= at))
        .map(|(id, t)| (id, t.position))
        .collect();
    for (id, position) in expired {
        state.store.troops.remove(id);
        spawn_effect(state, EffectKind::Spawn, position, SPAWN_EFFECT_DURATION);
    }
}
