//! Status effect engine: time-bounded modifiers attached to enemies, the hero, and troops.
//!
//! Every effect stores an absolute expiry on the simulation clock. Expiry is
//! detected by comparing against `now`, never by counting ticks, so a variable
//! tick length (or a speed multiplier) cannot shorten or stretch an effect.

use serde::{Deserialize, Serialize};

// === Constants ===

/// Strongest slow allowed (fraction of speed removed).
pub const MAX_SLOW: f32 = 0.8;

// === Types ===

/// A speed reduction that fades linearly to nothing over its duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slow {
    /// Fraction of speed removed at the moment of application.
    pub strength: f32,
    pub applied_at: f32,
    pub until: f32,
}

impl Slow {
    /// Current fraction of speed removed.
    #[must_use]
    pub fn factor(&self, now: f32) -> f32 {
        let duration = self.until - self.applied_at;
        if duration <= 0.0 || now >= self.until {
            return 0.0;
        }
        let remaining = ((self.until - now) / duration).clamp(0.0, 1.0);
        self.strength * remaining
    }
}

/// Damage over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Burn {
    pub damage_per_second: f32,
    /// Clock value up to which burn damage has already been dealt.
    pub settled_to: f32,
    pub until: f32,
}

/// Forces an enemy to fight the hero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Taunt {
    pub until: f32,
}

/// Outgoing damage multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub damage_multiplier: f32,
    pub until: f32,
}

/// Which effect a decay pass cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Slow,
    Stun,
    Freeze,
    Burn,
    Taunt,
    Shield,
    Buff,
}

/// Result of decaying one holder's effects for a tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusDecay {
    /// Burn damage owed for the elapsed interval.
    pub burn_damage: f32,
    pub expired: Vec<StatusKind>,
}

/// All effects currently attached to one holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub slow: Option<Slow>,
    pub stunned_until: Option<f32>,
    pub frozen_until: Option<f32>,
    pub burn: Option<Burn>,
    pub taunt: Option<Taunt>,
    pub shield_until: Option<f32>,
    pub buff: Option<Buff>,
}

impl StatusEffects {
    /// Apply or refresh a slow. A weaker slow never replaces a stronger active one.
    pub fn apply_slow(&mut self, strength: f32, duration: f32, now: f32) {
        let strength = strength.clamp(0.0, MAX_SLOW);
        if let Some(active) = self.slow {
            if active.factor(now) > strength {
                return;
            }
        }
        self.slow = Some(Slow {
            strength,
            applied_at: now,
            until: now + duration,
        });
    }

    pub fn stun(&mut self, duration: f32, now: f32) {
        self.stunned_until = Some(extend(self.stunned_until, now + duration));
    }

    pub fn freeze(&mut self, duration: f32, now: f32) {
        self.frozen_until = Some(extend(self.frozen_until, now + duration));
    }

    /// Ignite, keeping the hotter burn and the later expiry.
    pub fn ignite(&mut self, damage_per_second: f32, duration: f32, now: f32) {
        let until = now + duration;
        self.burn = Some(match self.burn {
            Some(active) => Burn {
                damage_per_second: active.damage_per_second.max(damage_per_second),
                settled_to: active.settled_to,
                until: active.until.max(until),
            },
            None => Burn {
                damage_per_second,
                settled_to: now,
                until,
            },
        });
    }

    pub fn taunt(&mut self, duration: f32, now: f32) {
        let until = extend(self.taunt.map(|t| t.until), now + duration);
        self.taunt = Some(Taunt { until });
    }

    pub fn shield(&mut self, duration: f32, now: f32) {
        self.shield_until = Some(extend(self.shield_until, now + duration));
    }

    pub fn buff(&mut self, damage_multiplier: f32, duration: f32, now: f32) {
        self.buff = Some(Buff {
            damage_multiplier,
            until: now + duration,
        });
    }

    #[must_use]
    pub fn is_stunned(&self, now: f32) -> bool {
        self.stunned_until.is_some_and(|until| now < until)
    }

    #[must_use]
    pub fn is_frozen(&self, now: f32) -> bool {
        self.frozen_until.is_some_and(|until| now < until)
    }

    /// Stunned or frozen: no movement, no attacks.
    #[must_use]
    pub fn is_incapacitated(&self, now: f32) -> bool {
        self.is_stunned(now) || self.is_frozen(now)
    }

    #[must_use]
    pub fn is_taunted(&self, now: f32) -> bool {
        self.taunt.is_some_and(|t| now < t.until)
    }

    #[must_use]
    pub fn is_shielded(&self, now: f32) -> bool {
        self.shield_until.is_some_and(|until| now < until)
    }

    /// Multiplier applied to movement speed.
    #[must_use]
    pub fn speed_multiplier(&self, now: f32) -> f32 {
        if self.is_incapacitated(now) {
            return 0.0;
        }
        1.0 - self.slow.map_or(0.0, |s| s.factor(now))
    }

    /// Multiplier applied to outgoing damage.
    #[must_use]
    pub fn damage_multiplier(&self, now: f32) -> f32 {
        self.buff
            .filter(|b| now < b.until)
            .map_or(1.0, |b| b.damage_multiplier)
    }

    /// Settle burn damage up to `now` and clear every effect whose expiry has passed.
    pub fn decay(&mut self, now: f32) -> StatusDecay {
        let mut out = StatusDecay::default();

        if let Some(burn) = self.burn.as_mut() {
            let end = now.min(burn.until);
            if end > burn.settled_to {
                out.burn_damage = burn.damage_per_second * (end - burn.settled_to);
                burn.settled_to = end;
            }
        }

        if self.slow.is_some_and(|s| now >= s.until) {
            self.slow = None;
            out.expired.push(StatusKind::Slow);
        }
        if self.stunned_until.is_some_and(|until| now >= until) {
            self.stunned_until = None;
            out.expired.push(StatusKind::Stun);
        }
        if self.frozen_until.is_some_and(|until| now >= until) {
            self.frozen_until = None;
            out.expired.push(StatusKind::Freeze);
        }
        if self.burn.is_some_and(|b| now >= b.until) {
            self.burn = None;
            out.expired.push(StatusKind::Burn);
        }
        if self.taunt.is_some_and(|t| now >= t.until) {
            self.taunt = None;
            out.expired.push(StatusKind::Taunt);
        }
        if self.shield_until.is_some_and(|until| now >= until) {
            self.shield_until = None;
            out.expired.push(StatusKind::Shield);
        }
        if self.buff.is_some_and(|b| now >= b.until) {
            self.buff = None;
            out.expired.push(StatusKind::Buff);
        }
        out
    }

    /// Time left on the longest-running active effect, for display.
    #[must_use]
    pub fn longest_remaining(&self, now: f32) -> f32 {
        [
            self.slow.map(|s| s.until),
            self.stunned_until,
            self.frozen_until,
            self.burn.map(|b| b.until),
            self.taunt.map(|t| t.until),
            self.shield_until,
            self.buff.map(|b| b.until),
        ]
        .into_iter()
        .flatten()
        .map(|until| (until - now).max(0.0))
        .fold(0.0, f32::max)
    }
}

fn extend(current: Option<f32>, until: f32) -> f32 {
    current.map_or(until, |c| c.max(until))
}
