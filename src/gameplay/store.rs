//! Entity store: id-keyed collections for every live entity category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::combat::projectile::{Effect, Projectile};
use super::ids::{CastId, EffectId, EnemyId, ObjectiveId, ProjectileId, TowerId, TroopId};
use super::objectives::Objective;
use super::spells::{ActiveSpell, Spell};
use super::units::enemy::Enemy;
use super::units::hero::Hero;
use super::units::tower::Tower;
use super::units::troop::Troop;

/// An id-keyed collection of one entity category.
///
/// Iteration follows id order, and ids grow monotonically, so iteration order is
/// creation order. Lookups of removed ids return `None`, which callers treat as a
/// stale reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize + Ord, V: Serialize",
    deserialize = "K: Deserialize<'de> + Ord, V: Deserialize<'de>"
))]
pub struct Roster<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K, V> Default for Roster<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy, V> Roster<K, V> {
    /// Insert an entity. A duplicate id replaces the previous entry and returns it.
    pub fn insert(&mut self, id: K, value: V) -> Option<V> {
        self.entries.insert(id, value)
    }

    #[must_use]
    pub fn get(&self, id: K) -> Option<&V> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: K) -> Option<&mut V> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: K) -> Option<V> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in iteration order, collected so the caller may mutate the roster while walking them.
    #[must_use]
    pub fn ids(&self) -> Vec<K> {
        self.entries.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.values_mut()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(K, &mut V) -> bool) {
        self.entries.retain(|k, v| keep(*k, v));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Every live entity collection. Owned by `SimulationState`; nothing else holds a copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStore {
    pub enemies: Roster<EnemyId, Enemy>,
    pub towers: Roster<TowerId, Tower>,
    pub hero: Option<Hero>,
    pub troops: Roster<TroopId, Troop>,
    pub projectiles: Roster<ProjectileId, Projectile>,
    pub effects: Roster<EffectId, Effect>,
    pub objectives: Roster<ObjectiveId, Objective>,
    pub spells: Vec<Spell>,
    pub active_spells: Roster<CastId, ActiveSpell>,
}

impl EntityStore {
    /// Empty every collection in one step.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
