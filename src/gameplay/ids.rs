//! Typed entity ids and the allocator that hands them out.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

typed_id!(
    /// Id of a live enemy.
    EnemyId,
    "enemy"
);
typed_id!(
    /// Id of a placed tower.
    TowerId,
    "tower"
);
typed_id!(
    /// Id of an allied troop.
    TroopId,
    "troop"
);
typed_id!(
    /// Id of an in-flight projectile.
    ProjectileId,
    "projectile"
);
typed_id!(
    /// Id of a transient effect marker.
    EffectId,
    "effect"
);
typed_id!(
    /// Id of a map objective.
    ObjectiveId,
    "objective"
);
typed_id!(
    /// Id of a spell cast (also names the squad a cast produced).
    CastId,
    "cast"
);

/// Monotonic id source shared by every entity category.
///
/// Ids are never reused within a run, so a stale id can never alias a newer entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    fn bump(&mut self) -> u32 {
        self.next += 1;
        self.next
    }

    pub fn enemy(&mut self) -> EnemyId {
        EnemyId(self.bump())
    }

    pub fn tower(&mut self) -> TowerId {
        TowerId(self.bump())
    }

    pub fn troop(&mut self) -> TroopId {
        TroopId(self.bump())
    }

    pub fn projectile(&mut self) -> ProjectileId {
        ProjectileId(self.bump())
    }

    pub fn effect(&mut self) -> EffectId {
        EffectId(self.bump())
    }

    pub fn objective(&mut self) -> ObjectiveId {
        ObjectiveId(self.bump())
    }

    pub fn cast(&mut self) -> CastId {
        CastId(self.bump())
    }
}
