//! Path resolver: named routes and progress-to-world-position conversion.

use std::collections::BTreeMap;
use std::fmt;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier selecting which named route a unit follows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(pub String);

impl PathKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a unit is along a path: the segment it is on and how far along it (0..=1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathCursor {
    pub segment: usize,
    pub progress: f32,
}

impl PathCursor {
    #[must_use]
    pub const fn new(segment: usize, progress: f32) -> Self {
        Self { segment, progress }
    }
}

/// A polyline route through the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<Vec2>,
}

impl Path {
    #[must_use]
    pub const fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[must_use]
    pub fn segment_length(&self, segment: usize) -> f32 {
        match (self.points.get(segment), self.points.get(segment + 1)) {
            (Some(a), Some(b)) => a.distance(*b),
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn total_length(&self) -> f32 {
        (0..self.segment_count()).map(|s| self.segment_length(s)).sum()
    }

    /// World position at `cursor`, pushed sideways by `lateral` world units.
    /// Positive `lateral` is to the left of the direction of travel.
    #[must_use]
    pub fn position(&self, cursor: PathCursor, lateral: f32) -> Option<Vec2> {
        let a = *self.points.get(cursor.segment)?;
        let b = *self.points.get(cursor.segment + 1)?;
        let t = cursor.progress.clamp(0.0, 1.0);
        let dir = (b - a).normalize_or_zero();
        Some(a.lerp(b, t) + dir.perp() * lateral)
    }

    /// Unit direction of travel at `cursor`.
    #[must_use]
    pub fn direction(&self, cursor: PathCursor) -> Vec2 {
        match (
            self.points.get(cursor.segment),
            self.points.get(cursor.segment + 1),
        ) {
            (Some(a), Some(b)) => (*b - *a).normalize_or_zero(),
            _ => Vec2::ZERO,
        }
    }

    /// Distance already covered from the start of the path.
    #[must_use]
    pub fn travelled(&self, cursor: PathCursor) -> f32 {
        let before: f32 = (0..cursor.segment.min(self.segment_count()))
            .map(|s| self.segment_length(s))
            .sum();
        before + self.segment_length(cursor.segment) * cursor.progress.clamp(0.0, 1.0)
    }

    /// Distance left until the end of the path.
    #[must_use]
    pub fn remaining(&self, cursor: PathCursor) -> f32 {
        (self.total_length() - self.travelled(cursor)).max(0.0)
    }

    /// Fraction of the whole path covered, 0..=1.
    #[must_use]
    pub fn fraction(&self, cursor: PathCursor) -> f32 {
        let total = self.total_length();
        if total <= f32::EPSILON {
            return 1.0;
        }
        (self.travelled(cursor) / total).clamp(0.0, 1.0)
    }

    /// Move `cursor` forward by `distance` world units, carrying across segment
    /// boundaries. Returns `true` once the end of the path is reached.
    pub fn advance(&self, cursor: &mut PathCursor, mut distance: f32) -> bool {
        while cursor.segment < self.segment_count() {
            let length = self.segment_length(cursor.segment);
            if length <= f32::EPSILON {
                cursor.segment += 1;
                cursor.progress = 0.0;
                continue;
            }
            let left_on_segment = length * (1.0 - cursor.progress);
            if distance < left_on_segment {
                cursor.progress += distance / length;
                return false;
            }
            distance -= left_on_segment;
            if cursor.segment + 1 == self.segment_count() {
                cursor.progress = 1.0;
                return true;
            }
            cursor.segment += 1;
            cursor.progress = 0.0;
        }
        true
    }

    /// Cursor of the point on the path closest to `point`.
    #[must_use]
    pub fn nearest_cursor(&self, point: Vec2) -> PathCursor {
        let mut best = PathCursor::default();
        let mut best_dist = f32::INFINITY;
        for segment in 0..self.segment_count() {
            let a = self.points[segment];
            let b = self.points[segment + 1];
            let ab = b - a;
            let len_sq = ab.length_squared();
            let t = if len_sq <= f32::EPSILON {
                0.0
            } else {
                ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0)
            };
            let dist = a.lerp(b, t).distance_squared(point);
            if dist < best_dist {
                best_dist = dist;
                best = PathCursor::new(segment, t);
            }
        }
        best
    }
}

/// All routes of the current map plus the lateral spread applied to lane offsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathTable {
    paths: BTreeMap<PathKey, Path>,
    /// World units a lane offset of `1.0` displaces a unit from the centerline.
    pub lane_half_width: f32,
}

impl PathTable {
    #[must_use]
    pub const fn new(lane_half_width: f32) -> Self {
        Self {
            paths: BTreeMap::new(),
            lane_half_width,
        }
    }

    pub fn insert(&mut self, key: PathKey, path: Path) {
        self.paths.insert(key, path);
    }

    #[must_use]
    pub fn get(&self, key: &PathKey) -> Option<&Path> {
        self.paths.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PathKey> {
        self.paths.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Keys in the order spawns alternate over: `primary` first, then the rest.
    #[must_use]
    pub fn spawn_order(&self, primary: &PathKey) -> Vec<PathKey> {
        let mut keys: Vec<PathKey> = Vec::with_capacity(self.paths.len());
        if self.paths.contains_key(primary) {
            keys.push(primary.clone());
        }
        keys.extend(self.paths.keys().filter(|k| *k != primary).cloned());
        keys
    }

    /// World position of a unit on `key` at `cursor` with the given lane offset.
    #[must_use]
    pub fn resolve(&self, key: &PathKey, cursor: PathCursor, lane_offset: f32) -> Option<Vec2> {
        self.paths
            .get(key)?
            .position(cursor, lane_offset * self.lane_half_width)
    }
}
