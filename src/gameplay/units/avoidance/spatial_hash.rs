//! Uniform-grid spatial hash for neighbor queries.

use std::collections::BTreeMap;

use bevy::math::Vec2;

/// Grid of ids bucketed by cell. Rebuilt every tick; ordered cells keep queries deterministic.
#[derive(Debug, Clone)]
pub struct SpatialHash<T> {
    cell_size: f32,
    cells: BTreeMap<(i32, i32), Vec<T>>,
}

impl<T: Copy> SpatialHash<T> {
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, id: T, position: Vec2) {
        let coords = self.cell_coords(position);
        self.cells.entry(coords).or_default().push(id);
    }

    /// Every id in a cell touching the square of half-size `radius` around
    /// `position`. Candidates only; callers still check the real distance.
    #[must_use]
    pub fn query_neighbors(&self, position: Vec2, radius: f32) -> Vec<T> {
        let min = self.cell_coords(position - Vec2::splat(radius));
        let max = self.cell_coords(position + Vec2::splat(radius));
        let mut result = Vec::new();
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                if let Some(ids) = self.cells.get(&(x, y)) {
                    result.extend(ids.iter().copied());
                }
            }
        }
        result
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_coords(&self, position: Vec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }
}
