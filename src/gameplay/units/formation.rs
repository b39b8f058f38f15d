//! Squad formation offsets around a shared rally point.

use bevy::math::Vec2;

/// Distance between neighbors in a formation.
pub const FORMATION_SPACING: f32 = 14.0;

/// Offset of member `slot` in a squad of `squad_size` from the rally point.
///
/// One member stands on the point, two stand side by side, three or more form
/// a triangle. Slots past the third repeat the triangle on a wider ring.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn formation_offset(slot: usize, squad_size: usize) -> Vec2 {
    let s = FORMATION_SPACING;
    match squad_size {
        0 | 1 => Vec2::ZERO,
        2 => {
            if slot % 2 == 0 {
                Vec2::new(-s * 0.5, 0.0)
            } else {
                Vec2::new(s * 0.5, 0.0)
            }
        }
        _ => {
            let ring = (slot / 3) as f32 + 1.0;
            let base = match slot % 3 {
                0 => Vec2::new(0.0, s * 0.6),
                1 => Vec2::new(-s, -s * 0.4),
                _ => Vec2::new(s, -s * 0.4),
            };
            base * ring
        }
    }
}
