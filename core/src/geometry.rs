//! World-space geometry shared by generation, placement, and navigation.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Tolerance, in radians, for treating a rotation as a right-angle multiple.
pub const RIGHT_ANGLE_TOLERANCE: f32 = 1e-3;

/// Point on the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal x coordinate.
    pub x: f32,
    /// Horizontal z coordinate.
    pub z: f32,
}

impl WorldPoint {
    /// Creates a point from planar coordinates.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Squared planar distance to `other`.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }
}

/// Point in world space, `y` pointing up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    /// Horizontal x coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
    /// Horizontal z coordinate.
    pub z: f32,
}

impl WorldPosition {
    /// Creates a position from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Projection onto the ground plane.
    #[must_use]
    pub const fn planar(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.z)
    }
}

/// Half-size of a box along each local axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HalfExtents {
    /// Half-size along the local x axis.
    pub x: f32,
    /// Half-size along the vertical axis.
    pub y: f32,
    /// Half-size along the local z axis.
    pub z: f32,
}

impl HalfExtents {
    /// Creates half-extents from their components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Axis-aligned half-extents of this box once rotated around the vertical axis.
    ///
    /// Rotations within [`RIGHT_ANGLE_TOLERANCE`] of an odd multiple of 90° swap
    /// the horizontal components and even multiples keep them. Any other angle
    /// yields the enclosing extents of the rotated rectangle.
    #[must_use]
    pub fn rotated_y(self, rotation_y: f32) -> Self {
        let quarter_turns = rotation_y / FRAC_PI_2;
        let nearest = quarter_turns.round();
        if ((quarter_turns - nearest) * FRAC_PI_2).abs() <= RIGHT_ANGLE_TOLERANCE {
            let odd = (nearest as i64).rem_euclid(2) == 1;
            return if odd {
                Self::new(self.z, self.y, self.x)
            } else {
                self
            };
        }

        let cos = rotation_y.cos().abs();
        let sin = rotation_y.sin().abs();
        Self::new(
            cos * self.x + sin * self.z,
            self.y,
            sin * self.x + cos * self.z,
        )
    }

    /// Axis-aligned half-extents that hold this box at every rotation around
    /// the vertical axis.
    ///
    /// Only squares and a square root are involved, so the result is identical
    /// on every IEEE-754 platform, unlike [`HalfExtents::rotated_y`] at oblique
    /// angles.
    #[must_use]
    pub fn enclosing_y(self) -> Self {
        let radius = (self.x * self.x + self.z * self.z).sqrt();
        Self::new(radius, self.y, radius)
    }
}

/// Axis-aligned rectangle on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Corner with the smallest coordinates.
    pub min: WorldPoint,
    /// Corner with the largest coordinates.
    pub max: WorldPoint,
}

impl Footprint {
    /// Creates a footprint spanning the two corners in any order.
    #[must_use]
    pub fn new(a: WorldPoint, b: WorldPoint) -> Self {
        Self {
            min: WorldPoint::new(a.x.min(b.x), a.z.min(b.z)),
            max: WorldPoint::new(a.x.max(b.x), a.z.max(b.z)),
        }
    }

    /// Footprint grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: WorldPoint::new(self.min.x - margin, self.min.z - margin),
            max: WorldPoint::new(self.max.x + margin, self.max.z + margin),
        }
    }

    /// Reports whether the interiors of the two rectangles overlap.
    #[must_use]
    pub fn intersects(&self, other: &Footprint) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Reports whether the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Area covered by the rectangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.max.x - self.min.x) * (self.max.z - self.min.z)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Corner with the smallest coordinates.
    pub min: WorldPosition,
    /// Corner with the largest coordinates.
    pub max: WorldPosition,
}

impl Aabb {
    /// Creates a box from explicit corners.
    #[must_use]
    pub const fn new(min: WorldPosition, max: WorldPosition) -> Self {
        Self { min, max }
    }

    /// Creates a box centered on `center` with the provided half-extents.
    #[must_use]
    pub fn from_center(center: WorldPosition, half: HalfExtents) -> Self {
        Self {
            min: WorldPosition::new(center.x - half.x, center.y - half.y, center.z - half.z),
            max: WorldPosition::new(center.x + half.x, center.y + half.y, center.z + half.z),
        }
    }

    /// Creates a box over a planar footprint spanning `[bottom, top]` vertically.
    #[must_use]
    pub fn from_footprint(footprint: Footprint, bottom: f32, top: f32) -> Self {
        Self {
            min: WorldPosition::new(footprint.min.x, bottom, footprint.min.z),
            max: WorldPosition::new(footprint.max.x, top, footprint.max.z),
        }
    }

    /// Projection onto the ground plane.
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint {
            min: self.min.planar(),
            max: self.max.planar(),
        }
    }

    /// Box grown by `margin` along both horizontal axes.
    #[must_use]
    pub fn expanded_horizontally(&self, margin: f32) -> Self {
        Self {
            min: WorldPosition::new(self.min.x - margin, self.min.y, self.min.z - margin),
            max: WorldPosition::new(self.max.x + margin, self.max.y, self.max.z + margin),
        }
    }

    /// Reports whether the interiors of the two boxes overlap.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_4, PI};

    #[test]
    fn right_angle_rotation_swaps_horizontal_extents() {
        let half = HalfExtents::new(1.5, 0.6, 0.3);
        assert_eq!(half.rotated_y(FRAC_PI_2), HalfExtents::new(0.3, 0.6, 1.5));
        assert_eq!(half.rotated_y(-FRAC_PI_2), HalfExtents::new(0.3, 0.6, 1.5));
        assert_eq!(half.rotated_y(PI), half);
        assert_eq!(half.rotated_y(0.0), half);
    }

    #[test]
    fn oblique_rotation_encloses_rectangle() {
        let half = HalfExtents::new(1.0, 0.5, 1.0);
        let rotated = half.rotated_y(FRAC_PI_4);
        let expected = std::f32::consts::SQRT_2;
        assert!((rotated.x - expected).abs() < 1e-5);
        assert!((rotated.z - expected).abs() < 1e-5);
        assert_eq!(rotated.y, 0.5);
    }

    #[test]
    fn enclosing_extents_hold_every_rotation() {
        let half = HalfExtents::new(0.75, 0.75, 0.75);
        let enclosing = half.enclosing_y();
        assert_eq!(enclosing, HalfExtents::new(1.125_f32.sqrt(), 0.75, 1.125_f32.sqrt()));

        for step in 0..64 {
            let rotated = half.rotated_y(step as f32 * 0.1);
            assert!(rotated.x <= enclosing.x + 1e-6);
            assert!(rotated.z <= enclosing.z + 1e-6);
        }
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let left = Aabb::from_footprint(
            Footprint::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(1.0, 1.0)),
            0.0,
            1.0,
        );
        let right = Aabb::from_footprint(
            Footprint::new(WorldPoint::new(1.0, 0.0), WorldPoint::new(2.0, 1.0)),
            0.0,
            1.0,
        );
        assert!(!left.intersects(&right));
        assert!(left.expanded_horizontally(0.1).intersects(&right));
    }

    #[test]
    fn footprint_normalizes_corners() {
        let footprint = Footprint::new(WorldPoint::new(3.0, -1.0), WorldPoint::new(2.0, 1.0));
        assert_eq!(footprint.min, WorldPoint::new(2.0, -1.0));
        assert_eq!(footprint.max, WorldPoint::new(3.0, 1.0));
        assert_eq!(footprint.area(), 2.0);
        assert!(footprint.contains(WorldPoint::new(2.5, 0.0)));
    }
}
