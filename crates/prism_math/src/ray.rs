use crate::Vec2;

/// A ray in the scene plane with an origin and a direction.
///
/// Directions produced by the tracer are unit length, but nothing here
/// relies on that: `t` is measured in multiples of `direction`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray2 {
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Ray2 {
    /// Create a new ray.
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self { origin, direction }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }

    /// Express this ray in a frame translated to `center` and rotated by `angle`.
    ///
    /// Used by primitives that are easier to intersect in their own
    /// axis-aligned frame.
    pub fn to_local(&self, center: Vec2, angle: f32) -> Ray2 {
        let inverse = Vec2::from_angle(-angle);
        Ray2::new(
            inverse.rotate(self.origin - center),
            inverse.rotate(self.direction),
        )
    }
}
