use crate::{Interval, Ray2, Vec2};

/// Axis-aligned bounding box in the scene plane.
///
/// Serves two purposes: the local-frame solid of the box primitive, and the
/// early-out bound that CSG combinators test before asking their children.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb2 {
    pub x: Interval,
    pub y: Interval,
}

/// Result of clipping a ray line against an [`Aabb2`].
///
/// `t` may start below zero when the ray origin is inside the box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SlabHit {
    pub t: Interval,
    /// Outward normal of the face the line enters through
    pub enter_normal: Vec2,
    /// Outward normal of the face the line leaves through
    pub exit_normal: Vec2,
}

impl Aabb2 {
    /// Create a new box from two intervals.
    pub fn new(x: Interval, y: Interval) -> Self {
        Self { x, y }
    }

    /// Create a box from two corner points.
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
        }
    }

    /// Create a box centred on `center` reaching `half_extents` along each axis.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::from_points(center - half_extents, center + half_extents)
    }

    /// Create a box that surrounds two other boxes.
    pub fn surrounding(box0: &Aabb2, box1: &Aabb2) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
        }
    }

    /// The overlap of two boxes.
    pub fn overlap(box0: &Aabb2, box1: &Aabb2) -> Self {
        Self {
            x: box0.x.intersect(&box1.x),
            y: box0.y.intersect(&box1.y),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            _ => self.y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    /// Clip the infinite line through `ray` against the box (slab method).
    ///
    /// Returns the parameter range spent inside the box together with the
    /// outward normals of the entry and exit faces.
    pub fn clip(&self, ray: &Ray2) -> Option<SlabHit> {
        if ray.direction == Vec2::ZERO {
            return None;
        }

        let mut t = Interval::UNIVERSE;
        let mut enter_normal = Vec2::ZERO;
        let mut exit_normal = Vec2::ZERO;

        for axis in 0..2 {
            let slab = self.axis_interval(axis);
            let o = ray.origin[axis];
            let d = ray.direction[axis];

            // Parallel to this slab: either always inside it or never
            if d == 0.0 {
                if !slab.contains(o) {
                    return None;
                }
                continue;
            }

            let adinv = 1.0 / d;
            let mut t0 = (slab.min - o) * adinv;
            let mut t1 = (slab.max - o) * adinv;
            let mut face = -Vec2::AXES[axis];
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
                face = -face;
            }

            if t0 > t.min {
                t.min = t0;
                enter_normal = face;
            }
            if t1 < t.max {
                t.max = t1;
                exit_normal = -face;
            }
            if t.max <= t.min {
                return None;
            }
        }

        Some(SlabHit {
            t,
            enter_normal,
            exit_normal,
        })
    }

    /// Test if a ray intersects this box within the given interval.
    pub fn hit(&self, ray: &Ray2, ray_t: Interval) -> bool {
        match self.clip(ray) {
            Some(slab) => !slab.t.intersect(&ray_t).is_empty(),
            None => false,
        }
    }

    pub const EMPTY: Aabb2 = Aabb2 {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb2 = Aabb2 {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb2::from_points(Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0));

        assert_eq!(aabb.x, Interval::new(0.0, 10.0));
        assert_eq!(aabb.y, Interval::new(0.0, 10.0));
    }

    #[test]
    fn test_aabb_surrounding_and_overlap() {
        let box1 = Aabb2::from_points(Vec2::ZERO, Vec2::splat(5.0));
        let box2 = Aabb2::from_points(Vec2::splat(3.0), Vec2::splat(10.0));

        let surrounding = Aabb2::surrounding(&box1, &box2);
        assert_eq!(surrounding.x, Interval::new(0.0, 10.0));

        let overlap = Aabb2::overlap(&box1, &box2);
        assert_eq!(overlap.x, Interval::new(3.0, 5.0));

        let far = Aabb2::from_points(Vec2::splat(20.0), Vec2::splat(30.0));
        assert!(Aabb2::overlap(&box1, &far).is_empty());
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb2::from_points(Vec2::splat(-1.0), Vec2::splat(1.0));

        // Ray pointing at center
        let ray = Ray2::new(Vec2::new(-5.0, 0.0), Vec2::X);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray2::new(Vec2::new(-5.0, 0.0), -Vec2::X);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray2::new(Vec2::new(-5.0, 3.0), Vec2::X);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_clip_normals() {
        let aabb = Aabb2::from_points(Vec2::splat(-1.0), Vec2::splat(1.0));

        let ray = Ray2::new(Vec2::new(-5.0, 0.5), Vec2::X);
        let slab = aabb.clip(&ray).unwrap();
        assert_eq!(slab.t, Interval::new(4.0, 6.0));
        assert_eq!(slab.enter_normal, -Vec2::X);
        assert_eq!(slab.exit_normal, Vec2::X);

        let ray = Ray2::new(Vec2::new(0.0, 5.0), -Vec2::Y);
        let slab = aabb.clip(&ray).unwrap();
        assert_eq!(slab.t, Interval::new(4.0, 6.0));
        assert_eq!(slab.enter_normal, Vec2::Y);
        assert_eq!(slab.exit_normal, -Vec2::Y);
    }

    #[test]
    fn test_aabb_clip_from_inside() {
        let aabb = Aabb2::from_points(Vec2::splat(-1.0), Vec2::splat(1.0));
        let ray = Ray2::new(Vec2::ZERO, Vec2::new(1.0, 1.0).normalize());

        let slab = aabb.clip(&ray).unwrap();
        assert!(slab.t.min < 0.0);
        assert!((slab.t.max - 2.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_empty_aabb_never_hits() {
        let ray = Ray2::new(Vec2::ZERO, Vec2::X);
        assert!(Aabb2::EMPTY.clip(&ray).is_none());
        assert!(Aabb2::UNIVERSE.hit(&ray, Interval::new(0.0, 1.0)));
    }
}
