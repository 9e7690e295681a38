//! Primitive solids: circles and rotated boxes.

use prism_math::{Aabb2, Ray2, Vec2};

use crate::geometry::{Boundary, Geometry, Span, Spans};
use crate::material::Body;

/// A filled circle.
pub struct Circle {
    center: Vec2,
    radius: f32,
    body: Body,
    bbox: Aabb2,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center: Vec2, radius: f32, body: Body) -> Self {
        let radius = radius.max(0.0);
        let bbox = Aabb2::from_center(center, Vec2::splat(radius));

        Self {
            center,
            radius,
            body,
            bbox,
        }
    }

    fn boundary(&self, ray: &Ray2, t: f32) -> Boundary<'_> {
        Boundary {
            t,
            normal: (ray.at(t) - self.center) / self.radius,
            body: &self.body,
        }
    }
}

impl Geometry for Circle {
    fn spans<'a>(&'a self, ray: &Ray2) -> Spans<'a> {
        let mut spans = Spans::new();

        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        // A tangent line touches the circle without entering it
        if a == 0.0 || discriminant <= 0.0 {
            return spans;
        }

        let sqrtd = discriminant.sqrt();
        let t0 = (-h - sqrtd) / a;
        let t1 = (-h + sqrtd) / a;
        spans.push(Span::new(self.boundary(ray, t0), self.boundary(ray, t1)));
        spans
    }

    fn bounding_box(&self) -> Aabb2 {
        self.bbox
    }
}

/// A filled box, rotated about its centre.
pub struct Rect {
    center: Vec2,
    rotation: f32,
    body: Body,
    local: Aabb2,
    bbox: Aabb2,
}

impl Rect {
    /// Create a new box with half width/height `half_extents`, rotated by
    /// `rotation` radians counter-clockwise.
    pub fn new(center: Vec2, half_extents: Vec2, rotation: f32, body: Body) -> Self {
        let half_extents = half_extents.max(Vec2::ZERO);
        let local = Aabb2::from_center(Vec2::ZERO, half_extents);

        // World bounds of the rotated corners
        let spin = Vec2::from_angle(rotation);
        let bbox = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
        ]
        .iter()
        .map(|corner| center + spin.rotate(*corner * half_extents))
        .fold(Aabb2::EMPTY, |bounds, p| {
            Aabb2::surrounding(&bounds, &Aabb2::from_points(p, p))
        });

        Self {
            center,
            rotation,
            body,
            local,
            bbox,
        }
    }
}

impl Geometry for Rect {
    fn spans<'a>(&'a self, ray: &Ray2) -> Spans<'a> {
        let mut spans = Spans::new();

        let local_ray = ray.to_local(self.center, self.rotation);
        let Some(slab) = self.local.clip(&local_ray) else {
            return spans;
        };

        let spin = Vec2::from_angle(self.rotation);
        spans.push(Span::new(
            Boundary {
                t: slab.t.min,
                normal: spin.rotate(slab.enter_normal),
                body: &self.body,
            },
            Boundary {
                t: slab.t.max,
                normal: spin.rotate(slab.exit_normal),
                body: &self.body,
            },
        ));
        spans
    }

    fn bounding_box(&self) -> Aabb2 {
        self.bbox
    }
}
