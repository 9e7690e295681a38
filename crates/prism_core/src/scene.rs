//! Scene container and the built-in demo scene.

use prism_math::{Aabb2, Ray2, Vec2};

use crate::csg::{circle, intersect, rect, union};
use crate::geometry::{nearest, Intersection, Node};
use crate::material::{Body, Color};

/// A scene is an optional CSG root. An empty scene is valid and renders black.
#[derive(Clone, Default)]
pub struct Scene {
    root: Option<Node>,
}

impl Scene {
    /// Create a scene from a CSG root.
    pub fn new(root: Node) -> Self {
        Self { root: Some(root) }
    }

    /// A scene with nothing in it.
    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Bounds of everything in the scene.
    pub fn bounds(&self) -> Aabb2 {
        self.root
            .as_ref()
            .map(|root| root.bounding_box())
            .unwrap_or(Aabb2::EMPTY)
    }

    /// Cast a ray and report the nearest boundary crossing ahead of `origin`.
    pub fn sample(&self, origin: Vec2, direction: Vec2) -> Intersection<'_> {
        match &self.root {
            Some(root) => nearest(root.as_ref(), &Ray2::new(origin, direction)),
            None => Intersection::miss(),
        }
    }

    /// A glass lens (circle intersected with a box) above a red and a blue
    /// light.
    pub fn lens_demo() -> Self {
        let glass = Body::new(Color::ZERO, Color::splat(0.2), 1.5, Color::splat(2.0));

        let lens = intersect(
            circle(1.1, 0.2, 0.4, glass),
            rect(1.1, 0.4, 0.4, 0.2, 0.0, glass),
        );
        let lights = union(
            circle(0.9, -0.6, 0.4, Body::emitter(Color::new(3.0, 0.2, 0.2))),
            circle(1.3, -0.6, 0.4, Body::emitter(Color::new(0.2, 0.2, 3.0))),
        );

        Self::new(union(lens, lights))
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("empty", &self.is_empty())
            .field("bounds", &self.bounds())
            .finish()
    }
}
