//! The sampling contract between CSG geometry and the light-transport code.
//!
//! Every solid reports the parameter ranges a ray line spends inside it as a
//! sorted list of [`Span`]s. Combinators merge or clip those lists, and the
//! scene turns the first span ahead of the ray origin into an
//! [`Intersection`].

use std::sync::Arc;

use prism_math::{Aabb2, Ray2, Vec2};
use smallvec::SmallVec;

use crate::material::Body;

/// One crossing of a solid's boundary along a ray line.
#[derive(Clone, Copy, Debug)]
pub struct Boundary<'a> {
    /// Ray parameter of the crossing
    pub t: f32,
    /// Outward unit normal of the solid at the crossing
    pub normal: Vec2,
    /// Body whose surface is crossed
    pub body: &'a Body,
}

/// A parameter range `[enter.t, exit.t]` spent inside a solid.
#[derive(Clone, Copy, Debug)]
pub struct Span<'a> {
    pub enter: Boundary<'a>,
    pub exit: Boundary<'a>,
}

impl<'a> Span<'a> {
    pub fn new(enter: Boundary<'a>, exit: Boundary<'a>) -> Self {
        Self { enter, exit }
    }
}

/// Spans along one ray, sorted by `enter.t` and pairwise disjoint.
pub type Spans<'a> = SmallVec<[Span<'a>; 4]>;

/// A solid that can be intersected with rays.
///
/// Implementations must be pure: the scene is shared read-only between all
/// render workers.
pub trait Geometry: Send + Sync {
    /// All spans of the infinite line through `ray`, including any that lie
    /// behind the origin.
    fn spans<'a>(&'a self, ray: &Ray2) -> Spans<'a>;

    /// Bounds of the solid.
    fn bounding_box(&self) -> Aabb2;
}

/// Shared handle to a node of the CSG graph. Sub-trees may be shared by
/// several combinators.
pub type Node = Arc<dyn Geometry>;

/// A boundary point resolved to a position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitPoint {
    pub position: Vec2,
    /// Outward unit normal
    pub normal: Vec2,
    /// Ray parameter; negative for a point behind the origin
    pub distance: f32,
}

impl HitPoint {
    fn resolve(ray: &Ray2, boundary: &Boundary<'_>) -> Self {
        Self {
            position: ray.at(boundary.t),
            normal: boundary.normal,
            distance: boundary.t,
        }
    }
}

/// Result of casting a ray into the scene.
#[derive(Clone, Copy, Debug, Default)]
pub struct Intersection<'a> {
    /// Governing body, `None` when nothing was hit
    pub body: Option<&'a Body>,
    /// Whether the ray origin lies inside `body`
    pub inside: bool,
    /// Near boundary (behind the origin when `inside`)
    pub entry: HitPoint,
    /// Far boundary
    pub exit: HitPoint,
}

impl<'a> Intersection<'a> {
    /// A ray that escapes the scene.
    pub fn miss() -> Self {
        Self::default()
    }

    /// Resolve a span into an intersection record.
    pub fn from_span(ray: &Ray2, span: &Span<'a>) -> Self {
        let inside = span.enter.t < 0.0;
        let body = if inside { span.exit.body } else { span.enter.body };
        Self {
            body: Some(body),
            inside,
            entry: HitPoint::resolve(ray, &span.enter),
            exit: HitPoint::resolve(ray, &span.exit),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.body.is_some()
    }

    /// The boundary the ray is about to cross: the exit when travelling
    /// inside a body, the entry otherwise.
    pub fn crossing(&self) -> &HitPoint {
        if self.inside {
            &self.exit
        } else {
            &self.entry
        }
    }
}

/// Find the first span ahead of the ray origin.
pub fn nearest<'a>(geometry: &'a dyn Geometry, ray: &Ray2) -> Intersection<'a> {
    geometry
        .spans(ray)
        .iter()
        .find(|span| span.exit.t > 0.0)
        .map(|span| Intersection::from_span(ray, span))
        .unwrap_or_else(Intersection::miss)
}
