//! Boolean combinators and the scene construction API.

use std::cmp::Ordering;
use std::sync::Arc;

use prism_math::{Aabb2, Interval, Ray2, Vec2};

use crate::geometry::{Geometry, Node, Span, Spans};
use crate::material::Body;
use crate::shapes::{Circle, Rect};

/// Everything inside either child.
pub struct Union {
    a: Node,
    b: Node,
    bbox: Aabb2,
}

impl Union {
    pub fn new(a: Node, b: Node) -> Self {
        let bbox = Aabb2::surrounding(&a.bounding_box(), &b.bounding_box());
        Self { a, b, bbox }
    }
}

impl Geometry for Union {
    fn spans<'a>(&'a self, ray: &Ray2) -> Spans<'a> {
        if !self.bbox.hit(ray, Interval::UNIVERSE) {
            return Spans::new();
        }

        let mut all = self.a.spans(ray);
        all.extend(self.b.spans(ray));
        all.sort_by(|x, y| x.enter.t.partial_cmp(&y.enter.t).unwrap_or(Ordering::Equal));

        let mut merged = Spans::new();
        for span in all {
            match merged.last_mut() {
                Some(last) if span.enter.t <= last.exit.t => {
                    if span.exit.t > last.exit.t {
                        last.exit = span.exit;
                    }
                }
                _ => merged.push(span),
            }
        }
        merged
    }

    fn bounding_box(&self) -> Aabb2 {
        self.bbox
    }
}

/// Everything inside both children.
pub struct Intersect {
    a: Node,
    b: Node,
    bbox: Aabb2,
}

impl Intersect {
    pub fn new(a: Node, b: Node) -> Self {
        let bbox = Aabb2::overlap(&a.bounding_box(), &b.bounding_box());
        Self { a, b, bbox }
    }
}

impl Geometry for Intersect {
    fn spans<'a>(&'a self, ray: &Ray2) -> Spans<'a> {
        let mut out = Spans::new();
        if self.bbox.is_empty() || !self.bbox.hit(ray, Interval::UNIVERSE) {
            return out;
        }

        let a = self.a.spans(ray);
        if a.is_empty() {
            return out;
        }
        let b = self.b.spans(ray);

        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let (x, y) = (&a[i], &b[j]);
            let enter = if x.enter.t >= y.enter.t { x.enter } else { y.enter };
            let exit = if x.exit.t <= y.exit.t { x.exit } else { y.exit };
            if enter.t < exit.t {
                out.push(Span::new(enter, exit));
            }
            if x.exit.t < y.exit.t {
                i += 1;
            } else {
                j += 1;
            }
        }
        out
    }

    fn bounding_box(&self) -> Aabb2 {
        self.bbox
    }
}

/// A circle centred at `(cx, cy)`.
pub fn circle(cx: f32, cy: f32, radius: f32, body: Body) -> Node {
    Arc::new(Circle::new(Vec2::new(cx, cy), radius, body))
}

/// A box centred at `(cx, cy)` with half extents `(half_w, half_h)`, rotated
/// by `rotation` radians.
pub fn rect(cx: f32, cy: f32, half_w: f32, half_h: f32, rotation: f32, body: Body) -> Node {
    Arc::new(Rect::new(
        Vec2::new(cx, cy),
        Vec2::new(half_w, half_h),
        rotation,
        body,
    ))
}

pub fn union(a: Node, b: Node) -> Node {
    Arc::new(Union::new(a, b))
}

pub fn intersect(a: Node, b: Node) -> Node {
    Arc::new(Intersect::new(a, b))
}
