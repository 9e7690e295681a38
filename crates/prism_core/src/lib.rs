//! Prism Core - materials, CSG geometry and scenes for the 2D light tracer.
//!
//! This crate provides:
//!
//! - **Material model**: `Body` optical properties and the `Color` helpers
//! - **CSG geometry**: circle and box primitives, union and intersection
//! - **Sampling contract**: `Scene::sample` returns the nearest boundary crossing
//! - **Scene files**: JSON scene descriptions
//!
//! # Example
//!
//! ```
//! use prism_core::{circle, Body, Color, Scene};
//! use prism_math::Vec2;
//!
//! let scene = Scene::new(circle(0.5, 0.5, 0.25, Body::emitter(Color::ONE)));
//! let hit = scene.sample(Vec2::new(0.5, 0.5), Vec2::X);
//! assert!(hit.inside);
//! ```

pub mod csg;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod scene;
pub mod shapes;

// Re-export commonly used types
pub use csg::{circle, intersect, rect, union};
pub use geometry::{Geometry, HitPoint, Intersection, Node};
pub use loader::{load_scene, load_scene_from_str, SceneError};
pub use material::{Body, Color, ColorExt};
pub use scene::Scene;
