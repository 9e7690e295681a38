//! JSON scene descriptions.
//!
//! A scene file holds an optional root shape. Shapes are externally tagged:
//!
//! ```json
//! { "root": { "union": [
//!     { "circle": { "center": [0.9, -0.6], "radius": 0.4,
//!                   "material": { "emission": [3.0, 0.2, 0.2] } } },
//!     { "rect": { "center": [1.1, 0.4], "half_extents": [0.4, 0.2],
//!                 "material": { "reflectance": [0.2, 0.2, 0.2], "eta": 1.5 } } }
//! ] } }
//! ```
//!
//! Combinators accept one or more children and fold them left to right.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::csg::{circle, intersect, rect, union};
use crate::geometry::Node;
use crate::material::{Body, Color};
use crate::scene::Scene;

/// Errors that can occur while loading a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("'{0}' needs at least one child")]
    EmptyCombinator(&'static str),
}

/// Result type for scene loading.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top level of a scene file.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct SceneDesc {
    #[serde(default)]
    pub root: Option<ShapeDesc>,
}

/// One node of the CSG tree as written in a scene file.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum ShapeDesc {
    Circle {
        center: [f32; 2],
        radius: f32,
        #[serde(default)]
        material: MaterialDesc,
    },
    Rect {
        center: [f32; 2],
        half_extents: [f32; 2],
        #[serde(default)]
        rotation: f32,
        #[serde(default)]
        material: MaterialDesc,
    },
    Union(Vec<ShapeDesc>),
    Intersection(Vec<ShapeDesc>),
}

/// Material block; every field defaults to zero.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialDesc {
    pub emission: [f32; 3],
    pub reflectance: [f32; 3],
    pub extinction: [f32; 3],
    pub eta: f32,
}

impl MaterialDesc {
    fn build(&self) -> SceneResult<Body> {
        let all = self
            .emission
            .iter()
            .chain(&self.reflectance)
            .chain(&self.extinction)
            .chain(std::iter::once(&self.eta));
        for value in all {
            if !value.is_finite() || *value < 0.0 {
                return Err(SceneError::InvalidParameter(format!(
                    "material values must be finite and non-negative, got {value}"
                )));
            }
        }

        Ok(Body::new(
            Color::from_array(self.extinction),
            Color::from_array(self.reflectance),
            self.eta,
            Color::from_array(self.emission),
        ))
    }
}

impl ShapeDesc {
    /// Build the CSG node described by this shape.
    pub fn build(&self) -> SceneResult<Node> {
        match self {
            ShapeDesc::Circle {
                center,
                radius,
                material,
            } => {
                check_finite(center, "circle center")?;
                check_positive(*radius, "circle radius")?;
                Ok(circle(center[0], center[1], *radius, material.build()?))
            }
            ShapeDesc::Rect {
                center,
                half_extents,
                rotation,
                material,
            } => {
                check_finite(center, "rect center")?;
                check_positive(half_extents[0], "rect half width")?;
                check_positive(half_extents[1], "rect half height")?;
                check_finite(&[*rotation], "rect rotation")?;
                Ok(rect(
                    center[0],
                    center[1],
                    half_extents[0],
                    half_extents[1],
                    *rotation,
                    material.build()?,
                ))
            }
            ShapeDesc::Union(children) => fold(children, "union", union),
            ShapeDesc::Intersection(children) => fold(children, "intersection", intersect),
        }
    }
}

fn fold(children: &[ShapeDesc], name: &'static str, combine: fn(Node, Node) -> Node) -> SceneResult<Node> {
    let (first, rest) = children
        .split_first()
        .ok_or(SceneError::EmptyCombinator(name))?;
    rest.iter()
        .try_fold(first.build()?, |acc, child| Ok(combine(acc, child.build()?)))
}

fn check_finite(values: &[f32], what: &str) -> SceneResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::InvalidParameter(format!("{what} must be finite")))
    }
}

fn check_positive(value: f32, what: &str) -> SceneResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidParameter(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

impl SceneDesc {
    pub fn build(&self) -> SceneResult<Scene> {
        match &self.root {
            Some(root) => Ok(Scene::new(root.build()?)),
            None => Ok(Scene::empty()),
        }
    }
}

/// Parse and build a scene from a JSON string.
pub fn load_scene_from_str(json: &str) -> SceneResult<Scene> {
    let desc: SceneDesc = serde_json::from_str(json)?;
    desc.build()
}

/// Load a scene file from disk.
pub fn load_scene<P: AsRef<Path>>(path: P) -> SceneResult<Scene> {
    let path = path.as_ref();
    log::info!("Loading scene from {}", path.display());

    let content = std::fs::read_to_string(path)?;
    let scene = load_scene_from_str(&content)?;

    log::debug!("Scene bounds: {:?}", scene.bounds());
    Ok(scene)
}
