//! Core light tracing.
//!
//! Implements the recursive tracer and the point sampler:
//! - Emission, Fresnel-weighted refraction and mirror reflection per boundary
//! - Beer-Lambert absorption over every travelled segment
//! - Stratified angular jitter around the sample point

use std::f32::consts::TAU;

use prism_core::{Color, ColorExt, Scene};
use prism_math::Vec2;
use rand::{Rng, RngCore};

use crate::optics::{attenuate, fresnel, reflect, refract};

/// Rays cast per sample point.
pub const SAMPLES: u32 = 256;

/// Recursion depth at which reflection and refraction stop.
pub const MAX_DEPTH: u32 = 5;

/// Offset along the normal for rays leaving a boundary.
pub const BIAS: f32 = 1e-4;

/// Decides whether a reflectance is strong enough to spawn a reflected ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflectanceGate {
    /// Every channel must be positive
    #[default]
    AllChannels,
    /// One positive channel is enough
    AnyChannel,
}

impl ReflectanceGate {
    #[inline]
    pub fn admits(self, reflectance: Color) -> bool {
        match self {
            ReflectanceGate::AllChannels => reflectance.is_valid_reflectance(),
            ReflectanceGate::AnyChannel => reflectance.any_positive(),
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Rays per sample point
    pub samples: u32,
    /// Maximum reflection/refraction depth
    pub max_depth: u32,
    /// Normal offset for secondary rays
    pub bias: f32,
    /// Reflection branch predicate
    pub reflectance_gate: ReflectanceGate,
    /// Base seed for the per-worker generators; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: SAMPLES,
            max_depth: MAX_DEPTH,
            bias: BIAS,
            reflectance_gate: ReflectanceGate::default(),
            seed: None,
        }
    }
}

impl RenderConfig {
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_reflectance_gate(mut self, gate: ReflectanceGate) -> Self {
        self.reflectance_gate = gate;
        self
    }
}

/// Compute the radiance arriving at `origin` from `direction`.
///
/// The ray picks up the emission of the body it reaches, then (below the
/// depth limit) branches into a refracted and a reflected ray at the boundary
/// it is crossing. Everything is attenuated by the absorption of the segment
/// just travelled.
pub fn trace(
    scene: &Scene,
    origin: Vec2,
    direction: Vec2,
    depth: u32,
    config: &RenderConfig,
) -> Color {
    let hit = scene.sample(origin, direction);
    let Some(body) = hit.body else {
        return Color::ZERO;
    };

    let crossing = hit.crossing();
    let mut sum = body.emission;

    if depth < config.max_depth {
        // Shading normal faces the incoming ray
        let normal = if hit.inside {
            -crossing.normal
        } else {
            crossing.normal
        };
        let pos = crossing.position;
        let idotn = direction.dot(normal);
        let mut refl = body.reflectance;

        if body.is_refractive() {
            let eta = if hit.inside { body.eta } else { 1.0 / body.eta };
            match refract(direction, normal, eta) {
                Some(refraction) => {
                    let cosi = -idotn;
                    let cost = -refraction.dot(normal);
                    let f = if hit.inside {
                        fresnel(cosi, cost, eta, 1.0)
                    } else {
                        fresnel(cosi, cost, 1.0, eta)
                    };
                    refl = (refl * f).saturate();
                    let transmitted =
                        trace(scene, pos - config.bias * normal, refraction, depth + 1, config);
                    sum += refl.one_minus() * transmitted;
                }
                // Total internal reflection
                None => refl = Color::ONE,
            }
        }

        if config.reflectance_gate.admits(refl) {
            let reflected = trace(
                scene,
                pos + config.bias * normal,
                reflect(direction, normal),
                depth + 1,
                config,
            );
            sum += refl * reflected;
        }
    }

    sum * attenuate(body.extinction, crossing.distance)
}

/// `count` directions covering the full circle, one per equal angular bin,
/// each jittered uniformly within its bin.
pub fn jittered_directions(count: u32, rng: &mut dyn RngCore) -> impl Iterator<Item = Vec2> + '_ {
    let n = count as f32;
    (0..count).map(move |i| Vec2::from_angle(TAU * (i as f32 + rng.gen::<f32>()) / n))
}

/// Estimate the radiance gathered at `point` from all directions.
pub fn sample_pixel(
    scene: &Scene,
    point: Vec2,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if config.samples == 0 {
        return Color::ZERO;
    }

    let sum: Color = jittered_directions(config.samples, rng)
        .map(|direction| trace(scene, point, direction, 0, config))
        .sum();

    sum / config.samples as f32
}
