//! Optical material model for CSG bodies.

use prism_math::Vec3;

/// Linear RGB radiance or reflectance, unclamped.
pub type Color = Vec3;

/// Colour operations used by the light-transport code.
pub trait ColorExt {
    /// `1 - c` per channel; the weight left for transmission after reflection.
    fn one_minus(self) -> Color;

    /// Clamp every channel into [0, 1].
    fn saturate(self) -> Color;

    /// True when every channel is strictly positive.
    fn is_valid_reflectance(self) -> bool;

    /// True when at least one channel is strictly positive.
    fn any_positive(self) -> bool;
}

impl ColorExt for Color {
    #[inline]
    fn one_minus(self) -> Color {
        Color::ONE - self
    }

    #[inline]
    fn saturate(self) -> Color {
        self.clamp(Color::ZERO, Color::ONE)
    }

    #[inline]
    fn is_valid_reflectance(self) -> bool {
        self.cmpgt(Color::ZERO).all()
    }

    #[inline]
    fn any_positive(self) -> bool {
        self.cmpgt(Color::ZERO).any()
    }
}

/// Optical properties of a solid body.
///
/// `eta == 0` marks an opaque body; anything positive is the refractive index
/// relative to the surrounding medium.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Body {
    /// Emitted radiance (L)
    pub emission: Color,

    /// Reflectance before any Fresnel weighting (R)
    pub reflectance: Color,

    /// Beer-Lambert absorption coefficient per unit length (S)
    pub extinction: Color,

    /// Relative refractive index
    pub eta: f32,
}

impl Body {
    /// Create a body, in the same argument order the scene constructors use.
    pub fn new(extinction: Color, reflectance: Color, eta: f32, emission: Color) -> Self {
        Self {
            emission,
            reflectance,
            extinction,
            eta,
        }
    }

    /// A pure light source: emits `emission`, no reflection, no absorption.
    pub fn emitter(emission: Color) -> Self {
        Self {
            emission,
            ..Default::default()
        }
    }

    /// Check if light can pass through this body.
    pub fn is_refractive(&self) -> bool {
        self.eta > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_minus() {
        let c = Color::new(0.25, 0.5, 1.0);
        assert_eq!(c.one_minus(), Color::new(0.75, 0.5, 0.0));
    }

    #[test]
    fn test_saturate() {
        let c = Color::new(-0.5, 0.5, 2.0);
        assert_eq!(c.saturate(), Color::new(0.0, 0.5, 1.0));
    }

    #[test]
    fn test_reflectance_validity() {
        assert!(Color::splat(0.2).is_valid_reflectance());
        assert!(!Color::new(0.5, 0.0, 0.0).is_valid_reflectance());
        assert!(Color::new(0.5, 0.0, 0.0).any_positive());
        assert!(!Color::ZERO.any_positive());
    }

    #[test]
    fn test_body_defaults() {
        let light = Body::emitter(Color::new(3.0, 0.2, 0.2));
        assert!(light.emission.any_positive());
        assert!(!light.is_refractive());
        assert_eq!(light.reflectance, Color::ZERO);
        assert_eq!(light.extinction, Color::ZERO);

        let glass = Body::new(Color::ZERO, Color::splat(0.2), 1.5, Color::ZERO);
        assert!(glass.is_refractive());
        assert!(!glass.emission.any_positive());
    }
}
