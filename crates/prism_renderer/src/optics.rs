//! Reflection, refraction and absorption at and between boundaries.

use prism_core::Color;
use prism_math::Vec2;

/// Beer-Lambert transmittance after travelling `distance` through a medium
/// with per-channel absorption `extinction`.
#[inline]
pub fn attenuate(extinction: Color, distance: f32) -> Color {
    Color::new(
        (-extinction.x * distance).exp(),
        (-extinction.y * distance).exp(),
        (-extinction.z * distance).exp(),
    )
}

/// Unpolarized Fresnel reflectance: the mean of the s- and p-polarized terms.
///
/// `cosi`/`cost` are the cosines of the incident and transmitted angles,
/// `etai`/`etat` the indices on either side.
#[inline]
pub fn fresnel(cosi: f32, cost: f32, etai: f32, etat: f32) -> f32 {
    let rs = (etat * cosi - etai * cost) / (etat * cosi + etai * cost);
    let rp = (etai * cosi - etat * cost) / (etai * cosi + etat * cost);
    (rs * rs + rp * rp) * 0.5
}

/// Mirror `v` about a normal.
#[inline]
pub fn reflect(v: Vec2, n: Vec2) -> Vec2 {
    v - 2.0 * v.dot(n) * n
}

/// Bend `v` through a boundary with relative index `eta` (Snell's law).
///
/// `n` must face against `v`. Returns `None` on total internal reflection.
#[inline]
pub fn refract(v: Vec2, n: Vec2, eta: f32) -> Option<Vec2> {
    let idotn = v.dot(n);
    let k = 1.0 - eta * eta * (1.0 - idotn * idotn);
    if k < 0.0 {
        return None;
    }
    Some(eta * v - (eta * idotn + k.sqrt()) * n)
}
