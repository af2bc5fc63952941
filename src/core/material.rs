// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

/// Capability set a surface exposes to the integrator.
///
/// Direction conventions: `wo` is the direction of the ray that arrived at
/// the shading point (it points *into* the surface), `wi` is the direction
/// leaving the shading point, towards a light sample or along a
/// continuation ray. `n` is the unit surface normal. All directions must be
/// normalized by the caller.
pub trait Material: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn has_emission(&self) -> bool {
        false
    }

    fn emission(&self) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    /// BRDF value for the pair of directions.
    fn eval(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> RGBSpectrum;

    /// Importance-samples an outgoing direction `wi` from two uniform numbers.
    fn sample(&self, u: &Vector2f, wo: &Vector3f, n: &Vector3f) -> Vector3f;

    /// Solid-angle density with which `sample` produces `wi`.
    fn pdf(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> Float;
}
