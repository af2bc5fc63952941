// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Radiance estimator driven by a renderer, one camera ray at a time.
pub trait Integrator: Sync {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum;
    fn samples_per_pixel(&self) -> u32;
}
