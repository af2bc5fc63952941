// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::light_sampler::LightPdfMode;
use crate::core::material::Material;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{ Float, PDF_EPSILON, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub const DEFAULT_RR_PROBABILITY: Float = 0.8;
const MAX_RR_PROBABILITY: Float = 0.99;

/// Unidirectional path tracer with next event estimation on area lights and
/// Russian roulette termination.
///
/// Direct light and BRDF-sampled bounces are estimated independently: a
/// bounce that lands on an emitter ends the path without adding its
/// emission, because that light was already accounted for by the light
/// sample at the previous vertex.
pub struct PathIntegrator {
    rr_probability: Float,
    samples_per_pixel: u32,
    light_pdf: LightPdfMode,
    max_depth: Option<u32>,
}

impl PathIntegrator {
    pub fn new(rr_probability: Float, samples_per_pixel: u32) -> Self {
        let clamped = if rr_probability.is_nan() {
            DEFAULT_RR_PROBABILITY
        } else {
            rr_probability.clamp(0.0, MAX_RR_PROBABILITY)
        };
        if clamped != rr_probability {
            log::warn!("Russian roulette probability {} clamped to {}", rr_probability, clamped);
        }

        Self {
            rr_probability: clamped,
            samples_per_pixel: samples_per_pixel.max(1),
            light_pdf: LightPdfMode::default(),
            max_depth: None,
        }
    }

    pub fn with_light_pdf(mut self, light_pdf: LightPdfMode) -> Self {
        if light_pdf != LightPdfMode::default() {
            log::info!("Light sample density: {}", light_pdf);
        }
        self.light_pdf = light_pdf;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn rr_probability(&self) -> Float {
        self.rr_probability
    }

    pub fn light_pdf(&self) -> LightPdfMode {
        self.light_pdf
    }

    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }

    /// Radiance arriving along `ray`.
    ///
    /// `depth` is the index of the first vertex; it only matters when a
    /// maximum depth is configured. Per shading vertex the sampler is read
    /// in a fixed order: light choice (1D), light point (2D), roulette (1D),
    /// BRDF direction (2D).
    pub fn cast_ray(&self, scene: &Scene, ray: &Ray3f, depth: u32, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let mut its = match scene.ray_intersection(ray) {
            Some(its) => its,
            None => return RGBSpectrum::default(),
        };
        let mut material = match its.material() {
            Some(m) => m.clone(),
            None => return Self::missing_material(),
        };
        if material.has_emission() {
            return its.le();
        }

        let mut wo = ray.dir();
        let mut depth = depth;
        let mut throughput = RGBSpectrum::splat(1.0);
        let mut radiance = RGBSpectrum::default();

        loop {
            let n = its.normal().normalize();
            let p = its.p();
            radiance += throughput * self.direct_lighting(scene, &its, material.as_ref(), &wo, &n, sampler);

            if self.max_depth.map_or(false, |max| depth >= max) {
                break;
            }
            if sampler.next_1d() >= self.rr_probability {
                break;
            }

            let wi = material.sample(&sampler.next_2d(), &wo, &n);
            if !(wi.norm_squared() > 0.0) {
                break;
            }
            let wi = wi.normalize();

            let next = match scene.ray_intersection(&Ray3f::spawn(p, wi)) {
                Some(next) => next,
                None => break,
            };
            let next_material = match next.material() {
                Some(m) if m.has_emission() => break,
                Some(m) => m.clone(),
                None => return radiance + Self::missing_material(),
            };

            let pdf = material.pdf(&wo, &wi, &n);
            if !(pdf > PDF_EPSILON) || !pdf.is_finite() {
                log::trace!("Path ended on degenerate BRDF density {}", pdf);
                break;
            }

            let cos_theta = wi.dot(&n).max(0.0);
            throughput = throughput * material.eval(&wo, &wi, &n) * (cos_theta / pdf / self.rr_probability);
            if throughput.is_black() {
                break;
            }

            its = next;
            material = next_material;
            wo = wi;
            depth += 1;
        }

        radiance
    }

    /// Single-sample estimate of the light arriving at `its` straight from an
    /// emitter and scattered towards `-wo`.
    pub fn direct_lighting(&self,
                           scene: &Scene,
                           its: &SurfaceIntersection,
                           material: &dyn Material,
                           wo: &Vector3f,
                           n: &Vector3f,
                           sampler: &mut dyn Sampler) -> RGBSpectrum {
        let record = match scene.sample_light(sampler, self.light_pdf) {
            Some(record) => record,
            None => return RGBSpectrum::default(),
        };

        let pdf = record.pdf();
        if !(pdf > 0.0) || !pdf.is_finite() {
            log::trace!("Skipped light sample with density {}", pdf);
            return RGBSpectrum::default();
        }

        let light = record.intersection();
        let p = its.p();
        let to_light = light.p() - p;
        let d1 = to_light.norm();
        if !(d1 > 0.0) {
            return RGBSpectrum::default();
        }

        let ws = to_light / d1;
        let cos_surface = n.dot(&ws).max(0.0);
        let cos_light = light.normal().normalize().dot(&(-ws)).max(0.0);
        if cos_surface <= 0.0 || cos_light <= 0.0 {
            return RGBSpectrum::default();
        }

        let (shadow_ray, _) = Ray3f::spawn_to(p, light.p());
        if scene.ray_intersection_t(&shadow_ray) {
            return RGBSpectrum::default();
        }

        light.le() * material.eval(wo, &ws, n) * (cos_surface * cos_light / (d1 * d1) / pdf)
    }

    fn missing_material() -> RGBSpectrum {
        debug_assert!(false, "scene hit without a material");
        RGBSpectrum::default()
    }
}

impl Integrator for PathIntegrator {
    fn li(&self, scene: &Scene, ray: &Ray3f, sampler: &mut dyn Sampler) -> RGBSpectrum {
        self.cast_ray(scene, ray, 0, sampler)
    }

    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }
}
