// Copyright @yucwang 2026

use crate::core::material::Material;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

use std::sync::Arc;

/// Turns any surface into an area light. Scattering is delegated to the
/// wrapped material.
pub struct EmissiveMaterial {
    base: Arc<dyn Material>,
    radiance: RGBSpectrum,
}

impl EmissiveMaterial {
    pub fn new(base: Arc<dyn Material>, radiance: RGBSpectrum) -> Self {
        Self { base, radiance }
    }
}

impl Material for EmissiveMaterial {
    fn name(&self) -> &'static str {
        "emissive"
    }

    fn has_emission(&self) -> bool {
        !self.radiance.is_black()
    }

    fn emission(&self) -> RGBSpectrum {
        self.radiance
    }

    fn eval(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> RGBSpectrum {
        self.base.eval(wo, wi, n)
    }

    fn sample(&self, u: &Vector2f, wo: &Vector3f, n: &Vector3f) -> Vector3f {
        self.base.sample(u, wo, n)
    }

    fn pdf(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> Float {
        self.base.pdf(wo, wi, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::lambertian_diffuse::LambertianDiffuse;

    #[test]
    fn test_emission_and_delegation() {
        let base: Arc<dyn Material> = Arc::new(LambertianDiffuse::new(RGBSpectrum::splat(0.65)));
        let light = EmissiveMaterial::new(base.clone(), RGBSpectrum::new(17.0, 12.0, 4.0));
        assert!(light.has_emission());
        assert_eq!(light.emission(), RGBSpectrum::new(17.0, 12.0, 4.0));

        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = -n;
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        assert_eq!(light.eval(&wo, &wi, &n), base.eval(&wo, &wi, &n));
        assert_eq!(light.pdf(&wo, &wi, &n), base.pdf(&wo, &wi, &n));

        let dark = EmissiveMaterial::new(base, RGBSpectrum::default());
        assert!(!dark.has_emission());
    }
}
