// Copyright @yucwang 2023

use crate::core::material::Material;
use crate::math::constants::{ Float, INV_PI, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_uniform_hemisphere, sample_uniform_hemisphere_pdf };

/// Ideal diffuse reflector. Directions are drawn uniformly over the
/// hemisphere around the normal.
pub struct LambertianDiffuse {
    albedo: RGBSpectrum
}

impl Material for LambertianDiffuse {
    fn name(&self) -> &'static str {
        "diffuse"
    }

    fn eval(&self, _wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> RGBSpectrum {
        if n.dot(wi) > 0.0 {
            self.albedo * INV_PI
        } else {
            RGBSpectrum::default()
        }
    }

    fn sample(&self, u: &Vector2f, _wo: &Vector3f, n: &Vector3f) -> Vector3f {
        Frame::from_normal(n).to_world(&sample_uniform_hemisphere(u))
    }

    fn pdf(&self, _wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> Float {
        if n.dot(wi) > 0.0 {
            sample_uniform_hemisphere_pdf()
        } else {
            0.0
        }
    }
}

impl LambertianDiffuse {
    pub fn new(albedo: RGBSpectrum) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> RGBSpectrum {
        self.albedo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::INV_2PI;

    #[test]
    fn test_eval_and_pdf_by_hemisphere() {
        let material = LambertianDiffuse::new(RGBSpectrum::new(0.5, 0.25, 1.0));
        let n = Vector3f::new(0.0, 1.0, 0.0);
        let wo = Vector3f::new(0.0, -1.0, 0.0);
        let up = Vector3f::new(0.6, 0.8, 0.0);
        let down = Vector3f::new(0.6, -0.8, 0.0);

        assert_eq!(material.eval(&wo, &up, &n), RGBSpectrum::new(0.5, 0.25, 1.0) * INV_PI);
        assert!(material.eval(&wo, &down, &n).is_black());
        assert_eq!(material.pdf(&wo, &up, &n), INV_2PI);
        assert_eq!(material.pdf(&wo, &down, &n), 0.0);
        assert!(!material.has_emission());
    }

    #[test]
    fn test_samples_stay_above_surface() {
        let material = LambertianDiffuse::new(RGBSpectrum::splat(0.8));
        let n = Vector3f::new(1.0, -2.0, 0.5).normalize();
        let wo = -n;
        for i in 0..16 {
            let u = Vector2f::new((i as Float + 0.5) / 16.0, (i * 7 % 16) as Float / 16.0);
            let wi = material.sample(&u, &wo, &n);
            assert!((wi.norm() - 1.0).abs() < 1e-4);
            assert!(wi.dot(&n) >= -1e-6);
        }

        let straight_up = material.sample(&Vector2f::new(1.0, 0.0), &wo, &n);
        assert!((straight_up - n).norm() < 1e-5);
    }
}
