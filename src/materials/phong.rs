// Copyright @yucwang 2026

use crate::core::material::Material;
use crate::math::constants::{ Float, INV_PI, INV_2PI, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_power_cosine, sample_power_cosine_pdf,
                         sample_uniform_hemisphere, sample_uniform_hemisphere_pdf };

/// Energy-normalized modified Phong: a diffuse lobe plus a `cos^exponent`
/// lobe around the mirror direction.
pub struct Phong {
    kd: RGBSpectrum,
    ks: RGBSpectrum,
    exponent: Float,
    diffuse_weight: Float,
}

impl Phong {
    pub fn new(kd: RGBSpectrum, ks: RGBSpectrum, exponent: Float) -> Self {
        if (kd + ks).max_component() > 1.0 {
            log::warn!("Phong material with kd + ks > 1 is not energy conserving");
        }

        let d = kd.max_component().max(0.0);
        let s = ks.max_component().max(0.0);
        let diffuse_weight = if d + s > 0.0 { d / (d + s) } else { 1.0 };

        Self { kd, ks, exponent: exponent.max(0.0), diffuse_weight }
    }

    fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
        *wo - *n * (2.0 * wo.dot(n))
    }
}

impl Material for Phong {
    fn name(&self) -> &'static str {
        "phong"
    }

    fn eval(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> RGBSpectrum {
        if n.dot(wi) <= 0.0 {
            return RGBSpectrum::default();
        }

        let cos_alpha = Self::reflect(wo, n).dot(wi).max(0.0);
        let specular = (self.exponent + 2.0) * INV_2PI * cos_alpha.powf(self.exponent);

        self.kd * INV_PI + self.ks * specular
    }

    fn sample(&self, u: &Vector2f, wo: &Vector3f, n: &Vector3f) -> Vector3f {
        if u.x < self.diffuse_weight {
            let reused = Vector2f::new(u.x / self.diffuse_weight, u.y);
            return Frame::from_normal(n).to_world(&sample_uniform_hemisphere(&reused));
        }

        let reused = Vector2f::new((u.x - self.diffuse_weight) / (1.0 - self.diffuse_weight), u.y);
        let r = Self::reflect(wo, n).normalize();
        Frame::from_normal(&r).to_world(&sample_power_cosine(&reused, self.exponent))
    }

    fn pdf(&self, wo: &Vector3f, wi: &Vector3f, n: &Vector3f) -> Float {
        if n.dot(wi) <= 0.0 {
            return 0.0;
        }

        let cos_alpha = Self::reflect(wo, n).normalize().dot(wi);
        self.diffuse_weight * sample_uniform_hemisphere_pdf()
            + (1.0 - self.diffuse_weight) * sample_power_cosine_pdf(cos_alpha, self.exponent)
    }
}
