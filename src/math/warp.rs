// Copyright @yucwang 2023

use super::constants::{ INV_2PI, PI, Float, Vector2f, Vector3f };

/// Uniform direction on the +z hemisphere; `u.x` is the cosine of the polar angle.
pub fn sample_uniform_hemisphere(u: &Vector2f) -> Vector3f {
    let z: Float = u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = 2. * PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn sample_uniform_hemisphere_pdf() -> Float {
    INV_2PI
}

pub fn sample_uniform_sphere(u: &Vector2f) -> Vector3f {
    let z: Float = 1.0 - 2.0 * u.x;
    let r: Float = (1. - z * z).max(0.0).sqrt();
    let phi: Float = 2. * PI * u.y;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Direction around +z distributed as `cos^exponent`, used for Phong lobes.
pub fn sample_power_cosine(u: &Vector2f, exponent: Float) -> Vector3f {
    let cos_theta = u.x.powf(1.0 / (exponent + 1.0));
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = 2.0 * PI * u.y;

    Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn sample_power_cosine_pdf(cos_theta: Float, exponent: Float) -> Float {
    if cos_theta <= 0.0 {
        return 0.0;
    }
    (exponent + 1.0) * INV_2PI * cos_theta.powf(exponent)
}

/// Barycentric coordinates of a uniformly distributed point in a triangle.
pub fn square_to_triangle(u: &Vector2f) -> Vector3f {
    let su0 = u.x.sqrt();
    let b0 = 1.0 - su0;
    let b1 = u.y * su0;

    Vector3f::new(b0, b1, 1.0 - b0 - b1)
}
